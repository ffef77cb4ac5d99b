use clap::{Parser, Subcommand};
use photo_gallery::config::{self, SiteConfig};
use photo_gallery::gallery::GalleryCatalog;
use photo_gallery::imaging::{
    self, ImageBackend, OutputFormat, Quality, ResizePolicy, ResizeSpec, RustBackend,
    TransformResult,
};
use photo_gallery::{metadata, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "photo-gallery")]
#[command(about = "Photo gallery lookup and image transforms")]
#[command(long_about = "\
Photo gallery lookup and image transforms

The data root holds a manifest plus one folder per gallery:

  data/
  ├── data.json          # [{\"Name\": \"Sea\", \"Folder\": \"sea\", \"Icon\": \"icon.jpg\"}]
  ├── sea/
  │   ├── icon.jpg       # Gallery icon (must exist)
  │   ├── 001.jpg        # .jpg and .png are listed, any case
  │   └── 002.png
  └── mountains/

Static photos live in <web_root>/<photo_folder> (default wwwroot/data/photo).

Metadata (first available wins):
  Title:   ImageDescription → XPTitle
  Comment: XPComment

Resize policies: none, fit, scale, crop, fill.

The DATA_ROOT environment variable overrides data_root from config.toml.
Run 'photo-gallery gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; stock defaults when missing)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Resize flags shared by transform commands.
#[derive(clap::Args, Clone)]
struct EncodeArgs {
    /// Output mime type (default: from output extension, then config)
    #[arg(long)]
    mime: Option<String>,

    /// Lossy encoding quality, 1-100 (default: from config)
    #[arg(long)]
    quality: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Site(SiteCommand),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

/// Commands that run against a loaded config.
#[derive(Subcommand)]
enum SiteCommand {
    /// List galleries from the manifest
    Galleries,
    /// List the images of a gallery
    Images {
        /// Gallery name (case-insensitive)
        name: String,
    },
    /// Show the icon of a gallery
    Icon {
        /// Gallery name (case-insensitive)
        name: String,
    },
    /// List the static photo folder with titles and comments
    Photos,
    /// Show size and metadata of an image file
    Info { file: PathBuf },
    /// Resize, pad or crop an image and re-encode it
    Transform {
        input: PathBuf,
        output: PathBuf,
        /// none, fit, scale, crop or fill
        #[arg(long, default_value = "fit")]
        policy: String,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Background colour: a name or #rgb/#rrggbb/#rrggbbaa (default: none)
        #[arg(long, default_value = "")]
        background: String,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Scale an image into a square box, keeping its aspect ratio
    Resize {
        input: PathBuf,
        output: PathBuf,
        /// Longest edge in pixels (default: from config)
        #[arg(long)]
        max_size: Option<u32>,
        #[command(flatten)]
        encode: EncodeArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Site(command) => {
            let site_config = config::load_config_with_env(&cli.config)?;
            run(command, &site_config)?;
        }
    }

    Ok(())
}

fn run(command: SiteCommand, site_config: &SiteConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = GalleryCatalog::from_config(site_config);

    match command {
        SiteCommand::Galleries => {
            output::print_galleries(catalog.list_galleries()?);
        }
        SiteCommand::Images { name } => {
            let gallery = catalog.find_gallery(&name)?;
            let images = catalog.gallery_images(&name)?;
            output::print_images(&gallery.name, &images);
        }
        SiteCommand::Icon { name } => {
            let gallery = catalog.find_gallery(&name)?;
            let icon = catalog.gallery_icon(&name)?;
            output::print_icon(&gallery.name, &icon);
        }
        SiteCommand::Photos => {
            init_thread_pool(&site_config.processing);
            let photos = catalog.photos()?;
            output::print_images("Photos", &photos);
        }
        SiteCommand::Info { file } => {
            let bytes = std::fs::read(&file)?;
            let size = RustBackend::new()
                .decode(&bytes)
                .ok()
                .map(|source| source.dimensions());
            output::print_image_info(&file, size, &metadata::read(&bytes));
        }
        SiteCommand::Transform {
            input,
            output: out,
            policy,
            width,
            height,
            background,
            encode,
        } => {
            let spec = ResizeSpec::parse(&policy, width, height, &background);
            let bytes = std::fs::read(&input)?;
            let result = imaging::transform(
                &RustBackend::new(),
                &bytes,
                &spec,
                quality(&encode, site_config),
                &mime_type(&encode, &out, site_config),
            )?;
            write_result(&out, &result)?;
            output::print_transform(&input, &out, &spec, &result);
        }
        SiteCommand::Resize {
            input,
            output: out,
            max_size,
            encode,
        } => {
            let max_size = max_size.unwrap_or(site_config.images.max_size);
            let bytes = std::fs::read(&input)?;
            let result = imaging::resize_image(
                &RustBackend::new(),
                &bytes,
                max_size,
                quality(&encode, site_config),
                &mime_type(&encode, &out, site_config),
            )?;
            write_result(&out, &result)?;
            let spec = ResizeSpec::square(ResizePolicy::Scale, max_size);
            output::print_transform(&input, &out, &spec, &result);
        }
    }

    Ok(())
}

/// Install the fmt subscriber on stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn quality(args: &EncodeArgs, config: &SiteConfig) -> Quality {
    Quality::new(args.quality.unwrap_or(config.images.quality))
}

/// `--mime`, else the output file's extension, else the configured default.
fn mime_type(args: &EncodeArgs, output: &Path, config: &SiteConfig) -> String {
    if let Some(mime) = &args.mime {
        return mime.clone();
    }
    output
        .extension()
        .and_then(|e| e.to_str())
        .and_then(OutputFormat::from_extension)
        .map(|format| format.mime_type().to_string())
        .unwrap_or_else(|| config.images.mime_type.clone())
}

fn write_result(path: &Path, result: &TransformResult) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &result.bytes)
}
