//! Gallery lookup over the data root.
//!
//! The data root holds a JSON manifest plus one folder per gallery:
//!
//! ```text
//! data/
//! ├── data.json        [{"Name": "Sea", "Folder": "sea", "Icon": "icon.jpg"}, ...]
//! ├── sea/
//! │   ├── icon.jpg
//! │   ├── 001.jpg
//! │   └── 002.PNG
//! └── mountains/
//!     └── ...
//! ```
//!
//! The manifest is read lazily on first use and then kept for the lifetime of
//! the catalog. Population happens under a mutex, so concurrent first callers
//! still read the file once; after that every read is lock-free.
//!
//! Images are served under [`ROOT_URL_PREFIX`], so an entry for `sea/001.jpg`
//! has the URL `/root/sea/001.jpg`. The static photo folder lives under the
//! web root and is served at `/<photo_folder>`.

use crate::config::SiteConfig;
use crate::metadata;
use crate::types::{Gallery, ImageEntry};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// URL prefix under which the data root is served.
pub const ROOT_URL_PREFIX: &str = "/root";

/// Extensions (lowercase) listed as gallery images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Gallery not found: {0}")]
    GalleryNotFound(String),
    #[error("Gallery folder not found: {0}")]
    FolderNotFound(PathBuf),
    #[error("Gallery icon not found: {0}")]
    IconNotFound(PathBuf),
    #[error("Image not found in gallery: {0}")]
    ImageNotFound(String),
    #[error("Manifest not found: {0}")]
    Manifest(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GalleryError>;

/// Galleries and photos under a data root and a web root.
#[derive(Debug)]
pub struct GalleryCatalog {
    data_root: PathBuf,
    manifest_file: String,
    photo_dir: PathBuf,
    photo_url: String,
    galleries: OnceLock<Vec<Gallery>>,
    init: Mutex<()>,
}

impl GalleryCatalog {
    /// Catalog with the stock manifest name and photo folder.
    pub fn new(data_root: impl Into<PathBuf>, web_root: impl AsRef<Path>) -> Self {
        let defaults = SiteConfig::default();
        Self::build(
            data_root.into(),
            web_root.as_ref(),
            &defaults.manifest,
            &defaults.photo_folder,
        )
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::build(
            config.data_root_path(),
            &config.web_root_path(),
            &config.manifest,
            &config.photo_folder,
        )
    }

    fn build(data_root: PathBuf, web_root: &Path, manifest: &str, photo_folder: &str) -> Self {
        let photo_folder = photo_folder.trim_matches('/');
        Self {
            data_root,
            manifest_file: manifest.to_string(),
            photo_dir: web_root.join(photo_folder),
            photo_url: format!("/{photo_folder}"),
            galleries: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_root.join(&self.manifest_file)
    }

    /// All galleries in manifest order.
    ///
    /// The first successful call reads the manifest; later calls return the
    /// cached list. A failed read is not cached, so the next call retries.
    pub fn list_galleries(&self) -> Result<&[Gallery]> {
        if let Some(galleries) = self.galleries.get() {
            return Ok(galleries);
        }
        let _guard = self.init.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(galleries) = self.galleries.get() {
            return Ok(galleries);
        }
        let loaded = self.load_manifest()?;
        Ok(self.galleries.get_or_init(|| loaded))
    }

    fn load_manifest(&self) -> Result<Vec<Gallery>> {
        let path = self.manifest_path();
        if !path.is_file() {
            return Err(GalleryError::Manifest(path));
        }
        let content = std::fs::read_to_string(&path)?;
        let galleries: Vec<Gallery> = serde_json::from_str(&content)?;
        info!(path = %path.display(), count = galleries.len(), "loaded gallery manifest");
        Ok(galleries)
    }

    /// Find a gallery by name, ignoring case.
    pub fn find_gallery(&self, name: &str) -> Result<&Gallery> {
        let needle = name.to_lowercase();
        self.list_galleries()?
            .iter()
            .find(|g| g.name.to_lowercase() == needle)
            .ok_or_else(|| GalleryError::GalleryNotFound(name.to_string()))
    }

    /// Filesystem folder of a gallery.
    pub fn gallery_dir(&self, gallery: &Gallery) -> PathBuf {
        self.data_root.join(&gallery.folder)
    }

    /// Images of a gallery, sorted by filename.
    ///
    /// Entries carry the `/root/<Folder>` URL folder and no text; titles are
    /// read by the page that shows a single image.
    pub fn gallery_images(&self, name: &str) -> Result<Vec<ImageEntry>> {
        let gallery = self.find_gallery(name)?;
        let dir = self.gallery_dir(gallery);
        if !dir.is_dir() {
            return Err(GalleryError::FolderNotFound(dir));
        }
        let url_folder = gallery_url_folder(gallery);
        Ok(list_images_in(&dir)?
            .into_iter()
            .map(|filename| ImageEntry::new(url_folder.clone(), filename))
            .collect())
    }

    /// The cover image of a gallery. The icon file must exist.
    pub fn gallery_icon(&self, name: &str) -> Result<ImageEntry> {
        let gallery = self.find_gallery(name)?;
        let path = self.gallery_dir(gallery).join(&gallery.icon);
        if !path.is_file() {
            return Err(GalleryError::IconNotFound(path));
        }
        Ok(ImageEntry::new(gallery_url_folder(gallery), gallery.icon.clone()))
    }

    /// Filesystem path of a gallery image, for handing to the decoder.
    ///
    /// `filename` must be one of the names [`list_images_in`] returns for the
    /// gallery folder; anything else, including paths, is `ImageNotFound`.
    pub fn image_path(&self, name: &str, filename: &str) -> Result<PathBuf> {
        let gallery = self.find_gallery(name)?;
        let dir = self.gallery_dir(gallery);
        if !dir.is_dir() {
            return Err(GalleryError::FolderNotFound(dir));
        }
        if !list_images_in(&dir)?.iter().any(|listed| listed == filename) {
            return Err(GalleryError::ImageNotFound(filename.to_string()));
        }
        Ok(dir.join(filename))
    }

    /// Photos of the static photo folder with their title and comment.
    ///
    /// A missing folder is an empty list. Metadata is read in parallel.
    pub fn photos(&self) -> Result<Vec<ImageEntry>> {
        if !self.photo_dir.is_dir() {
            debug!(path = %self.photo_dir.display(), "photo folder missing");
            return Ok(Vec::new());
        }
        let filenames = list_images_in(&self.photo_dir)?;
        Ok(filenames
            .into_par_iter()
            .map(|filename| {
                let meta = metadata::read_file(&self.photo_dir.join(&filename));
                ImageEntry::new(self.photo_url.clone(), filename)
                    .with_text(meta.title, meta.comment)
            })
            .collect())
    }
}

fn gallery_url_folder(gallery: &Gallery) -> String {
    format!("{ROOT_URL_PREFIX}/{}", gallery.folder)
}

/// Image filenames directly inside `folder`, sorted.
///
/// Only `.jpg` and `.png` files are listed, matched case-insensitively.
/// Subdirectories are not descended into.
pub fn list_images_in(folder: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => GalleryError::Io(io),
            None => GalleryError::FolderNotFound(folder.to_path_buf()),
        })?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::tags::{TAG_IMAGE_DESCRIPTION, TAG_XP_COMMENT};
    use crate::test_helpers::{TiffEntry, jpeg_with_exif, setup_gallery_root, utf16z};
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // list_images_in
    // =========================================================================

    #[test]
    fn list_images_filters_extensions_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.JPG", "a.png", "c.Png", "notes.txt", "d.jpeg", "e.gif"] {
            fs::write(tmp.path().join(name), b"x").unwrap();
        }
        let names = list_images_in(tmp.path()).unwrap();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.Png"]);
    }

    #[test]
    fn list_images_skips_subdirectories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested.jpg")).unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/inner.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("top.jpg"), b"x").unwrap();
        assert_eq!(list_images_in(tmp.path()).unwrap(), vec!["top.jpg"]);
    }

    #[test]
    fn list_images_missing_folder_is_error() {
        let tmp = TempDir::new().unwrap();
        assert!(list_images_in(&tmp.path().join("nope")).is_err());
    }

    // =========================================================================
    // manifest
    // =========================================================================

    #[test]
    fn list_galleries_in_manifest_order() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        let names: Vec<&str> = catalog
            .list_galleries()
            .unwrap()
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["Sea", "Mountains", "Empty"]);
    }

    #[test]
    fn manifest_read_once() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert_eq!(catalog.list_galleries().unwrap().len(), 3);

        fs::write(catalog.manifest_path(), "[]").unwrap();
        assert_eq!(catalog.list_galleries().unwrap().len(), 3);
    }

    #[test]
    fn manifest_loaded_once_across_threads() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        let firsts: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| catalog.list_galleries().unwrap().as_ptr() as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(firsts.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn missing_manifest_is_error() {
        let tmp = TempDir::new().unwrap();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(
            catalog.list_galleries(),
            Err(GalleryError::Manifest(_))
        ));
    }

    #[test]
    fn malformed_manifest_is_json_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("data.json"), "{not json").unwrap();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(catalog.list_galleries(), Err(GalleryError::Json(_))));
    }

    #[test]
    fn failed_load_is_retried() {
        let tmp = TempDir::new().unwrap();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(catalog.list_galleries().is_err());

        fs::write(
            tmp.path().join("data.json"),
            r#"[{"Name":"Late","Folder":"late","Icon":"i.jpg"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.list_galleries().unwrap()[0].name, "Late");
    }

    #[test]
    fn custom_manifest_name_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("galleries.json"), "[]").unwrap();
        let config = SiteConfig {
            data_root: tmp.path().to_string_lossy().into_owned(),
            manifest: "galleries.json".into(),
            ..SiteConfig::default()
        };
        let catalog = GalleryCatalog::from_config(&config);
        assert!(catalog.list_galleries().unwrap().is_empty());
    }

    // =========================================================================
    // find_gallery
    // =========================================================================

    #[test]
    fn find_gallery_ignores_case() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert_eq!(catalog.find_gallery("sea").unwrap().folder, "sea");
        assert_eq!(catalog.find_gallery("MOUNTAINS").unwrap().folder, "mountains");
    }

    #[test]
    fn find_gallery_requires_exact_name() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(
            catalog.find_gallery("Se"),
            Err(GalleryError::GalleryNotFound(name)) if name == "Se"
        ));
    }

    // =========================================================================
    // gallery_images / gallery_icon
    // =========================================================================

    #[test]
    fn gallery_images_use_root_url_folder() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        let images = catalog.gallery_images("Sea").unwrap();
        let urls: Vec<String> = images.iter().map(ImageEntry::url).collect();
        assert_eq!(
            urls,
            vec!["/root/sea/001.jpg", "/root/sea/002.PNG", "/root/sea/icon.jpg"]
        );
    }

    #[test]
    fn gallery_images_missing_folder() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(
            catalog.gallery_images("Empty"),
            Err(GalleryError::FolderNotFound(_))
        ));
    }

    #[test]
    fn gallery_images_unknown_gallery() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(
            catalog.gallery_images("Desert"),
            Err(GalleryError::GalleryNotFound(_))
        ));
    }

    #[test]
    fn gallery_icon_found() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert_eq!(catalog.gallery_icon("sea").unwrap().url(), "/root/sea/icon.jpg");
    }

    #[test]
    fn gallery_icon_missing_file() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(
            catalog.gallery_icon("Mountains"),
            Err(GalleryError::IconNotFound(_))
        ));
    }

    #[test]
    fn image_path_joins_data_root() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert_eq!(
            catalog.image_path("Sea", "001.jpg").unwrap(),
            tmp.path().join("sea/001.jpg")
        );
    }

    #[test]
    fn image_path_rejects_names_outside_listing() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        for filename in [
            "../../../../etc/passwd",
            "../mountains/001.jpg",
            "/etc/hosts",
            "notes.txt",
            "missing.jpg",
            "",
        ] {
            assert!(
                matches!(
                    catalog.image_path("Sea", filename),
                    Err(GalleryError::ImageNotFound(ref name)) if name == filename
                ),
                "{filename}"
            );
        }
    }

    #[test]
    fn image_path_missing_folder() {
        let tmp = setup_gallery_root();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(matches!(
            catalog.image_path("Empty", "001.jpg"),
            Err(GalleryError::FolderNotFound(_))
        ));
    }

    // =========================================================================
    // photos
    // =========================================================================

    #[test]
    fn photos_missing_folder_is_empty() {
        let tmp = TempDir::new().unwrap();
        let catalog = GalleryCatalog::new(tmp.path(), tmp.path());
        assert!(catalog.photos().unwrap().is_empty());
    }

    #[test]
    fn photos_carry_title_and_comment() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("data/photo");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("a.jpg"),
            jpeg_with_exif(
                4,
                4,
                &[
                    TiffEntry::ascii(TAG_IMAGE_DESCRIPTION, "Pier"),
                    TiffEntry::bytes(TAG_XP_COMMENT, utf16z("Low tide")),
                ],
            ),
        )
        .unwrap();
        fs::write(dir.join("b.png"), b"not really a png").unwrap();
        fs::write(dir.join("readme.md"), b"skip").unwrap();

        let catalog = GalleryCatalog::new(tmp.path().join("data"), tmp.path());
        let photos = catalog.photos().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].url(), "/data/photo/a.jpg");
        assert_eq!(photos[0].title, "Pier");
        assert_eq!(photos[0].comment, "Low tide");
        assert_eq!(photos[1].filename, "b.png");
        assert_eq!(photos[1].title, "");
    }
}
