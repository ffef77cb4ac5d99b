//! Shared records: galleries from the manifest and image entries handed to
//! page rendering.

use serde::{Deserialize, Serialize};

/// One gallery record from the `data.json` manifest.
///
/// The manifest uses PascalCase keys:
///
/// ```json
/// [{ "Name": "Sea", "Folder": "sea", "Icon": "icon.jpg" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Gallery {
    /// Display name, also the lookup key (case-insensitive).
    pub name: String,
    /// Subfolder of the data root holding the gallery's images.
    pub folder: String,
    /// Filename of the cover image inside `folder`.
    pub icon: String,
}

/// An image as shown on a page: where it is served from plus its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// URL folder, e.g. `/root/sea` or `/data/photo`.
    pub folder: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl ImageEntry {
    pub fn new(folder: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, title: String, comment: String) -> Self {
        self.title = title;
        self.comment = comment;
        self
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.folder, self.filename)
    }
}
