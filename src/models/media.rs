use serde::{Deserialize, Serialize};

/// One photo of the gallery zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryItem {
    pub url: String,
    pub title: String,
}

/// An image file listed from the Drive folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveImage {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

impl DriveImage {
    /// Images without a content link cannot be displayed.
    pub fn into_gallery_item(self) -> Option<GalleryItem> {
        let title = self.name;
        self.url.map(|url| GalleryItem { url, title })
    }
}
