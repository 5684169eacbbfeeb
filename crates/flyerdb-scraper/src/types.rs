use serde::{Deserialize, Serialize};

/// One flyer card scraped from the listing page, after allowlist filtering.
///
/// `store` is the normalized (trimmed, lowercased) dealer name; two cards
/// with the same store and url describe the same flyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerListing {
    pub store: String,
    /// Card title, `"Weekly Savings"` when the card has none.
    pub title: String,
    /// Validity text, `"Current Week"` when the card has none.
    pub date_range: String,
    /// Absolute URL of the flyer viewer page.
    pub url: String,
}

/// The page-image URLs of one store's flyer, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreImageSet {
    pub store_key: String,
    pub store: String,
    pub title: String,
    pub date_range: String,
    pub url: String,
    pub image_urls: Vec<String>,
    pub image_count: usize,
}

/// Outcome of downloading one store's page images.
#[derive(Debug, Clone, Default)]
pub struct StoreDownload {
    /// Pages written to disk.
    pub downloaded: usize,
    /// Failed pages as `(1-based page index, url)`; the batch keeps going past them.
    pub failed: Vec<(usize, String)>,
}

impl StoreDownload {
    /// Total pages attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.downloaded + self.failed.len()
    }
}
