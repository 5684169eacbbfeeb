//! Run statistics for the download and analysis stages.

use serde::Serialize;

/// Outcome counters for the image download stage.
///
/// `total_downloaded <= total_images` always holds; the difference is pages
/// that failed mid-batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadStats {
    pub stores_processed: usize,
    pub stores_succeeded: usize,
    /// Page downloads attempted across all stores, after the page cap.
    pub total_images: usize,
    /// Page images actually written to disk.
    pub total_downloaded: usize,
    /// Stores where nothing could be downloaded, by display name.
    pub failed_stores: Vec<String>,
}

/// Outcome counters for the vision analysis stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub stores_processed: usize,
    pub stores_succeeded: usize,
    /// Pages analyzed across succeeded stores.
    pub total_pages: usize,
    pub total_promotions: usize,
    /// Stores that yielded no promotions, by store key.
    pub failed_stores: Vec<String>,
}
