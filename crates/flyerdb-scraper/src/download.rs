//! Flyer page-image downloads.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::types::{StoreDownload, StoreImageSet};

/// Browser-typical request headers; the CDN refuses obvious bot requests.
const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REFERER: &str = "https://www.redflagdeals.com/";
const ACCEPT_IMAGES: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Downloads flyer page images to disk.
///
/// No automatic retry: a failed page is recorded and skipped, and the next
/// pipeline run overwrites whatever did land on disk.
pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    /// Creates a downloader with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(BROWSER_UA)
            .build()?;
        Ok(Self { client })
    }

    /// Download one store's page images into `<image_root>/<store_key>/`.
    ///
    /// Pages are numbered 1-based in URL order and written as
    /// `<store_key>_page_NNN.jpg` (zero-padded to three digits), overwriting
    /// previous runs. `limit_pages` truncates the URL list up front so capped
    /// pages are never fetched. One page's failure never aborts the batch:
    /// `downloaded + failed.len()` always equals the attempted count.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Io`] only if the store directory cannot be
    /// created; per-page failures land in [`StoreDownload::failed`].
    pub async fn download_store_images(
        &self,
        set: &StoreImageSet,
        image_root: &Path,
        limit_pages: Option<usize>,
    ) -> Result<StoreDownload, ScrapeError> {
        let store_dir = image_root.join(&set.store_key);
        tokio::fs::create_dir_all(&store_dir)
            .await
            .map_err(|e| ScrapeError::Io {
                path: store_dir.display().to_string(),
                source: e,
            })?;

        let urls: Vec<&String> = match limit_pages {
            Some(limit) => set.image_urls.iter().take(limit).collect(),
            None => set.image_urls.iter().collect(),
        };

        let mut outcome = StoreDownload::default();
        for (idx, url) in urls.iter().enumerate() {
            let page = idx + 1;
            let dest = store_dir.join(format!("{}_page_{page:03}.jpg", set.store_key));

            match self.download_page(url, &dest).await {
                Ok(()) => {
                    tracing::debug!(store = %set.store_key, page, "downloaded flyer page");
                    outcome.downloaded += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        store = %set.store_key,
                        page,
                        url = %url,
                        error = %e,
                        "failed to download flyer page"
                    );
                    outcome.failed.push((page, (*url).clone()));
                }
            }
        }

        tracing::info!(
            store = %set.store_key,
            downloaded = outcome.downloaded,
            failed = outcome.failed.len(),
            "store download complete"
        );
        Ok(outcome)
    }

    async fn download_page(&self, url: &str, dest: &Path) -> Result<(), ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::REFERER, REFERER)
            .header(reqwest::header::ACCEPT, ACCEPT_IMAGES)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| ScrapeError::Io {
                path: dest.display().to_string(),
                source: e,
            })?;
        Ok(())
    }
}
