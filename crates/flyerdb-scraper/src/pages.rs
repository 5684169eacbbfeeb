//! Page-image URL extraction from a flyer's viewer page.

use std::collections::HashSet;

use regex::Regex;

use flyerdb_core::stores::store_key;

use crate::error::ScrapeError;
use crate::render::RenderClient;
use crate::types::{FlyerListing, StoreImageSet};

/// Fixed CDN pattern for full-resolution flyer page images.
const IMAGE_URL_PATTERN: &str =
    r"https://[a-z]\.dam-img\.rfdcontent\.com/cms/[0-9/]+_original\.jpg";

/// Extract page-image URLs from rendered viewer HTML.
///
/// The pattern is applied to the whole document rather than by walking
/// markup: the viewer embeds page URLs in scripts and attributes whose shape
/// shifts between site updates, while the CDN URL format stays put.
/// Duplicates are dropped; first-occurrence order is page order.
#[must_use]
pub fn extract_page_urls(html: &str) -> Vec<String> {
    let re = Regex::new(IMAGE_URL_PATTERN).expect("valid image url regex");

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for found in re.find_iter(html) {
        let url = found.as_str();
        if seen.insert(url.to_string()) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Render a flyer's viewer page and collect its page-image URLs.
///
/// Zero extracted URLs is not an error; a warning is logged since it usually
/// means the viewer markup changed.
///
/// # Errors
///
/// Returns [`ScrapeError::Render`] or [`ScrapeError::Http`] if the viewer
/// page cannot be rendered.
pub async fn extract_store_images(
    render: &RenderClient,
    listing: &FlyerListing,
) -> Result<StoreImageSet, ScrapeError> {
    tracing::info!(store = %listing.store, url = %listing.url, "rendering flyer viewer");
    let html = render.content(&listing.url).await?;
    let image_urls = extract_page_urls(&html);

    if image_urls.is_empty() {
        tracing::warn!(
            store = %listing.store,
            "no page images found; viewer markup may have changed"
        );
    } else {
        tracing::info!(
            store = %listing.store,
            pages = image_urls.len(),
            "extracted flyer page urls"
        );
    }

    Ok(StoreImageSet {
        store_key: store_key(&listing.store),
        store: listing.store.clone(),
        title: listing.title.clone(),
        date_range: listing.date_range.clone(),
        url: listing.url.clone(),
        image_count: image_urls.len(),
        image_urls,
    })
}
