//! JSON artifact files written under the artifacts directory.
//!
//! Every writer overwrites: a pipeline run replaces the previous run's
//! artifacts wholesale, nothing merges.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use flyerdb_core::StorePromotionsDoc;
use flyerdb_scraper::{FlyerListing, StoreImageSet};

use crate::error::PipelineError;
use crate::stats::AnalysisStats;

/// Flyer cards found by the discovery stage.
pub const DISCOVERED_FLYERS_FILE: &str = "discovered_flyers.json";
/// Map of store key to that store's flyer page-image URLs.
pub const IMAGE_URLS_FILE: &str = "flyer_image_urls.json";
/// Condensed per-run analysis summary.
pub const SUMMARY_FILE: &str = "_summary.json";

/// Per-store analysis results land in `<store_key>_promotions.json`.
#[must_use]
pub fn store_doc_filename(store_key: &str) -> String {
    format!("{store_key}_promotions.json")
}

fn write_json<T: Serialize>(
    dir: &Path,
    filename: &str,
    value: &T,
) -> Result<PathBuf, PipelineError> {
    let path = dir.join(filename);
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::ArtifactIo {
        path: path.clone(),
        source,
    })?;
    let payload =
        serde_json::to_string_pretty(value).map_err(|source| PipelineError::ArtifactEncode {
            path: path.clone(),
            source,
        })?;
    std::fs::write(&path, payload).map_err(|source| PipelineError::ArtifactIo {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Writes the discovery stage's flyer cards.
///
/// # Errors
///
/// Returns [`PipelineError::ArtifactIo`] / [`PipelineError::ArtifactEncode`]
/// if the file cannot be written.
pub fn write_discovered_flyers(
    dir: &Path,
    flyers: &[FlyerListing],
) -> Result<PathBuf, PipelineError> {
    let path = write_json(dir, DISCOVERED_FLYERS_FILE, &flyers)?;
    tracing::info!(path = %path.display(), count = flyers.len(), "discovered flyers saved");
    Ok(path)
}

/// Writes the `store_key -> image urls` map for the download stage.
///
/// # Errors
///
/// Returns [`PipelineError::ArtifactIo`] / [`PipelineError::ArtifactEncode`]
/// if the file cannot be written.
pub fn write_image_url_map(dir: &Path, sets: &[StoreImageSet]) -> Result<PathBuf, PipelineError> {
    let map: BTreeMap<&str, &StoreImageSet> = sets
        .iter()
        .map(|set| (set.store_key.as_str(), set))
        .collect();
    let path = write_json(dir, IMAGE_URLS_FILE, &map)?;
    tracing::info!(path = %path.display(), stores = map.len(), "image url map saved");
    Ok(path)
}

/// Writes one store's analysis document.
///
/// # Errors
///
/// Returns [`PipelineError::ArtifactIo`] / [`PipelineError::ArtifactEncode`]
/// if the file cannot be written.
pub fn write_store_doc(dir: &Path, doc: &StorePromotionsDoc) -> Result<PathBuf, PipelineError> {
    let path = write_json(dir, &store_doc_filename(&doc.store_key), doc)?;
    tracing::info!(path = %path.display(), promotions = doc.promotion_count, "store analysis saved");
    Ok(path)
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    stats: &'a AnalysisStats,
    /// Succeeded stores only; failed stores appear in `stats.failed_stores`.
    stores: BTreeMap<&'a str, StoreSummary>,
}

#[derive(Debug, Serialize)]
struct StoreSummary {
    promotion_count: usize,
    page_count: usize,
}

/// Writes the condensed run summary from the analysis stats and the
/// succeeded stores' documents.
///
/// # Errors
///
/// Returns [`PipelineError::ArtifactIo`] / [`PipelineError::ArtifactEncode`]
/// if the file cannot be written.
pub fn write_summary(
    dir: &Path,
    stats: &AnalysisStats,
    docs: &[StorePromotionsDoc],
) -> Result<PathBuf, PipelineError> {
    let stores = docs
        .iter()
        .map(|doc| {
            (
                doc.store_key.as_str(),
                StoreSummary {
                    promotion_count: doc.promotion_count,
                    page_count: doc.page_count,
                },
            )
        })
        .collect();
    let summary = RunSummary { stats, stores };
    let path = write_json(dir, SUMMARY_FILE, &summary)?;
    tracing::info!(path = %path.display(), "run summary saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    use flyerdb_core::Promotion;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flyerdb-artifacts-{tag}-{}",
            std::process::id()
        ));
        if dir.exists() {
            std::fs::remove_dir_all(&dir).expect("failed to clear scratch dir");
        }
        dir
    }

    fn listing(store: &str) -> FlyerListing {
        FlyerListing {
            store: store.to_string(),
            title: "Weekly Savings".to_string(),
            date_range: "Current Week".to_string(),
            url: format!("https://www.redflagdeals.com/flyers/{store}"),
        }
    }

    fn doc(store_key: &str, promotions: Vec<Promotion>) -> StorePromotionsDoc {
        StorePromotionsDoc {
            store: store_key.replace('-', " "),
            store_key: store_key.to_string(),
            page_count: 2,
            total_pages: 4,
            promotion_count: promotions.len(),
            promotions,
        }
    }

    #[test]
    fn discovered_flyers_file_is_a_json_array() {
        let dir = scratch_dir("flyers");
        let path = write_discovered_flyers(&dir, &[listing("metro"), listing("iga")])
            .expect("write should succeed");

        let raw = std::fs::read_to_string(path).expect("artifact should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(value[0]["store"], "metro");
    }

    #[test]
    fn image_url_map_is_keyed_by_store_key() {
        let dir = scratch_dir("url-map");
        let set = StoreImageSet {
            store_key: "no-frills".to_string(),
            store: "no frills".to_string(),
            title: "Weekly Savings".to_string(),
            date_range: "Current Week".to_string(),
            url: "https://www.redflagdeals.com/flyers/no-frills".to_string(),
            image_urls: vec!["https://a.dam-img.rfdcontent.com/cms/1/1_original.jpg".to_string()],
            image_count: 1,
        };
        let path = write_image_url_map(&dir, &[set]).expect("write should succeed");

        let raw = std::fs::read_to_string(path).expect("artifact should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["no-frills"]["image_count"], 1);
        assert_eq!(
            value["no-frills"]["image_urls"][0],
            "https://a.dam-img.rfdcontent.com/cms/1/1_original.jpg"
        );
    }

    #[test]
    fn store_doc_lands_in_suffixed_file_and_overwrites() {
        let dir = scratch_dir("store-doc");
        let first = doc(
            "maxi",
            vec![Promotion {
                item: "Chicken Wings".to_string(),
                price: 6.95,
                unit: "lb".to_string(),
                discount: "30% off".to_string(),
                store: "maxi".to_string(),
            }],
        );
        let path = write_store_doc(&dir, &first).expect("write should succeed");
        assert!(path.ends_with("maxi_promotions.json"));

        // Second write replaces the first wholesale.
        let second = doc("maxi", Vec::new());
        write_store_doc(&dir, &second).expect("overwrite should succeed");

        let raw = std::fs::read_to_string(&path).expect("artifact should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["promotion_count"], 0);
        assert_eq!(value["promotions"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn summary_reports_stats_and_succeeded_stores() {
        let dir = scratch_dir("summary");
        let stats = AnalysisStats {
            stores_processed: 2,
            stores_succeeded: 1,
            total_pages: 2,
            total_promotions: 3,
            failed_stores: vec!["ghost-mart".to_string()],
        };
        let succeeded = doc(
            "iga",
            vec![Promotion {
                item: "Eggs".to_string(),
                price: 2.99,
                unit: "dozen".to_string(),
                discount: String::new(),
                store: "iga".to_string(),
            }],
        );
        let path = write_summary(&dir, &stats, &[succeeded]).expect("write should succeed");
        assert!(path.ends_with("_summary.json"));

        let raw = std::fs::read_to_string(path).expect("artifact should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["stats"]["stores_processed"], 2);
        assert_eq!(value["stats"]["failed_stores"][0], "ghost-mart");
        assert_eq!(value["stores"]["iga"]["promotion_count"], 1);
        assert_eq!(value["stores"]["iga"]["page_count"], 2);
        assert!(value["stores"].get("ghost-mart").is_none());
    }
}
