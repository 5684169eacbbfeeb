//! The four-stage scrape-and-analyze pipeline.
//!
//! Stages run in order: discover flyers, extract page-image urls, download
//! page images, analyze the downloaded pages. The first two stages abort the
//! run when they produce nothing (nothing downstream could possibly work);
//! the last two record per-store failures and keep going.

use std::path::{Path, PathBuf};

use flyerdb_ai::OpenAiClient;
use flyerdb_core::stores::StoresFile;
use flyerdb_core::{Promotion, StorePromotionsDoc};
use flyerdb_scraper::{
    discover_flyers, extract_store_images, FlyerListing, ImageDownloader, RenderClient,
    StoreImageSet,
};

use crate::artifacts;
use crate::error::{PipelineError, Stage};
use crate::stats::{AnalysisStats, DownloadStats};

/// Clients the pipeline drives. Constructed once by the caller and reused
/// across runs.
pub struct PipelineDeps {
    pub render: RenderClient,
    pub downloader: ImageDownloader,
    pub ai: OpenAiClient,
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Flyer listing index page to discover flyers on.
    pub flyer_index_url: String,
    /// Root directory for downloaded page images, one subdirectory per store.
    pub image_dir: PathBuf,
    /// Directory for the run's JSON artifacts.
    pub artifacts_dir: PathBuf,
    /// Page cap applied per store in both the download and analysis stages.
    pub pages_per_store: usize,
    pub stores: StoresFile,
}

/// What a completed run produced, stage by stage.
#[derive(Debug)]
pub struct PipelineReport {
    pub flyers: Vec<FlyerListing>,
    pub image_sets: Vec<StoreImageSet>,
    pub download: DownloadStats,
    pub analysis: AnalysisStats,
    /// Every extracted promotion across the stores that produced any.
    pub promotions: Vec<Promotion>,
}

/// Runs the full pipeline and returns the per-stage report.
///
/// Artifacts are written as each stage completes, so a run that fails midway
/// still leaves the earlier stages' output on disk for inspection.
///
/// # Errors
///
/// - [`PipelineError::EmptyStage`] — no flyers discovered, or no store
///   yielded page urls.
/// - [`PipelineError::Scrape`] — the index page could not be rendered.
/// - [`PipelineError::ArtifactIo`] / [`PipelineError::ArtifactEncode`] — an
///   artifact file could not be written.
pub async fn run_pipeline(
    deps: &PipelineDeps,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError> {
    let flyers =
        discover_flyers(&deps.render, &config.flyer_index_url, &config.stores.stores).await?;
    if flyers.is_empty() {
        return Err(PipelineError::EmptyStage(Stage::Discover));
    }
    artifacts::write_discovered_flyers(&config.artifacts_dir, &flyers)?;

    let mut image_sets = Vec::new();
    for listing in &flyers {
        match extract_store_images(&deps.render, listing).await {
            Ok(set) if set.image_urls.is_empty() => {
                tracing::warn!(store = %listing.store, "no page urls extracted; skipping store");
            }
            Ok(set) => image_sets.push(set),
            Err(e) => {
                tracing::error!(
                    store = %listing.store,
                    error = %e,
                    "failed to render flyer viewer; skipping store"
                );
            }
        }
    }
    if image_sets.is_empty() {
        return Err(PipelineError::EmptyStage(Stage::ExtractUrls));
    }
    if image_sets.len() < flyers.len() {
        tracing::warn!(
            skipped = flyers.len() - image_sets.len(),
            "some flyers yielded no page urls"
        );
    }
    image_sets.sort_by(|a, b| a.store_key.cmp(&b.store_key));
    artifacts::write_image_url_map(&config.artifacts_dir, &image_sets)?;

    let download = download_stage(&deps.downloader, config, &image_sets).await;
    let (analysis, docs) = run_analysis(&deps.ai, config, None).await?;

    let promotions = docs.into_iter().flat_map(|doc| doc.promotions).collect();
    Ok(PipelineReport {
        flyers,
        image_sets,
        download,
        analysis,
        promotions,
    })
}

/// Downloads each store's page images, capped at `pages_per_store`.
///
/// A store counts as succeeded when at least one page lands on disk. Failed
/// stores are recorded by display name and never abort the stage.
async fn download_stage(
    downloader: &ImageDownloader,
    config: &PipelineConfig,
    image_sets: &[StoreImageSet],
) -> DownloadStats {
    let mut stats = DownloadStats::default();
    for set in image_sets {
        stats.stores_processed += 1;
        stats.total_images += set.image_count.min(config.pages_per_store);

        match downloader
            .download_store_images(set, &config.image_dir, Some(config.pages_per_store))
            .await
        {
            Ok(outcome) if outcome.downloaded > 0 => {
                stats.stores_succeeded += 1;
                stats.total_downloaded += outcome.downloaded;
            }
            Ok(_) => {
                tracing::warn!(store = %set.store, "no pages downloaded");
                stats.failed_stores.push(set.store.clone());
            }
            Err(e) => {
                tracing::error!(store = %set.store, error = %e, "store download failed");
                stats.failed_stores.push(set.store.clone());
            }
        }
    }

    if !stats.failed_stores.is_empty() {
        tracing::warn!(stores = ?stats.failed_stores, "stores with no downloaded pages");
    }
    tracing::info!(
        processed = stats.stores_processed,
        succeeded = stats.stores_succeeded,
        downloaded = stats.total_downloaded,
        "download stage complete"
    );
    stats
}

/// Analyzes every store directory under `image_dir`, current run or stale.
///
/// The directory listing, not the download stage's output, drives this stage:
/// pages left behind by earlier runs still get analyzed, which is what the
/// `exclude_keys` list in the store config is for. A store succeeds when its
/// analysis yields at least one promotion; its document is written either way
/// so an empty result is inspectable. Failed stores are recorded by store key.
///
/// `store_filter` restricts the run to a single store key; the summary
/// artifact then covers only that store.
///
/// # Errors
///
/// Returns [`PipelineError::ArtifactIo`] or [`PipelineError::ArtifactEncode`]
/// if a store document or the summary cannot be written. Per-store analysis
/// failures never abort the run.
pub async fn run_analysis(
    ai: &OpenAiClient,
    config: &PipelineConfig,
    store_filter: Option<&str>,
) -> Result<(AnalysisStats, Vec<StorePromotionsDoc>), PipelineError> {
    let mut store_keys = list_store_dirs(&config.image_dir, &config.stores.exclude_keys);
    if let Some(filter) = store_filter {
        store_keys.retain(|key| key == filter);
    }

    let mut stats = AnalysisStats::default();
    let mut docs = Vec::new();
    for store_key in &store_keys {
        stats.stores_processed += 1;

        let Some(doc) = flyerdb_ai::analyze_store(
            ai,
            store_key,
            &config.image_dir,
            Some(config.pages_per_store),
        )
        .await
        else {
            stats.failed_stores.push(store_key.clone());
            continue;
        };

        artifacts::write_store_doc(&config.artifacts_dir, &doc)?;
        if doc.promotions.is_empty() {
            tracing::warn!(store = %store_key, "analysis produced no promotions");
            stats.failed_stores.push(store_key.clone());
        } else {
            stats.stores_succeeded += 1;
            stats.total_pages += doc.page_count;
            stats.total_promotions += doc.promotion_count;
            docs.push(doc);
        }
    }

    if stats.stores_processed > 0 && stats.stores_succeeded == 0 {
        tracing::warn!("analysis succeeded for no stores");
    }
    artifacts::write_summary(&config.artifacts_dir, &stats, &docs)?;
    tracing::info!(
        processed = stats.stores_processed,
        succeeded = stats.stores_succeeded,
        promotions = stats.total_promotions,
        "analysis stage complete"
    );
    Ok((stats, docs))
}

/// Store subdirectories of `image_dir`, sorted, minus the excluded keys.
fn list_store_dirs(image_dir: &Path, exclude_keys: &[String]) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(image_dir) else {
        tracing::warn!(dir = %image_dir.display(), "image directory missing; nothing to analyze");
        return Vec::new();
    };

    let mut keys: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|key| !exclude_keys.contains(key))
        .collect();
    keys.sort();
    keys
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
