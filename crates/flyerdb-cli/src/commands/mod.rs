//! Command handlers for the CLI.
//!
//! These are called from `main` after configuration is loaded and, for the
//! commands that touch the database, after the pool is established. Per-store
//! failures inside a run are logged and folded into the printed statistics
//! rather than propagated, so one bad store does not abort a full run.

use std::collections::BTreeMap;
use std::path::Path;

use flyerdb_ai::OpenAiClient;
use flyerdb_core::stores::StoresFile;
use flyerdb_core::{AppConfig, Promotion};
use flyerdb_pipeline::{run_analysis, run_pipeline, PipelineConfig, PipelineDeps};
use flyerdb_scraper::{discover_flyers, ImageDownloader, RenderClient};

/// Build the pipeline clients from application config.
fn build_deps(config: &AppConfig) -> anyhow::Result<PipelineDeps> {
    Ok(PipelineDeps {
        render: RenderClient::new(
            &config.render_url,
            config.render_token.as_deref(),
            config.render_timeout_secs,
        )?,
        downloader: ImageDownloader::new(config.download_timeout_secs)?,
        ai: OpenAiClient::with_base_url(
            &config.openai_api_key,
            config.ai_timeout_secs,
            &config.openai_base_url,
        )?,
    })
}

fn build_pipeline_config(config: &AppConfig, stores: StoresFile) -> PipelineConfig {
    PipelineConfig {
        flyer_index_url: config.flyer_index_url.clone(),
        image_dir: config.image_dir.clone(),
        artifacts_dir: config.artifacts_dir.clone(),
        pages_per_store: config.pages_per_store,
        stores,
    }
}

/// Restrict the store allowlist to a single store key.
fn filter_stores(mut stores: StoresFile, key: &str) -> anyhow::Result<StoresFile> {
    stores.stores.retain(|store| store.store_key() == key);
    if stores.stores.is_empty() {
        anyhow::bail!("store '{key}' is not in the allowlist; check config/stores.yaml");
    }
    Ok(stores)
}

/// Run the full pipeline and ingest the resulting artifact set.
///
/// # Errors
///
/// Returns an error if the store filter matches nothing, the pipeline aborts,
/// or the ingest fails. Per-store download and analysis failures only show up
/// in the printed statistics.
pub(crate) async fn run_scrape(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    store_filter: Option<&str>,
) -> anyhow::Result<()> {
    let mut stores = flyerdb_core::stores::load_stores(&config.stores_path)?;
    if let Some(key) = store_filter {
        stores = filter_stores(stores, key)?;
    }

    let deps = build_deps(config)?;
    let pipeline = build_pipeline_config(config, stores);

    let report = run_pipeline(&deps, &pipeline).await?;
    println!(
        "scraped {} flyers: {} pages downloaded, {} promotions from {} stores",
        report.flyers.len(),
        report.download.total_downloaded,
        report.analysis.total_promotions,
        report.analysis.stores_succeeded,
    );

    let promotions = flyerdb_db::load_promotions_from_dir(&pipeline.artifacts_dir);
    let scrape = flyerdb_db::ingest_promotions(pool, &promotions).await?;
    println!(
        "ingested {} promotions as scrape {}",
        scrape.promotion_count, scrape.scrape_id
    );
    Ok(())
}

/// Preview a scrape: render the flyer index and print which flyers a real run
/// would fetch. Nothing is downloaded, written, or ingested.
///
/// # Errors
///
/// Returns an error if the store filter matches nothing or the index page
/// cannot be rendered.
pub(crate) async fn run_scrape_dry_run(
    config: &AppConfig,
    store_filter: Option<&str>,
) -> anyhow::Result<()> {
    let mut stores = flyerdb_core::stores::load_stores(&config.stores_path)?;
    if let Some(key) = store_filter {
        stores = filter_stores(stores, key)?;
    }

    let render = RenderClient::new(
        &config.render_url,
        config.render_token.as_deref(),
        config.render_timeout_secs,
    )?;
    let flyers = discover_flyers(&render, &config.flyer_index_url, &stores.stores).await?;
    if flyers.is_empty() {
        println!("dry-run: no flyers found for the configured stores");
        return Ok(());
    }

    println!("dry-run: would scrape {} flyers:", flyers.len());
    for flyer in &flyers {
        println!("  {}: {} ({})", flyer.store, flyer.title, flyer.date_range);
    }
    Ok(())
}

/// Re-run analysis over page images already on disk, rewriting the artifact
/// files. Does not touch the database; follow up with `import` to ingest.
///
/// # Errors
///
/// Returns an error if the store config cannot be loaded, the clients cannot
/// be built, or an artifact cannot be written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    store_filter: Option<&str>,
) -> anyhow::Result<()> {
    let stores = flyerdb_core::stores::load_stores(&config.stores_path)?;
    let deps = build_deps(config)?;
    let pipeline = build_pipeline_config(config, stores);

    if let Some(key) = store_filter {
        if !pipeline.image_dir.join(key).is_dir() {
            anyhow::bail!(
                "no downloaded pages for store '{key}' under {}",
                pipeline.image_dir.display()
            );
        }
    }

    let (stats, _docs) = run_analysis(&deps.ai, &pipeline, store_filter).await?;
    if stats.stores_processed == 0 {
        println!("nothing to analyze under {}", pipeline.image_dir.display());
        return Ok(());
    }

    println!(
        "analyzed {} pages across {} stores: {} promotions",
        stats.total_pages, stats.stores_succeeded, stats.total_promotions
    );
    if !stats.failed_stores.is_empty() {
        println!(
            "stores with no promotions: {}",
            stats.failed_stores.join(", ")
        );
    }
    Ok(())
}

/// Ingest previously written artifact files into the database.
///
/// Covers artifacts produced by `analyze` or copied from elsewhere; a scrape
/// run ingests its own output already.
///
/// # Errors
///
/// Returns an error if the ingest transaction fails.
pub(crate) async fn run_import(pool: &sqlx::PgPool, artifacts_dir: &Path) -> anyhow::Result<()> {
    let promotions = flyerdb_db::load_promotions_from_dir(artifacts_dir);
    if promotions.is_empty() {
        println!(
            "no promotion artifacts found under {}; run a scrape first",
            artifacts_dir.display()
        );
        return Ok(());
    }

    let scrape = flyerdb_db::ingest_promotions(pool, &promotions).await?;
    println!(
        "ingested {} promotions as scrape {}",
        scrape.promotion_count, scrape.scrape_id
    );
    Ok(())
}

/// Print the current promotion set, grouped by store.
///
/// # Errors
///
/// Returns an error if the database queries fail.
pub(crate) async fn run_promotions(
    pool: &sqlx::PgPool,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let promotions = flyerdb_db::current_promotions(pool, &config.artifacts_dir).await?;
    if promotions.is_empty() {
        println!("no promotions available; run a scrape first");
        return Ok(());
    }

    if let Some(scrape) = flyerdb_db::latest_scrape(pool).await? {
        println!(
            "scrape {} at {} ({} promotions)",
            scrape.scrape_id, scrape.created_at, scrape.promotion_count
        );
    }
    for (store, count) in count_by_store(&promotions) {
        println!("  {store}: {count} promotions");
    }
    println!("total: {} promotions", promotions.len());
    Ok(())
}

/// Promotion counts per store display name, sorted by store.
fn count_by_store(promotions: &[Promotion]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for promo in promotions {
        *counts.entry(promo.store.clone()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
