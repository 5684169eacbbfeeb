use axum::{extract::State, Extension, Json};
use serde::Serialize;

use flyerdb_core::Promotion;
use flyerdb_db::ScrapeRow;
use flyerdb_pipeline::run_pipeline;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct ScrapeData {
    pub status: &'static str,
    pub message: String,
    pub promotions: Vec<Promotion>,
    pub count: usize,
}

/// Runs the full pipeline, then ingests whatever the artifact directory holds.
///
/// Ingestion reads the artifact files rather than the run report: store
/// documents left by earlier runs still count, so a store that failed this
/// week keeps last week's promotions in the set. Callers must hold the
/// scrape guard.
pub(crate) async fn run_and_ingest(state: &AppState) -> anyhow::Result<(ScrapeRow, Vec<Promotion>)> {
    let report = run_pipeline(&state.deps, &state.pipeline).await?;
    tracing::info!(
        flyers = report.flyers.len(),
        stores = report.image_sets.len(),
        images_downloaded = report.download.total_downloaded,
        promotions = report.analysis.total_promotions,
        "pipeline run finished"
    );

    let promotions = flyerdb_db::load_promotions_from_dir(&state.pipeline.artifacts_dir);
    let scrape = flyerdb_db::ingest_promotions(&state.pool, &promotions).await?;
    Ok((scrape, promotions))
}

/// `POST /api/v1/scrape` — run the pipeline now and ingest the results.
pub(super) async fn trigger_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ScrapeData>>, ApiError> {
    let Ok(_guard) = state.scrape_guard.try_lock() else {
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "a scrape is already running",
        ));
    };

    let (scrape, promotions) = run_and_ingest(&state).await.map_err(|e| {
        tracing::error!(error = %e, "scrape run failed");
        ApiError::new(req_id.0.clone(), "pipeline_failed", e.to_string())
    })?;
    tracing::info!(scrape_id = %scrape.scrape_id, "scrape ingested");

    let count = promotions.len();
    Ok(Json(ApiResponse {
        data: ScrapeData {
            status: "success",
            message: "scrape and analysis completed".to_string(),
            promotions,
            count,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
