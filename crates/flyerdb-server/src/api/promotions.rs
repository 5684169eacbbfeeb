use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use flyerdb_core::Promotion;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct PromotionsData {
    pub promotions: Vec<Promotion>,
    pub count: usize,
    /// When the promotion set was last refreshed by a scrape; the current
    /// time when no scrape has ever been recorded.
    pub last_updated: DateTime<Utc>,
}

/// `GET /api/v1/promotions` — the current promotion set.
pub(super) async fn list_promotions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<PromotionsData>>, ApiError> {
    let promotions = flyerdb_db::current_promotions(&state.pool, &state.pipeline.artifacts_dir)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let last_updated = flyerdb_db::latest_scrape(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .map_or_else(Utc::now, |scrape| scrape.created_at);

    let count = promotions.len();
    Ok(Json(ApiResponse {
        data: PromotionsData {
            promotions,
            count,
            last_updated,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
