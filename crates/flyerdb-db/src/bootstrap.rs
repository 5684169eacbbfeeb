//! File-based fallback for the promotion set.
//!
//! Before the first ingestion the database has no scrape rows, but earlier
//! runs may have left per-store artifact files on disk. These loaders read
//! them so the API can serve promotions from a cold database.

use std::path::Path;

use sqlx::PgPool;

use flyerdb_core::{Promotion, StorePromotionsDoc};

use crate::promotions::query_current_promotions;
use crate::DbError;

/// Load promotions from per-store artifact files in `dir`.
///
/// Scans for `*_promotions.json` files, sorted by filename so the result
/// order is stable across runs. Unreadable or malformed files are logged and
/// skipped; a missing directory yields an empty set.
#[must_use]
pub fn load_promotions_from_dir(dir: &Path) -> Vec<Promotion> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(
                dir = %dir.display(),
                error = %e,
                "promotion artifacts directory not readable"
            );
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("_promotions.json"))
        })
        .collect();
    paths.sort();

    let mut promotions = Vec::new();
    for path in paths {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable promotions file"
                );
                continue;
            }
        };

        match serde_json::from_str::<StorePromotionsDoc>(&content) {
            Ok(doc) => promotions.extend(doc.promotions),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping malformed promotions file"
                );
            }
        }
    }

    promotions
}

/// Current promotions from the database, falling back to artifact files when
/// no scrape has been ingested yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the database query fails. File-level problems
/// on the fallback path are skipped, never propagated.
pub async fn current_promotions(
    pool: &PgPool,
    artifacts_dir: &Path,
) -> Result<Vec<Promotion>, DbError> {
    if let Some(promotions) = query_current_promotions(pool).await? {
        return Ok(promotions);
    }

    tracing::debug!(
        dir = %artifacts_dir.display(),
        "no scrape ingested yet; loading promotions from artifact files"
    );
    Ok(load_promotions_from_dir(artifacts_dir))
}
