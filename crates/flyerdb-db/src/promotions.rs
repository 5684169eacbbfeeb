//! Database operations for `scrapes` and `promotions`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use flyerdb_core::Promotion;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `scrapes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRow {
    pub scrape_id: String,
    pub created_at: DateTime<Utc>,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub promotion_count: i32,
}

/// A row from the `promotions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PromotionRow {
    pub id: i64,
    pub scrape_id: String,
    pub item: String,
    pub price: f64,
    pub unit: String,
    pub discount: String,
    pub store: String,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Promotion {
            item: row.item,
            price: row.price,
            unit: row.unit,
            discount: row.discount,
            store: row.store,
        }
    }
}

// ---------------------------------------------------------------------------
// Scrape ids
// ---------------------------------------------------------------------------

/// Generate a scrape id for the current instant.
///
/// Fixed-width UTC timestamp (`%Y-%m-%dT%H:%M:%S%.6fZ`): lexicographic order
/// of scrape ids equals chronological order, which `latest_scrape` relies on.
#[must_use]
pub fn new_scrape_id() -> String {
    scrape_id_at(Utc::now())
}

fn scrape_id_at(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Replace the stored promotion set with `promotions` under a fresh scrape id.
///
/// Runs in a single transaction: insert the new scrape row, delete all prior
/// promotion rows, insert the new rows tagged with the new id, commit.
/// Readers never observe an empty or partially-written promotion set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement in the transaction fails.
pub async fn ingest_promotions(
    pool: &PgPool,
    promotions: &[Promotion],
) -> Result<ScrapeRow, DbError> {
    let scrape_id = new_scrape_id();
    let promotion_count = i32::try_from(promotions.len()).unwrap_or(i32::MAX);

    let mut tx = pool.begin().await?;

    let scrape = sqlx::query_as::<_, ScrapeRow>(
        "INSERT INTO scrapes (scrape_id, promotion_count) \
         VALUES ($1, $2) \
         RETURNING scrape_id, created_at, promotion_count",
    )
    .bind(&scrape_id)
    .bind(promotion_count)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM promotions")
        .execute(&mut *tx)
        .await?;

    for promo in promotions {
        sqlx::query(
            "INSERT INTO promotions (scrape_id, item, price, unit, discount, store) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&scrape_id)
        .bind(&promo.item)
        .bind(promo.price)
        .bind(&promo.unit)
        .bind(&promo.discount)
        .bind(&promo.store)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        scrape_id = %scrape.scrape_id,
        promotion_count = scrape.promotion_count,
        "ingested promotion set"
    );

    Ok(scrape)
}

/// The most recent scrape row, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_scrape(pool: &PgPool) -> Result<Option<ScrapeRow>, DbError> {
    let row = sqlx::query_as::<_, ScrapeRow>(
        "SELECT scrape_id, created_at, promotion_count \
         FROM scrapes \
         ORDER BY scrape_id DESC \
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The promotion set of the most recent scrape, in ingestion order.
///
/// Returns `Ok(None)` when no scrape has ever been ingested, so callers can
/// fall back to artifact files on disk.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn query_current_promotions(pool: &PgPool) -> Result<Option<Vec<Promotion>>, DbError> {
    let Some(scrape) = latest_scrape(pool).await? else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, PromotionRow>(
        "SELECT id, scrape_id, item, price, unit, discount, store \
         FROM promotions \
         WHERE scrape_id = $1 \
         ORDER BY id",
    )
    .bind(&scrape.scrape_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(rows.into_iter().map(Promotion::from).collect()))
}
