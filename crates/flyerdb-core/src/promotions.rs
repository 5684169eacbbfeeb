use serde::{Deserialize, Serialize};

/// A single promoted item extracted from one flyer page.
///
/// Duplicates are preserved verbatim: the same item promoted by two stores
/// (or twice on one flyer) yields two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub item: String,
    /// Sale price as printed on the flyer, currency symbols stripped.
    pub price: f64,
    /// Pricing unit as printed, e.g. `"lb"`, `"kg"`, `"each"`, `"pkg"`.
    #[serde(default)]
    pub unit: String,
    /// Promotion text exactly as shown, e.g. `"30% off"`, `"2 for $5"`.
    #[serde(default)]
    pub discount: String,
    /// Display name of the store whose flyer carried the item.
    pub store: String,
}

/// Per-store analysis result, written to `<artifacts>/<store_key>_promotions.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorePromotionsDoc {
    pub store: String,
    pub store_key: String,
    /// Pages actually analyzed (after the per-store page cap).
    pub page_count: usize,
    /// Pages present on disk for this store.
    pub total_pages: usize,
    pub promotion_count: usize,
    pub promotions: Vec<Promotion>,
}
