//! Vision extraction of promotions from downloaded flyer page images.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use flyerdb_core::stores::store_display_name;
use flyerdb_core::{Promotion, StorePromotionsDoc};

use crate::client::OpenAiClient;
use crate::error::AiError;

const EXTRACTION_MODEL: &str = "gpt-4o";
const EXTRACTION_MAX_TOKENS: u32 = 2000;
const EXTRACTION_TEMPERATURE: f64 = 0.2;

/// Instruction prompt sent alongside every flyer page image.
const EXTRACTION_PROMPT: &str = r#"
Analyze this grocery store flyer image and extract ALL promotions, discounts, and sale items.

For each item, extract:
- item: Product name
- price: Regular or sale price (as a number)
- unit: Unit of measurement (e.g., "lb", "kg", "each", "pkg")
- discount: Discount description (e.g., "30% off", "Save $2", "2 for $5")

Return ONLY a valid JSON array with this exact structure:
[
  {
    "item": "Product name",
    "price": 4.99,
    "unit": "lb",
    "discount": "30% off"
  }
]

If no promotions are visible in this image, return an empty array: []

Important:
- Extract ALL visible items with prices
- Convert prices to numbers (remove $ and other symbols)
- Be specific with product names
- Include the discount/promotion text exactly as shown
"#;

/// A promotion as the model emits it, before the store label is attached.
#[derive(Debug, Deserialize)]
struct ExtractedPromotion {
    item: String,
    price: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    discount: String,
}

/// Strips a markdown code fence from around a JSON payload.
///
/// Models frequently wrap the array in a ```json fence despite the prompt
/// asking for bare JSON. Anything after the closing fence is discarded.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    let inner = match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    };
    inner.trim()
}

/// Reads an image from disk and base64-encodes it for a data URL.
///
/// # Errors
///
/// Returns [`AiError::Image`] if the file cannot be read.
async fn encode_image(path: &Path) -> Result<String, AiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AiError::Image {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(STANDARD.encode(bytes))
}

fn parse_promotions(payload: &str, store: &str) -> Result<Vec<Promotion>, serde_json::Error> {
    let extracted: Vec<ExtractedPromotion> = serde_json::from_str(payload)?;
    Ok(extracted
        .into_iter()
        .map(|p| Promotion {
            item: p.item,
            price: p.price,
            unit: p.unit,
            discount: p.discount,
            store: store.to_string(),
        })
        .collect())
}

/// Extracts every promotion visible on a single flyer page image.
///
/// Any failure (unreadable file, API error, a response that is not the
/// requested JSON array) is logged and yields an empty vec, so one bad page
/// never aborts a store's analysis loop. Every parsed promotion gets `store`
/// attached.
pub async fn extract_promotions(
    client: &OpenAiClient,
    image_path: &Path,
    store: &str,
) -> Vec<Promotion> {
    let encoded = match encode_image(image_path).await {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unreadable flyer page");
            return Vec::new();
        }
    };

    let body = json!({
        "model": EXTRACTION_MODEL,
        "messages": [
            {
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": {
                            "url": format!("data:image/jpeg;base64,{encoded}"),
                            "detail": "high"
                        }
                    }
                ]
            }
        ],
        "max_tokens": EXTRACTION_MAX_TOKENS,
        "temperature": EXTRACTION_TEMPERATURE
    });

    let content = match client.chat(&body).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %image_path.display(), error = %e, "vision extraction call failed");
            return Vec::new();
        }
    };

    match parse_promotions(strip_code_fence(&content), store) {
        Ok(promotions) => promotions,
        Err(e) => {
            let prefix: String = content.chars().take(200).collect();
            tracing::warn!(error = %e, raw = %prefix, "vision response was not a promotion array");
            Vec::new()
        }
    }
}

/// Analyzes every downloaded page for one store and aggregates the results.
///
/// Pages are visited in filename order. `limit_pages` caps how many are sent
/// to the vision model; `total_pages` still reports everything on disk.
/// Returns `None` when the store directory is missing or holds no images.
pub async fn analyze_store(
    client: &OpenAiClient,
    store_key: &str,
    image_dir: &Path,
    limit_pages: Option<usize>,
) -> Option<StorePromotionsDoc> {
    let store_dir = image_dir.join(store_key);
    let Ok(entries) = std::fs::read_dir(&store_dir) else {
        tracing::warn!(path = %store_dir.display(), "store image directory not found");
        return None;
    };

    let mut pages: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| has_image_extension(path))
        .collect();
    pages.sort();

    if pages.is_empty() {
        tracing::warn!(path = %store_dir.display(), "no flyer images to analyze");
        return None;
    }

    let total_pages = pages.len();
    if let Some(limit) = limit_pages {
        pages.truncate(limit);
    }

    let store = store_display_name(store_key);
    let mut promotions = Vec::new();
    for page in &pages {
        let extracted = extract_promotions(client, page, &store).await;
        tracing::debug!(page = %page.display(), count = extracted.len(), "flyer page analyzed");
        promotions.extend(extracted);
    }

    tracing::info!(
        store = store_key,
        pages = pages.len(),
        promotions = promotions.len(),
        "store analysis complete"
    );

    Some(StorePromotionsDoc {
        store,
        store_key: store_key.to_string(),
        page_count: pages.len(),
        total_pages,
        promotion_count: promotions.len(),
        promotions,
    })
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_code_fence_handles_json_fence() {
        let raw = "```json\n[{\"item\": \"Milk\"}]\n```";
        assert_eq!(strip_code_fence(raw), "[{\"item\": \"Milk\"}]");
    }

    #[test]
    fn strip_code_fence_handles_bare_fence() {
        let raw = "```\n[]\n```";
        assert_eq!(strip_code_fence(raw), "[]");
    }

    #[test]
    fn strip_code_fence_passes_unfenced_content_through() {
        assert_eq!(strip_code_fence("  [1, 2]  "), "[1, 2]");
    }

    #[test]
    fn strip_code_fence_drops_commentary_after_closing_fence() {
        let raw = "```json\n[]\n```\nLet me know if you need more detail.";
        assert_eq!(strip_code_fence(raw), "[]");
    }

    #[test]
    fn parse_promotions_attaches_store_to_every_record() {
        let payload = r#"[
            {"item": "Chicken Wings", "price": 6.95, "unit": "lb", "discount": "30% off"},
            {"item": "Bananas", "price": 0.69}
        ]"#;
        let promotions = parse_promotions(payload, "maxi").expect("payload should parse");
        assert_eq!(promotions.len(), 2);
        assert_eq!(promotions[0].store, "maxi");
        assert_eq!(promotions[1].store, "maxi");
        assert_eq!(promotions[1].unit, "");
        assert_eq!(promotions[1].discount, "");
    }

    #[test]
    fn parse_promotions_rejects_non_array_payload() {
        assert!(parse_promotions(r#"{"item": "Milk"}"#, "metro").is_err());
        assert!(parse_promotions("I could not find any promotions.", "metro").is_err());
    }

    #[test]
    fn parse_promotions_accepts_empty_array() {
        let promotions = parse_promotions("[]", "iga").expect("empty array should parse");
        assert!(promotions.is_empty());
    }

    #[test]
    fn has_image_extension_accepts_flyer_page_formats() {
        assert!(has_image_extension(Path::new("maxi_page_001.jpg")));
        assert!(has_image_extension(Path::new("maxi_page_002.JPEG")));
        assert!(has_image_extension(Path::new("scan.png")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("maxi_page_001")));
    }
}
