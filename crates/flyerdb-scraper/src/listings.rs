//! Flyer-card discovery on the listing index page.

use scraper::{ElementRef, Html, Selector};

use flyerdb_core::stores::StoreConfig;

use crate::error::ScrapeError;
use crate::render::RenderClient;
use crate::types::FlyerListing;

/// Relative viewer links on the listing page resolve against this base.
const FLYER_BASE_URL: &str = "https://www.redflagdeals.com/flyers/";

/// Render the flyer index page and return the allowlisted flyer cards.
///
/// An index page with no matching cards yields `Ok(vec![])`; only a failure
/// to render the page itself is an error.
///
/// # Errors
///
/// Returns [`ScrapeError::Render`] or [`ScrapeError::Http`] if the index page
/// cannot be rendered.
pub async fn discover_flyers(
    render: &RenderClient,
    index_url: &str,
    stores: &[StoreConfig],
) -> Result<Vec<FlyerListing>, ScrapeError> {
    tracing::info!(url = %index_url, "rendering flyer index page");
    let html = render.content(index_url).await?;
    let listings = parse_flyer_listings(&html, stores);
    tracing::info!(count = listings.len(), "discovered grocery flyers");
    Ok(listings)
}

/// Parse rendered listing-page HTML into allowlisted flyer cards.
///
/// A card is kept when any configured store name is a substring of its
/// normalized (trimmed, lowercased) dealer name, so `"super c"` also catches
/// `"Super C Express"`. Cards missing the dealer name or the viewer link are
/// skipped with a debug log, never fatal.
#[must_use]
pub fn parse_flyer_listings(html: &str, stores: &[StoreConfig]) -> Vec<FlyerListing> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse(".flyer_listing").expect("valid card selector");
    let link_selector = Selector::parse("a.flyer_image").expect("valid link selector");
    let title_selector = Selector::parse(".flyer_title").expect("valid title selector");
    let dates_selector = Selector::parse(".flyer_dates").expect("valid dates selector");

    let allowlist: Vec<String> = stores.iter().map(|s| s.name.to_lowercase()).collect();

    let mut listings = Vec::new();
    for card in document.select(&card_selector) {
        let Some(dealer) = card.value().attr("data-dealer-name") else {
            tracing::debug!("skipping flyer card without a dealer name");
            continue;
        };
        let store = dealer.trim().to_lowercase();

        if !allowlist.iter().any(|name| store.contains(name.as_str())) {
            continue;
        }

        let Some(href) = card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            tracing::debug!(store = %store, "skipping flyer card without a viewer link");
            continue;
        };
        let url = absolutize(href);

        let title =
            select_text(card, &title_selector).unwrap_or_else(|| "Weekly Savings".to_string());
        let date_range =
            select_text(card, &dates_selector).unwrap_or_else(|| "Current Week".to_string());

        tracing::debug!(store = %store, url = %url, "found grocery flyer");
        listings.push(FlyerListing {
            store,
            title,
            date_range,
            url,
        });
    }

    listings
}

fn absolutize(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{FLYER_BASE_URL}{href}")
    }
}

fn select_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
