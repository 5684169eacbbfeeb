//! Client for a browserless-style rendering service.
//!
//! The flyer site assembles both its listing page and the per-flyer viewer
//! with JavaScript, so a plain GET returns an empty shell. The rendering
//! service loads a URL in a headless browser and returns the final DOM.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;

pub struct RenderClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RenderClient {
    /// Creates a `RenderClient` with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Fetch the fully rendered HTML for `url` via the service's `/content` endpoint.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Render`] — non-2xx response from the service; the body
    ///   text is carried as the message.
    /// - [`ScrapeError::Http`] — network failure or timeout.
    pub async fn content(&self, url: &str) -> Result<String, ScrapeError> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(token) = &self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let response = self
            .client
            .post(&endpoint)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScrapeError::Render {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}
