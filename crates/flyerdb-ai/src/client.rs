//! HTTP client for the OpenAI chat completions API.
//!
//! Wraps `reqwest` with bearer-token auth and response unwrapping. The two
//! call sites (vision extraction and recipe generation) use very different
//! message shapes, so callers assemble the request body themselves and this
//! client hands back the first choice's message content as plain text.

use std::time::Duration;

use reqwest::Client;

use crate::error::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Client for the OpenAI chat completions endpoint.
///
/// Manages the HTTP client, API key, and base URL. Use [`OpenAiClient::new`]
/// for production or [`OpenAiClient::with_base_url`] to point at a mock
/// server in tests.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a new client pointed at the production OpenAI API.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AiError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("flyerdb/0.1 (flyer-analysis)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends a chat completion request and returns the first choice's
    /// message content, trimmed.
    ///
    /// `body` must be a complete chat completions payload: model, messages,
    /// and sampling parameters.
    ///
    /// # Errors
    ///
    /// - [`AiError::Http`] on network failure.
    /// - [`AiError::UnexpectedStatus`] on a non-2xx HTTP status; the body
    ///   text is carried as the message.
    /// - [`AiError::Deserialize`] if the body is not valid JSON.
    /// - [`AiError::EmptyResponse`] if no choice carries string content.
    pub async fn chat(&self, body: &serde_json::Value) -> Result<String, AiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }

        let raw = response.text().await?;
        let parsed: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| AiError::Deserialize {
                context: "chat completions response".to_string(),
                source: e,
            })?;

        let content = parsed
            .get("choices")
            .and_then(serde_json::Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(serde_json::Value::as_str)
            .ok_or(AiError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = OpenAiClient::with_base_url("test-key", 30, "http://localhost:9100/")
            .expect("client construction should not fail");
        assert_eq!(client.base_url, "http://localhost:9100");
    }

    #[test]
    fn default_base_url_points_at_openai() {
        let client =
            OpenAiClient::new("test-key", 30).expect("client construction should not fail");
        assert_eq!(client.base_url, "https://api.openai.com");
    }
}
