use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the OpenAI chat client and the callers built on it.
#[derive(Debug, Error)]
pub enum AiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx HTTP status.
    #[error("OpenAI API returned status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The response parsed as JSON but carried no message content.
    #[error("OpenAI API response contained no message content")]
    EmptyResponse,

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A flyer image could not be read from disk.
    #[error("failed to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
