use std::path::PathBuf;

use thiserror::Error;

use flyerdb_scraper::ScrapeError;

/// The four sequential stages of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discover,
    ExtractUrls,
    Download,
    Analyze,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Discover => "discover",
            Stage::ExtractUrls => "extract-urls",
            Stage::Download => "download",
            Stage::Analyze => "analyze",
        };
        f.write_str(name)
    }
}

/// Errors that abort a pipeline run.
///
/// Per-store and per-page failures never surface here; they are folded into
/// the run statistics instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage the rest of the run depends on produced nothing.
    #[error("pipeline stage '{0}' produced no results")]
    EmptyStage(Stage),

    /// Fatal scrape failure (the flyer index page could not be rendered).
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    /// An artifact file could not be written.
    #[error("failed to write artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact payload could not be serialized.
    #[error("failed to encode artifact {path}: {source}")]
    ArtifactEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
