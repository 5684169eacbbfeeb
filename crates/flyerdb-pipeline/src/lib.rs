pub mod artifacts;
pub mod error;
pub mod runner;
pub mod stats;

pub use error::{PipelineError, Stage};
pub use runner::{run_analysis, run_pipeline, PipelineConfig, PipelineDeps, PipelineReport};
pub use stats::{AnalysisStats, DownloadStats};
