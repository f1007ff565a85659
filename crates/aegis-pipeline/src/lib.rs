//! Per-frame orchestration tying history, motion, behavior, crowd, risk,
//! alert, and semantic-enrichment stages into a single pipeline.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{FrameOutput, Pipeline};
