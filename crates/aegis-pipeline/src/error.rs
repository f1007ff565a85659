//! Error types for pipeline construction and orchestration.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid analysis config: {0}")]
    Analysis(#[from] aegis_analysis::AnalysisError),

    #[error("invalid risk config: {0}")]
    Risk(#[from] aegis_risk::RiskError),

    #[error("invalid alert config: {0}")]
    Alert(#[from] aegis_alerts::AlertError),

    #[error("invalid semantic config: {0}")]
    Semantic(#[from] aegis_semantic::SemanticError),
}
