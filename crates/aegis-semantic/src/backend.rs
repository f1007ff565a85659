//! The pluggable vision-language model backend invoked by `SemanticExecutor`.

use async_trait::async_trait;

use crate::error::SemanticResult;
use crate::phash::Crop;

/// One raw hypothesis from the VLM, before it is stamped with track/frame IDs.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendDetection {
    pub label: String,
    pub confidence: f64,
    pub description: String,
    pub matched_phrase: Option<String>,
}

/// The out-of-scope VLM call. Implementations may hit a local model, a
/// hosted API, or (in tests) return canned results.
#[async_trait]
pub trait SemanticBackend: Send + Sync {
    async fn infer(&self, crop: &Crop, prompt: &str) -> SemanticResult<Vec<BackendDetection>>;
}

/// A backend that always returns a single low-confidence "unknown" match.
/// Useful as a default when no real VLM is wired up yet.
pub struct NullBackend;

#[async_trait]
impl SemanticBackend for NullBackend {
    async fn infer(&self, _crop: &Crop, prompt: &str) -> SemanticResult<Vec<BackendDetection>> {
        Ok(vec![BackendDetection {
            label: "unknown".to_string(),
            confidence: 0.0,
            description: format!("no backend configured for prompt '{prompt}'"),
            matched_phrase: None,
        }])
    }
}
