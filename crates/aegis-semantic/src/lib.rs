//! Selective semantic (vision-language model) enrichment for the Aegis pipeline:
//! deciding which crops warrant inference, caching by perceptual hash, running
//! a bounded async worker pool, and fusing results into unified objects.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod fusion;
pub mod phash;
pub mod trigger;

pub use backend::{BackendDetection, NullBackend, SemanticBackend};
pub use cache::PromptManager;
pub use config::SemanticConfig;
pub use error::{SemanticError, SemanticResult};
pub use executor::SemanticExecutor;
pub use fusion::SemanticFusion;
pub use phash::{average_hash, Crop};
pub use trigger::{FrameImage, SemanticTrigger, UserQuery};
