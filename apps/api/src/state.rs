use std::sync::Arc;

use crate::cache::store::RecordStore;
use crate::cleanup::ReclaimQueue;
use crate::compile::DocumentCompiler;
use crate::config::Config;
use crate::models::resume::Resume;
use crate::tailor::ResumeTailor;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every dependency is constructed in `main`, no ambient
/// singletons. The external collaborators sit behind traits so tests can
/// drive the pipeline with in-memory substitutes.
#[derive(Clone)]
pub struct AppState {
    /// Artifact record store. Default: redis-backed `ArtifactStore`.
    pub store: Arc<dyn RecordStore>,
    /// Deferred reclamation queue. Default: redis-backed `CleanupScheduler`.
    pub scheduler: Arc<dyn ReclaimQueue>,
    /// LaTeX compiler. Default: `PdfLatex`.
    pub compiler: Arc<dyn DocumentCompiler>,
    /// Pluggable tailoring strategy. Default: AnthropicTailor.
    pub tailor: Arc<dyn ResumeTailor>,
    /// The base resume every request tailors from, loaded once at startup.
    pub base_resume: Arc<Resume>,
    pub config: Config,
}
