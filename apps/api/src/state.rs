use std::sync::Arc;

use crate::analysis::documents::DocumentStore;
use crate::analysis::fetch::DocumentFetcher;
use crate::jobs::store::JobRecordStore;
use crate::llm_client::GenerativeModel;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every collaborator sits behind a trait object so router tests can swap in
/// in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobRecordStore,
    pub documents: Arc<dyn DocumentStore>,
    /// Downloads stored resumes (http(s) or s3) into scoped temp files.
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub model: Arc<dyn GenerativeModel>,
}
