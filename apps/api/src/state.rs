use std::sync::Arc;

use crate::config::Config;
use crate::intake::object_store::ObjectFetcher;
use crate::screening::batch::BatchRunner;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data: each screening run receives its own `ScreeningRequest`.
#[derive(Clone)]
pub struct AppState {
    pub runner: BatchRunner,
    /// Object store used for remote folder URLs. Default: S3 with ambient credentials.
    pub fetcher: Arc<dyn ObjectFetcher>,
    pub config: Config,
}
