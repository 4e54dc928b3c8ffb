//! Shared application state handed to every Axum handler and extractor.

use sqlx::PgPool;

use crate::config::ServiceConfig;

/// Wrapped in `Arc` by the caller (`main.rs`) before being handed to
/// `axum::Router::with_state` — cheap to clone per-request, the pool
/// already manages its own internal connection sharing.
pub struct AppState {
    pub db: PgPool,
    pub config: ServiceConfig,
}
