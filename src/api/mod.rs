//! HTTP Surface (A1)
//!
//! Assembles the Axum router for the six endpoints of spec.md §6 and the
//! shared `tower-http` layers (tracing, compression, CORS). Handlers are
//! thin — see `handlers/` — all business logic lives in the core modules.

pub mod envelope;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::error::Elapsed;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Builds the full application router over `AppState`.
///
/// Per-route timeouts reflect the deadlines in spec.md §5
/// (`recommendation_timeout_secs` / `power_loss_timeout_secs`); requests
/// that don't commit before the deadline are cancelled and the client
/// receives a timeout result.
///
/// `TimeoutLayer`'s `Service::Error` is `BoxError`, which has no
/// `Into<Infallible>` impl — `MethodRouter::layer`/`Router::route` require
/// one, so a bare `TimeoutLayer` does not compose. `handle_timeout_error`
/// is wrapped in front of it via `HandleErrorLayer` so the `BoxError` is
/// turned into a rendered `Response` before it ever reaches the router's
/// error bound, the same shape axum's own timeout examples use.
pub fn build_router(state: Arc<AppState>) -> Router {
    let recommendation_timeout = Duration::from_secs(state.config.recommendation_timeout_secs);
    let power_loss_timeout = Duration::from_secs(state.config.power_loss_timeout_secs);

    let calculations = Router::new()
        .route(
            "/power-loss",
            post(handlers::power_loss::handle).layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout_error))
                    .timeout(power_loss_timeout),
            ),
        )
        .route(
            "/minimum-power",
            post(handlers::minimum_power::handle).layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout_error))
                    .timeout(power_loss_timeout),
            ),
        )
        .route("/history", get(handlers::history::handle));

    let recommendations = Router::new()
        .route(
            "/generate",
            post(handlers::recommendations::generate).layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout_error))
                    .timeout(recommendation_timeout),
            ),
        )
        .route("/history", get(handlers::recommendations::history))
        .route("/:id", get(handlers::recommendations::get_by_id));

    Router::new()
        .nest("/api/calculations", calculations)
        .nest("/api/recommendations", recommendations)
        .layer(ConcurrencyLimitLayer::new(256))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Maps a `TimeoutLayer` elapse (or any other boxed middleware error) into
/// a rendered JSend response. Always renders production-safe (no
/// diagnostic detail) — a timeout carries nothing a client should see
/// beyond the user-facing message regardless of run mode.
async fn handle_timeout_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        AppError::Timeout("La operación excedió el tiempo límite de espera".to_string())
            .into_response()
    } else {
        AppError::Internal(err.to_string()).into_response()
    }
}
