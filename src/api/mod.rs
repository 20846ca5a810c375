//! Results API: read-only vote counts over HTTP.
//!
//! Served alongside the worker. It reads the same `votes` table that the
//! consumer loop writes and never locks out those writes.

pub mod handlers;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::WorkerError;
use crate::persistence::VoteStore;

/// Builds the complete results router.
pub fn build_router<S>() -> Router<AppState<S>>
where
    S: VoteStore + Clone + 'static,
{
    Router::new()
        .nest("/api", handlers::results::routes())
        .merge(handlers::system::routes())
}

/// Binds `addr` and serves the results router until the process exits.
///
/// # Errors
///
/// Returns [`WorkerError::Internal`] if the address cannot be bound or
/// the server fails.
pub async fn serve<S>(addr: SocketAddr, state: AppState<S>) -> Result<(), WorkerError>
where
    S: VoteStore + Clone + 'static,
{
    let app = build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| WorkerError::Internal(format!("bind {addr}: {e}")))?;
    tracing::info!(%addr, "results endpoint listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| WorkerError::Internal(e.to_string()))
}
