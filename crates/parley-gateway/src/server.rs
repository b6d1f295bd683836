// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server startup.

use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_middleware;
use axum::routing::{delete, get, post};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use parley_config::model::LimitsConfig;
use parley_core::error::ParleyError;
use parley_core::traits::{IdentityProvider, MessageStore};
use parley_engine::{ModelRegistry, Orchestrator, StreamHub};

use crate::auth::auth_middleware;
use crate::handlers;

/// Shared state for every gateway handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub registry: Arc<ModelRegistry>,
    pub orchestrator: Arc<Orchestrator>,
    /// `None` when resumption is disabled; streams are then plain.
    pub hub: Option<Arc<StreamHub>>,
    pub limits: LimitsConfig,
    /// Token budget for internal utility calls (title generation).
    pub max_tokens: u32,
}

/// Builds the full route table.
///
/// `/health` is public; everything under `/v1` requires a bearer token.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/chat/{id}/stream", get(handlers::get_stream))
        .route("/v1/chat/{id}", delete(handlers::delete_chat))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until `shutdown` is cancelled.
pub async fn start_server(
    host: &str,
    port: u16,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), ParleyError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        ParleyError::Internal(format!("failed to bind gateway to {addr}: {e}"))
    })?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ParleyError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
