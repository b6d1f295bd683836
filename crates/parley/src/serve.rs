// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley serve` command implementation.
//!
//! Wires the SQLite store, upstream backend, model registry, tools,
//! orchestrator, and stream hub into the gateway, then serves until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::info;

use parley_config::model::ParleyConfig;
use parley_core::error::ParleyError;
use parley_core::traits::{MessageStore, ModelBackend};
use parley_engine::{ModelRegistry, Orchestrator, ToolRuntime, global_hub};
use parley_gateway::{AppState, StaticIdentityProvider, start_server};
use parley_storage::SqliteStore;
use parley_upstream::{HttpBackend, UpstreamClient};

/// Runs the `parley serve` command.
pub async fn run_serve(config: ParleyConfig) -> Result<(), ParleyError> {
    init_tracing(&config.server.log_level);

    info!("starting parley serve");

    let sqlite = Arc::new(SqliteStore::new(config.storage.database_path.clone()));
    sqlite.initialize().await?;
    let store: Arc<dyn MessageStore> = sqlite.clone();

    let client = UpstreamClient::new(
        config.upstream.base_url.clone(),
        config.upstream.api_key.as_deref(),
    )?;
    let backend: Arc<dyn ModelBackend> = Arc::new(HttpBackend::new(client));

    let registry = Arc::new(ModelRegistry::new(backend.clone(), &config.upstream));
    let tools = Arc::new(ToolRuntime::new(
        config.tools.weather_base_url.clone(),
        store.clone(),
        backend,
        config.upstream.title_model.clone(),
        config.upstream.max_tokens,
    )?);
    let orchestrator = Arc::new(Orchestrator::new(
        registry.clone(),
        store.clone(),
        tools,
        config.upstream.max_tokens,
    ));

    let hub = global_hub(&config.resume);
    let identity = Arc::new(StaticIdentityProvider::from_config(&config.auth)?);

    let state = AppState {
        store: store.clone(),
        identity,
        registry,
        orchestrator,
        hub,
        limits: config.limits.clone(),
        max_tokens: config.upstream.max_tokens,
    };

    let shutdown = crate::shutdown::install_signal_handler();
    start_server(&config.server.host, config.server.port, state, shutdown).await?;

    // Flush the WAL before the process exits.
    if let Err(e) = sqlite.close().await {
        tracing::warn!(error = %e, "store close failed during shutdown");
    }

    info!("parley serve shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
