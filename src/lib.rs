//! Movie Leaks catalog - Stremio addon backed by r/MovieLeaks
//!
//! A scheduler periodically reads the subreddit listing, resolves each post
//! against Cinemeta (optionally adding critic scores) and publishes an
//! in-memory snapshot that the HTTP surface serves as a Stremio catalog.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod commands;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::{CatalogService, CatalogStore, RefreshScheduler, RefreshService};
use crate::commands::{addon_router, AddonState};
use crate::infrastructure::config::AppConfig;

/// Run the addon until Ctrl-C: refresh scheduler plus HTTP server.
///
/// Logging must already be initialized.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let store = Arc::new(CatalogStore::new());
    let refresh = Arc::new(RefreshService::from_config(Arc::clone(&store), &config)?);
    let scheduler = RefreshScheduler::from_config(refresh, &config);

    let shutdown = CancellationToken::new();
    let scheduler_task = tokio::spawn(scheduler.run(shutdown.child_token()));

    let state = AddonState::new(CatalogService::new(store, config.catalog_page_size));
    let app = addon_router(state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🚀 Addon listening on http://{}/manifest.json", listener.local_addr()?);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                    info!("🛑 Shutdown signal received");
                }
                () = server_shutdown.cancelled() => {}
            }
        })
        .await
        .context("HTTP server failed")?;

    shutdown.cancel();
    if let Err(e) = scheduler_task.await {
        warn!("Scheduler task ended abnormally: {}", e);
    }
    info!("👋 Addon stopped");
    Ok(())
}
