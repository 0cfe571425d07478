// src/server/initialization.rs

//! Handles the server initialization process: persistence replay, state
//! setup, and binding the listener. Replay completes before the listener
//! exists, so no client input can interleave with it.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::persistence::{AofLoader, AppendOnlyFile};
use crate::core::state::ServerState;
use crate::core::storage::Db;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    let (shutdown_tx, _) = broadcast::channel(1);

    let db = Db::new();

    // Rebuild in-memory state from the log. A replay failure is fatal to
    // startup: serving from silently incomplete state is worse than not
    // starting.
    let loader = AofLoader::new(config.persistence.clone());
    loader
        .replay_into(&db)
        .await
        .context("failed to replay the append-only file")?;

    let aof = if config.persistence.aof_enabled {
        Some(
            AppendOnlyFile::open(
                &config.persistence.aof_path,
                config.persistence.flush_interval,
            )
            .await
            .context("failed to open the append-only file")?,
        )
    } else {
        info!("Persistence is disabled; mutating commands will not survive a restart.");
        None
    };

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        "OpalDB server listening on {}",
        listener.local_addr().map_or_else(
            |_| format!("{}:{}", config.host, config.port),
            |addr| addr.to_string()
        )
    );

    let state = Arc::new(ServerState { config, db, aof });

    Ok(ServerContext {
        state,
        listener,
        shutdown_tx,
    })
}
