// src/core/persistence/aof.rs

//! Implements the append-only file (AOF) writer.
//!
//! Every mutating request frame is appended, byte-exactly as received, before
//! the command executes. Durability is bounded: a background task fsyncs the
//! file on a fixed interval instead of after every append, so up to one
//! interval of acknowledged writes can be lost on a crash.

use crate::core::OpalDBError;
use crate::core::protocol::RespFrame;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// The append-only log of mutating request frames.
///
/// The file handle sits behind a single exclusive mutex shared with the
/// periodic flush task: an fsync never interleaves with an append.
pub struct AppendOnlyFile {
    file: Arc<Mutex<File>>,
    flush_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl AppendOnlyFile {
    /// Opens the file (creating it if absent) positioned for appending, and
    /// starts the periodic flush task. The task lives exactly as long as the
    /// log: `close` stops it.
    pub async fn open(path: &str, flush_interval: Duration) -> Result<Self, OpalDBError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        let file = Arc::new(Mutex::new(file));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let flush_task = tokio::spawn(flush_periodically(
            file.clone(),
            flush_interval,
            shutdown_rx,
        ));

        info!("Append-only file opened at '{path}', fsync every {flush_interval:?}.");
        Ok(Self {
            file,
            flush_task: Mutex::new(Some(flush_task)),
            shutdown_tx,
        })
    }

    /// Appends one serialized request frame at the end of the file.
    ///
    /// Callers must pass the full original request (the array of bulk strings
    /// exactly as received), never a re-encoded form, so replay reproduces
    /// the same command.
    pub async fn append(&self, frame: &RespFrame) -> Result<(), OpalDBError> {
        let bytes = frame.encode_to_vec()?;
        let mut file = self.file.lock().await;
        file.write_all(&bytes).await?;
        file.flush().await?;
        Ok(())
    }

    /// Forces all written bytes to stable storage.
    pub async fn sync(&self) -> Result<(), OpalDBError> {
        let file = self.file.lock().await;
        file.sync_all().await?;
        Ok(())
    }

    /// Stops the flush task, performs a final sync and releases the handle.
    /// No appends are possible afterward.
    pub async fn close(&self) -> Result<(), OpalDBError> {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.flush_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("AOF flush task failed to stop cleanly: {e:?}");
            }
        }
        self.sync().await
    }
}

/// Fsyncs the log on a fixed interval until told to stop.
async fn flush_periodically(
    file: Arc<Mutex<File>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("AOF flush task stopping.");
                return;
            }
            _ = ticker.tick() => {
                let file = file.lock().await;
                if let Err(e) = file.sync_all().await {
                    error!("Failed to fsync append-only file: {e}");
                }
            }
        }
    }
}
