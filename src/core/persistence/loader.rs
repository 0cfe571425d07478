// src/core/persistence/loader.rs

//! Implements the logic for replaying the append-only file into memory when
//! the server starts.

use crate::config::PersistenceConfig;
use crate::core::protocol::RespFrameCodec;
use crate::core::storage::{Db, ExecutionContext};
use crate::core::{Command, OpalDBError};
use bytes::BytesMut;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::codec::Decoder;
use tracing::{debug, info};

/// `AofLoader` reads the append-only file from offset zero and re-executes
/// every recorded request to reconstruct the in-memory state. It streams the
/// file in chunks instead of loading it whole.
pub struct AofLoader {
    config: PersistenceConfig,
}

impl AofLoader {
    pub fn new(config: PersistenceConfig) -> Self {
        Self { config }
    }

    /// Replays the log into the given store, returning the number of applied
    /// records.
    ///
    /// Replay runs to completion before the listener accepts connections, so
    /// it never races an append. A truncated final record or any framing
    /// error aborts the replay: there is no partial-record recovery.
    pub async fn replay_into(&self, db: &Db) -> Result<u64, OpalDBError> {
        if !self.config.aof_enabled {
            return Ok(0);
        }

        let path = Path::new(&self.config.aof_path);
        if !path.exists() {
            info!(
                "Append-only file not found at '{}', starting with an empty state.",
                self.config.aof_path
            );
            return Ok(0);
        }

        info!("Replaying append-only file: {}", self.config.aof_path);
        let file = File::open(path).await?;
        let mut reader = BufReader::new(file);
        let mut buffer = BytesMut::with_capacity(8192);
        let mut codec = RespFrameCodec;
        let mut applied: u64 = 0;

        loop {
            if reader.read_buf(&mut buffer).await? == 0 {
                if !buffer.is_empty() {
                    return Err(OpalDBError::AofError(
                        "truncated record at end of append-only file".to_string(),
                    ));
                }
                break;
            }

            // Apply as many complete records as the buffer holds; a partial
            // frame stays buffered until the next chunk arrives.
            while let Some(frame) = codec.decode(&mut buffer)? {
                let command = Command::try_from(&frame).map_err(|e| {
                    OpalDBError::AofError(format!("unreplayable record in append-only file: {e}"))
                })?;
                debug!("Replaying '{}' from append-only file.", command.name());

                let mut ctx = ExecutionContext { db };
                command.execute(&mut ctx).await?;
                applied += 1;
            }
        }

        info!("Replayed {applied} records from the append-only file.");
        Ok(applied)
    }
}
