// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a
//! client connection: the read/dispatch/respond loop and the transaction
//! state machine.

use super::session::SessionState;
use crate::core::protocol::{RespFrame, RespFrameCodec, RespValue};
use crate::core::state::ServerState;
use crate::core::storage::ExecutionContext;
use crate::core::{Command, OpalDBError};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, error, warn};

/// Manages the full lifecycle of a client connection.
pub struct ConnectionHandler {
    framed: Framed<TcpStream, RespFrameCodec>,
    addr: SocketAddr,
    state: Arc<ServerState>,
    session_id: u64,
    shutdown_rx: broadcast::Receiver<()>,
    session: SessionState,
}

impl ConnectionHandler {
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: u64,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            framed: Framed::new(socket, RespFrameCodec),
            addr,
            state,
            session_id,
            shutdown_rx,
            session: SessionState::new(),
        }
    }

    /// The main event loop for the connection. Terminates on end-of-stream,
    /// on a framing error, or on server shutdown.
    pub async fn run(&mut self) -> Result<(), OpalDBError> {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    debug!("Connection handler for {} received shutdown signal.", self.addr);
                    let msg = RespFrame::Error("SHUTDOWN Server is shutting down".to_string());
                    let _ = self.framed.send(msg).await;
                    break;
                }
                result = self.framed.next() => {
                    match result {
                        Some(Ok(frame)) => {
                            if let Some(response) = self.process_frame(frame).await {
                                self.framed.send(response).await?;
                            }
                        }
                        Some(Err(e)) => {
                            // RESP is length-prefixed: once framing is lost the
                            // buffer cannot be resynchronized, so the connection
                            // closes cleanly instead of hanging.
                            if is_normal_disconnect(&e) {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Protocol error on connection from {}: {}. Closing.", self.addr, e);
                            }
                            break;
                        }
                        None => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Routes one decoded frame through the session state machine. Returns
    /// `None` when the request is silently dropped (accept-and-drop policy
    /// for anything that is not a well-formed request array).
    async fn process_frame(&mut self, frame: RespFrame) -> Option<RespFrame> {
        let Some(name) = request_command_name(&frame) else {
            debug!(
                "Session {}: ignoring request that is not a non-empty array of bulk strings.",
                self.session_id
            );
            return None;
        };

        let response = match name.as_str() {
            "multi" => {
                self.session.begin_transaction();
                RespValue::SimpleString("OK".to_string())
            }
            "exec" => {
                if self.session.is_in_transaction {
                    self.commit_transaction().await
                } else {
                    RespValue::Error("ERR EXEC without MULTI".to_string())
                }
            }
            "discard" => {
                if self.session.is_in_transaction {
                    self.session.end_transaction();
                    RespValue::SimpleString("OK".to_string())
                } else {
                    RespValue::Error("ERR DISCARD without MULTI".to_string())
                }
            }
            _ if self.session.is_in_transaction => {
                self.session.queue_request(frame);
                RespValue::SimpleString("QUEUED".to_string())
            }
            _ => self.execute_request(&frame).await,
        };

        Some(response.into())
    }

    /// Executes every queued request in FIFO order and aggregates the results
    /// into one array response. Mutating requests are persisted in execution
    /// order.
    async fn commit_transaction(&mut self) -> RespValue {
        let queued = self.session.end_transaction();
        debug!(
            "Session {}: committing transaction of {} queued requests.",
            self.session_id,
            queued.len()
        );

        let mut results = Vec::with_capacity(queued.len());
        for request in &queued {
            results.push(self.execute_request(request).await);
        }
        RespValue::Array(results)
    }

    /// Dispatches one well-formed request, persisting it first when its
    /// command mutates the dataset. Failures stay local to the request: the
    /// session always gets a value back.
    async fn execute_request(&self, frame: &RespFrame) -> RespValue {
        let command = match Command::try_from(frame) {
            Ok(command) => command,
            Err(OpalDBError::UnknownCommand(name)) => {
                warn!("Session {}: unsupported command '{}'.", self.session_id, name);
                return RespValue::SimpleString(String::new());
            }
            Err(e) => return RespValue::Error(e.to_string()),
        };

        // Persist happens-before execute: a crash in between is replayable.
        if command.is_write()
            && let Some(aof) = &self.state.aof
            && let Err(e) = aof.append(frame).await
        {
            error!(
                "Session {}: failed to persist '{}' command: {}",
                self.session_id,
                command.name(),
                e
            );
            return RespValue::Error(format!("ERR persistence failure: {e}"));
        }

        let mut ctx = ExecutionContext {
            db: &self.state.db,
        };
        match command.execute(&mut ctx).await {
            Ok(value) => value,
            Err(e) => RespValue::Error(e.to_string()),
        }
    }
}

/// Extracts the lowercased command name from a request frame. Returns `None`
/// for anything other than a non-empty array led by a bulk string; such
/// requests are dropped without a response.
fn request_command_name(frame: &RespFrame) -> Option<String> {
    let RespFrame::Array(parts) = frame else {
        return None;
    };
    match parts.first() {
        Some(RespFrame::BulkString(name)) => Some(String::from_utf8_lossy(name).to_lowercase()),
        _ => None,
    }
}

/// Helper function to check for non-critical disconnection errors.
fn is_normal_disconnect(e: &OpalDBError) -> bool {
    matches!(e, OpalDBError::Io(arc_err) if matches!(
        arc_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
