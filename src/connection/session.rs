// src/connection/session.rs

//! Defines the state associated with a single client session.

use crate::core::protocol::RespFrame;

/// Per-session state. Each connection owns its own instance, so a `MULTI`
/// block on one connection is invisible to every other connection.
#[derive(Debug, Default)]
pub struct SessionState {
    /// True while inside a `MULTI`/`EXEC` block.
    pub is_in_transaction: bool,
    /// Request frames queued since `MULTI`, in arrival order.
    queued_requests: Vec<RespFrame>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enters transaction mode. Re-entrant: a `MULTI` inside a transaction is
    /// accepted and discards anything already queued.
    pub fn begin_transaction(&mut self) {
        self.queued_requests.clear();
        self.is_in_transaction = true;
    }

    /// Leaves transaction mode, draining the queue in FIFO order.
    pub fn end_transaction(&mut self) -> Vec<RespFrame> {
        self.is_in_transaction = false;
        std::mem::take(&mut self.queued_requests)
    }

    pub fn queue_request(&mut self, frame: RespFrame) {
        self.queued_requests.push(frame);
    }
}
