// src/core/state.rs

//! Defines the state shared by every connection.

use crate::config::Config;
use crate::core::persistence::AppendOnlyFile;
use crate::core::storage::Db;

/// The single server-wide state, shared across sessions through an `Arc`.
///
/// Transaction state deliberately does not live here: it is owned by each
/// session, so concurrent clients can never interleave into one queue.
pub struct ServerState {
    pub config: Config,
    pub db: Db,
    /// `None` when persistence is disabled in the configuration.
    pub aof: Option<AppendOnlyFile>,
}
