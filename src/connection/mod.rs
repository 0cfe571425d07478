// src/connection/mod.rs

//! Manages the lifecycle of a single client TCP connection, including frame
//! parsing, transaction batching, execution routing, and session state.

mod handler;
mod session;

pub use handler::ConnectionHandler;
pub use session::SessionState;
