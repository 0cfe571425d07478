// src/core/persistence/mod.rs

//! All logic related to data persistence: the append-only file that records
//! mutating requests, and the loader that replays it on startup.

mod aof;
mod loader;

pub use aof::AppendOnlyFile;
pub use loader::AofLoader;
