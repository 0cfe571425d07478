// src/core/commands/generic/mod.rs

mod ping;

pub use ping::Ping;
