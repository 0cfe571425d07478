// src/core/commands/string/mod.rs

mod get;
mod set;

pub use get::Get;
pub use set::Set;
