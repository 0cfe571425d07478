// src/core/commands/hash/mod.rs

mod hget;
mod hgetall;
mod hset;

pub use hget::HGet;
pub use hgetall::HGetAll;
pub use hset::HSet;
