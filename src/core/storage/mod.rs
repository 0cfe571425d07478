// src/core/storage/mod.rs

mod db;

pub use db::{Db, ExecutionContext};
