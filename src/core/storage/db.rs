// src/core/storage/db.rs

//! The in-memory store backing the command set: a map of string keys and a
//! map of hashes. Each map sits behind its own mutex; no lock is ever held
//! across an await point.

use bytes::Bytes;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Hashes use `IndexMap` so that `HGETALL` reflects field insertion order.
type Hash = IndexMap<Bytes, Bytes>;

#[derive(Debug, Default)]
pub struct Db {
    strings: Mutex<HashMap<Bytes, Bytes>>,
    hashes: Mutex<HashMap<Bytes, Hash>>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: Bytes, value: Bytes) {
        self.strings.lock().insert(key, value);
    }

    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.strings.lock().get(key).cloned()
    }

    pub fn hset(&self, key: Bytes, field: Bytes, value: Bytes) {
        self.hashes
            .lock()
            .entry(key)
            .or_default()
            .insert(field, value);
    }

    pub fn hget(&self, key: &[u8], field: &[u8]) -> Option<Bytes> {
        self.hashes.lock().get(key)?.get(field).cloned()
    }

    /// All field/value pairs of a hash, in field insertion order. A missing
    /// key yields an empty vector.
    pub fn hgetall(&self, key: &[u8]) -> Vec<(Bytes, Bytes)> {
        self.hashes
            .lock()
            .get(key)
            .map(|hash| hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

/// Everything a command needs while executing. Commands receive the context
/// by mutable reference so the signature stays stable as the context grows.
pub struct ExecutionContext<'a> {
    pub db: &'a Db,
}
