// src/config.rs

//! Manages server configuration: loading from a TOML file and built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Top-level server configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// The address the TCP listener binds to.
    pub host: String,
    /// The port the TCP listener binds to.
    pub port: u16,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub persistence: PersistenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            log_level: "info".to_string(),
            persistence: PersistenceConfig::default(),
        }
    }
}

/// Configuration of the append-only file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Whether mutating commands are persisted at all.
    pub aof_enabled: bool,
    /// Path of the append-only file, created on first start if absent.
    pub aof_path: String,
    /// Interval between fsyncs of the append-only file. Acknowledged writes
    /// inside this window can be lost on a crash.
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            aof_enabled: true,
            aof_path: "opaldb.aof".to_string(),
            flush_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Loads and parses the configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        Ok(config)
    }
}
