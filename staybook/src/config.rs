use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which store backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    MongoDb,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "mongodb" | "mongo" => Ok(BackendKind::MongoDb),
            other => Err(format!("unknown backend {other}, expected memory or mongodb")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendKind,
    pub mongo_url: String,
    pub db_name: String,
    /// Events buffered per websocket before a slow client starts skipping.
    pub push_capacity: usize,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Reads the configuration from `source`, falling back to defaults for unset keys.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&source, "PORT", "3030")?,
            backend: try_load(&source, "STORE_BACKEND", "memory")?,
            mongo_url: try_load(&source, "MONGO_URL", "mongodb://localhost:27017")?,
            db_name: try_load(&source, "DB_NAME", "staybook_db")?,
            push_capacity: try_load(&source, "PUSH_CAPACITY", "256")?,
        })
    }
}

fn try_load<T: FromStr>(
    source: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = source(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError { key, value: value.clone(), reason: e.to_string() }
    })
}
