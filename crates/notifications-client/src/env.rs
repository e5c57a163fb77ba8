//! Key/value configuration provider.
//!
//! Values come from a [`ConfigSource`] (the process environment by default)
//! and are read through typed accessors that fall back to a default when a
//! key is missing or cannot be parsed. Parse failures are logged, never
//! returned.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Set in deployed environments; `.env` files are skipped when present.
pub const ENVIRONMENT_KEY: &str = "ENVIRONMENT";

/// Keys logged (masked where sensitive) after loading a `.env` file.
pub const MONITORED_KEYS: &[&str] = &[
    "NOTIFICATIONS_SERVER_ADDRESS",
    "NOTIFICATIONS_ORIGIN",
    "NOTIFICATIONS_TIMEOUT",
    "NOTIFICATIONS_MAX_RETRIES",
    "NOTIFICATIONS_RETRY_INTERVAL",
    "NOTIFICATIONS_TLS_CERT_PATH",
    "RUST_LOG",
];

const SENSITIVE_MARKERS: &[&str] = &["API_KEY", "SECRET", "PASSWORD", "TOKEN"];

/// A source of raw string values.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory source, useful for tests and for embedding the client in
/// applications that manage their own configuration.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Typed accessors over a [`ConfigSource`].
#[derive(Debug, Clone, Default)]
pub struct EnvConfig<S = ProcessEnv> {
    source: S,
}

impl EnvConfig<ProcessEnv> {
    pub fn from_process() -> Self {
        Self { source: ProcessEnv }
    }
}

impl<S: ConfigSource> EnvConfig<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Raw value, treating an empty string as absent.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.source.get(key).filter(|v| !v.is_empty())
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_parsed(key, default, |v| v.trim().parse::<i64>())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_parsed(key, default, |v| {
            parse_bool(v).ok_or_else(|| format!("invalid boolean value: {v}"))
        })
    }

    /// Durations use human-readable notation such as `10s`, `250ms` or `1m 30s`.
    pub fn get_duration(&self, key: &str, default: Duration) -> Duration {
        self.get_parsed(key, default, |v| humantime::parse_duration(v.trim()))
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.get_parsed(key, default, |v| v.trim().parse::<f64>())
    }

    fn get_parsed<T, E, F>(&self, key: &str, default: T, parse: F) -> T
    where
        T: Debug,
        E: Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        let Some(value) = self.raw(key) else {
            return default;
        };

        match parse(&value) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(key, error = %e, "invalid value, using default {:?}", default);
                default
            }
        }
    }

    /// Logs each of `keys` with sensitive values masked.
    pub fn log_monitored(&self, keys: &[&str]) {
        for key in keys {
            let value = self.source.get(key).unwrap_or_default();
            info!(key, value = %display_value(key, &value), "environment");
        }
    }
}

/// Loads `.env` from the working directory unless [`ENVIRONMENT_KEY`] is set.
///
/// Returns the loaded path, or `None` when loading was skipped.
pub fn load_dotenv() -> ClientResult<Option<PathBuf>> {
    if ProcessEnv.get(ENVIRONMENT_KEY).is_some_and(|v| !v.is_empty()) {
        debug!("{ENVIRONMENT_KEY} is set, skipping .env");
        return Ok(None);
    }

    let path = std::env::current_dir()
        .map_err(|e| ClientError::configuration(format!("cannot resolve working directory: {e}")))?
        .join(".env");

    dotenvy::from_path(&path).map_err(|e| {
        ClientError::configuration(format!("failed to load {}: {e}", path.display()))
    })?;

    EnvConfig::from_process().log_monitored(MONITORED_KEYS);
    Ok(Some(path))
}

/// Parses the usual boolean spellings plus `yes`/`y`/`no`/`n`, ignoring case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "y" => Some(true),
        "0" | "f" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Whether a key's value must not be logged in clear.
pub fn is_sensitive(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    SENSITIVE_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Masks all but the last four characters; short values are fully masked.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

fn display_value(key: &str, value: &str) -> String {
    if is_sensitive(key) && !value.is_empty() {
        mask(value)
    } else {
        value.to_string()
    }
}
