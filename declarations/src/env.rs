//! Environment variable sources
//!
//! Loaders never read the process environment directly. They take an
//! [`EnvSource`] so the binary can pass [`ProcessEnv`] once at startup while
//! tests and embedding callers hand in a [`MapEnv`].

use crate::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use tracing::debug;

/// Read-only access to named configuration variables
pub trait EnvSource: Send + Sync {
    /// Returns the raw value, or `None` when the variable is not set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    pub fn new() -> Self {
        Self
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // Non-unicode values are treated like unset ones.
        std::env::var(key).ok()
    }
}

/// An in-memory set of variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Reads a required, non-empty string variable.
pub fn require(source: &dyn EnvSource, key: &str) -> ConfigResult<String> {
    match source.var(key) {
        None => Err(ConfigError::MissingVariable {
            name: key.to_string(),
        }),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyVariable {
            name: key.to_string(),
        }),
        Some(value) => {
            debug!(variable = key, "resolved configuration variable");
            Ok(value)
        }
    }
}

/// Reads a required variable and parses it as a base-10 integer.
///
/// Surrounding whitespace is ignored and a leading `+` or `-` is accepted.
pub fn require_int(source: &dyn EnvSource, key: &str) -> ConfigResult<i64> {
    let raw = require(source, key)?;

    raw.trim()
        .parse::<i64>()
        .map_err(|source| ConfigError::InvalidInteger {
            name: key.to_string(),
            value: raw.clone(),
            source,
        })
}

/// Reads an optional variable; empty values count as unset.
pub fn optional(source: &dyn EnvSource, key: &str) -> Option<String> {
    source.var(key).filter(|value| !value.trim().is_empty())
}

/// Reads an optional variable, falling back to `default`.
pub fn var_or(source: &dyn EnvSource, key: &str, default: &str) -> String {
    optional(source, key).unwrap_or_else(|| default.to_string())
}
