//! Identifier types used throughout entcache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Error;

/// Prefix used by [`CorrelationIdGenerator::default`].
pub const DEFAULT_CORRELATION_PREFIX: &str = "CRID";

/// Primary key of an entity in a cached collection.
///
/// Remote APIs hand out either numeric or string keys; both are accepted and
/// serialize back to the same JSON shape they were read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    Number(i64),
    Text(String),
}

impl EntityKey {
    /// Reads a key from a JSON value. Only integers and strings are keys.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, Error> {
        match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Number)
                .ok_or_else(|| Error::InvalidKey(format!("non-integer number {n}"))),
            serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(Error::InvalidKey(other.to_string())),
        }
    }

    /// Returns the key as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Number(n) => serde_json::Value::from(*n),
            Self::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl From<i64> for EntityKey {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Opaque token letting a caller match a success/error action back to the
/// request that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::InvalidKey("empty correlation id".into()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Generates correlation ids of the form `{prefix}{seq}`.
///
/// The sequence starts at 1; ids from one generator never repeat.
#[derive(Debug)]
pub struct CorrelationIdGenerator {
    prefix: String,
    seq: AtomicU64,
}

impl CorrelationIdGenerator {
    /// Creates a generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seq: AtomicU64::new(0),
        }
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the next correlation id.
    pub fn next_id(&self) -> CorrelationId {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        CorrelationId(format!("{}{}", self.prefix, seq))
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_CORRELATION_PREFIX)
    }
}
