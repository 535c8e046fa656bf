//! Cache key composition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifies one read's result: operation name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build the key for `operation` called with `args`.
    ///
    /// JSON objects serialize with sorted keys, so equal arguments always
    /// give equal keys regardless of insertion order.
    pub fn for_operation(operation: &str, args: &Value) -> Self {
        match args {
            Value::Null => Self(format!("{}()", operation)),
            other => Self(format!("{}({})", operation, other)),
        }
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
