//! Cache Key Module
//!
//! Derives namespaced storage keys from file paths.

use std::fmt;

// == Cache Key ==
/// Storage key for a cached path.
///
/// Path separators (`/` and `\`) become `_` and the namespace prefix is
/// prepended. Distinct paths may collide (`a/b` and `a_b`); that is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn derive(prefix: &str, path: &str) -> Self {
        let flattened = path.replace(['/', '\\'], "_");
        Self(format!("{prefix}{flattened}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True when `key` belongs to the cache namespace `prefix`.
pub fn is_namespaced(key: &str, prefix: &str) -> bool {
    key.starts_with(prefix)
}
