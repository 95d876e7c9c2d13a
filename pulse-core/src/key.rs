//! Cache key types and construction.
//!
//! A [`CacheKey`] has three components:
//!
//! 1. **Prefix** - namespace of the call site (`feed`, `memes`, `rewrite`)
//! 2. **Version** - bumped when the shape of a cached payload changes
//! 3. **Parts** - key-value pairs describing the request
//!
//! The string form is `{prefix}:v{version}:key1=value1&key2=value2`. It is
//! also what storage backends use as the physical record name.
//!
//! ```
//! use pulse_core::{CacheKey, KeyPart};
//!
//! let key = CacheKey::new("feed", 1, vec![
//!     KeyPart::new("category", Some("Tech Info")),
//!     KeyPart::new("window", Some("24h")),
//! ]);
//! assert_eq!(key.to_string(), "feed:v1:category=Tech Info&window=24h");
//!
//! let key = CacheKey::new("memes", 0, vec![]);
//! assert_eq!(key.to_string(), "memes:");
//!
//! let key = CacheKey::new("", 0, vec![KeyPart::new("flag", None::<&str>)]);
//! assert_eq!(key.to_string(), "flag");
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
struct CacheKeyInner {
    prefix: SmolStr,
    version: u32,
    parts: Vec<KeyPart>,
}

/// A cache key identifying a cached payload.
///
/// `CacheKey` wraps its data in [`Arc`], so `clone()` only bumps a reference
/// count. Keys are cloned into log fields and backend calls on every request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "CacheKeyInner", into = "CacheKeyInner")]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl From<CacheKeyInner> for CacheKey {
    fn from(inner: CacheKeyInner) -> Self {
        CacheKey {
            inner: Arc::new(inner),
        }
    }
}

impl From<CacheKey> for CacheKeyInner {
    fn from(key: CacheKey) -> Self {
        Arc::try_unwrap(key.inner).unwrap_or_else(|arc| (*arc).clone())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.inner.prefix.is_empty() {
            write!(f, "{}:", self.inner.prefix)?;
        }
        if self.inner.version > 0 {
            write!(f, "v{}:", self.inner.version)?;
        }
        for (i, part) in self.inner.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl CacheKey {
    /// Creates a new cache key with the given components.
    pub fn new(prefix: impl Into<SmolStr>, version: u32, parts: Vec<KeyPart>) -> Self {
        CacheKeyInner {
            prefix: prefix.into(),
            version,
            parts,
        }
        .into()
    }

    /// Creates a key with a single key-value part, no prefix and version 0.
    pub fn from_str(key: &str, value: &str) -> Self {
        Self::new(SmolStr::default(), 0, vec![KeyPart::new(key, Some(value))])
    }

    /// Returns an iterator over the key parts.
    pub fn parts(&self) -> impl Iterator<Item = &KeyPart> {
        self.inner.parts.iter()
    }

    /// Returns the cache key version number.
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    /// Returns the cache key prefix.
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Estimated memory usage of this key in bytes, used for weighing
    /// entries in size-bounded stores.
    pub fn memory_size(&self) -> usize {
        let parts: usize = self
            .inner
            .parts
            .iter()
            .map(|part| {
                std::mem::size_of::<KeyPart>()
                    + part.key.len()
                    + part.value.as_ref().map_or(0, |v| v.len())
            })
            .sum();
        std::mem::size_of::<CacheKeyInner>() + self.inner.prefix.len() + parts
    }
}

/// A single `key[=value]` component of a cache key.
///
/// Both halves use [`SmolStr`], so short components stay inline.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct KeyPart {
    key: SmolStr,
    value: Option<SmolStr>,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(ref value) = self.value {
            write!(f, "={}", value)?;
        }
        Ok(())
    }
}

impl KeyPart {
    /// Creates a new key part.
    pub fn new<K: AsRef<str>, V: AsRef<str>>(key: K, value: Option<V>) -> Self {
        KeyPart {
            key: SmolStr::new(key),
            value: value.map(SmolStr::new),
        }
    }

    /// Returns the key name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the optional value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_prefix_version_and_parts() {
        let key = CacheKey::new(
            "feed",
            2,
            vec![
                KeyPart::new("category", Some("All")),
                KeyPart::new("window", Some("1h")),
            ],
        );
        assert_eq!(key.to_string(), "feed:v2:category=All&window=1h");
    }

    #[test]
    fn from_str_has_no_prefix() {
        let key = CacheKey::from_str("k", "1");
        assert_eq!(key.prefix(), "");
        assert_eq!(key.version(), 0);
        assert_eq!(key.to_string(), "k=1");
    }

    #[test]
    fn clones_compare_equal_to_rebuilt_keys() {
        let key = CacheKey::new("memes", 1, vec![]);
        let rebuilt = CacheKey::new("memes", 1, vec![]);
        assert_eq!(key.clone(), rebuilt);
        assert_ne!(key, CacheKey::new("memes", 2, vec![]));
    }
}
