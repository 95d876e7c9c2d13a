//! Stored payloads with their write timestamp.
//!
//! A [`CacheEntry`] never carries its own expiry. Freshness is decided at read
//! time by comparing the entry's age against the TTL of the call that reads
//! it, so the same physical record can be *fresh* for one caller, *expired*
//! for another, and still usable by anyone as a stale fallback.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use pulse_core::{CacheEntry, Freshness};
//! use std::time::Duration;
//!
//! let stored_at = Utc.timestamp_millis_opt(0).unwrap();
//! let entry = CacheEntry::new("payload", stored_at);
//!
//! let now = Utc.timestamp_millis_opt(200).unwrap();
//! assert!(entry.is_fresh(Duration::from_millis(1000), now));
//!
//! let later = Utc.timestamp_millis_opt(1500).unwrap();
//! match entry.freshness(Duration::from_millis(1000), later) {
//!     Freshness::Fresh(_) => unreachable!(),
//!     Freshness::Expired(entry) => assert_eq!(entry.data(), &"payload"),
//! }
//! ```

use chrono::{DateTime, Utc};
use std::mem::size_of;
use std::time::Duration;

use crate::Raw;

/// A cached payload together with the moment it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    data: T,
    stored_at: DateTime<Utc>,
}

/// Result of comparing an entry's age against a TTL.
#[derive(Debug, PartialEq, Eq)]
pub enum Freshness<T> {
    /// The entry is younger than the TTL.
    Fresh(T),
    /// The entry is at least as old as the TTL. Still readable as stale data.
    Expired(T),
}

impl<T> Freshness<T> {
    /// Returns the wrapped value regardless of freshness.
    pub fn into_inner(self) -> T {
        match self {
            Freshness::Fresh(value) | Freshness::Expired(value) => value,
        }
    }

    /// Returns `true` for [`Freshness::Fresh`].
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh(_))
    }
}

impl<T> CacheEntry<T> {
    /// Creates a new entry stored at the given instant.
    pub fn new(data: T, stored_at: DateTime<Utc>) -> Self {
        CacheEntry { data, stored_at }
    }

    /// Returns a reference to the cached payload.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the payload was written.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Consumes the entry and returns the payload.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Consumes the entry and returns the timestamp and payload separately.
    pub fn into_parts(self) -> (DateTime<Utc>, T) {
        (self.stored_at, self.data)
    }

    /// Replaces the payload, keeping the timestamp.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CacheEntry<U> {
        CacheEntry {
            data: f(self.data),
            stored_at: self.stored_at,
        }
    }

    /// Age of the entry at `now`.
    ///
    /// An entry stamped in the future (clock skew) has age zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the entry is strictly younger than `ttl` at `now`.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < ttl
    }

    /// Classifies the entry against `ttl`, preserving it in either case.
    pub fn freshness(self, ttl: Duration, now: DateTime<Utc>) -> Freshness<Self> {
        if self.is_fresh(ttl, now) {
            Freshness::Fresh(self)
        } else {
            Freshness::Expired(self)
        }
    }
}

impl CacheEntry<Raw> {
    /// Estimated memory usage of this entry in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn age_boundary_is_expired() {
        let entry = CacheEntry::new(1, at(0));
        assert!(entry.is_fresh(Duration::from_millis(1000), at(999)));
        assert!(!entry.is_fresh(Duration::from_millis(1000), at(1000)));
    }

    #[test]
    fn future_entries_have_zero_age() {
        let entry = CacheEntry::new(1, at(5_000));
        assert_eq!(entry.age(at(0)), Duration::ZERO);
        assert!(entry.is_fresh(Duration::from_millis(1), at(0)));
    }

    #[test]
    fn expired_entries_keep_their_payload() {
        let entry = CacheEntry::new("stale", at(0));
        let freshness = entry.freshness(Duration::from_secs(1), at(10_000));
        assert!(!freshness.is_fresh());
        assert_eq!(freshness.into_inner().into_inner(), "stale");
    }
}
