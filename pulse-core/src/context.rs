//! What happened to a single orchestrated call.

use crate::label::BackendLabel;

/// Whether the payload came from fresh storage, the provider, or stale storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// A fresh entry was returned inside the throttle window.
    Hit,
    /// The provider was called.
    #[default]
    Miss,
    /// An expired entry was returned because the provider was rate-limited.
    Stale,
}

impl CacheStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Stale => "stale",
        }
    }
}

/// Where the returned payload came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseSource {
    /// The provider produced it during this call.
    #[default]
    Provider,
    /// A storage backend with the given label produced it.
    Backend(BackendLabel),
}

impl ResponseSource {
    /// Returns the source as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            ResponseSource::Provider => "provider",
            ResponseSource::Backend(label) => label.as_str(),
        }
    }
}

/// Per-call state machine.
///
/// ```text
/// Idle ─┬─> ReturnCached
///       └─> WaitForSlot ─> InFlight ─┬─> Success
///                            ▲       ├─> ReturnStale
///                            │       ├─> Backoff ─┐
///                            │       └─> Fail     │
///                            └────────────────────┘
/// ```
///
/// `WaitForSlot` may also resolve to `ReturnCached` when another call filled
/// the cache while this one was waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallState {
    /// Not started.
    #[default]
    Idle,
    /// Answered from a fresh entry inside the throttle window.
    ReturnCached,
    /// Waiting for the process-wide provider slot.
    WaitForSlot,
    /// A provider attempt is running.
    InFlight {
        /// One-based attempt number.
        attempt: u32,
    },
    /// Sleeping before the next attempt.
    Backoff {
        /// Attempt that was rate-limited.
        attempt: u32,
        /// Delay including jitter, in milliseconds.
        delay_ms: u64,
    },
    /// Answered from an expired entry after a rate-limit.
    ReturnStale,
    /// The provider answered.
    Success,
    /// The error was propagated to the caller.
    Fail,
}

impl CallState {
    /// Returns `true` for states a call ends in.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallState::ReturnCached | CallState::ReturnStale | CallState::Success | CallState::Fail
        )
    }
}

/// Summary of a finished call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Cache outcome.
    pub status: CacheStatus,
    /// Origin of the returned payload.
    pub source: ResponseSource,
    /// Number of provider attempts made.
    pub attempts: u32,
    /// Last state reached.
    pub state: CallState,
}

impl CallContext {
    /// Moves to `state`.
    #[inline]
    pub fn transition(&mut self, state: CallState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(CallState::ReturnCached.is_terminal());
        assert!(CallState::Success.is_terminal());
        assert!(CallState::ReturnStale.is_terminal());
        assert!(CallState::Fail.is_terminal());
        assert!(!CallState::WaitForSlot.is_terminal());
        assert!(!CallState::InFlight { attempt: 1 }.is_terminal());
        assert!(
            !CallState::Backoff {
                attempt: 1,
                delay_ms: 10
            }
            .is_terminal()
        );
    }

    #[test]
    fn source_names() {
        assert_eq!(ResponseSource::Provider.as_str(), "provider");
        assert_eq!(
            ResponseSource::Backend(BackendLabel::new_static("moka")).as_str(),
            "moka"
        );
    }
}
