//! Errors returned by [`RequestOrchestrator`](crate::RequestOrchestrator).

use pulse_core::RateLimitAware;
use thiserror::Error;

/// Failure of an orchestrated call.
///
/// Rate limits are only surfaced once retries are exhausted and no stored
/// payload, fresh or stale, exists for the key.
#[derive(Debug, Error)]
pub enum OrchestratorError<E> {
    /// Every attempt was rate-limited and nothing was stored for the key.
    #[error("provider still rate-limited after {attempts} attempt(s)")]
    RateLimited {
        /// Attempts made before giving up.
        attempts: u32,
        /// Error returned by the last attempt.
        source: E,
    },
    /// The provider failed for a reason other than a rate limit.
    #[error(transparent)]
    Upstream(E),
    /// The provider's payload could not be converted to JSON for storage.
    #[error("payload could not be encoded: {0}")]
    Payload(#[source] serde_json::Error),
}

impl<E> OrchestratorError<E> {
    /// Returns the provider error, if the failure came from the provider.
    pub fn into_upstream(self) -> Option<E> {
        match self {
            OrchestratorError::RateLimited { source, .. } | OrchestratorError::Upstream(source) => {
                Some(source)
            }
            OrchestratorError::Payload(_) => None,
        }
    }

    /// Returns the provider error by reference, if any.
    pub fn upstream(&self) -> Option<&E> {
        match self {
            OrchestratorError::RateLimited { source, .. } | OrchestratorError::Upstream(source) => {
                Some(source)
            }
            OrchestratorError::Payload(_) => None,
        }
    }
}

impl<E> RateLimitAware for OrchestratorError<E> {
    fn is_rate_limited(&self) -> bool {
        matches!(self, OrchestratorError::RateLimited { .. })
    }
}
