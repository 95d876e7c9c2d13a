//! Provider failures and their classification.

use thiserror::Error;

/// Errors the orchestrator can retry on implement this trait.
///
/// Only a rate-limit is retry-worthy. Every other error propagates on the
/// first occurrence.
pub trait RateLimitAware {
    /// Returns `true` when the provider refused the call because of a quota or
    /// throttle.
    fn is_rate_limited(&self) -> bool;
}

impl<E: RateLimitAware + ?Sized> RateLimitAware for Box<E> {
    fn is_rate_limited(&self) -> bool {
        (**self).is_rate_limited()
    }
}

impl<E: RateLimitAware + ?Sized> RateLimitAware for &E {
    fn is_rate_limited(&self) -> bool {
        (**self).is_rate_limited()
    }
}

/// Failure reported by the content provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, if any.
        message: String,
    },
    /// The request never produced a response.
    #[error("provider transport error: {0}")]
    Transport(String),
    /// The response arrived but could not be interpreted.
    #[error("provider response could not be parsed: {0}")]
    Parse(String),
    /// No API key is configured.
    #[error("provider credential is missing")]
    MissingCredential,
}

const RATE_LIMIT_MARKERS: [&str; 3] = ["resource_exhausted", "too many requests", "quota"];

fn mentions_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl ProviderError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl RateLimitAware for ProviderError {
    fn is_rate_limited(&self) -> bool {
        match self {
            ProviderError::Status { status: 429, .. } => true,
            ProviderError::Status { message, .. } => mentions_rate_limit(message),
            ProviderError::Transport(message) | ProviderError::Parse(message) => {
                mentions_rate_limit(message)
            }
            ProviderError::MissingCredential => false,
        }
    }
}
