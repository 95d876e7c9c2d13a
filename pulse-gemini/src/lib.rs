//! Viral tech posts, memes and rewrites from Gemini.
//!
//! [`ContentService`] exposes the three caller operations. Each one runs
//! through a [`pulse::RequestOrchestrator`], so repeated requests are served
//! from the store, provider calls are serialized, and rate limits fall back
//! to stale data.
//!
//! The provider boundary is the [`Provider`] trait; [`GeminiClient`] is the
//! REST implementation.

mod client;
pub mod model;
pub mod prompt;
mod provider;
pub mod schema;
mod service;
pub mod shaping;
mod wire;

pub use client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, GeminiClient, GeminiClientBuilder};
pub use model::{Category, ContentItem, Rewrites, TimeRange};
pub use provider::{GenerateRequest, Provider};
pub use pulse_core::ProviderError;
pub use service::{ContentService, ServicePolicies};
