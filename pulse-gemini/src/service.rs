use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use pulse::{RequestOrchestrator, RequestPolicy};
use pulse_backend::CacheBackend;
use pulse_core::{CacheKey, Clock, KeyPart, ProviderError, SystemClock};
use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::model::{Category, ContentItem, Rewrites, TimeRange};
use crate::provider::{GenerateRequest, Provider};
use crate::{prompt, schema, shaping};

/// Bump when the shape of a cached payload changes.
const KEY_VERSION: u32 = 1;

fn text_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

type ProviderCall<T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send>>;

/// A repeatable provider call followed by shaping.
fn provider_call<P, T, S>(
    provider: Arc<P>,
    request: GenerateRequest,
    shape: S,
) -> impl FnMut() -> ProviderCall<T> + Send + 'static
where
    P: Provider + 'static,
    T: Send + 'static,
    S: Fn(serde_json::Value) -> T + Clone + Send + Sync + 'static,
{
    move || {
        let provider = Arc::clone(&provider);
        let request = request.clone();
        let shape = shape.clone();
        Box::pin(async move { provider.generate(&request).await.map(shape) })
    }
}

/// One [`RequestPolicy`] per operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServicePolicies {
    pub feed: RequestPolicy,
    pub memes: RequestPolicy,
    pub rewrite: RequestPolicy,
}

impl Default for ServicePolicies {
    fn default() -> Self {
        let half_hour = Duration::from_secs(30 * 60);
        Self {
            feed: RequestPolicy::default(),
            memes: RequestPolicy::default().ttl(half_hour),
            rewrite: RequestPolicy::default().ttl(half_hour),
        }
    }
}

/// The caller-facing operations.
///
/// None of them fails: provider errors that survive the orchestrator are
/// logged, and the operation answers with an empty list or, for rewrites,
/// the input text in every tone.
///
/// Each operation runs on its own spawned task. A caller that stops waiting
/// does not interrupt the provider call, so its result is still stored.
pub struct ContentService<P, B, C = SystemClock> {
    provider: Arc<P>,
    orchestrator: RequestOrchestrator<B, C>,
    policies: Arc<ServicePolicies>,
}

impl<P, B, C> Clone for ContentService<P, B, C> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            orchestrator: self.orchestrator.clone(),
            policies: Arc::clone(&self.policies),
        }
    }
}

impl<P, B, C> std::fmt::Debug for ContentService<P, B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentService")
            .field("orchestrator", &self.orchestrator)
            .field("policies", &self.policies)
            .finish_non_exhaustive()
    }
}

impl<P, B, C> ContentService<P, B, C>
where
    P: Provider + 'static,
    B: CacheBackend + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(provider: P, orchestrator: RequestOrchestrator<B, C>) -> Self {
        Self {
            provider: Arc::new(provider),
            orchestrator,
            policies: Arc::new(ServicePolicies::default()),
        }
    }

    pub fn with_policies(mut self, policies: ServicePolicies) -> Self {
        self.policies = Arc::new(policies);
        self
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator<B, C> {
        &self.orchestrator
    }

    pub fn policies(&self) -> &ServicePolicies {
        &self.policies
    }

    pub fn feed_key(category: Category, range: TimeRange) -> CacheKey {
        CacheKey::new(
            "feed",
            KEY_VERSION,
            vec![
                KeyPart::new("category", Some(category.as_str())),
                KeyPart::new("window", Some(range.as_str())),
            ],
        )
    }

    pub fn memes_key() -> CacheKey {
        CacheKey::new("memes", KEY_VERSION, vec![])
    }

    /// The text is keyed by its length and a truncated SHA-256 digest.
    pub fn rewrite_key(text: &str) -> CacheKey {
        let len = text.len().to_string();
        CacheKey::new(
            "rewrite",
            KEY_VERSION,
            vec![
                KeyPart::new("len", Some(len)),
                KeyPart::new("text", Some(text_digest(text))),
            ],
        )
    }

    /// Viral posts for `category` from the last `range`.
    pub async fn fetch_viral_content(
        &self,
        category: Category,
        range: TimeRange,
    ) -> Vec<ContentItem> {
        let request = GenerateRequest::new(prompt::feed(category, range))
            .schema(schema::feed())
            .grounded();
        let work = provider_call(Arc::clone(&self.provider), request, |raw| {
            shaping::feed_items(&raw)
        });
        self.run(Self::feed_key(category, range), &self.policies.feed, work)
            .await
            .unwrap_or_default()
    }

    /// Image-bearing tech memes.
    pub async fn fetch_meme_images(&self) -> Vec<ContentItem> {
        let request = GenerateRequest::new(prompt::memes())
            .schema(schema::memes())
            .grounded();
        let work = provider_call(Arc::clone(&self.provider), request, |raw| {
            shaping::meme_items(&raw)
        });
        self.run(Self::memes_key(), &self.policies.memes, work)
            .await
            .unwrap_or_default()
    }

    /// `text` rewritten in a professional, a casual and a humorous tone.
    pub async fn rewrite(&self, text: &str) -> Rewrites {
        let request = GenerateRequest::new(prompt::rewrite(text)).schema(schema::rewrites());
        let original = text.to_owned();
        let work = provider_call(Arc::clone(&self.provider), request, move |raw| {
            shaping::rewrites(&raw, &original)
        });
        self.run(Self::rewrite_key(text), &self.policies.rewrite, work)
            .await
            .flatten()
            .unwrap_or_else(|| Rewrites::echo(text))
    }

    async fn run<T, W, Fut>(&self, key: CacheKey, policy: &RequestPolicy, work: W) -> Option<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        W: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    {
        let operation = key.prefix().to_owned();
        if !self.provider.has_credential() {
            warn!(%operation, "no provider credential configured, skipping call");
            return None;
        }

        let orchestrator = self.orchestrator.clone();
        let policy = policy.clone();
        let task = tokio::spawn(async move {
            orchestrator
                .execute_with_context(&key, &policy, work)
                .await
        });

        match task.await {
            Ok(Ok((data, ctx))) => {
                debug!(
                    %operation,
                    status = ctx.status.as_str(),
                    source = ctx.source.as_str(),
                    attempts = ctx.attempts,
                    "operation answered"
                );
                Some(data)
            }
            Ok(Err(error)) => {
                warn!(%operation, %error, "operation failed, degrading");
                None
            }
            Err(error) => {
                warn!(%operation, %error, "operation task did not complete, degrading");
                None
            }
        }
    }
}
