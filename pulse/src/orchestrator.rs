use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use pulse_backend::CacheBackend;
use pulse_core::{
    CacheEntry, CacheKey, CacheStatus, CallContext, CallState, Clock, RateLimitAware,
    ResponseSource, SystemClock, Upstream,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::OrchestratorError;
use crate::gate::ProviderGate;
use crate::metrics::{self, Event, Timer};
use crate::policy::RequestPolicy;

const NO_SUCCESS: i64 = i64::MIN;

struct Inner<B, C> {
    backend: B,
    clock: C,
    gate: ProviderGate,
    last_success_ms: AtomicI64,
}

/// Wraps provider calls with a TTL cache, a throttle window, rate-limit
/// backoff and a stale-data fallback.
///
/// Cloning is cheap: clones share the store, the clock, the provider gate and
/// the last-success timestamp, so at most one provider call runs at a time
/// across all clones.
///
/// ```
/// use pulse::{RequestOrchestrator, RequestPolicy};
/// use pulse_core::{CacheKey, ProviderError};
/// use pulse_moka::MokaBackend;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let orchestrator = RequestOrchestrator::new(MokaBackend::builder().max_entries(64).build());
/// let key = CacheKey::from_str("greeting", "en");
///
/// let greeting: String = orchestrator
///     .execute(&key, &RequestPolicy::default(), || async {
///         Ok::<_, ProviderError>("hello".to_owned())
///     })
///     .await
///     .unwrap();
/// assert_eq!(greeting, "hello");
/// # }
/// ```
pub struct RequestOrchestrator<B, C = SystemClock> {
    inner: Arc<Inner<B, C>>,
}

impl<B, C> Clone for RequestOrchestrator<B, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, C> std::fmt::Debug for RequestOrchestrator<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOrchestrator")
            .field("in_flight", &self.is_in_flight())
            .field("last_success_at", &self.last_success_at())
            .finish_non_exhaustive()
    }
}

impl<B> RequestOrchestrator<B, SystemClock>
where
    B: CacheBackend,
{
    /// Creates an orchestrator over `backend` using the system clock.
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<B, C> RequestOrchestrator<B, C> {
    /// Creates an orchestrator with an explicit clock.
    pub fn with_clock(backend: B, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                clock,
                gate: ProviderGate::new(),
                last_success_ms: AtomicI64::new(NO_SUCCESS),
            }),
        }
    }

    /// The underlying store.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Whether a provider call is running right now.
    pub fn is_in_flight(&self) -> bool {
        self.inner.gate.is_busy()
    }

    /// When the last provider call succeeded, if any did.
    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        match self.inner.last_success_ms.load(Ordering::Acquire) {
            NO_SUCCESS => None,
            millis => Utc.timestamp_millis_opt(millis).single(),
        }
    }
}

impl<B, C> RequestOrchestrator<B, C>
where
    B: CacheBackend,
    C: Clock,
{
    /// Runs `upstream` under `policy` and returns its payload or a stored one.
    pub async fn execute<T, U>(
        &self,
        key: &CacheKey,
        policy: &RequestPolicy,
        upstream: U,
    ) -> Result<T, OrchestratorError<U::Error>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        U: Upstream<Response = T> + Send,
        U::Error: RateLimitAware + Send,
    {
        self.execute_with_context(key, policy, upstream)
            .await
            .map(|(data, _)| data)
    }

    /// Like [`execute`](Self::execute), also reporting how the call was answered.
    pub async fn execute_with_context<T, U>(
        &self,
        key: &CacheKey,
        policy: &RequestPolicy,
        mut upstream: U,
    ) -> Result<(T, CallContext), OrchestratorError<U::Error>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        U: Upstream<Response = T> + Send,
        U::Error: RateLimitAware + Send,
    {
        let operation = key.prefix();
        let mut ctx = CallContext::default();

        if let Some(entry) = self.throttled_entry::<T>(key, policy).await {
            return Ok(self.answer_cached(entry, ctx, operation));
        }

        ctx.transition(CallState::WaitForSlot);
        debug!(cache_key = %key, "waiting for provider slot");
        let _permit = self.inner.gate.acquire().await;

        // Another call may have refreshed the entry while this one waited.
        if let Some(entry) = self.throttled_entry::<T>(key, policy).await {
            return Ok(self.answer_cached(entry, ctx, operation));
        }

        let max_attempts = policy.max_attempts();
        let mut backoff = policy.backoff();

        loop {
            ctx.attempts += 1;
            let attempt = ctx.attempts;
            ctx.transition(CallState::InFlight { attempt });
            debug!(cache_key = %key, attempt, "calling provider");
            metrics::record(operation, Event::Attempt);

            let timer = Timer::new();
            let result = upstream.call().await;
            metrics::record_upstream_duration(operation, timer.elapsed());

            match result {
                Ok(data) => {
                    let now = self.inner.clock.now();
                    self.inner
                        .last_success_ms
                        .fetch_max(now.timestamp_millis(), Ordering::AcqRel);
                    if let Err(error) = self.store(key, &data, now).await {
                        metrics::record(operation, Event::Failure);
                        ctx.transition(CallState::Fail);
                        return Err(OrchestratorError::Payload(error));
                    }

                    ctx.status = CacheStatus::Miss;
                    ctx.source = ResponseSource::Provider;
                    ctx.transition(CallState::Success);
                    debug!(cache_key = %key, attempt, "provider call succeeded");
                    return Ok((data, ctx));
                }
                Err(error) if error.is_rate_limited() => {
                    metrics::record(operation, Event::RateLimited);

                    if let Some(entry) = self.any_entry::<T>(key).await {
                        warn!(
                            cache_key = %key,
                            attempt,
                            stored_at = %entry.stored_at(),
                            "provider rate-limited, returning stale entry"
                        );
                        metrics::record(operation, Event::StaleFallback);
                        ctx.status = CacheStatus::Stale;
                        ctx.source = ResponseSource::Backend(self.inner.backend.label());
                        ctx.transition(CallState::ReturnStale);
                        return Ok((entry.into_inner(), ctx));
                    }

                    if attempt >= max_attempts {
                        warn!(cache_key = %key, attempt, "provider rate-limited, retries exhausted");
                        metrics::record(operation, Event::Failure);
                        ctx.transition(CallState::Fail);
                        return Err(OrchestratorError::RateLimited {
                            attempts: attempt,
                            source: error,
                        });
                    }

                    let delay = backoff.next().unwrap_or(policy.initial_delay);
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    ctx.transition(CallState::Backoff { attempt, delay_ms });
                    debug!(cache_key = %key, attempt, delay_ms, "provider rate-limited, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    debug!(cache_key = %key, attempt, "provider failed");
                    metrics::record(operation, Event::Failure);
                    ctx.transition(CallState::Fail);
                    return Err(OrchestratorError::Upstream(error));
                }
            }
        }
    }

    fn answer_cached<T>(
        &self,
        entry: CacheEntry<T>,
        mut ctx: CallContext,
        operation: &str,
    ) -> (T, CallContext) {
        metrics::record(operation, Event::ThrottledHit);
        ctx.status = CacheStatus::Hit;
        ctx.source = ResponseSource::Backend(self.inner.backend.label());
        ctx.transition(CallState::ReturnCached);
        (entry.into_inner(), ctx)
    }

    /// Fresh entry, returned only inside the throttle window.
    async fn throttled_entry<T>(&self, key: &CacheKey, policy: &RequestPolicy) -> Option<CacheEntry<T>>
    where
        T: DeserializeOwned + Send,
    {
        let now = self.inner.clock.now();
        let entry = match self
            .inner
            .backend
            .get_fresh::<T>(key, policy.ttl, now)
            .await
        {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(cache_key = %key, "no fresh entry");
                return None;
            }
            Err(error) => {
                warn!(cache_key = %key, %error, "store read failed, treating as miss");
                return None;
            }
        };

        let within_window = self
            .last_success_at()
            .and_then(|last| now.signed_duration_since(last).to_std().ok())
            .is_some_and(|since| since < policy.throttle);

        if within_window {
            debug!(cache_key = %key, stored_at = %entry.stored_at(), "fresh entry inside throttle window");
            Some(entry)
        } else {
            debug!(cache_key = %key, "fresh entry outside throttle window");
            None
        }
    }

    async fn any_entry<T>(&self, key: &CacheKey) -> Option<CacheEntry<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.inner.backend.get_any::<T>(key).await {
            Ok(entry) => entry,
            Err(error) => {
                warn!(cache_key = %key, %error, "store read failed, no stale fallback");
                None
            }
        }
    }

    /// Write failures are logged and swallowed; only encoding errors escape.
    async fn store<T>(
        &self,
        key: &CacheKey,
        data: &T,
        now: DateTime<Utc>,
    ) -> Result<(), serde_json::Error>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(data)?;
        if is_empty(&value) {
            debug!(cache_key = %key, "empty result, keeping previous entry");
            return Ok(());
        }
        if let Err(error) = self.inner.backend.set(key, &value, now).await {
            warn!(cache_key = %key, %error, "store write failed, result not cached");
            metrics::record(key.prefix(), Event::StoreWriteFailure);
        }
        Ok(())
    }
}

/// `null`, `[]`, `{}` and `""` never overwrite a stored payload.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(is_empty(&json!("")));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!([null])));
        assert!(!is_empty(&json!({"professional": ""})));
    }
}
