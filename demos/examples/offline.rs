//! Offline orchestrator example
//!
//! Runs the orchestrator against a fake provider that rate-limits on a
//! schedule, so backoff, stale fallback and the throttle window can be
//! watched without network access.
//!
//! Run:
//!   RUST_LOG=debug cargo run -p pulse-demos --example offline

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pulse::{RequestOrchestrator, RequestPolicy};
use pulse_core::{CacheKey, KeyPart, ProviderError};
use pulse_moka::MokaBackend;
use serde_json::{Value, json};

/// Every third call succeeds; the rest answer 429.
fn flaky(calls: Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<Result<Value, ProviderError>> {
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        let result = if n % 3 == 0 {
            Ok(json!([{ "author": "Ferris", "content": format!("post #{n}") }]))
        } else {
            Err(ProviderError::Status {
                status: 429,
                message: "RESOURCE_EXHAUSTED: quota".into(),
            })
        };
        std::future::ready(result)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse=debug".into()),
        )
        .init();

    let orchestrator = RequestOrchestrator::new(MokaBackend::builder().max_entries(16).build());
    let policy = RequestPolicy::default()
        .ttl(Duration::from_secs(2))
        .throttle(Duration::from_secs(1))
        .max_retries(3)
        .initial_delay(Duration::from_millis(200))
        .max_jitter(Duration::from_millis(50));
    let key = CacheKey::new("feed", 1, vec![KeyPart::new("category", Some("All"))]);
    let calls = Arc::new(AtomicUsize::new(0));

    for round in 1..=4 {
        let result = orchestrator
            .execute_with_context(&key, &policy, flaky(Arc::clone(&calls)))
            .await;
        match result {
            Ok((value, ctx)) => tracing::info!(
                round,
                status = ctx.status.as_str(),
                source = ctx.source.as_str(),
                attempts = ctx.attempts,
                %value,
                "answered"
            ),
            Err(error) => tracing::warn!(round, %error, "failed"),
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }

    tracing::info!(provider_calls = calls.load(Ordering::SeqCst), "done");
}
