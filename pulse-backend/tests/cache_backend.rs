//! Typed reads and writes over a simple DashMap store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use dashmap::DashMap;
use pulse_backend::{Backend, BackendResult, CacheBackend, CacheKeyFormat, DeleteStatus};
use pulse_core::{CacheEntry, CacheKey, KeyPart, Raw};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct TestBackend {
    store: Arc<DashMap<CacheKey, CacheEntry<Raw>>>,
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        Ok(self.store.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        self.store.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }
}

impl CacheBackend for TestBackend {}

fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

fn key() -> CacheKey {
    CacheKey::new("feed", 1, vec![KeyPart::new("category", Some("All"))])
}

#[tokio::test]
async fn fresh_read_respects_ttl() {
    let backend = TestBackend::default();
    backend.set(&key(), &json!(["a"]), at(0)).await.unwrap();

    let fresh: Option<CacheEntry<Value>> = backend
        .get_fresh(&key(), Duration::from_millis(1000), at(999))
        .await
        .unwrap();
    assert_eq!(fresh.unwrap().data(), &json!(["a"]));

    let expired: Option<CacheEntry<Value>> = backend
        .get_fresh(&key(), Duration::from_millis(1000), at(1000))
        .await
        .unwrap();
    assert!(expired.is_none());

    let any: CacheEntry<Value> = backend.get_any(&key()).await.unwrap().unwrap();
    assert_eq!(any.stored_at(), at(0));
}

#[tokio::test]
async fn stored_at_never_moves_backwards() {
    let backend = TestBackend::default();
    backend.set(&key(), &json!(1), at(5_000)).await.unwrap();
    let written = backend.set(&key(), &json!(2), at(1_000)).await.unwrap();
    assert_eq!(written, at(5_000));

    let entry: CacheEntry<Value> = backend.get_any(&key()).await.unwrap().unwrap();
    assert_eq!(entry.data(), &json!(2));
    assert_eq!(entry.stored_at(), at(5_000));
}

#[tokio::test]
async fn undecodable_payload_is_an_error() {
    let backend = TestBackend::default();
    backend
        .write(&key(), CacheEntry::new(Bytes::from_static(b"{oops"), at(0)))
        .await
        .unwrap();
    let result = backend.get_any::<Value>(&key()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn trait_objects_forward_calls() {
    let backend: Arc<dyn Backend + Send> = Arc::new(TestBackend::default());
    backend.set(&key(), &json!({"k": "v"}), at(0)).await.unwrap();
    assert_eq!(backend.label().as_str(), "backend");
    assert_eq!(
        backend.delete(&key()).await.unwrap(),
        DeleteStatus::Deleted(1)
    );
    assert_eq!(backend.delete(&key()).await.unwrap(), DeleteStatus::Missing);
}

#[test]
fn key_formats() {
    let key = CacheKey::new(
        "feed",
        1,
        vec![
            KeyPart::new("category", Some("Tech Info")),
            KeyPart::new("window", Some("24h")),
        ],
    );
    assert_eq!(
        CacheKeyFormat::Plain.serialize(&key).unwrap(),
        b"feed:v1:category=Tech Info&window=24h".to_vec()
    );
    assert_eq!(
        String::from_utf8(CacheKeyFormat::UrlEncoded.serialize(&key).unwrap()).unwrap(),
        "_prefix=feed&_version=1&category=Tech+Info&window=24h"
    );
}
