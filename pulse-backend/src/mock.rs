//! In-memory backend with operation counters, for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use pulse_core::{BackendLabel, CacheEntry, CacheKey, Raw};

use crate::{Backend, BackendError, BackendResult, CacheBackend, DeleteStatus};

#[derive(Default)]
struct Counters {
    reads: AtomicUsize,
    writes: AtomicUsize,
    removes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Thread-safe in-memory backend. Clones share storage and counters.
#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<DashMap<CacheKey, CacheEntry<Raw>>>,
    counters: Arc<Counters>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.counters.removes.load(Ordering::SeqCst)
    }

    /// Makes every subsequent read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.counters.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail, as a full store would.
    pub fn fail_writes(&self, fail: bool) {
        self.counters.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the raw entry under `key` without touching the counters.
    pub fn raw(&self, key: &CacheKey) -> Option<CacheEntry<Raw>> {
        self.store.get(key).map(|entry| entry.clone())
    }

    /// Inserts a raw entry without touching the counters.
    pub fn insert_raw(&self, key: CacheKey, entry: CacheEntry<Raw>) {
        self.store.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

fn simulated(what: &str) -> BackendError {
    BackendError::internal(std::io::Error::other(format!("simulated {what} failure")))
}

#[async_trait]
impl Backend for MockBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheEntry<Raw>>> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_reads.load(Ordering::SeqCst) {
            return Err(simulated("read"));
        }
        Ok(self.store.get(key).map(|entry| entry.clone()))
    }

    async fn write(&self, key: &CacheKey, entry: CacheEntry<Raw>) -> BackendResult<()> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        if self.counters.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated("write"));
        }
        self.store.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        self.counters.removes.fetch_add(1, Ordering::SeqCst);
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("mock")
    }
}

impl CacheBackend for MockBackend {}
