//! Process-wide serialization of provider calls.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One-slot gate shared by every call of an orchestrator, regardless of key.
///
/// Waiters are served in FIFO order. The slot is held by a [`GatePermit`];
/// dropping the permit on any exit path, including cancellation of the
/// holder's future, frees the slot.
#[derive(Debug, Clone, Default)]
pub struct ProviderGate {
    slot: Arc<Mutex<()>>,
}

/// Proof of holding the provider slot.
#[derive(Debug)]
pub struct GatePermit {
    _guard: OwnedMutexGuard<()>,
}

impl ProviderGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the slot is free and takes it.
    pub async fn acquire(&self) -> GatePermit {
        GatePermit {
            _guard: self.slot.clone().lock_owned().await,
        }
    }

    /// Takes the slot if it is free right now.
    #[cfg(test)]
    fn try_acquire(&self) -> Option<GatePermit> {
        self.slot
            .clone()
            .try_lock_owned()
            .ok()
            .map(|guard| GatePermit { _guard: guard })
    }

    /// Returns `true` while some call holds the slot.
    pub fn is_busy(&self) -> bool {
        self.slot.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn permit_is_exclusive() {
        let gate = ProviderGate::new();
        let permit = gate.acquire().await;
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn dropping_a_waiting_future_leaves_gate_usable() {
        let gate = ProviderGate::new();
        let permit = gate.acquire().await;

        let waiter = tokio::spawn({
            let gate = gate.clone();
            async move {
                let _permit = gate.acquire().await;
            }
        });
        tokio::task::yield_now().await;
        waiter.abort();
        let _ = waiter.await;

        drop(permit);
        assert!(gate.try_acquire().is_some());
    }
}
