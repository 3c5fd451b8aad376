//! Stateful decode-event filter with an auto-released processing slot

use crate::dedup::decision::{Decision, DedupConfig, DeduplicationState};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::task::AbortHandle;

struct Inner {
    state: DeduplicationState,
    /// Bumped on every acceptance so a late timer cannot release a newer scan
    generation: u64,
    pending_release: Option<AbortHandle>,
}

impl Inner {
    fn cancel_pending_release(&mut self) {
        if let Some(handle) = self.pending_release.take() {
            handle.abort();
        }
    }
}

/// Decides whether decode events are accepted
///
/// At most one accepted scan is in flight: after `Accept` every event is
/// rejected as busy until [`Deduplicator::release`] is called or the
/// processing timeout fires. The timeout is a Tokio task owned by this
/// instance and aborted when the instance is dropped.
///
/// # Examples
/// ```rust
/// use scanlog::dedup::{Decision, Deduplicator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dedup = Deduplicator::default();
/// assert_eq!(dedup.decide("ABC123", 1_000), Decision::Accept);
/// assert_eq!(dedup.decide("XYZ", 1_010), Decision::RejectBusy);
///
/// dedup.release();
/// assert_eq!(dedup.decide("ABC123", 1_020), Decision::RejectDuplicate);
/// # }
/// ```
pub struct Deduplicator {
    config: DedupConfig,
    inner: Arc<Mutex<Inner>>,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: DeduplicationState::default(),
                generation: 0,
                pending_release: None,
            })),
        }
    }

    pub fn config(&self) -> DedupConfig {
        self.config
    }

    /// Offer a decode event
    ///
    /// On `Accept` an automatic release is scheduled on the current Tokio
    /// runtime. Outside a runtime no timer can be scheduled and the caller
    /// must call [`release`](Self::release) itself.
    pub fn decide(&self, payload: &str, decoded_at: i64) -> Decision {
        let mut inner = lock_inner(&self.inner);
        let decision = inner.state.apply(payload, decoded_at, self.config.cooldown);

        if decision.is_accept() {
            let generation = inner.generation.wrapping_add(1);
            inner.generation = generation;
            inner.cancel_pending_release();
            inner.pending_release = self.schedule_release(generation);
        }

        log::debug!("Decode event at {} -> {}", decoded_at, decision);
        decision
    }

    /// Clear the processing flag; returns whether a scan was in flight
    pub fn release(&self) -> bool {
        let mut inner = lock_inner(&self.inner);
        inner.cancel_pending_release();
        let was_processing = inner.state.processing;
        inner.state.processing = false;
        was_processing
    }

    pub fn is_processing(&self) -> bool {
        lock_inner(&self.inner).state.processing
    }

    /// Snapshot of the current state
    pub fn state(&self) -> DeduplicationState {
        lock_inner(&self.inner).state.clone()
    }

    fn schedule_release(&self, generation: u64) -> Option<AbortHandle> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("No async runtime available; processing flag needs a manual release");
                return None;
            }
        };

        let weak: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        let timeout = self.config.processing_timeout;

        let task = handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                let mut inner = lock_inner(&inner);
                if inner.generation == generation && inner.state.processing {
                    inner.state.processing = false;
                    inner.pending_release = None;
                    log::debug!("Processing flag released after {:?}", timeout);
                }
            }
        });
        Some(task.abort_handle())
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DedupConfig::default())
    }
}

impl Drop for Deduplicator {
    fn drop(&mut self) {
        lock_inner(&self.inner).cancel_pending_release();
    }
}

// The state stays consistent even if a holder panicked, since every
// mutation is a plain field assignment.
fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
