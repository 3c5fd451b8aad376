//! In-memory scan store

use crate::core::time::{Clock, SystemClock};
use crate::store::error::{StoreError, StoreResult};
use crate::store::record::{normalize_type_tag, RecordId, ScanRecord};
use crate::store::traits::ScanStore;
use async_trait::async_trait;
use std::sync::{Arc, LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    /// Insertion order, oldest first
    records: Vec<ScanRecord>,
    next_id: RecordId,
}

/// Scan store kept entirely in process memory
///
/// All state sits behind one `RwLock`, so every operation observes a whole
/// snapshot. Nothing survives a restart.
pub struct MemoryScanStore {
    state: RwLock<MemoryState>,
    clock: Arc<dyn Clock>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                records: Vec::new(),
                next_id: 1,
            }),
            clock,
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, MemoryState>> {
        map_poison(self.state.read(), "read")
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryState>> {
        map_poison(self.state.write(), "write")
    }
}

impl Default for MemoryScanStore {
    fn default() -> Self {
        Self::new()
    }
}

// A panic while holding the lock poisons it; surface that as a store error
// instead of propagating the panic.
fn map_poison<G>(result: LockResult<G>, mode: &str) -> StoreResult<G> {
    result.map_err(|poison_err| StoreError::Lock {
        message: format!(
            "scan store lock poisoned on {} (a panic occurred while holding it): {:?}",
            mode, poison_err
        ),
    })
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn exists(&self, payload: &str) -> StoreResult<bool> {
        let state = self.read()?;
        Ok(state.records.iter().any(|r| r.data == payload))
    }

    async fn insert(&self, payload: &str, type_tag: &str) -> StoreResult<ScanRecord> {
        let mut state = self.write()?;
        let record = ScanRecord {
            id: state.next_id,
            data: payload.to_string(),
            type_tag: normalize_type_tag(type_tag),
            created_at: self.clock.now_millis(),
        };
        state.next_id += 1;
        state.records.push(record.clone());
        log::debug!("Stored scan #{} ({})", record.id, record.type_tag);
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<ScanRecord>> {
        let state = self.read()?;
        Ok(state.records.iter().rev().cloned().collect())
    }

    async fn delete_by_id(&self, id: RecordId) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.records.iter().position(|r| r.id == id) {
            Some(index) => {
                state.records.remove(index);
                log::debug!("Deleted scan #{}", id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_all(&self) -> StoreResult<usize> {
        let mut state = self.write()?;
        let removed = state.records.len();
        state.records.clear();
        log::debug!("Cleared {} scans", removed);
        Ok(removed)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
