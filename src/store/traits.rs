//! Scan store trait

use crate::store::error::StoreResult;
use crate::store::record::{RecordId, ScanRecord};
use crate::store::stats::AggregateStats;
use async_trait::async_trait;

/// Durable log of scan records
///
/// The store is a log, not a set: inserting a payload that already exists
/// creates another record. Every mutation is applied atomically per call, so
/// a concurrent reader sees either the state before or after it.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// True if any stored record carries exactly this payload
    async fn exists(&self, payload: &str) -> StoreResult<bool>;

    /// Create a new record with a fresh id and the store clock's current time
    async fn insert(&self, payload: &str, type_tag: &str) -> StoreResult<ScanRecord>;

    /// All records, most recently inserted first
    async fn list(&self) -> StoreResult<Vec<ScanRecord>>;

    /// Remove one record; `Ok(false)` if no record has this id
    async fn delete_by_id(&self, id: RecordId) -> StoreResult<bool>;

    /// Remove every record and return how many were removed
    async fn clear_all(&self) -> StoreResult<usize>;

    /// Statistics derived from a single consistent snapshot
    async fn compute_stats(&self) -> StoreResult<AggregateStats> {
        let records = self.list().await?;
        Ok(AggregateStats::from_records(&records))
    }

    /// Short backend description for logs
    fn describe(&self) -> String;
}
