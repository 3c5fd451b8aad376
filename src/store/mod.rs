//! Scan Store Component
//!
//! Durable log of accepted scans plus the aggregate statistics derived from
//! it. The store exclusively owns record lifetime: records are created by
//! `insert` and destroyed by `delete_by_id` or `clear_all`.
//!
//! ## Backends
//!
//! - [`MemoryScanStore`]: process-local, used for tests and `--store memory`
//! - [`JsonFileScanStore`]: a single JSON document replaced atomically on
//!   every mutation
//!
//! Storage failures surface as [`StoreError`]; the store never retries.

pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod stats;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileScanStore;
pub use memory::MemoryScanStore;
pub use record::{normalize_type_tag, RecordId, ScanRecord, Symbology, UNKNOWN_TYPE_TAG};
pub use stats::AggregateStats;
pub use traits::ScanStore;

#[cfg(test)]
mod tests;
