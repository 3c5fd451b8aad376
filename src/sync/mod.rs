//! Remote Synchronization
//!
//! Exports stored scan records to a remote endpoint, or reports a local-only
//! notice when no remote is configured. The network seam is the
//! [`RecordTransport`] trait; [`HttpTransport`] is the production
//! implementation.

pub mod coordinator;
pub mod error;
pub mod result;
pub mod transport;

pub use coordinator::{SyncCoordinator, SyncMode, DEFAULT_LOCAL_SYNC_DELAY};
pub use error::{NetworkError, SyncTransportResult};
pub use result::SyncResult;
pub use transport::{
    HttpTransport, RecordTransport, SyncPayload, DEFAULT_HTTP_TIMEOUT_SECS, SYNC_ENDPOINT_PATH,
};
