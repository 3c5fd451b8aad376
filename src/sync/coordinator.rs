//! Sequential, best-effort record export

use crate::store::ScanRecord;
use crate::sync::result::SyncResult;
use crate::sync::transport::{RecordTransport, SyncPayload};
use std::sync::Arc;
use std::time::Duration;

/// Default pause before reporting a local-only sync
pub const DEFAULT_LOCAL_SYNC_DELAY: Duration = Duration::from_millis(1000);

/// Where sync sends records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    LocalOnly,
    Remote,
}

/// Pushes stored records to the remote endpoint one at a time
///
/// There is no retry, rollback or resume checkpoint: a failure stops the
/// batch and a later sync resends everything. Callers serialize calls to
/// [`sync`](Self::sync).
pub struct SyncCoordinator {
    mode: SyncMode,
    transport: Option<Arc<dyn RecordTransport>>,
    local_delay: Duration,
}

impl SyncCoordinator {
    /// Coordinator that never touches the network
    pub fn local_only(local_delay: Duration) -> Self {
        Self {
            mode: SyncMode::LocalOnly,
            transport: None,
            local_delay,
        }
    }

    pub fn remote(transport: Arc<dyn RecordTransport>) -> Self {
        Self {
            mode: SyncMode::Remote,
            transport: Some(transport),
            local_delay: DEFAULT_LOCAL_SYNC_DELAY,
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub async fn sync(&self, records: &[ScanRecord]) -> SyncResult {
        if records.is_empty() {
            log::debug!("Sync requested with no records");
            return SyncResult::NothingToSync;
        }

        let transport = match (&self.mode, &self.transport) {
            (SyncMode::Remote, Some(transport)) => transport,
            _ => {
                log::info!("Local-only mode: skipping upload of {} records", records.len());
                if !self.local_delay.is_zero() {
                    tokio::time::sleep(self.local_delay).await;
                }
                return SyncResult::LocalModeNotice(records.len());
            }
        };

        let mut sent = 0usize;
        for record in records {
            let payload = SyncPayload::from(record);
            match transport.send(&payload).await {
                Ok(()) => {
                    sent += 1;
                    log::debug!("Sent record {} ({}/{})", record.id, sent, records.len());
                }
                Err(error) => {
                    log::warn!(
                        "Sync stopped at record {} after {} sent: {}",
                        record.id,
                        sent,
                        error
                    );
                    return SyncResult::Failed { sent, error };
                }
            }
        }

        log::info!("Synced {} records", sent);
        SyncResult::Succeeded(sent)
    }
}
