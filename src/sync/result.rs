//! Outcome of a sync run

use crate::sync::error::NetworkError;
use std::fmt;

#[derive(Debug, Clone)]
pub enum SyncResult {
    /// The store was empty; nothing was attempted
    NothingToSync,
    /// Local-only mode; no network I/O happened
    LocalModeNotice(usize),
    /// Every record was delivered
    Succeeded(usize),
    /// Delivery stopped at the first failure. `sent` records made it before
    /// the error; they are not rolled back.
    Failed { sent: usize, error: NetworkError },
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, SyncResult::Failed { .. })
    }

    /// Records delivered to the remote endpoint
    pub fn sent(&self) -> usize {
        match self {
            SyncResult::Succeeded(n) => *n,
            SyncResult::Failed { sent, .. } => *sent,
            SyncResult::NothingToSync | SyncResult::LocalModeNotice(_) => 0,
        }
    }

    /// User-facing message for this result
    pub fn summary(&self) -> String {
        match self {
            SyncResult::NothingToSync => "No codes to sync".to_string(),
            SyncResult::LocalModeNotice(n) => format!(
                "Local mode: {} code{} kept on this device",
                n,
                plural(*n)
            ),
            SyncResult::Succeeded(n) => {
                format!("Synced {} code{} to the server", n, plural(*n))
            }
            SyncResult::Failed { sent, error } => format!(
                "Sync failed after {} code{}: {}",
                sent,
                plural(*sent),
                error
            ),
        }
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
