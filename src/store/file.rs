//! JSON-file backed scan store
//!
//! The whole store lives in one JSON document:
//!
//! ```text
//! { "version": 1, "next_id": 4, "records": [ {"id":1,"data":"...","type":"qr","created_at":...}, ... ] }
//! ```
//!
//! Records are kept on disk in insertion order. Each mutation writes the
//! complete new document to a sibling temporary file and renames it over the
//! store file; the in-memory copy is only replaced once the rename succeeded,
//! so a failed write leaves both at the previous state. The write and the
//! in-memory commit run together on a spawned task, so a caller that drops a
//! mutation future part way cannot leave the two out of step.

use crate::core::time::{Clock, SystemClock};
use crate::core::version::store_format_version;
use crate::store::error::{StoreError, StoreResult};
use crate::store::record::{normalize_type_tag, RecordId, ScanRecord};
use crate::store::traits::ScanStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    next_id: RecordId,
    records: Vec<ScanRecord>,
}

impl StoreDocument {
    fn empty() -> Self {
        Self {
            version: store_format_version(),
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// Scan store persisted to a JSON file
pub struct JsonFileScanStore {
    path: PathBuf,
    document: Arc<Mutex<StoreDocument>>,
    clock: Arc<dyn Clock>,
}

impl JsonFileScanStore {
    /// Open the store at `path`, creating parent directories as needed
    ///
    /// A missing file is an empty store; the file is first written on the
    /// first mutation.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let document = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => parse_document(&path, &contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| StoreError::io("create store directory", parent, e))?;
                }
                StoreDocument::empty()
            }
            Err(e) => return Err(StoreError::io("read store", &path, e)),
        };

        log::debug!(
            "Opened scan store {} ({} records)",
            path.display(),
            document.records.len()
        );

        Ok(Self {
            path,
            document: Arc::new(Mutex::new(document)),
            clock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `updated` to disk, then make it the in-memory document
    async fn commit(
        &self,
        mut guard: OwnedMutexGuard<StoreDocument>,
        updated: StoreDocument,
    ) -> StoreResult<()> {
        let path = self.path.clone();
        let write = tokio::spawn(async move {
            persist(&path, &updated).await?;
            *guard = updated;
            Ok::<(), StoreError>(())
        });
        write.await.map_err(|e| StoreError::Lock {
            message: format!("store write task failed: {}", e),
        })?
    }
}

async fn persist(path: &Path, document: &StoreDocument) -> StoreResult<()> {
    let serialized = serde_json::to_vec_pretty(document).map_err(|e| StoreError::Corrupt {
        message: format!("failed to serialise scan store: {}", e),
    })?;

    let tmp_path = temp_path_for(path);
    tokio::fs::write(&tmp_path, serialized)
        .await
        .map_err(|e| StoreError::io("write store", &tmp_path, e))?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(StoreError::io("replace store", path, e));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "scans.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn parse_document(path: &Path, contents: &str) -> StoreResult<StoreDocument> {
    let mut document: StoreDocument =
        serde_json::from_str(contents).map_err(|e| StoreError::Corrupt {
            message: format!("{} is not a valid scan store: {}", path.display(), e),
        })?;

    let supported = store_format_version();
    if document.version != supported {
        return Err(StoreError::Corrupt {
            message: format!(
                "{} has store format version {} (supported: {})",
                path.display(),
                document.version,
                supported
            ),
        });
    }

    // A hand-edited next_id must never hand out an id that is still in use
    let max_id = document.records.iter().map(|r| r.id).max().unwrap_or(0);
    if document.next_id <= max_id {
        log::warn!(
            "Store {} has next_id {} <= highest id {}; adjusting",
            path.display(),
            document.next_id,
            max_id
        );
        document.next_id = max_id + 1;
    }
    Ok(document)
}

#[async_trait]
impl ScanStore for JsonFileScanStore {
    async fn exists(&self, payload: &str) -> StoreResult<bool> {
        let document = self.document.lock().await;
        Ok(document.records.iter().any(|r| r.data == payload))
    }

    async fn insert(&self, payload: &str, type_tag: &str) -> StoreResult<ScanRecord> {
        let document = self.document.clone().lock_owned().await;

        let record = ScanRecord {
            id: document.next_id,
            data: payload.to_string(),
            type_tag: normalize_type_tag(type_tag),
            created_at: self.clock.now_millis(),
        };
        let mut updated = document.clone();
        updated.next_id += 1;
        updated.records.push(record.clone());

        self.commit(document, updated).await?;

        log::debug!("Stored scan #{} ({}) in {}", record.id, record.type_tag, self.path.display());
        Ok(record)
    }

    async fn list(&self) -> StoreResult<Vec<ScanRecord>> {
        let document = self.document.lock().await;
        Ok(document.records.iter().rev().cloned().collect())
    }

    async fn delete_by_id(&self, id: RecordId) -> StoreResult<bool> {
        let document = self.document.clone().lock_owned().await;

        let Some(index) = document.records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let mut updated = document.clone();
        updated.records.remove(index);

        self.commit(document, updated).await?;
        log::debug!("Deleted scan #{}", id);
        Ok(true)
    }

    async fn clear_all(&self) -> StoreResult<usize> {
        let document = self.document.clone().lock_owned().await;
        let removed = document.records.len();

        let mut updated = document.clone();
        updated.records.clear();

        self.commit(document, updated).await?;
        log::debug!("Cleared {} scans", removed);
        Ok(removed)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
