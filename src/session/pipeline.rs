//! Decode event → decision → persistence → notification

use crate::dedup::{Decision, Deduplicator};
use crate::notifications::api::{
    publish_best_effort, Event, ScanEvent, ScanEventType, SharedNotificationManager,
};
use crate::session::decode::DecodeEvent;
use crate::store::{AggregateStats, ScanRecord, ScanStore, StoreResult};
use std::sync::Arc;

pub const NEW_CODE_MESSAGE: &str = "New code saved";
pub const ALREADY_SCANNED_MESSAGE: &str = "Code already scanned";

/// What happened to one decode event
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// Filtered out; the store was not touched
    Rejected(Decision),
    Recorded {
        record: ScanRecord,
        /// False when the payload was already stored before this scan
        first_seen: bool,
        stats: AggregateStats,
    },
}

impl ScanOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, ScanOutcome::Recorded { .. })
    }
}

/// One scanning session over a store
///
/// The processing slot taken by an accepted event is released by the
/// deduplicator's timeout, so decode events arriving while the store write
/// is in progress (and shortly after) are rejected as busy.
pub struct ScanPipeline {
    dedup: Deduplicator,
    store: Arc<dyn ScanStore>,
    notifications: SharedNotificationManager,
}

impl ScanPipeline {
    pub fn new(
        dedup: Deduplicator,
        store: Arc<dyn ScanStore>,
        notifications: SharedNotificationManager,
    ) -> Self {
        Self {
            dedup,
            store,
            notifications,
        }
    }

    pub fn deduplicator(&self) -> &Deduplicator {
        &self.dedup
    }

    pub fn store(&self) -> &Arc<dyn ScanStore> {
        &self.store
    }

    pub async fn handle(&self, event: DecodeEvent) -> StoreResult<ScanOutcome> {
        let decision = self.dedup.decide(&event.payload, event.decoded_at);
        if !decision.is_accept() {
            return Ok(ScanOutcome::Rejected(decision));
        }

        match self.record(&event).await {
            Ok((record, first_seen, stats)) => {
                let (event_type, message) = if first_seen {
                    (ScanEventType::NewCode, NEW_CODE_MESSAGE)
                } else {
                    (ScanEventType::AlreadyScanned, ALREADY_SCANNED_MESSAGE)
                };
                log::info!(
                    "Recorded scan {} ({}, first_seen={})",
                    record.id,
                    record.type_tag,
                    first_seen
                );
                publish_best_effort(
                    &self.notifications,
                    Event::Scan(ScanEvent::with_message(
                        event_type,
                        Some(record.id),
                        message.to_string(),
                    )),
                )
                .await;

                Ok(ScanOutcome::Recorded {
                    record,
                    first_seen,
                    stats,
                })
            }
            Err(e) => {
                // Nothing is in flight any more; the next decode need not wait
                // out the processing timeout
                self.dedup.release();
                log::error!("Failed to record scan: {}", e);
                publish_best_effort(
                    &self.notifications,
                    Event::Scan(ScanEvent::with_message(
                        ScanEventType::Error,
                        None,
                        format!("Could not save code: {}", e),
                    )),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn record(&self, event: &DecodeEvent) -> StoreResult<(ScanRecord, bool, AggregateStats)> {
        // Checked before the insert, otherwise every payload would look known
        let already_stored = self.store.exists(&event.payload).await?;
        let record = self.store.insert(&event.payload, &event.symbology).await?;
        let stats = self.store.compute_stats().await?;
        Ok((record, !already_stored, stats))
    }
}
