//! Common test utilities and helpers
//!
//! Test doubles shared by the integration suites: a transport that records
//! what it is asked to send, and pipeline constructors with short timeouts.

#![allow(dead_code)]

use async_trait::async_trait;
use scanlog::core::time::ManualClock;
use scanlog::dedup::{DedupConfig, Deduplicator};
use scanlog::notifications::api::new_shared_manager;
use scanlog::session::ScanPipeline;
use scanlog::store::{MemoryScanStore, ScanStore};
use scanlog::sync::{NetworkError, RecordTransport, SyncPayload, SyncTransportResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Processing timeout used by integration pipelines
pub const FAST_PROCESSING_TIMEOUT: Duration = Duration::from_millis(30);

/// Long enough for the fast processing timeout to have fired
pub const AFTER_RELEASE: Duration = Duration::from_millis(120);

pub fn fast_dedup() -> Deduplicator {
    Deduplicator::new(DedupConfig {
        cooldown: Duration::from_millis(3000),
        processing_timeout: FAST_PROCESSING_TIMEOUT,
    })
}

pub fn memory_store(start_millis: i64) -> (Arc<dyn ScanStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_millis));
    let store: Arc<dyn ScanStore> = Arc::new(MemoryScanStore::with_clock(clock.clone()));
    (store, clock)
}

pub fn pipeline_over(store: Arc<dyn ScanStore>) -> ScanPipeline {
    ScanPipeline::new(fast_dedup(), store, new_shared_manager())
}

/// Transport that records payloads and fails the call whose 1-based index is `fail_on`
pub struct RecordingTransport {
    sent: Mutex<Vec<SyncPayload>>,
    calls: Mutex<usize>,
    fail_on: Option<usize>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Self::failing_on(None)
    }

    pub fn failing_on(fail_on: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
            fail_on,
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn sent(&self) -> Vec<SyncPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordTransport for RecordingTransport {
    async fn send(&self, payload: &SyncPayload) -> SyncTransportResult<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_on == Some(call) {
            return Err(NetworkError::Request {
                url: "http://test.invalid/codigos".to_string(),
                message: "connection reset".to_string(),
            });
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
