//! Scan session integration tests
//!
//! Decode events through the pipeline into real stores.

mod common;

use common::{memory_store, pipeline_over, AFTER_RELEASE};
use scanlog::dedup::Decision;
use scanlog::session::{DecodeEvent, ScanOutcome, ScanPipeline};
use scanlog::store::{JsonFileScanStore, ScanStore};
use std::sync::Arc;

async fn scan_after_release(pipeline: &ScanPipeline, payload: &str, decoded_at: i64) -> ScanOutcome {
    tokio::time::sleep(AFTER_RELEASE).await;
    pipeline
        .handle(DecodeEvent::new(payload, "qr", decoded_at))
        .await
        .expect("store should accept the scan")
}

#[tokio::test]
async fn test_same_code_scanned_three_times_is_logged_three_times() {
    let (store, _clock) = memory_store(1_000);
    let pipeline = pipeline_over(store.clone());

    // Each scan is past both the processing timeout and the cooldown
    for i in 0..3 {
        let outcome = scan_after_release(&pipeline, "ABC123", i * 10_000).await;
        assert!(outcome.is_recorded());
    }

    let records = store.list().await.unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.data == "ABC123" && r.type_tag == "qr"));
    assert!(store.exists("ABC123").await.unwrap());

    let stats = store.compute_stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.count_for("qr"), 3);
}

#[tokio::test]
async fn test_burst_of_identical_detections_records_once() {
    let (store, _clock) = memory_store(1_000);
    let pipeline = pipeline_over(store.clone());
    let base = 1_700_000_000_000i64;

    let mut recorded = 0;
    let mut rejected = Vec::new();
    for i in 0..25 {
        match pipeline
            .handle(DecodeEvent::new("ABC123", "qr", base + i * 33))
            .await
            .unwrap()
        {
            ScanOutcome::Recorded { .. } => recorded += 1,
            ScanOutcome::Rejected(decision) => rejected.push(decision),
        }
    }

    assert_eq!(recorded, 1);
    assert!(rejected.iter().all(|d| *d == Decision::RejectBusy));

    // Once released, the same code is still inside its cooldown window
    let late = scan_after_release(&pipeline, "ABC123", base + 2_000).await;
    assert!(matches!(late, ScanOutcome::Rejected(Decision::RejectDuplicate)));
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stats_stay_consistent_through_mixed_operations() {
    let (store, clock) = memory_store(5_000);
    let payloads = [
        ("A", "qr"),
        ("B", "ean13"),
        ("C", "org.iso.Code128"),
        ("D", "maxicode"),
        ("A", "qr"),
    ];

    let mut ids = Vec::new();
    for (payload, tag) in payloads {
        clock.advance(100);
        ids.push(store.insert(payload, tag).await.unwrap().id);
    }
    store.delete_by_id(ids[1]).await.unwrap();
    store.delete_by_id(9_999).await.unwrap();

    let check = |stats: &scanlog::store::AggregateStats, len: usize| {
        assert_eq!(stats.total, len);
        assert_eq!(stats.by_type.values().sum::<usize>(), stats.total);
    };

    let stats = store.compute_stats().await.unwrap();
    check(&stats, store.list().await.unwrap().len());
    assert_eq!(stats.count_for("code128"), 1);
    assert_eq!(stats.count_for("maxicode"), 1);
    assert_eq!(stats.count_for("ean13"), 0);
    assert_eq!(stats.last_scan_at, Some(5_500));

    store.clear_all().await.unwrap();
    let stats = store.compute_stats().await.unwrap();
    check(&stats, 0);
    assert_eq!(stats.last_scan_at, None);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_keeps_scans_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("scans.json");

    {
        let store: Arc<dyn ScanStore> = Arc::new(JsonFileScanStore::open(&path).await.unwrap());
        let pipeline = pipeline_over(store);
        scan_after_release(&pipeline, "first", 0).await;
        scan_after_release(&pipeline, "second", 100).await;
    }

    let reopened = JsonFileScanStore::open(&path).await.unwrap();
    let records = reopened.list().await.unwrap();
    let payloads: Vec<&str> = records.iter().map(|r| r.data.as_str()).collect();
    assert_eq!(payloads, vec!["second", "first"]);

    let next = reopened.insert("third", "qr").await.unwrap();
    assert!(records.iter().all(|r| r.id < next.id));
}
