//! Command tests against an in-memory store

use crate::app::cli::{AppConfig, StoreLocation};
use crate::app::commands::*;
use crate::notifications::api::{new_shared_manager, Event, EventFilter, SyncEventType};
use crate::store::{MemoryScanStore, ScanStore};
use crate::sync::{SyncCoordinator, SyncResult};
use std::sync::Arc;
use std::time::Duration;

fn context() -> AppContext {
    let config = AppConfig {
        store: StoreLocation::Memory,
        local_sync_delay: Duration::ZERO,
        ..AppConfig::default()
    };
    AppContext {
        config,
        store: Arc::new(MemoryScanStore::new()),
        notifications: new_shared_manager(),
        use_color: false,
    }
}

#[tokio::test]
async fn test_scan_reads_until_eof() {
    let ctx = context();
    let (_shutdown, shutdown_rx) = crate::core::shutdown::ShutdownCoordinator::new();
    // All lines arrive well inside the processing timeout, so only the first
    // event is recorded and the rest are rejected as busy
    let input: &[u8] = b"ABC123\tqr\t1000\n\nABC123\tqr\t1100\nXYZ\tean13\t1200\nbad\tqr\tlater\n";

    let summary = run_scan(&ctx, input, shutdown_rx).await.unwrap();

    assert_eq!(summary.events, 3);
    assert_eq!(summary.recorded, 1);
    assert_eq!(summary.new_codes, 1);
    assert_eq!(summary.busy, 2);
    assert_eq!(summary.invalid_lines, 1);
    assert!(!summary.interrupted);
    assert_eq!(ctx.store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_scan_stops_on_shutdown() {
    let ctx = context();
    let (shutdown, shutdown_rx) = crate::core::shutdown::ShutdownCoordinator::new();
    // A reader that never yields a line
    let (_writer, reader) = tokio::io::duplex(64);

    shutdown.trigger_shutdown();
    let summary = run_scan(&ctx, tokio::io::BufReader::new(reader), shutdown_rx)
        .await
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.events, 0);
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let ctx = context();
    let record = ctx.store.insert("A", "qr").await.unwrap();

    assert!(run_delete(&ctx, record.id).await.is_ok());
    let err = run_delete(&ctx, record.id).await.unwrap_err();
    assert!(matches!(err, CommandError::NotFound { id } if id == record.id));
}

#[tokio::test]
async fn test_clear_empties_store() {
    let ctx = context();
    ctx.store.insert("A", "qr").await.unwrap();
    ctx.store.insert("B", "qr").await.unwrap();

    run_clear(&ctx).await.unwrap();

    assert!(ctx.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_local_only_publishes_notice() {
    let ctx = context();
    let mut receiver = ctx.notifications.lock().await.subscribe(
        "test".to_string(),
        EventFilter::SyncOnly,
        "test".to_string(),
    );
    ctx.store.insert("A", "qr").await.unwrap();
    ctx.store.insert("B", "code128").await.unwrap();

    let coordinator = build_sync_coordinator(&ctx.config).unwrap();
    let result = run_sync(&ctx, &coordinator).await.unwrap();

    assert!(matches!(result, SyncResult::LocalModeNotice(2)));
    let started = receiver.recv().await;
    assert!(matches!(started, Some(Event::Sync(ref e)) if e.event_type == SyncEventType::Started));
    match receiver.recv().await {
        Some(Event::Sync(e)) => {
            assert_eq!(e.event_type, SyncEventType::LocalOnly);
            assert_eq!(e.count, 2);
            assert_eq!(e.message.as_deref(), Some(result.summary().as_str()));
        }
        other => panic!("expected sync event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sync_empty_store() {
    let ctx = context();
    let coordinator = SyncCoordinator::local_only(Duration::ZERO);

    let result = run_sync(&ctx, &coordinator).await.unwrap();

    assert!(matches!(result, SyncResult::NothingToSync));
}

#[tokio::test]
async fn test_remote_coordinator_selected_when_not_local() {
    let config = AppConfig {
        local_only: false,
        ..AppConfig::default()
    };
    let coordinator = build_sync_coordinator(&config).unwrap();
    assert_eq!(coordinator.mode(), crate::sync::SyncMode::Remote);
}

#[tokio::test]
async fn test_event_printer_drains_and_stops() {
    let ctx = context();
    let printer = spawn_event_printer(&ctx.notifications, false).await;
    assert_eq!(ctx.notifications.lock().await.subscriber_count(), 1);

    stop_event_printer(&ctx.notifications, printer).await;

    assert_eq!(ctx.notifications.lock().await.subscriber_count(), 0);
}
