//! Sync integration tests
//!
//! Stored records through the coordinator, against both the recording
//! transport and a minimal HTTP endpoint on localhost.

mod common;

use common::{memory_store, RecordingTransport};
use scanlog::store::ScanStore;
use scanlog::sync::{HttpTransport, NetworkError, SyncCoordinator, SyncResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_empty_store_makes_no_calls() {
    let (store, _clock) = memory_store(0);
    let transport = RecordingTransport::new();
    let coordinator = SyncCoordinator::remote(transport.clone());

    let result = coordinator.sync(&store.list().await.unwrap()).await;

    assert!(matches!(result, SyncResult::NothingToSync));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_local_only_never_uses_network() {
    let (store, _clock) = memory_store(0);
    store.insert("r1", "qr").await.unwrap();
    store.insert("r2", "qr").await.unwrap();
    let coordinator = SyncCoordinator::local_only(Duration::ZERO);

    let result = coordinator.sync(&store.list().await.unwrap()).await;

    assert!(matches!(result, SyncResult::LocalModeNotice(2)));
    assert_eq!(result.sent(), 0);
}

#[tokio::test]
async fn test_store_records_sent_in_list_order() {
    let (store, clock) = memory_store(1_000);
    for payload in ["a", "b", "c"] {
        clock.advance(10);
        store.insert(payload, "code128").await.unwrap();
    }
    let transport = RecordingTransport::new();
    let coordinator = SyncCoordinator::remote(transport.clone());

    let result = coordinator.sync(&store.list().await.unwrap()).await;

    assert!(matches!(result, SyncResult::Succeeded(3)));
    let sent = transport.sent();
    let data: Vec<&str> = sent.iter().map(|p| p.data.as_str()).collect();
    assert_eq!(data, vec!["c", "b", "a"]);
    assert_eq!(sent[0].timestamp, 1_030);
    assert_eq!(sent[0].type_tag, "code128");
}

#[tokio::test]
async fn test_second_of_three_failing_reports_one_sent() {
    let (store, _clock) = memory_store(0);
    for payload in ["a", "b", "c"] {
        store.insert(payload, "qr").await.unwrap();
    }
    let transport = RecordingTransport::failing_on(Some(2));
    let coordinator = SyncCoordinator::remote(transport.clone());

    let result = coordinator.sync(&store.list().await.unwrap()).await;

    assert!(matches!(
        result,
        SyncResult::Failed {
            sent: 1,
            error: NetworkError::Request { .. }
        }
    ));
    assert_eq!(transport.calls(), 2);
    // Nothing is removed from the store by a sync
    assert_eq!(store.list().await.unwrap().len(), 3);
}

/// Accept `responses.len()` connections, answer each with the given status
/// and forward the raw request text
async fn serve(responses: Vec<u16>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for status in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let _ = tx.send(request);
            let reply = format!(
                "HTTP/1.1 {} X\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (base_url, rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).to_string()
}

#[tokio::test]
async fn test_http_transport_posts_json_records() {
    let (base_url, mut requests) = serve(vec![201, 200]).await;
    let (store, _clock) = memory_store(1_700_000_000_000);
    store.insert("ABC123", "qr").await.unwrap();
    store.insert("4006381333931", "ean13").await.unwrap();

    let transport = HttpTransport::new(&base_url, Duration::from_secs(5)).unwrap();
    let coordinator = SyncCoordinator::remote(Arc::new(transport));
    let result = coordinator.sync(&store.list().await.unwrap()).await;

    assert!(matches!(result, SyncResult::Succeeded(2)));

    let first = requests.recv().await.unwrap();
    assert!(first.starts_with("POST /codigos HTTP/1.1"));
    assert!(first.to_ascii_lowercase().contains("content-type: application/json"));
    let body = first.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"data": "4006381333931", "type": "ean13", "timestamp": 1_700_000_000_000i64})
    );
}

#[tokio::test]
async fn test_http_error_status_stops_batch() {
    let (base_url, _requests) = serve(vec![200, 500]).await;
    let (store, _clock) = memory_store(0);
    for payload in ["a", "b", "c"] {
        store.insert(payload, "qr").await.unwrap();
    }

    let transport = HttpTransport::new(&base_url, Duration::from_secs(5)).unwrap();
    let coordinator = SyncCoordinator::remote(Arc::new(transport));
    let result = coordinator.sync(&store.list().await.unwrap()).await;

    match result {
        SyncResult::Failed { sent, error } => {
            assert_eq!(sent, 1);
            assert!(matches!(error, NetworkError::Status { status: 500, .. }));
        }
        other => panic!("expected failure, got {:?}", other),
    }
}
