//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use auction_gateway::GatewayConfig;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Config that binds both listeners to ephemeral loopback ports.
#[allow(dead_code)]
pub fn ephemeral_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.host = "127.0.0.1".into();
    config.port = 0;
    config.admin_port = 0;
    config
}

/// A mock bid cache. Answers every request with one generated key per
/// stored value and counts the puts it received.
pub struct MockCache {
    pub addr: SocketAddr,
    pub puts: Arc<AtomicUsize>,
}

/// Start the mock cache on an ephemeral port.
#[allow(dead_code)]
pub async fn start_mock_cache() -> MockCache {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let puts = Arc::new(AtomicUsize::new(0));

    let counter = puts.clone();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let counter = counter.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let mut content_length = 0usize;
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                        return;
                    }
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap_or(0);
                        }
                    }
                }

                let mut body = vec![0u8; content_length];
                if reader.read_exact(&mut body).await.is_err() {
                    return;
                }

                let request: serde_json::Value =
                    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
                let count = request["puts"].as_array().map_or(0, Vec::len);
                let n = counter.fetch_add(count, Ordering::SeqCst);

                let responses: Vec<_> = (0..count)
                    .map(|i| serde_json::json!({ "uuid": format!("key-{}", n + i) }))
                    .collect();
                let payload = serde_json::json!({ "responses": responses }).to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    payload.len(),
                    payload
                );

                let mut socket = reader.into_inner();
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockCache { addr, puts }
}
