//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Well-known development mnemonic (Anvil/Hardhat). Never use for real funds.
#[allow(dead_code)]
pub const TEST_PHRASE: &str = "test test test test test test test test test test test junk";

/// Request line path and lower-cased headers seen by a mock backend.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` maps each request to a status code and JSON body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(MockRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let (read_half, mut write_half) = socket.into_split();
                        let mut reader = BufReader::new(read_half);

                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();

                        let mut headers = HashMap::new();
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) | Err(_) => break,
                                Ok(_) => {
                                    let line = line.trim_end();
                                    if line.is_empty() {
                                        break;
                                    }
                                    if let Some((name, value)) = line.split_once(':') {
                                        headers.insert(
                                            name.trim().to_ascii_lowercase(),
                                            value.trim().to_string(),
                                        );
                                    }
                                }
                            }
                        }

                        let (status, body) = f(MockRequest { path, headers }).await;
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            403 => "403 Forbidden",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = write_half.write_all(response.as_bytes()).await;
                        let _ = write_half.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// Write a wallet file into `dir` and return its path.
#[allow(dead_code)]
pub fn write_wallet(dir: &tempfile::TempDir, contents: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("wallet.json");
    std::fs::write(&path, contents.to_string()).unwrap();
    path
}
