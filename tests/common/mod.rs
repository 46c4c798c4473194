//! Shared utilities for integration tests.
//!
//! Provides a stub backend bound to an unused local port plus helpers for
//! reading and writing newline-delimited JSON frames from the server side.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

/// Result type for test functions.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Bind a listener on an unused local port, returning it with the port.
pub async fn stub_listener() -> TestResult<(TcpListener, u16)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// Read one newline-terminated line from the client.
pub async fn read_line(reader: &mut BufReader<TcpStream>) -> TestResult<String> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line)
}

/// Write `payload` followed by a newline.
pub async fn write_line(stream: &mut TcpStream, payload: &str) -> TestResult<()> {
    stream.write_all(payload.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await?;
    Ok(())
}

/// A `panel_config` frame advertising `devices` generic devices.
pub fn config_frame(devices: usize) -> String {
    let devices: Vec<_> = (0..devices)
        .map(|i| json!({"id": format!("device_{i}"), "type": "input"}))
        .collect();
    json!({
        "type": "panel_config",
        "timestamp": "2026-08-29T00:00:00.000000Z",
        "data": {"devices": devices},
    })
    .to_string()
}
