//! Integration tests for the connection and correlation engine against a
//! stub backend on a real TCP socket.

use paneldiag::{ConnectionState, PanelConnection, SendError, message};
use tokio::{io::BufReader, time::Duration};

mod common;
use common::{TestResult, config_frame, read_line, stub_listener, write_line};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

async fn connect(port: u16) -> TestResult<PanelConnection> {
    Ok(PanelConnection::connect("127.0.0.1", port, CONNECT_TIMEOUT).await?)
}

#[tokio::test]
async fn heartbeat_is_answered_with_a_config_reply() -> TestResult {
    let (listener, port) = stub_listener().await?;

    // Stub backend: expect one heartbeat, reply with a three-device config.
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut reader = BufReader::new(stream);
        let line = read_line(&mut reader).await.expect("read heartbeat");
        let heartbeat: serde_json::Value = serde_json::from_str(line.trim()).expect("valid JSON");
        assert_eq!(heartbeat["type"], "panel_heartbeat");
        assert_eq!(heartbeat["data"]["client_id"], "helm_main");

        let mut stream = reader.into_inner();
        write_line(&mut stream, &config_frame(3)).await.expect("write config");
        stream
    });

    let mut conn = connect(port).await?;
    conn.send(&paneldiag::PanelMessage::heartbeat("helm_main"))
        .await?;
    let config = conn
        .wait_for(message::CONFIG, Duration::from_secs(1))
        .await
        .expect("config reply within the deadline");
    assert_eq!(config.device_count(), 3);

    conn.disconnect().await;
    drop(server.await?);
    Ok(())
}

#[tokio::test]
async fn malformed_frame_does_not_interrupt_the_stream() -> TestResult {
    let (listener, port) = stub_listener().await?;

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        write_line(&mut stream, &config_frame(1)).await.expect("write");
        write_line(&mut stream, "this is not json").await.expect("write");
        write_line(
            &mut stream,
            r#"{"type":"panel_input","timestamp":"t","data":{"value":1.0}}"#,
        )
        .await
        .expect("write");
        stream
    });

    let mut conn = connect(port).await?;
    let config = conn.wait_for(message::CONFIG, Duration::from_secs(1)).await;
    assert!(config.is_some(), "frame before the garbage should decode");
    let input = conn.wait_for(message::INPUT, Duration::from_secs(1)).await;
    assert!(input.is_some(), "frame after the garbage should decode");

    conn.disconnect().await;
    drop(server.await?);
    Ok(())
}

#[tokio::test]
async fn correlation_is_fifo_per_type_across_the_wire() -> TestResult {
    let (listener, port) = stub_listener().await?;

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        for frame in [
            r#"{"type":"panel_config","timestamp":"first","data":{}}"#,
            r#"{"type":"panel_input","timestamp":"between","data":{}}"#,
            r#"{"type":"panel_config","timestamp":"second","data":{}}"#,
        ] {
            write_line(&mut stream, frame).await.expect("write");
        }
        stream
    });

    let mut conn = connect(port).await?;
    let first = conn
        .wait_for(message::CONFIG, Duration::from_secs(1))
        .await
        .expect("first config");
    assert_eq!(first.timestamp, "first");
    let second = conn
        .wait_for(message::CONFIG, Duration::from_secs(1))
        .await
        .expect("second config");
    assert_eq!(second.timestamp, "second");
    let between = conn
        .wait_for(message::INPUT, Duration::from_secs(1))
        .await
        .expect("intervening input stays queued");
    assert_eq!(between.timestamp, "between");

    conn.disconnect().await;
    drop(server.await?);
    Ok(())
}

#[tokio::test]
async fn waits_time_out_after_the_peer_closes() -> TestResult {
    let (listener, port) = stub_listener().await?;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        drop(stream); // Close immediately.
    });

    let mut conn = connect(port).await?;
    server.await?;

    let start = tokio::time::Instant::now();
    let got = conn
        .wait_for(message::CONFIG, Duration::from_millis(200))
        .await;
    assert!(got.is_none());
    assert!(
        start.elapsed() >= Duration::from_millis(200),
        "loss of connection surfaces as a timeout, not an early return"
    );

    conn.disconnect().await;
    Ok(())
}

#[tokio::test]
async fn send_after_disconnect_is_a_reported_failure() -> TestResult {
    let (listener, port) = stub_listener().await?;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        stream
    });

    let mut conn = connect(port).await?;
    assert!(conn.is_connected());

    conn.disconnect().await;
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    // Disconnect is idempotent.
    conn.disconnect().await;

    let err = conn
        .send(&paneldiag::PanelMessage::heartbeat("helm_main"))
        .await
        .expect_err("send on a closed connection must fail");
    assert!(matches!(err, SendError::NotConnected));

    drop(server.await?);
    Ok(())
}

#[tokio::test]
async fn connecting_to_a_closed_port_reports_the_cause() -> TestResult {
    // Bind then drop to obtain a port with nothing listening.
    let (listener, port) = stub_listener().await?;
    drop(listener);

    let err = PanelConnection::connect("127.0.0.1", port, CONNECT_TIMEOUT)
        .await
        .expect_err("connect must fail");
    assert!(err.to_string().contains("failed to connect"));
    Ok(())
}
