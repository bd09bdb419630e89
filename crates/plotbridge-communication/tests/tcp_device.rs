//! End-to-end session runs against a fake plotter on a loopback socket.

use plotbridge_communication::{run_session, DeviceCommand, TcpTransport};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Minimal stand-in for the plotter: greets on connect, then answers
/// every null-then-newline terminated command line with an ack (or an
/// error for commands containing a marker).
async fn fake_device(listener: TcpListener) -> Vec<String> {
    let (stream, _) = listener.accept().await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half.write_all(b"hello 1.0\r\n").await.unwrap();

    let mut received = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = match reader.read_until(b'\n', &mut line).await {
            Ok(n) => n,
            Err(_) => break,
        };
        if n == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line)
            .trim_matches(|c: char| c == '\0' || c.is_whitespace())
            .to_string();
        if text.is_empty() {
            continue;
        }

        let reply = if text.contains("X9999") {
            "error out of range\r\n".to_string()
        } else {
            format!("ok {}\r\n", text.len())
        };
        received.push(text);
        if write_half.write_all(reply.as_bytes()).await.is_err() {
            break;
        }
    }
    received
}

#[tokio::test]
async fn streams_a_queue_against_a_live_socket() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let device = tokio::spawn(fake_device(listener));

    let queue = vec![
        DeviceCommand::linear_move(1000, 0, 0),
        DeviceCommand::linear_move(1100, 100, 0),
        DeviceCommand::linear_move(1200, 200, 1000),
    ];

    let mut transport =
        TcpTransport::connect(&addr.ip().to_string(), addr.port(), Duration::from_secs(2))
            .await
            .unwrap();
    let outcome = run_session(&mut transport, queue).await;
    assert!(outcome.is_ok(), "{:?}", outcome);

    let received = device.await.unwrap();
    assert_eq!(
        received,
        vec![
            "G01 X1000 Y0 Z0".to_string(),
            "G01 X1100 Y100 Z0".to_string(),
            "G01 X1200 Y200 Z1000".to_string(),
        ]
    );
}

#[tokio::test]
async fn device_error_reply_fails_the_run() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let device = tokio::spawn(fake_device(listener));

    let queue = vec![
        DeviceCommand::linear_move(9999, 0, 0),
        DeviceCommand::linear_move(1000, 0, 1000),
    ];

    let mut transport =
        TcpTransport::connect(&addr.ip().to_string(), addr.port(), Duration::from_secs(2))
            .await
            .unwrap();
    let outcome = run_session(&mut transport, queue).await;
    assert!(outcome.unwrap_err().is_protocol_error());

    // The faulting command is the only one the device ever saw
    let received = device.await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn connect_to_closed_port_is_a_transport_error() {
    // Bind and immediately drop to get a (very likely) dead port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome =
        TcpTransport::connect(&addr.ip().to_string(), addr.port(), Duration::from_secs(2)).await;
    match outcome {
        Ok(_) => panic!("expected connect failure"),
        Err(e) => assert!(e.is_transport_error(), "{:?}", e),
    }
}
