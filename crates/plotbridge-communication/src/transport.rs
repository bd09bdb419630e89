//! Transport layer for the plotter connection
//!
//! Provides the `Transport` seam the session driver runs against, and
//! the concrete TCP implementation. The device speaks text lines, one
//! command per line, terminated by a null byte then newline.

use crate::encoder::DeviceCommand;
use async_trait::async_trait;
use plotbridge_core::{Result, TransportError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Terminator appended to every outbound command line.
pub const COMMAND_TERMINATOR: &[u8] = b"\x00\n";

/// Byte-stream connection to the device.
///
/// The session driver owns exactly one transport per run; it is closed
/// on completion, error, or disconnect and never reused.
#[async_trait]
pub trait Transport: Send {
    /// Send one command verbatim, followed by the protocol terminator.
    async fn send_command(&mut self, command: &DeviceCommand) -> Result<()>;

    /// Read the next inbound message from the device.
    ///
    /// Returns `Ok(None)` when the peer has closed the connection.
    /// Empty lines are skipped; framing is newline-delimited with any
    /// null padding stripped.
    async fn read_message(&mut self) -> Result<Option<String>>;

    /// Close the connection. Subsequent sends are an error.
    async fn close(&mut self);
}

/// TCP transport to the plotter's G-code service.
pub struct TcpTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: Option<OwnedWriteHalf>,
    peer: String,
    line: Vec<u8>,
}

impl TcpTransport {
    /// Open a connection to the device, bounded by `timeout`.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let peer = format!("{}:{}", host, port);
        tracing::debug!("Connecting to plotter at {}", peer);

        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| TransportError::ConnectTimeout {
                host: host.to_string(),
                port,
                timeout_ms: timeout.as_millis() as u64,
            })?
            .map_err(|e| TransportError::ConnectFailed {
                host: host.to_string(),
                port,
                reason: e.to_string(),
            })?;

        tracing::info!("Connected to plotter at {}", peer);
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: Some(write_half),
            peer,
            line: Vec::with_capacity(64),
        })
    }

    /// The remote address this transport is connected to.
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send_command(&mut self, command: &DeviceCommand) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| TransportError::Io {
            reason: "connection already closed".to_string(),
        })?;

        tracing::debug!("Sending: {}", command);
        let io_err = |e: std::io::Error| TransportError::Io {
            reason: e.to_string(),
        };
        writer.write_all(command.as_str().as_bytes()).await.map_err(io_err)?;
        writer.write_all(COMMAND_TERMINATOR).await.map_err(io_err)?;
        writer.flush().await.map_err(io_err)?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<Option<String>> {
        // Inbound messages are unspecified-length, newline-delimited, and
        // may carry null padding around the text.
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.line)
                .await
                .map_err(|e| TransportError::Io {
                    reason: e.to_string(),
                })?;
            if n == 0 {
                return Ok(None);
            }

            let text: String = String::from_utf8_lossy(&self.line)
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string();
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.shutdown().await;
            tracing::debug!("Closed connection to {}", self.peer);
        }
    }
}
