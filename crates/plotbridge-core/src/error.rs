//! Error handling for plotbridge
//!
//! Provides error types for all layers of the bridge:
//! - Validation errors (malformed caller input, no device I/O attempted)
//! - Protocol errors (device-reported faults)
//! - Transport errors (connection establishment and I/O)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Represents errors in caller-supplied input. These are detected before
/// any device I/O is attempted and are always reported back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Path contained no points
    #[error("Path must contain at least one point")]
    EmptyPath,

    /// Path payload could not be decoded
    #[error("Malformed path payload: {reason}")]
    MalformedPath {
        /// Why the payload could not be decoded.
        reason: String,
    },

    /// Command queue was empty
    #[error("Command queue must contain at least one command")]
    EmptyQueue,
}

/// Protocol error type
///
/// Represents faults reported by the device itself over the wire.
/// A device fault abandons the remaining queue; the protocol does not
/// support resuming mid-queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Device sent an error-class message
    #[error("Device fault: {message}")]
    DeviceFault {
        /// The raw error message received from the device.
        message: String,
    },
}

/// Transport error type
///
/// Represents errors in the TCP connection to the plotter, from
/// connection establishment through unexpected closure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Failed to open a connection to the device
    #[error("Failed to connect to {host}:{port}: {reason}")]
    ConnectFailed {
        /// Device hostname.
        host: String,
        /// Device TCP port.
        port: u16,
        /// The underlying failure.
        reason: String,
    },

    /// Connection attempt timed out
    #[error("Connection to {host}:{port} timed out after {timeout_ms}ms")]
    ConnectTimeout {
        /// Device hostname.
        host: String,
        /// Device TCP port.
        port: u16,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// I/O failure on an established connection
    #[error("Device I/O error: {reason}")]
    Io {
        /// The underlying failure.
        reason: String,
    },
}

/// Main error type for plotbridge
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Device-reported protocol fault
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Connection/transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Connection closed before the command cursor reached the end of
    /// the queue, without an explicit device fault. An ambiguous
    /// outcome: some commands may have executed.
    #[error("Partial completion: {sent} of {total} commands sent before close")]
    PartialCompletion {
        /// Commands transmitted before the close.
        sent: usize,
        /// Total commands in the queue.
        total: usize,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a device-reported protocol fault
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is a partial completion outcome
    pub fn is_partial_completion(&self) -> bool {
        matches!(self, Error::PartialCompletion { .. })
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
