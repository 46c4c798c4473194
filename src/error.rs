//! Error types for connection establishment and message transmission.
//!
//! Failures here are result values the orchestration layer counts as test
//! events; nothing in this crate escapes a caller by panicking.

use std::io;

use thiserror::Error;

/// Errors establishing a connection to the backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectError {
    /// The connect attempt did not complete within the configured timeout.
    #[error("connection to {addr} timed out after {seconds}s")]
    Timeout {
        /// Address that was being dialled.
        addr: String,
        /// Configured timeout in seconds.
        seconds: u64,
    },
    /// Connection refused, address resolution failure, or another I/O fault.
    #[error("failed to connect to {addr}: {source}")]
    Io {
        /// Address that was being dialled.
        addr: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },
}

/// Errors sending a message over an established connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SendError {
    /// The connection is closed or the receive task has terminated.
    #[error("not connected")]
    NotConnected,
    /// Writing the frame to the socket failed.
    #[error("failed to write frame: {0}")]
    Io(#[from] io::Error),
}
