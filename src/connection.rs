//! TCP connection to the panel backend.
//!
//! A [`PanelConnection`] owns the write half of the socket and the caller-side
//! [`Inbox`]; the read half belongs exclusively to a background receive task
//! that decodes frames and forwards them over a bounded channel. Shutdown is
//! signalled with a [`CancellationToken`], which the receive task also
//! cancels on its way out so connection loss is observable from the caller
//! side.

use std::fmt;

use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    task::JoinHandle,
    time::Duration,
};
use tokio_util::{
    codec::{FramedRead, FramedWrite},
    sync::CancellationToken,
};

use crate::{
    codec::{DecodedLine, PanelCodec},
    correlation::Inbox,
    error::{ConnectError, SendError},
    message::PanelMessage,
};

/// Lifecycle state of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket is open.
    Disconnected,
    /// The socket is open and the receive task is running.
    Connected,
    /// Shutdown has been requested; cleanup is in progress.
    Closing,
}

/// A live connection to the backend.
pub struct PanelConnection {
    writer: FramedWrite<OwnedWriteHalf, PanelCodec>,
    inbox: Inbox,
    shutdown: CancellationToken,
    receiver: Option<JoinHandle<()>>,
    state: ConnectionState,
    peer: String,
}

impl fmt::Debug for PanelConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelConnection")
            .field("peer", &self.peer)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PanelConnection {
    /// Open a connection to `host:port` with a bounded connect timeout and
    /// start the receive task.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Timeout`] if the dial does not complete in
    /// time, or [`ConnectError::Io`] for refusal, resolution failure and
    /// other socket errors. On error no receive task is left running.
    pub async fn connect(
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let addr = format!("{host}:{port}");
        let stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ConnectError::Timeout {
                addr: addr.clone(),
                seconds: timeout.as_secs(),
            })?
            .map_err(|source| ConnectError::Io {
                addr: addr.clone(),
                source,
            })?;
        stream
            .set_nodelay(true)
            .map_err(|source| ConnectError::Io {
                addr: addr.clone(),
                source,
            })?;

        let (read_half, write_half) = stream.into_split();
        let (tx, inbox) = Inbox::channel();
        let shutdown = CancellationToken::new();
        let receiver = tokio::spawn(receive_loop(
            FramedRead::new(read_half, PanelCodec),
            tx,
            shutdown.clone(),
        ));
        info!("connected to server at {addr}");

        Ok(Self {
            writer: FramedWrite::new(write_half, PanelCodec),
            inbox,
            shutdown,
            receiver: Some(receiver),
            state: ConnectionState::Connected,
            peer: addr,
        })
    }

    /// Whether the connection is usable for sending.
    ///
    /// Becomes false once [`disconnect`](Self::disconnect) runs or the
    /// receive task has observed peer close or a hard I/O error.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && !self.shutdown.is_cancelled()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.state == ConnectionState::Connected && self.shutdown.is_cancelled() {
            ConnectionState::Closing
        } else {
            self.state
        }
    }

    /// Encode `message` and write the full frame to the socket.
    ///
    /// A failure is an explicit result, never a panic: the orchestration
    /// layer counts failed sends as test events and keeps going.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::NotConnected`] if the connection is closed, or
    /// [`SendError::Io`] if the write fails partway.
    pub async fn send(&mut self, message: &PanelMessage) -> Result<(), SendError> {
        if !self.is_connected() {
            return Err(SendError::NotConnected);
        }
        self.writer.send(message).await?;
        debug!("frame sent: kind={}", message.kind);
        Ok(())
    }

    /// Wait up to `timeout` for the oldest received message of type `kind`.
    ///
    /// Returns `None` when the deadline elapses with no match; see
    /// [`Inbox::wait_for`] for the correlation semantics.
    pub async fn wait_for(&mut self, kind: &str, timeout: Duration) -> Option<PanelMessage> {
        self.inbox.wait_for(kind, timeout).await
    }

    /// Close the socket and stop the receive task.
    ///
    /// Idempotent; safe to call on an already-closed connection.
    pub async fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        self.state = ConnectionState::Closing;
        self.shutdown.cancel();
        if let Err(e) = self.writer.get_mut().shutdown().await {
            debug!("error closing write half: {e}");
        }
        if let Some(handle) = self.receiver.take() {
            if let Err(e) = handle.await {
                warn!("receive task did not shut down cleanly: {e}");
            }
        }
        self.state = ConnectionState::Disconnected;
        info!("disconnected from {}", self.peer);
    }
}

/// Background task decoding inbound frames and forwarding them in arrival
/// order. Exits on cancellation, peer close, channel closure or a hard I/O
/// error, cancelling the shutdown token so the caller can observe the loss.
async fn receive_loop(
    mut frames: FramedRead<OwnedReadHalf, PanelCodec>,
    tx: mpsc::Sender<PanelMessage>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            frame = frames.next() => match frame {
                Some(Ok(DecodedLine::Frame(message))) => {
                    if tx.send(message).await.is_err() {
                        debug!("inbox dropped; stopping receive task");
                        break;
                    }
                }
                Some(Ok(DecodedLine::Malformed(raw))) => {
                    warn!("invalid JSON received: {raw}");
                }
                Some(Err(e)) => {
                    warn!("receive error, stopping receive task: {e}");
                    break;
                }
                None => {
                    info!("server closed the connection");
                    break;
                }
            },
        }
    }
    shutdown.cancel();
}
