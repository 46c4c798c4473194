//! Correlation of awaited requests with asynchronous replies.
//!
//! The receive task hands decoded messages to the caller over a bounded
//! channel; the [`Inbox`] on the caller side stashes messages that arrive
//! while a different type is awaited, preserving arrival order. A
//! [`wait_for`](Inbox::wait_for) call always returns the oldest unconsumed
//! message of the requested type, so correlation is FIFO per type.
//!
//! Waiting blocks on the channel under a deadline rather than poll-sleeping,
//! so discovery latency is bounded by delivery, not by a poll interval.

use std::collections::VecDeque;

use tokio::{
    sync::mpsc,
    time::{Duration, Instant},
};
use tracing::warn;

use crate::message::PanelMessage;

/// Capacity of the channel between the receive task and the inbox.
pub const CHANNEL_CAPACITY: usize = 64;

/// Maximum number of drained-but-unmatched messages retained. When the stash
/// is full the oldest entry is dropped and logged; sustained mismatch
/// otherwise grows memory without bound.
pub const STASH_CAPACITY: usize = 1024;

/// Consumer side of the received-message stream.
///
/// Holds the channel receiver plus an ordered stash of messages that were
/// drained while waiting for some other type. Exactly one inbox exists per
/// connection and it is owned by the caller; no locking is involved.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<PanelMessage>,
    stash: VecDeque<PanelMessage>,
}

impl Inbox {
    /// Create an inbox reading from `rx`.
    #[must_use]
    pub fn new(rx: mpsc::Receiver<PanelMessage>) -> Self {
        Self {
            rx,
            stash: VecDeque::new(),
        }
    }

    /// Create a bounded channel pair wired for a receive task and an inbox.
    #[must_use]
    pub fn channel() -> (mpsc::Sender<PanelMessage>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (tx, Self::new(rx))
    }

    /// Wait up to `timeout` for the oldest message of type `kind`.
    ///
    /// Messages of other types that arrive in the meantime are stashed in
    /// arrival order for later calls. Returns `None` once the deadline
    /// elapses with no match; an expired wait is a legitimate empty result,
    /// not an error. If the receive task has terminated, the call still waits
    /// out the deadline so that connection loss surfaces as a timeout rather
    /// than an early return.
    pub async fn wait_for(&mut self, kind: &str, timeout: Duration) -> Option<PanelMessage> {
        if let Some(message) = self.take_stashed(kind) {
            return Some(message);
        }

        let deadline = Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Err(_) => return None,
                Ok(None) => {
                    // Channel closed: receive task is gone. Sleep out the
                    // deadline so the caller observes a normal timeout.
                    tokio::time::sleep_until(deadline).await;
                    return None;
                }
                Ok(Some(message)) => {
                    if message.kind == kind {
                        return Some(message);
                    }
                    self.stash(message);
                }
            }
        }
    }

    /// Number of drained messages currently stashed.
    #[must_use]
    pub fn stashed(&self) -> usize {
        self.stash.len()
    }

    fn take_stashed(&mut self, kind: &str) -> Option<PanelMessage> {
        let pos = self.stash.iter().position(|m| m.kind == kind)?;
        self.stash.remove(pos)
    }

    fn stash(&mut self, message: PanelMessage) {
        if self.stash.len() >= STASH_CAPACITY {
            if let Some(dropped) = self.stash.pop_front() {
                warn!(kind = %dropped.kind, "inbox stash full; dropping oldest unmatched message");
            }
        }
        self.stash.push_back(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{CONFIG, INPUT, PanelMessage};

    fn msg(kind: &str) -> PanelMessage {
        PanelMessage::new(kind, serde_json::Map::new())
    }

    #[tokio::test]
    async fn returns_oldest_match_and_leaves_later_copies() {
        let (tx, mut inbox) = Inbox::channel();
        let mut first = msg(CONFIG);
        first.timestamp = "first".to_owned();
        let mut second = msg(CONFIG);
        second.timestamp = "second".to_owned();
        tx.send(first).await.expect("send");
        tx.send(msg(INPUT)).await.expect("send");
        tx.send(second).await.expect("send");

        let got = inbox
            .wait_for(CONFIG, Duration::from_secs(1))
            .await
            .expect("match");
        assert_eq!(got.timestamp, "first");

        let got = inbox
            .wait_for(CONFIG, Duration::from_secs(1))
            .await
            .expect("second match");
        assert_eq!(got.timestamp, "second");

        // The intervening input message is still queued.
        assert!(
            inbox
                .wait_for(INPUT, Duration::from_millis(10))
                .await
                .is_some()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn expires_at_the_deadline_with_no_match() {
        let (_tx, mut inbox) = Inbox::channel();
        let start = Instant::now();
        let got = inbox.wait_for(CONFIG, Duration::from_secs(5)).await;
        assert!(got.is_none());
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_still_waits_out_the_deadline() {
        let (tx, mut inbox) = Inbox::channel();
        drop(tx);
        let start = Instant::now();
        let got = inbox.wait_for(CONFIG, Duration::from_secs(3)).await;
        assert!(got.is_none());
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn stash_overflow_drops_the_oldest_entry() {
        let (tx, mut inbox) = Inbox::channel();
        for i in 0..STASH_CAPACITY + 1 {
            let mut m = msg(INPUT);
            m.timestamp = i.to_string();
            tx.send(m).await.expect("send");
            // Drain into the stash by waiting for a type that never arrives.
            if (i + 1) % (CHANNEL_CAPACITY / 2) == 0 || i == STASH_CAPACITY {
                let _ = inbox.wait_for(CONFIG, Duration::from_millis(1)).await;
            }
        }
        assert_eq!(inbox.stashed(), STASH_CAPACITY);
        let oldest = inbox
            .wait_for(INPUT, Duration::from_millis(10))
            .await
            .expect("stash entry");
        assert_eq!(oldest.timestamp, "1", "entry 0 should have been dropped");
    }
}
