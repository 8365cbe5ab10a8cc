//! Viewer channels: the hub-side handle for one connected viewer.
//!
//! A [`ViewerChannel`] is the sending half of a bounded queue. The receiving
//! half belongs to the viewer's connection pump, so a slow socket never
//! blocks whoever is broadcasting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use super::message::ReloadMessage;
use crate::error::PreviewError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque viewer identifier, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(u64);

impl ViewerId {
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Connection lifecycle. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Connecting,
    Open,
    Closed,
}

impl ViewerState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Result of a successful hand-off to a viewer's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Queued,
    /// Queue full; the viewer is too slow and misses this message.
    Dropped,
}

/// Hub-side handle for one viewer.
#[derive(Debug)]
pub struct ViewerChannel {
    id: ViewerId,
    tx: Sender<ReloadMessage>,
}

impl ViewerChannel {
    /// Create a channel with a fresh id and a queue holding `capacity` messages.
    pub fn new(capacity: usize) -> (Self, Receiver<ReloadMessage>) {
        Self::with_id(ViewerId::next(), capacity)
    }

    pub fn with_id(id: ViewerId, capacity: usize) -> (Self, Receiver<ReloadMessage>) {
        let (tx, rx) = channel::bounded(capacity.max(1));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ViewerId {
        self.id
    }

    /// Queue a message without blocking.
    ///
    /// Fails only when the receiving pump is gone, i.e. the viewer is closed.
    pub fn send(&self, msg: ReloadMessage) -> Result<SendOutcome, PreviewError> {
        match self.tx.try_send(msg) {
            Ok(()) => Ok(SendOutcome::Queued),
            Err(TrySendError::Full(_)) => Ok(SendOutcome::Dropped),
            Err(TrySendError::Disconnected(_)) => Err(PreviewError::ChannelSend(self.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique() {
        let a = ViewerId::next();
        let b = ViewerId::next();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with('#'));
    }

    #[test]
    fn test_send_queued_then_dropped_when_full() {
        let (channel, rx) = ViewerChannel::new(1);
        assert_eq!(channel.send(ReloadMessage::Reload).unwrap(), SendOutcome::Queued);
        assert_eq!(channel.send(ReloadMessage::Reload).unwrap(), SendOutcome::Dropped);
        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (channel, rx) = ViewerChannel::new(4);
        drop(rx);
        let err = channel.send(ReloadMessage::Reload).unwrap_err();
        assert!(matches!(err, PreviewError::ChannelSend(id) if id == channel.id()));
    }
}
