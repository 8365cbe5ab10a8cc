//! Notification Hub
//!
//! Registry of open viewer channels with fan-out broadcast. A failed send
//! removes that viewer on the spot and never stops delivery to the rest.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::channel::{SendOutcome, ViewerChannel, ViewerId};
use super::message::ReloadMessage;

/// Per-broadcast delivery counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Channels a send was attempted on.
    pub attempted: usize,
    pub delivered: usize,
    /// Queue was full; the viewer stays registered.
    pub dropped: usize,
    /// Viewer was gone and has been unregistered.
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct NotificationHub {
    channels: Mutex<FxHashMap<ViewerId, ViewerChannel>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. Returns `false` if the id is already registered.
    pub fn register(&self, channel: ViewerChannel) -> bool {
        let mut channels = self.channels.lock();
        let id = channel.id();
        if channels.contains_key(&id) {
            return false;
        }
        channels.insert(id, channel);
        crate::debug!("live"; "viewer {} registered (total: {})", id, channels.len());
        true
    }

    /// Remove a channel. Absent ids are fine; returns whether one was removed.
    pub fn unregister(&self, id: ViewerId) -> bool {
        let mut channels = self.channels.lock();
        let removed = channels.remove(&id).is_some();
        if removed {
            crate::debug!("live"; "viewer {} unregistered (total: {})", id, channels.len());
        }
        removed
    }

    /// Send `msg` to every registered channel.
    pub fn broadcast(&self, msg: &ReloadMessage) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut channels = self.channels.lock();

        channels.retain(|id, channel| {
            report.attempted += 1;
            match channel.send(msg.clone()) {
                Ok(SendOutcome::Queued) => {
                    report.delivered += 1;
                    true
                }
                Ok(SendOutcome::Dropped) => {
                    crate::debug!("live"; "viewer {} is behind, {} dropped", id, msg.label());
                    report.dropped += 1;
                    true
                }
                Err(e) => {
                    crate::debug!("live"; "{}", e);
                    report.failed += 1;
                    false
                }
            }
        });

        crate::debug!(
            "live";
            "{} sent to {}/{} viewers",
            msg.label(),
            report.delivered,
            report.attempted
        );
        report
    }

    /// Drop every channel, which ends each viewer's pump. Returns how many were open.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = self.channels.lock().drain().collect();
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.channels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.lock().is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: ViewerId) -> bool {
        self.channels.lock().contains_key(&id)
    }
}
