//! Reload coordinator: wires the watcher to the hub.
//!
//! On every settled burst it re-reads the file, builds the message for the
//! configured push mode and broadcasts it. A failed read is reported on the
//! status line and nothing is sent.

use std::sync::Arc;

use tokio::runtime::Handle;

use super::hub::{BroadcastReport, NotificationHub};
use super::message::ReloadMessage;
use super::watch::{ChangeKind, ChangeWatcher};
use crate::config::{PushMode, WatchConfig};
use crate::content::ContentStore;
use crate::error::PreviewError;
use crate::logger::{status_error, status_success};
use crate::render::{MarkdownOptions, render_fragment};

#[derive(Clone)]
pub struct Coordinator {
    store: Arc<ContentStore>,
    hub: Arc<NotificationHub>,
    push: PushMode,
}

impl Coordinator {
    pub fn new(store: Arc<ContentStore>, hub: Arc<NotificationHub>, push: PushMode) -> Self {
        Self { store, hub, push }
    }

    /// Start a watcher on the store's file that drives this coordinator.
    pub fn start(self, config: &WatchConfig, handle: &Handle) -> notify::Result<ChangeWatcher> {
        let target = self.store.path().to_path_buf();
        ChangeWatcher::spawn(&target, config, handle, move |kind| {
            // Errors are already on the status line.
            let _ = self.on_change(kind);
        })
    }

    /// Handle one debounced change.
    pub fn on_change(&self, kind: ChangeKind) -> Result<BroadcastReport, PreviewError> {
        let snapshot = match self.store.read() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                status_error(&format!("{}: {}", kind.label(), self.store.title()), &e.to_string());
                return Err(e);
            }
        };

        crate::debug!("watch"; "read v{} at {:?}", snapshot.version, snapshot.read_at);

        if self.hub.is_empty() {
            status_success(&format!("{}: {} (no viewers)", kind.label(), self.store.title()));
            return Ok(BroadcastReport::default());
        }

        let msg = match self.push {
            PushMode::Reload => ReloadMessage::Reload,
            PushMode::Content => ReloadMessage::ContentUpdate(render_fragment(
                &snapshot.content,
                MarkdownOptions::default(),
            )),
        };

        let report = self.hub.broadcast(&msg);
        status_success(&format!(
            "{}: {} ({} viewer{})",
            msg.label(),
            self.store.title(),
            report.delivered,
            if report.delivered == 1 { "" } else { "s" }
        ));
        Ok(report)
    }
}
