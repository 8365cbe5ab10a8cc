//! Pure timing and event folding. No I/O, no callbacks.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::types::ChangeKind;
use crate::config::WatchConfig;

/// Idle sleep when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Check if path is an editor temp/backup file
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

pub(super) struct Debouncer {
    target: PathBuf,
    pending: Option<ChangeKind>,
    last_event: Option<Instant>,
    quiet: Duration,
    poll: Duration,
}

impl Debouncer {
    pub(super) fn new(target: PathBuf, config: &WatchConfig) -> Self {
        Self {
            target,
            pending: None,
            last_event: None,
            quiet: config.quiet(),
            poll: config.poll(),
        }
    }

    /// Record a raw notify event. Events for other paths are dropped.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        let Some(kind) = ChangeKind::from_event(&event.kind) else {
            return;
        };

        for path in &event.paths {
            if *path != self.target {
                if !is_temp_file(path) {
                    crate::debug!("watch"; "skip sibling {}: {}", kind.label(), path.display());
                }
                continue;
            }

            self.pending = match self.pending {
                Some(existing) => ChangeKind::merge(existing, kind),
                None => Some(kind),
            };
            // Any event on the target restarts the quiet period, even a discarded pair.
            self.last_event = Some(Instant::now());
            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
        }
    }

    /// Take the folded change once the quiet period has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<ChangeKind> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.quiet)
    }

    /// How long the event loop may sleep before sampling again.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE;
        };

        self.quiet
            .saturating_sub(last_event.elapsed())
            .min(self.poll)
            .max(Duration::from_millis(1))
    }

    #[cfg(test)]
    pub(super) fn pending(&self) -> Option<ChangeKind> {
        self.pending
    }

    #[cfg(test)]
    pub(super) fn backdate(&mut self, by: Duration) {
        self.last_event = self.last_event.and_then(|t| t.checked_sub(by));
    }
}
