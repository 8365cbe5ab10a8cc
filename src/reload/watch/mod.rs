//! Change Watcher
//!
//! Watches one file and turns bursts of raw filesystem events into single
//! "changed" signals.
//!
//! ```text
//! notify (OS thread) → unbounded channel → debounce task (tokio) → on_change()
//! ```
//!
//! The parent directory is watched non-recursively so the watch survives
//! editors that save by renaming a temp file over the target.

mod debouncer;
mod types;


pub use types::ChangeKind;

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use self::debouncer::Debouncer;
use crate::config::WatchConfig;
use crate::utils::path::normalize_path;

/// Handle to a running watcher. Dropping it stops the watch.
pub struct ChangeWatcher {
    target: PathBuf,
    watcher: Option<RecommendedWatcher>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    handle: Handle,
}

impl ChangeWatcher {
    /// Start watching `target`, calling `on_change` once per debounced burst.
    ///
    /// The OS watch is registered before this returns, so writes made right
    /// after `spawn` are not lost.
    pub fn spawn<F>(
        target: &Path,
        config: &WatchConfig,
        handle: &Handle,
        mut on_change: F,
    ) -> notify::Result<Self>
    where
        F: FnMut(ChangeKind) + Send + 'static,
    {
        let target = normalize_path(target);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Event>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    // Receiver gone means the task already stopped.
                    let _ = event_tx.send(event);
                }
                Err(e) => crate::log!("watch"; "notify error: {}", e),
            }
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let mut debouncer = Debouncer::new(target.clone(), config);

        let task = handle.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    event = event_rx.recv() => match event {
                        Some(event) => debouncer.add_event(&event),
                        None => break,
                    },
                    _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                        if let Some(kind) = debouncer.take_if_ready() {
                            crate::debug!("watch"; "burst settled: {}", kind.label());
                            on_change(kind);
                        }
                    }
                }
            }
            crate::debug!("watch"; "debounce task stopped");
        });

        crate::debug!("watch"; "watching {}", target.display());

        Ok(Self {
            target,
            watcher: Some(watcher),
            shutdown: Some(shutdown_tx),
            task: Some(task),
            handle: handle.clone(),
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Release the OS watch and wait for the debounce task to finish.
    ///
    /// Once this returns no callback runs again. Calling it twice is a no-op.
    pub fn stop(&mut self) {
        // Dropping the watcher unregisters the OS handles and closes the event sender.
        drop(self.watcher.take());

        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        let Some(task) = self.task.take() else {
            return;
        };
        if Handle::try_current().is_ok() {
            // Cannot block inside the runtime; the shutdown signal still wins the biased select.
            task.abort();
        } else if let Err(e) = self.handle.block_on(task)
            && e.is_panic()
        {
            crate::log!("watch"; "debounce task panicked");
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
