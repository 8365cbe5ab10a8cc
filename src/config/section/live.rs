//! `[live]` section configuration.
//!
//! ```toml
//! [live]
//! push = "reload"        # "reload" or "content"
//! heartbeat_ms = 5000    # Ping idle viewers to notice dead connections
//! queue = 16             # Pending messages kept per viewer
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the server pushes to viewers when the file changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// Send the bare `reload` token; viewers reload the page.
    #[default]
    Reload,
    /// Send the rendered document; viewers swap it in place.
    Content,
}

/// Live-reload channel settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub push: PushMode,

    /// Idle time before a viewer is pinged.
    pub heartbeat_ms: u64,

    /// Outgoing queue depth per viewer. Messages beyond it are dropped.
    pub queue: usize,
}

impl LiveConfig {
    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            push: PushMode::Reload,
            heartbeat_ms: 5000,
            queue: 16,
        }
    }
}
