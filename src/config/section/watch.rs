//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! quiet_ms = 100   # Quiet period that ends a burst of writes
//! poll_ms = 50     # How often a pending burst is sampled
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File watcher debounce settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Milliseconds without raw events before a change is emitted.
    pub quiet_ms: u64,

    /// Sampling interval while a burst is pending.
    pub poll_ms: u64,
}

impl WatchConfig {
    pub fn quiet(&self) -> Duration {
        Duration::from_millis(self.quiet_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            quiet_ms: 100,
            poll_ms: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_watch_config() {
        let config = test_parse_config("[watch]\nquiet_ms = 250");
        assert_eq!(config.watch.quiet(), Duration::from_millis(250));
        assert_eq!(config.watch.poll(), Duration::from_millis(50));
    }
}
