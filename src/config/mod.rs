//! Preview configuration.
//!
//! Values come from three layers, later ones winning:
//! built-in defaults, an optional TOML file (`--config`), and CLI flags.
//!
//! # Sections
//!
//! | Section    | Purpose                                      |
//! |------------|----------------------------------------------|
//! | `[serve]`  | Interface, port, open-on-start               |
//! | `[watch]`  | Debounce quiet period and poll interval      |
//! | `[live]`   | Push mode, heartbeat, per-viewer queue depth |

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{LiveConfig, PushMode, ServeConfig, WatchConfig};

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{cli::Cli, log};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub serve: ServeConfig,
    pub watch: WatchConfig,
    pub live: LiveConfig,
}

impl PreviewConfig {
    /// Build the effective configuration for this run.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {} ignored: {}", path.display(), ignored.join(", "));
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// CLI flags override file values.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.serve.port = port;
        }
        if let Some(interface) = cli.interface {
            self.serve.interface = interface;
        }
        if let Some(push) = cli.push {
            self.live.push = push;
        }
        if cli.open {
            self.serve.open = true;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.watch.quiet_ms == 0 {
            return Err(ConfigError::Validation("watch.quiet_ms must be positive".into()));
        }
        if self.watch.poll_ms == 0 {
            return Err(ConfigError::Validation("watch.poll_ms must be positive".into()));
        }
        if self.live.queue == 0 {
            return Err(ConfigError::Validation("live.queue must be at least 1".into()));
        }
        if self.live.heartbeat_ms < 100 {
            return Err(ConfigError::Validation(
                "live.heartbeat_ms must be at least 100".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_parse_config(content: &str) -> PreviewConfig {
    PreviewConfig::parse_with_ignored(content).unwrap().0
}
