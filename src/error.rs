//! Preview error types.
//!
//! Startup errors (`Usage`, `FileNotFound`, `PortBind`, `Config`) end the
//! process with exit code 1. Everything else is scoped to one request or one
//! viewer and only gets logged.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::reload::channel::ViewerId;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("missing markdown file\n\n{0}")]
    Usage(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("cannot read `{}`", .0.display())]
    FileUnreadable(PathBuf, #[source] io::Error),

    #[error("failed to bind {addr}")]
    PortBind {
        addr: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("viewer {0} is closed")]
    ChannelSend(ViewerId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PreviewError {
    /// Classify an I/O error from reading `path`.
    pub fn from_read(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound(path),
            _ => Self::FileUnreadable(path, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_read_not_found() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        let e = PreviewError::from_read(PathBuf::from("/tmp/x.md"), err);
        assert!(matches!(e, PreviewError::FileNotFound(_)));
        assert!(e.to_string().contains("not found"));
    }

    #[test]
    fn test_from_read_permission() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        let e = PreviewError::from_read(PathBuf::from("/tmp/x.md"), err);
        assert!(matches!(e, PreviewError::FileUnreadable(..)));
        assert!(e.to_string().contains("cannot read"));
    }

    #[test]
    fn test_usage_message() {
        let e = PreviewError::Usage("Usage: mdview [FILE]".into());
        assert!(e.to_string().starts_with("missing markdown file"));
        assert!(e.to_string().ends_with("Usage: mdview [FILE]"));
        assert!(PreviewError::ChannelSend(ViewerId::next()).to_string().contains("closed"));
    }
}
