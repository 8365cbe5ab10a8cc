//! Viewer window shell.
//!
//! The server only needs something that can show a URL. The default shell
//! hands it to the system browser; a native window would implement the same
//! trait.

use anyhow::{Context, Result};

pub trait WindowShell {
    /// Show `url`. `title` is a hint for shells that own their window chrome.
    fn open(&self, url: &str, title: &str) -> Result<()>;
}

/// Opens the preview in the user's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserShell;

impl WindowShell for BrowserShell {
    fn open(&self, url: &str, title: &str) -> Result<()> {
        crate::debug!("serve"; "opening {} ({})", url, title);
        webbrowser::open(url).with_context(|| format!("failed to open {url} in a browser"))
    }
}
