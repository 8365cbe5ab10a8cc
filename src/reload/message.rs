//! Live-reload wire protocol.
//!
//! Two server → client messages:
//!
//! - `reload` (bare text): reload the page
//! - `{"content": "<html>"}`: replace the document body in place
//!
//! The variants are only turned into text at the socket boundary.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Literal token for a full reload.
pub const RELOAD_TOKEN: &str = "reload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadMessage {
    /// Full page reload
    Reload,
    /// Rendered HTML fragment to swap in without reloading
    ContentUpdate(String),
}

#[derive(Serialize, Deserialize)]
struct ContentPayload<'a> {
    #[serde(borrow)]
    content: Cow<'a, str>,
}

impl ReloadMessage {
    /// Encode as the text frame sent to viewers.
    pub fn encode(&self) -> String {
        match self {
            Self::Reload => RELOAD_TOKEN.to_string(),
            Self::ContentUpdate(content) => serde_json::to_string(&ContentPayload {
                content: Cow::Borrowed(content),
            })
            .unwrap_or_else(|_| RELOAD_TOKEN.to_string()),
        }
    }

    /// Parse a text frame. Unknown frames yield `None`.
    #[cfg(test)]
    pub fn decode(text: &str) -> Option<Self> {
        if text == RELOAD_TOKEN {
            return Some(Self::Reload);
        }
        let payload: ContentPayload<'_> = serde_json::from_str(text).ok()?;
        Some(Self::ContentUpdate(payload.content.into_owned()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::ContentUpdate(_) => "content",
        }
    }
}
