//! MIME type constants used by the preview server.

pub const HTML: &str = "text/html; charset=utf-8";
pub const PLAIN: &str = "text/plain; charset=utf-8";
pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
