//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Preview page and live-reload client script
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{PAGE_HTML, PageVars};
//!
//! let html = PAGE_HTML.render(&PageVars { title, body: fragment, ws_port: 4000 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};
    use crate::utils::html::escape;

    /// URL the page loads the live-reload client from.
    pub const LIVERELOAD_URL: &str = "/__mdview/livereload.js";

    /// Variables for page.html.
    pub struct PageVars {
        /// Plain-text title, escaped on render.
        pub title: String,
        /// Rendered HTML fragment.
        pub body: String,
        pub ws_port: u16,
    }

    impl TemplateVars for PageVars {
        fn apply(&self, content: &str) -> String {
            // Body last: document text must never be scanned for placeholders.
            content
                .replace("__MDVIEW_TITLE__", &escape(&self.title))
                .replace("__MDVIEW_WS_PORT__", &self.ws_port.to_string())
                .replace("__MDVIEW_SCRIPT_URL__", LIVERELOAD_URL)
                .replace("__MDVIEW_BODY__", &self.body)
        }
    }

    /// Variables for livereload.js.
    pub struct LiveReloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LiveReloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__MDVIEW_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Full preview page.
    pub const PAGE_HTML: Template<PageVars> =
        Template::new(include_str!("serve/page.html"));

    /// Live-reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LiveReloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_page_render() {
            let html = PAGE_HTML.render(&PageVars {
                title: "a<b>.md".into(),
                body: "<h1>Hello</h1>".into(),
                ws_port: 4321,
            });
            assert!(html.contains("<title>a&lt;b&gt;.md</title>"));
            assert!(html.contains("<h1>Hello</h1>"));
            assert!(html.contains(r#"content="4321""#));
            assert!(html.contains(LIVERELOAD_URL));
            assert!(html.contains("highlight"));
            assert!(html.contains("mermaid"));
            assert!(!html.contains("__MDVIEW_"));
        }

        #[test]
        fn test_body_placeholders_left_alone() {
            let html = PAGE_HTML.render(&PageVars {
                title: "t".into(),
                body: "<p>__MDVIEW_WS_PORT__</p>".into(),
                ws_port: 1,
            });
            assert!(html.contains("<p>__MDVIEW_WS_PORT__</p>"));
        }

        #[test]
        fn test_livereload_port() {
            let js = LIVERELOAD_JS.render(&LiveReloadVars { ws_port: 4321 });
            assert!(js.contains("var port = 4321;"));
        }
    }
}
