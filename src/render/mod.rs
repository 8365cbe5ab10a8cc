//! Markdown rendering.
//!
//! Parsing is delegated to pulldown-cmark; this module only picks the
//! extensions and wraps the fragment in the preview page.

use pulldown_cmark::{Options, Parser, html};

use crate::embed::serve::{PAGE_HTML, PageVars};

/// Options for markdown conversion
#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// `# Heading {#custom-id}`
    pub heading_attributes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    fn to_pulldown_options(self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Render markdown text into an HTML fragment.
pub fn render_fragment(markdown: &str, options: MarkdownOptions) -> String {
    let parser = Parser::new_ext(markdown, options.to_pulldown_options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render markdown text into the full preview page.
pub fn render_page(markdown: &str, title: &str, ws_port: u16) -> String {
    let body = render_fragment(markdown, MarkdownOptions::all());
    PAGE_HTML.render(&PageVars {
        title: title.to_string(),
        body,
        ws_port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_bold() {
        let html = render_fragment("# Hello World\n\nThis is **bold** text.", MarkdownOptions::all());
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_extensions() {
        let md = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done";
        let html = render_fragment(md, MarkdownOptions::all());
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_extensions_disabled() {
        let opts = MarkdownOptions {
            strikethrough: false,
            ..MarkdownOptions::all()
        };
        let html = render_fragment("~~kept~~", opts);
        assert!(!html.contains("<del>"));
    }

    #[test]
    fn test_code_block_language_class() {
        let html = render_fragment("```mermaid\ngraph TD;\n```", MarkdownOptions::all());
        assert!(html.contains(r#"class="language-mermaid""#));
    }

    #[test]
    fn test_render_page() {
        let page = render_page("# Hello", "doc.md", 8080);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<h1>Hello</h1>"));
        assert!(page.contains("<title>doc.md</title>"));
    }
}
