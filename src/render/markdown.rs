//! Markdown to HTML for the answer panel.

use pulldown_cmark::{Event, Options, Parser, html};

/// Converts accumulated answer markdown into panel HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn to_html(&self, markdown: &str) -> String;
}

/// CommonMark renderer with the usual extensions.
///
/// Raw HTML in the answer is rendered as text, never as markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkRenderer;

impl MarkdownRenderer for CmarkRenderer {
    fn to_html(&self, markdown: &str) -> String {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, opts).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_links_and_code() {
        let html = CmarkRenderer.to_html("See [join](https://docs.example.com/api/join.html) and `otp.run`.");
        assert!(html.contains(r#"<a href="https://docs.example.com/api/join.html">join</a>"#));
        assert!(html.contains("<code>otp.run</code>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = CmarkRenderer.to_html("before <script>alert(1)</script> after");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_partial_markdown_renders() {
        // Mid-stream text can stop anywhere, including inside a link.
        let html = CmarkRenderer.to_html("Use [the join");
        assert!(html.contains("Use [the join"));
    }
}
