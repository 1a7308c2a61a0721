//! Page summaries for results that come without a description.

use scraper::{ElementRef, Html, Selector};

use crate::render::html_escape;

/// Builds the summary markup shown under a result from the page's raw HTML.
pub trait Summarizer: Send + Sync {
    /// `None` when the page has nothing worth showing.
    fn summarize(&self, page_html: &str) -> Option<String>;
}

/// Opening excerpt of the page's main content block, as
/// `<p class="context">...</p>`.
///
/// Text comes from the element with `role="main"`; permalink markers
/// (`.headerlink`) are skipped.
#[derive(Debug, Clone)]
pub struct ExcerptSummarizer {
    max_chars: usize,
}

impl Default for ExcerptSummarizer {
    fn default() -> Self {
        Self { max_chars: 240 }
    }
}

impl ExcerptSummarizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Visible text of the main content block.
    pub fn main_text(page_html: &str) -> Option<String> {
        let document = Html::parse_document(page_html);
        let main_selector = Selector::parse(r#"[role="main"]"#).ok()?;
        let main = document.select(&main_selector).next()?;

        let mut text = String::new();
        for node in main.descendants() {
            let Some(fragment) = node.value().as_text() else {
                continue;
            };
            let in_headerlink = node.ancestors().filter_map(ElementRef::wrap).any(|el| {
                el.value().classes().any(|class| class == "headerlink")
            });
            if !in_headerlink {
                text.push_str(fragment);
            }
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }
}

impl Summarizer for ExcerptSummarizer {
    fn summarize(&self, page_html: &str) -> Option<String> {
        let text = Self::main_text(page_html)?;
        let mut excerpt: String = text.chars().take(self.max_chars).collect();
        let truncated = excerpt.len() < text.len();
        excerpt.truncate(excerpt.trim_end().len());
        if truncated {
            excerpt.push_str("...");
        }
        Some(format!(r#"<p class="context">{}</p>"#, html_escape(&excerpt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><head><title>Join</title></head><body>
        <nav>Navigation noise</nav>
        <div role="main">
          <h1>Join<a class="headerlink" href="#join">¶</a></h1>
          <p>Joins two   tick sources by time.</p>
        </div>
        </body></html>"##;

    #[test]
    fn test_main_text_skips_headerlinks_and_nav() {
        let text = ExcerptSummarizer::main_text(PAGE).unwrap();
        assert_eq!(text, "Join Joins two tick sources by time.");
    }

    #[test]
    fn test_short_page_is_not_truncated() {
        let summary = ExcerptSummarizer::default().summarize(PAGE).unwrap();
        assert_eq!(
            summary,
            r#"<p class="context">Join Joins two tick sources by time.</p>"#
        );
    }

    #[test]
    fn test_long_page_is_truncated_on_chars() {
        let body = "é".repeat(30);
        let page = format!(r#"<div role="main"><p>{body}</p></div>"#);
        let summary = ExcerptSummarizer::new(10).summarize(&page).unwrap();
        assert_eq!(
            summary,
            format!(r#"<p class="context">{}...</p>"#, "é".repeat(10))
        );
    }

    #[test]
    fn test_page_without_main_block() {
        assert_eq!(
            ExcerptSummarizer::default().summarize("<html><body><p>x</p></body></html>"),
            None
        );
    }

    #[test]
    fn test_summary_text_is_escaped() {
        let page = r#"<div role="main"><pre>a &lt; b</pre></div>"#;
        let summary = ExcerptSummarizer::default().summarize(page).unwrap();
        assert_eq!(summary, r#"<p class="context">a &lt; b</p>"#);
    }
}
