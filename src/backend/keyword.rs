//! Stand-in for the site's own keyword search, used by the CLI.
//!
//! Pages whose title contains every query word (case-insensitive) are listed
//! in index order. There is no scoring; a real deployment keeps whatever
//! keyword engine the site generator ships.

use std::sync::Arc;

use async_trait::async_trait;

use super::SearchStrategy;
use crate::config::DocumentationOptions;
use crate::error::Result;
use crate::index::DocumentIndex;
use crate::model::Query;
use crate::render::{RESULTS_TITLE, ResultsTarget};
use crate::results::item_open_html;

pub struct TitleMatchSearch {
    index: Arc<DocumentIndex>,
    options: DocumentationOptions,
}

impl TitleMatchSearch {
    pub fn new(index: Arc<DocumentIndex>, options: DocumentationOptions) -> Self {
        Self { index, options }
    }

    /// Docnames whose title matches every word of `query`.
    pub fn matches<'a>(&'a self, query: &Query) -> Vec<(&'a str, &'a str)> {
        let words: Vec<String> = query
            .as_str()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return Vec::new();
        }
        self.index
            .entries()
            .filter(|(_, title)| {
                let title = title.to_lowercase();
                words.iter().all(|word| title.contains(word.as_str()))
            })
            .collect()
    }
}

#[async_trait]
impl SearchStrategy for TitleMatchSearch {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn query(&self, query: &Query, target: &mut dyn ResultsTarget) -> Result<()> {
        for (docname, title) in self.matches(query) {
            let urls = self.options.item_urls(docname);
            let mut html = item_open_html(title, &urls.link_url);
            html.push_str("</li>");
            target.append_item(&html);
        }
        target.stop_pulse();
        target.set_title(RESULTS_TITLE);
        target.reveal_status();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ResultsPanel;

    fn search() -> TitleMatchSearch {
        let index = DocumentIndex::new(
            vec!["api/join".into(), "api/join_by_time".into(), "guide/index".into()],
            vec!["Join".into(), "Join by time".into(), "User guide".into()],
        )
        .unwrap();
        TitleMatchSearch::new(Arc::new(index), DocumentationOptions::default())
    }

    #[test]
    fn test_all_words_must_match() {
        let s = search();
        let hits: Vec<_> = s.matches(&Query::new("JOIN time")).into_iter().map(|(d, _)| d).collect();
        assert_eq!(hits, vec!["api/join_by_time"]);
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        assert!(search().matches(&Query::new("   ")).is_empty());
    }

    #[tokio::test]
    async fn test_query_renders_in_index_order_and_finalizes() {
        let s = search();
        let mut panel = ResultsPanel::new();
        s.query(&Query::new("join"), &mut panel).await.unwrap();
        let state = panel.snapshot();
        assert_eq!(
            state.items,
            vec![
                r#"<li><a href="api/join.html">Join</a></li>"#.to_string(),
                r#"<li><a href="api/join_by_time.html">Join by time</a></li>"#.to_string(),
            ]
        );
        assert_eq!(state.finalized, 1);
    }
}
