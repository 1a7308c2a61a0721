//! Read-only path-to-title lookup over the documentation site's search index.
//!
//! The index is two parallel arrays, `docnames` and `titles`, exactly as the
//! site generator publishes them in `searchindex.js`. Nothing in this crate
//! mutates it after construction; components share it through an `Arc`.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{AssistError, Result};
use crate::http::ApiClient;

/// Name of the search index script published next to the pages.
pub const SEARCH_INDEX_FILE: &str = "searchindex.js";

const SET_INDEX_PREFIX: &str = "Search.setIndex(";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentIndex {
    docnames: Vec<String>,
    titles: Vec<String>,
}

impl DocumentIndex {
    pub fn new(docnames: Vec<String>, titles: Vec<String>) -> Result<Self> {
        let index = Self { docnames, titles };
        index.check()?;
        Ok(index)
    }

    /// Parse a JSON object carrying `docnames` and `titles` (other keys are
    /// ignored).
    pub fn from_json(raw: &str) -> Result<Self> {
        let index: Self = serde_json::from_str(raw)
            .map_err(|e| AssistError::Index(format!("invalid index JSON: {e}")))?;
        index.check()?;
        Ok(index)
    }

    /// Parse the body of a `searchindex.js` file: `Search.setIndex({...})`.
    pub fn from_searchindex_js(raw: &str) -> Result<Self> {
        let body = raw.trim().trim_end_matches(';').trim_end();
        let json = body
            .strip_prefix(SET_INDEX_PREFIX)
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| {
                AssistError::Index(format!("expected a {SET_INDEX_PREFIX}...) call"))
            })?;
        Self::from_json(json)
    }

    /// Download and parse `searchindex.js` from `url_root`.
    pub async fn fetch(client: &ApiClient, url_root: &Url) -> Result<Self> {
        let url = url_root.join(SEARCH_INDEX_FILE)?;
        let body = client.get_text(url.clone()).await?;
        let index = Self::from_searchindex_js(&body)?;
        debug!(url = %url, documents = index.len(), "loaded search index");
        Ok(index)
    }

    /// Position of the first docname equal to `path`.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.docnames.iter().position(|name| name == path)
    }

    /// Display title for an exact docname match.
    pub fn title_for(&self, path: &str) -> Option<&str> {
        self.position(path)
            .and_then(|idx| self.titles.get(idx))
            .map(String::as_str)
    }

    /// `(docname, title)` pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.docnames
            .iter()
            .zip(&self.titles)
            .map(|(name, title)| (name.as_str(), title.as_str()))
    }

    pub fn len(&self) -> usize {
        self.docnames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docnames.is_empty()
    }

    fn check(&self) -> Result<()> {
        if self.docnames.len() != self.titles.len() {
            return Err(AssistError::Index(format!(
                "{} docnames but {} titles",
                self.docnames.len(),
                self.titles.len()
            )));
        }
        Ok(())
    }
}
