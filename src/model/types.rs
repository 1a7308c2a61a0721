//! Query and ranked-result entities.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::error::Result;

/// The page a query is read from must be the site's search page.
const SEARCH_PAGE_MARKER: &str = "search.html";

/// Search query parameter on the search page URL.
const QUERY_PARAM: &str = "q";

/// A search query read from the page URL. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Read the `q` parameter of a search-results page URL.
    ///
    /// Returns `Ok(None)` for pages that are not the search page, or search
    /// pages without a query. The value is percent-decoded.
    pub fn from_page_url(page_url: &str) -> Result<Option<Self>> {
        let url = Url::parse(page_url)?;
        if !url.path().contains(SEARCH_PAGE_MARKER) {
            return Ok(None);
        }
        Ok(url
            .query_pairs()
            .find(|(key, _)| key == QUERY_PARAM)
            .map(|(_, value)| Self(value.into_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ranked hit from the vector-search endpoint.
///
/// On the wire this is a positional array
/// `[path, title, anchor, short_description, score]`; `anchor` and
/// `short_description` may be `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RecordTuple")]
pub struct ResultRecord {
    pub path: String,
    pub title: String,
    pub anchor: String,
    /// Empty when the backend has no description for the page.
    pub description: String,
    pub score: f64,
}

#[derive(Deserialize)]
struct RecordTuple(String, String, Option<String>, Option<String>, f64);

impl From<RecordTuple> for ResultRecord {
    fn from(RecordTuple(path, title, anchor, description, score): RecordTuple) -> Self {
        Self {
            path,
            title,
            anchor: anchor.unwrap_or_default(),
            description: description.unwrap_or_default(),
            score,
        }
    }
}

impl ResultRecord {
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}
