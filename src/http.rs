//! HTTP access to the documentation site.
//!
//! One pooled `reqwest::Client` is shared by the answer stream, the capability
//! probe, the vector search and the summary fetches. No request timeout is
//! set: the answer stream is long-lived, and a stalled backend is allowed to
//! simply never advance the panels.

use reqwest::{Client, Response};
use tracing::trace;
use url::Url;

use crate::error::{AssistError, Result};
use crate::model::Query;

/// Server-push answer stream.
pub const ASSISTANT_PATH: &str = "api/assistant";
/// Ranked vector-search results.
pub const RAGSEARCH_PATH: &str = "api/ragsearch";
/// Capability probe for the vector-search backend.
pub const API_CHECK_PATH: &str = "api_check";

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// `base` must end with `/` so that endpoint paths join under it.
    pub fn new(base: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("docsearch-assist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Endpoint URL under the base, with `query=<q>` when a query is given.
    pub fn endpoint(&self, path: &str, query: Option<&Query>) -> Result<Url> {
        let mut url = self.base.join(path)?;
        if let Some(query) = query {
            url.query_pairs_mut().append_pair("query", query.as_str());
        }
        Ok(url)
    }

    /// Send a GET and hand back the response whatever its status.
    pub async fn get(&self, url: Url) -> Result<Response> {
        trace!(url = %url, "GET");
        Ok(self.client.get(url).send().await?)
    }

    /// GET with a success status required.
    pub async fn get_ok(&self, url: Url) -> Result<Response> {
        let response = self.get(url.clone()).await?;
        if !response.status().is_success() {
            return Err(AssistError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    pub async fn get_text(&self, url: Url) -> Result<String> {
        Ok(self.get_ok(url).await?.text().await?)
    }
}
