//! Search backend selection.
//!
//! The page starts with the host's keyword search. At load time
//! [`SearchBackendSelector::probe_and_install`] asks `/api_check` whether the
//! vector-search service is up; if it is, the [`VectorSearch`] strategy is
//! installed into the page's [`SearchBinding`]. The binding accepts exactly
//! one override and keeps it until it is dropped, so every later search goes
//! through the vector backend. Callers always go through the binding and
//! never hold on to a particular strategy.

pub mod keyword;

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{AssistError, Result};
use crate::http::{API_CHECK_PATH, ApiClient, RAGSEARCH_PATH};
use crate::model::{Query, ResultRecord};
use crate::render::ResultsTarget;
use crate::results::ResultListSequencer;

pub use keyword::TitleMatchSearch;

/// A way of answering a search query into the results panel.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn query(&self, query: &Query, target: &mut dyn ResultsTarget) -> Result<()>;
}

/// Which backend ended up serving searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Keyword,
    Vector,
}

/// The page's current search strategy: the default until an override is
/// installed, the override afterwards.
pub struct SearchBinding {
    default: Arc<dyn SearchStrategy>,
    replacement: OnceCell<Arc<dyn SearchStrategy>>,
}

impl SearchBinding {
    pub fn new(default: Arc<dyn SearchStrategy>) -> Self {
        Self {
            default,
            replacement: OnceCell::new(),
        }
    }

    /// Install the override. Returns `false` if one is already installed.
    pub fn install(&self, strategy: Arc<dyn SearchStrategy>) -> bool {
        self.replacement.set(strategy).is_ok()
    }

    pub fn current(&self) -> Arc<dyn SearchStrategy> {
        self.replacement
            .get()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    pub fn backend(&self) -> Backend {
        if self.replacement.get().is_some() {
            Backend::Vector
        } else {
            Backend::Keyword
        }
    }

    /// Run `query` through the current strategy.
    pub async fn query(&self, query: &Query, target: &mut dyn ResultsTarget) -> Result<()> {
        let strategy = self.current();
        debug!(strategy = strategy.name(), query = %query, "search");
        strategy.query(query, target).await
    }
}

/// Ranked results from `/api/ragsearch`, rendered by the sequencer.
pub struct VectorSearch {
    client: ApiClient,
    sequencer: ResultListSequencer,
}

impl VectorSearch {
    pub fn new(client: ApiClient, sequencer: ResultListSequencer) -> Self {
        Self { client, sequencer }
    }

    /// Fetch the ranked records for `query`, best first.
    pub async fn fetch(&self, query: &Query) -> Result<Vec<ResultRecord>> {
        let url = self.client.endpoint(RAGSEARCH_PATH, Some(query))?;
        let body = self.client.get_text(url).await?;
        serde_json::from_str(&body).map_err(AssistError::Results)
    }
}

#[async_trait]
impl SearchStrategy for VectorSearch {
    fn name(&self) -> &'static str {
        "vector"
    }

    /// Failures to fetch or decode results leave the panel as it is.
    async fn query(&self, query: &Query, target: &mut dyn ResultsTarget) -> Result<()> {
        let results = match self.fetch(query).await {
            Ok(results) => results,
            Err(AssistError::Results(e)) => {
                warn!(error = %e, "vector search returned malformed results");
                return Ok(());
            }
            Err(e) => {
                debug!(error = %e, "vector search request failed");
                return Ok(());
            }
        };
        debug!(query = %query, results = results.len(), "vector search results");
        self.sequencer.render(results, target).await;
        Ok(())
    }
}

/// One-shot capability probe for the vector backend.
pub struct SearchBackendSelector {
    client: ApiClient,
}

impl SearchBackendSelector {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// True when `/api_check` answers with a success status.
    pub async fn probe(&self) -> bool {
        let url = match self.client.endpoint(API_CHECK_PATH, None) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "api check url invalid");
                return false;
            }
        };
        match self.client.get(url).await {
            Ok(response) if response.status().is_success() => {
                info!("API check passed, using vector search");
                true
            }
            Ok(response) => {
                info!(status = %response.status(), "API check failed, using default search");
                false
            }
            Err(e) => {
                info!(error = %e, "API check failed with error, using default search");
                false
            }
        }
    }

    /// Probe and, on success, install `vector` into `binding`.
    pub async fn probe_and_install(
        &self,
        binding: &SearchBinding,
        vector: Arc<dyn SearchStrategy>,
    ) -> Backend {
        if self.probe().await && !binding.install(vector) {
            debug!("search override already installed");
        }
        binding.backend()
    }
}
