//! What happens when a documentation page loads.
//!
//! Two independent flows run side by side on the same task:
//!
//! 1. the backend probe, which may swap the search strategy; on the search
//!    page the query is then run through whichever strategy is current;
//! 2. on the search page only, the AI answer stream for the page's query.
//!
//! A stalled stream never holds up the search results, and vice versa.
//! The probe runs at most once per [`SearchPage`]; its outcome holds for
//! every later search on the same page.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::assistant::StreamAnswerController;
use crate::backend::{Backend, SearchBackendSelector, SearchBinding, SearchStrategy, VectorSearch};
use crate::config::AssistConfig;
use crate::error::Result;
use crate::http::ApiClient;
use crate::index::DocumentIndex;
use crate::model::Query;
use crate::render::{
    AnswerRenderer, AnswerTarget, CmarkRenderer, LinkRewriter, MarkdownRenderer, ResultsTarget,
};
use crate::results::ResultListSequencer;

/// Outcome of one page load.
pub struct PageSession<T: AnswerTarget> {
    pub backend: Backend,
    pub query: Option<Query>,
    /// Present on the search page; `Closed` by the time the session returns.
    pub answer: Option<StreamAnswerController<T>>,
}

pub struct SearchPage {
    client: ApiClient,
    config: Arc<AssistConfig>,
    index: Arc<DocumentIndex>,
    markdown: Arc<dyn MarkdownRenderer>,
    binding: Arc<SearchBinding>,
    vector: Arc<dyn SearchStrategy>,
    /// Outcome of the one `/api_check` probe; holds until the page is dropped.
    probed: OnceCell<Backend>,
}

impl SearchPage {
    /// Wire the components for one page. `default_search` is the host's
    /// keyword search.
    pub fn new(
        client: ApiClient,
        config: Arc<AssistConfig>,
        index: Arc<DocumentIndex>,
        default_search: Arc<dyn SearchStrategy>,
    ) -> Self {
        let sequencer = ResultListSequencer::from_config(client.clone(), &config);
        let vector: Arc<dyn SearchStrategy> =
            Arc::new(VectorSearch::new(client.clone(), sequencer));
        Self {
            client,
            config,
            index,
            markdown: Arc::new(CmarkRenderer),
            binding: Arc::new(SearchBinding::new(default_search)),
            vector,
            probed: OnceCell::new(),
        }
    }

    pub fn with_markdown(mut self, markdown: Arc<dyn MarkdownRenderer>) -> Self {
        self.markdown = markdown;
        self
    }

    /// The page's search binding, for searches issued after load.
    pub fn binding(&self) -> Arc<SearchBinding> {
        Arc::clone(&self.binding)
    }

    pub fn selector(&self) -> SearchBackendSelector {
        SearchBackendSelector::new(self.client.clone())
    }

    pub fn answer_controller<T: AnswerTarget>(&self, panel: T) -> StreamAnswerController<T> {
        StreamAnswerController::new(
            self.client.clone(),
            AnswerRenderer::new(panel),
            Arc::clone(&self.markdown),
            LinkRewriter::new(self.config.docs_base_url.clone(), Arc::clone(&self.index)),
        )
    }

    /// Probe the backend on first use; later calls return the same outcome
    /// without another request.
    pub async fn backend(&self) -> Backend {
        *self
            .probed
            .get_or_init(|| async {
                self.selector()
                    .probe_and_install(&self.binding, Arc::clone(&self.vector))
                    .await
            })
            .await
    }

    /// Run `query` through whichever strategy the page's probe selected.
    pub async fn search(&self, query: &Query, results: &mut dyn ResultsTarget) -> Result<Backend> {
        let backend = self.backend().await;
        self.binding.query(query, results).await?;
        Ok(backend)
    }

    /// Run the page-load flows for `page_url`.
    pub async fn load<T: AnswerTarget>(
        &self,
        page_url: &str,
        answer_panel: T,
        results: &mut dyn ResultsTarget,
    ) -> Result<PageSession<T>> {
        let query = Query::from_page_url(page_url)?;
        debug!(page_url, query = ?query.as_ref().map(Query::as_str), "page load");

        let Some(query) = query else {
            let backend = self.backend().await;
            return Ok(PageSession {
                backend,
                query: None,
                answer: None,
            });
        };

        let mut controller = self.answer_controller(answer_panel);
        let (searched, streamed) =
            tokio::join!(self.search(&query, results), controller.start(&query));
        let backend = searched?;
        streamed?;

        Ok(PageSession {
            backend,
            query: Some(query),
            answer: Some(controller),
        })
    }
}
