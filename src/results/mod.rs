//! Progressive rendering of ranked search results.
//!
//! [`ResultListSequencer::render`] takes ownership of the result array and
//! pops one record per step, so items are appended in the **reverse** of the
//! order they arrived in: for `[A, B, C]` (A best) the list shows `C, B, A`.
//! This matches the deployed site and is kept deliberately; callers that want
//! best-first display must reverse the array themselves.
//!
//! Between steps the sequencer sleeps for `step_delay`, giving the rest of
//! the runtime a chance to run. Summary fetches are strictly sequential. Once
//! the queue is empty the results panel is finalized exactly once.

pub mod summary;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{AssistConfig, Builder, DocumentationOptions};
use crate::http::ApiClient;
use crate::model::ResultRecord;
use crate::render::{RESULTS_TITLE, ResultsTarget, html_escape};

pub use summary::{ExcerptSummarizer, Summarizer};

/// Where a result is fetched from (for its summary) and linked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUrls {
    pub request_url: String,
    pub link_url: String,
}

impl DocumentationOptions {
    pub fn item_urls(&self, path: &str) -> ItemUrls {
        match self.builder {
            Builder::Dirhtml => {
                let url = format!("{}{}", self.url_root, dirhtml_dirname(path));
                ItemUrls {
                    request_url: url.clone(),
                    link_url: url,
                }
            }
            Builder::Html => ItemUrls {
                request_url: format!("{}{}{}", self.url_root, path, self.file_suffix),
                link_url: format!("{}{}", path, self.link_suffix),
            },
        }
    }
}

/// Directory form of a page path: `docs/index` -> `docs/`, `index` -> ``,
/// `docs/join` -> `docs/join/`.
pub fn dirhtml_dirname(path: &str) -> String {
    let dirname = format!("{path}/");
    if dirname.ends_with("/index/") {
        dirname[..dirname.len() - "index/".len()].to_string()
    } else if dirname == "index/" {
        String::new()
    } else {
        dirname
    }
}

/// `<li>` markup for one result, before any summary is attached.
pub fn item_open_html(title: &str, link_url: &str) -> String {
    format!(
        r#"<li><a href="{}">{}</a>"#,
        html_escape(link_url),
        html_escape(title)
    )
}

pub struct ResultListSequencer {
    client: ApiClient,
    options: DocumentationOptions,
    summarizer: Arc<dyn Summarizer>,
    step_delay: Duration,
}

impl ResultListSequencer {
    pub fn new(
        client: ApiClient,
        options: DocumentationOptions,
        summarizer: Arc<dyn Summarizer>,
        step_delay: Duration,
    ) -> Self {
        Self {
            client,
            options,
            summarizer,
            step_delay,
        }
    }

    pub fn from_config(client: ApiClient, config: &AssistConfig) -> Self {
        Self::new(
            client,
            config.options.clone(),
            Arc::new(ExcerptSummarizer::default()),
            config.step_delay(),
        )
    }

    pub fn options(&self) -> &DocumentationOptions {
        &self.options
    }

    /// Render every record, last first, then finalize the panel.
    /// Returns the number of items appended.
    pub async fn render(
        &self,
        mut queue: Vec<ResultRecord>,
        target: &mut dyn ResultsTarget,
    ) -> usize {
        let mut rendered = 0;
        while let Some(item) = queue.pop() {
            let html = self.render_item(&item).await;
            target.append_item(&html);
            rendered += 1;
            debug!(path = %item.path, remaining = queue.len(), "result rendered");
            tokio::time::sleep(self.step_delay).await;
        }

        target.stop_pulse();
        target.set_title(RESULTS_TITLE);
        target.reveal_status();
        debug!(rendered, "result list complete");
        rendered
    }

    async fn render_item(&self, item: &ResultRecord) -> String {
        let urls = self.options.item_urls(&item.path);
        let mut html = item_open_html(&item.title, &urls.link_url);
        if item.has_description() {
            html.push_str(&format!("<span> ({})</span>", html_escape(&item.description)));
        } else if self.options.show_summary
            && let Some(summary) = self.fetch_summary(&urls.request_url).await
        {
            html.push_str(&summary);
        }
        html.push_str("</li>");
        html
    }

    /// Fetch the page and summarize it. Any failure just drops the summary.
    async fn fetch_summary(&self, request_url: &str) -> Option<String> {
        let url = match self.client.base().join(request_url) {
            Ok(url) => url,
            Err(e) => {
                debug!(request_url, error = %e, "summary url invalid");
                return None;
            }
        };
        let body = match self.client.get_text(url).await {
            Ok(body) => body,
            Err(e) => {
                debug!(request_url, error = %e, "summary fetch failed");
                return None;
            }
        };
        if body.is_empty() {
            return None;
        }
        self.summarizer.summarize(&body)
    }
}
