//! Streamed AI answer.
//!
//! [`StreamAnswerController`] opens one server-sent-event stream for a query,
//! appends each JSON-encoded fragment to its accumulator and re-renders the
//! answer panel after every append, unless the accumulator is still
//! indistinguishable from the "no answer" sentinel.
//!
//! ```text
//! Idle --start--> Streaming --error / end of body--> Closed
//! ```
//!
//! Transport problems close the stream silently and leave whatever was last
//! rendered. A fragment that is not a JSON string is a protocol violation and
//! is returned to the caller as [`AssistError::Decode`].

pub mod sse;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{AssistError, Result};
use crate::http::{ASSISTANT_PATH, ApiClient};
use crate::model::Query;
use crate::render::{AnswerRenderer, AnswerTarget, LinkRewriter, MarkdownRenderer};

pub use sse::{SseDecoder, SseEvent};

/// Phrase the assistant uses when it has no answer.
pub const SUPPRESSION_SENTINEL: &str = "Hmm, I'm not sure.";

/// True while `accumulated` could still be (or already is) the sentinel
/// answer: either string is a prefix of the other.
pub fn is_suppressed(accumulated: &str) -> bool {
    accumulated.starts_with(SUPPRESSION_SENTINEL) || SUPPRESSION_SENTINEL.starts_with(accumulated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming,
    Closed,
}

/// What happened to the panel after a fragment was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOutcome {
    Rendered,
    Suppressed,
}

pub struct StreamAnswerController<T: AnswerTarget> {
    client: ApiClient,
    renderer: AnswerRenderer<T>,
    markdown: Arc<dyn MarkdownRenderer>,
    links: LinkRewriter,
    accumulated: String,
    state: StreamState,
    fragments: usize,
}

impl<T: AnswerTarget> StreamAnswerController<T> {
    pub fn new(
        client: ApiClient,
        renderer: AnswerRenderer<T>,
        markdown: Arc<dyn MarkdownRenderer>,
        links: LinkRewriter,
    ) -> Self {
        Self {
            client,
            renderer,
            markdown,
            links,
            accumulated: String::new(),
            state: StreamState::Idle,
            fragments: 0,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Everything received so far, in arrival order.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn fragments(&self) -> usize {
        self.fragments
    }

    pub fn renderer(&self) -> &AnswerRenderer<T> {
        &self.renderer
    }

    pub fn into_renderer(self) -> AnswerRenderer<T> {
        self.renderer
    }

    /// Open the answer stream for `query` and process it to the end.
    ///
    /// Returns `Ok` when the stream ends or fails at the transport level;
    /// the controller is `Closed` afterwards in every case.
    pub async fn start(&mut self, query: &Query) -> Result<()> {
        if self.state != StreamState::Idle {
            return Err(AssistError::AlreadyStarted(self.state));
        }
        self.state = StreamState::Streaming;
        let outcome = self.pump(query).await;
        self.state = StreamState::Closed;
        debug!(
            fragments = self.fragments,
            chars = self.accumulated.len(),
            shown = self.renderer.is_shown(),
            "answer stream closed"
        );
        outcome
    }

    async fn pump(&mut self, query: &Query) -> Result<()> {
        let url = self.client.endpoint(ASSISTANT_PATH, Some(query))?;
        let mut response = match self.client.get(url).await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "answer stream failed to open");
                return Ok(());
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "answer stream rejected");
            return Ok(());
        }

        let mut decoder = SseDecoder::new();
        loop {
            let chunk = match response.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => return Ok(()),
                Err(e) => {
                    debug!(error = %e, "answer stream error");
                    return Ok(());
                }
            };
            for event in decoder.feed(&chunk) {
                if event.is_message() {
                    self.on_fragment(&event.data)?;
                }
            }
        }
    }

    /// Decode one fragment, append it and re-render if not suppressed.
    fn on_fragment(&mut self, payload: &str) -> Result<FragmentOutcome> {
        let fragment: String = serde_json::from_str(payload).map_err(|source| {
            warn!(payload, "answer fragment is not a JSON string");
            AssistError::Decode {
                payload: payload.to_string(),
                source,
            }
        })?;
        self.accumulated.push_str(&fragment);
        self.fragments += 1;

        if is_suppressed(&self.accumulated) {
            debug!(fragment = self.fragments, "answer suppressed");
            return Ok(FragmentOutcome::Suppressed);
        }

        let html = self.markdown.to_html(&self.accumulated);
        self.renderer.render(&html);
        self.links.rewrite(self.renderer.target_mut());
        Ok(FragmentOutcome::Rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocumentIndex;
    use crate::render::{AnswerPanel, CmarkRenderer};
    use proptest::prelude::*;
    use url::Url;

    fn controller(panel: &AnswerPanel) -> StreamAnswerController<AnswerPanel> {
        let index = DocumentIndex::new(vec!["api/join".into()], vec!["otp.join".into()]).unwrap();
        StreamAnswerController::new(
            ApiClient::new(Url::parse("http://127.0.0.1:9/").unwrap()).unwrap(),
            AnswerRenderer::new(panel.clone()),
            Arc::new(CmarkRenderer),
            LinkRewriter::new("https://docs.example.com/", Arc::new(index)),
        )
    }

    fn encode(fragment: &str) -> String {
        serde_json::to_string(fragment).unwrap()
    }

    #[test]
    fn test_sentinel_predicate() {
        assert!(is_suppressed(""));
        assert!(is_suppressed("Hmm"));
        assert!(is_suppressed("Hmm, I'm not sure."));
        assert!(is_suppressed("Hmm, I'm not sure. I could not find"));
        assert!(!is_suppressed("Something else"));
        assert!(!is_suppressed("Hmm, I think"));
        assert!(!is_suppressed("hmm"));
    }

    #[test]
    fn test_prefix_of_sentinel_is_not_rendered() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        assert_eq!(c.on_fragment(&encode("Hmm")).unwrap(), FragmentOutcome::Suppressed);
        assert_eq!(c.on_fragment(&encode(", I'm")).unwrap(), FragmentOutcome::Suppressed);
        assert!(!panel.is_visible());
        assert_eq!(panel.snapshot().writes, 0);
    }

    #[test]
    fn test_sentinel_then_extension_stays_suppressed() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        c.on_fragment(&encode("Hmm, I'm not sure.")).unwrap();
        let outcome = c.on_fragment(&encode(" Actually yes")).unwrap();
        assert_eq!(outcome, FragmentOutcome::Suppressed);
        assert_eq!(c.accumulated(), "Hmm, I'm not sure. Actually yes");
        assert!(!panel.is_visible());
    }

    #[test]
    fn test_diverging_answer_renders_immediately() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        assert_eq!(
            c.on_fragment(&encode("Something else")).unwrap(),
            FragmentOutcome::Rendered
        );
        let state = panel.snapshot();
        assert!(state.visible);
        assert_eq!(state.content, "<p>Something else</p>\n");
    }

    #[test]
    fn test_hmm_that_diverges_renders() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        assert_eq!(c.on_fragment(&encode("Hmm")).unwrap(), FragmentOutcome::Suppressed);
        assert_eq!(
            c.on_fragment(&encode(", good question")).unwrap(),
            FragmentOutcome::Rendered
        );
        assert!(panel.snapshot().content.contains("Hmm, good question"));
    }

    #[test]
    fn test_render_rewrites_internal_links() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        c.on_fragment(&encode("See [here](https://docs.example.com/api/join.html)."))
            .unwrap();
        assert!(panel.snapshot().content.contains("[<b>otp.join</b>]"));
    }

    #[test]
    fn test_malformed_fragment_is_fatal_and_not_appended() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        c.on_fragment(&encode("Partial ")).unwrap();
        let err = c.on_fragment("not json").unwrap_err();
        assert!(matches!(err, AssistError::Decode { .. }));
        assert_eq!(c.accumulated(), "Partial ");
        // A JSON value that is not a string is just as malformed.
        assert!(c.on_fragment("42").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_closes_silently() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        assert_eq!(c.state(), StreamState::Idle);
        c.start(&Query::new("join")).await.unwrap();
        assert_eq!(c.state(), StreamState::Closed);
        assert!(!panel.is_visible());
    }

    #[tokio::test]
    async fn test_start_is_one_shot() {
        let panel = AnswerPanel::new();
        let mut c = controller(&panel);
        c.start(&Query::new("join")).await.unwrap();
        let err = c.start(&Query::new("join")).await.unwrap_err();
        assert!(matches!(err, AssistError::AlreadyStarted(StreamState::Closed)));
    }

    proptest! {
        #[test]
        fn prop_accumulator_is_ordered_concatenation(fragments in proptest::collection::vec(".{0,12}", 0..20)) {
            let panel = AnswerPanel::new();
            let mut c = controller(&panel);
            for fragment in &fragments {
                c.on_fragment(&encode(fragment)).unwrap();
            }
            prop_assert_eq!(c.accumulated(), fragments.concat());
            prop_assert_eq!(c.fragments(), fragments.len());
        }
    }
}
