//! Panels the core writes into.
//!
//! The page itself is out of reach of this crate, so every mutation goes
//! through two narrow traits:
//!
//! - [`AnswerTarget`]: the AI answer panel (`set_content`, `show`)
//! - [`ResultsTarget`]: the search results list (`append_item` plus the
//!   end-of-search affordances)
//!
//! [`AnswerPanel`] and [`ResultsPanel`] are in-memory implementations. They
//! are cheap handles over shared state, so a caller can keep one clone to
//! inspect while another is owned by a controller.

pub mod answer;
pub mod links;
pub mod markdown;

use std::sync::Arc;

use parking_lot::Mutex;

pub use answer::AnswerRenderer;
pub use links::LinkRewriter;
pub use markdown::{CmarkRenderer, MarkdownRenderer};

/// Title shown once the result list is complete.
pub const RESULTS_TITLE: &str = "Search Results";

/// The answer panel.
pub trait AnswerTarget: Send {
    /// Replace the panel content.
    fn set_content(&mut self, html: &str);
    /// Current panel content.
    fn content(&self) -> String;
    /// Make the panel visible.
    fn show(&mut self);
}

/// The search results list.
pub trait ResultsTarget: Send {
    /// Append one rendered `<li>` item.
    fn append_item(&mut self, html: &str);
    /// Stop the "searching" indicator.
    fn stop_pulse(&mut self);
    fn set_title(&mut self, title: &str);
    /// Reveal the status line under the title.
    fn reveal_status(&mut self);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerPanelState {
    pub content: String,
    pub visible: bool,
    /// Number of `set_content` calls.
    pub writes: usize,
}

/// In-memory answer panel. Starts hidden and empty.
#[derive(Debug, Clone, Default)]
pub struct AnswerPanel {
    state: Arc<Mutex<AnswerPanelState>>,
}

impl AnswerPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AnswerPanelState {
        self.state.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }
}

impl AnswerTarget for AnswerPanel {
    fn set_content(&mut self, html: &str) {
        let mut state = self.state.lock();
        state.content = html.to_string();
        state.writes += 1;
    }

    fn content(&self) -> String {
        self.state.lock().content.clone()
    }

    fn show(&mut self) {
        self.state.lock().visible = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsPanelState {
    pub items: Vec<String>,
    pub pulsing: bool,
    pub title: String,
    pub status_visible: bool,
    /// How many times the end-of-search title was set.
    pub finalized: usize,
}

impl Default for ResultsPanelState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pulsing: true,
            title: "Searching".to_string(),
            status_visible: false,
            finalized: 0,
        }
    }
}

/// In-memory results list. Starts empty with the searching indicator on.
#[derive(Debug, Clone, Default)]
pub struct ResultsPanel {
    state: Arc<Mutex<ResultsPanelState>>,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ResultsPanelState {
        self.state.lock().clone()
    }

    pub fn items(&self) -> Vec<String> {
        self.state.lock().items.clone()
    }
}

impl ResultsTarget for ResultsPanel {
    fn append_item(&mut self, html: &str) {
        self.state.lock().items.push(html.to_string());
    }

    fn stop_pulse(&mut self) {
        self.state.lock().pulsing = false;
    }

    fn set_title(&mut self, title: &str) {
        let mut state = self.state.lock();
        state.title = title.to_string();
        state.finalized += 1;
    }

    fn reveal_status(&mut self) {
        self.state.lock().status_visible = true;
    }
}

/// Escape text for HTML content and double-quoted attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Visible text of an HTML fragment, whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
