//! Panels rendered to the terminal.
//!
//! Result items are printed the moment they are appended, so a slow summary
//! fetch shows up as a pause between lines. The answer panel is printed once
//! the stream closes.

use std::io::Write;

use colored::Colorize;
use scraper::{Html, Selector};

use crate::render::{AnswerPanelState, ResultsTarget, plain_text};

/// Results list printed line by line to stdout.
#[derive(Debug, Default)]
pub struct StdoutResults {
    html: bool,
    printed: usize,
}

impl StdoutResults {
    /// `html` prints raw item markup instead of text.
    pub fn new(html: bool) -> Self {
        Self { html, printed: 0 }
    }

    pub fn printed(&self) -> usize {
        self.printed
    }
}

impl ResultsTarget for StdoutResults {
    fn append_item(&mut self, html: &str) {
        self.printed += 1;
        let line = if self.html {
            html.to_string()
        } else {
            format_item(html)
        };
        let _ = writeln!(std::io::stdout().lock(), "{line}");
    }

    fn stop_pulse(&mut self) {}

    fn set_title(&mut self, title: &str) {
        let _ = writeln!(
            std::io::stderr().lock(),
            "{} ({} shown)",
            title.bold(),
            self.printed
        );
    }

    fn reveal_status(&mut self) {}
}

/// `• Title (description)  link` for one `<li>` item.
pub fn format_item(html: &str) -> String {
    let text = plain_text(html);
    match item_href(html) {
        Some(href) => format!("• {}  {}", text, href.dimmed()),
        None => format!("• {text}"),
    }
}

fn item_href(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse("a[href]").ok()?;
    fragment
        .select(&selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Print the final answer panel; nothing when it never became visible.
pub fn print_answer(state: &AnswerPanelState, html: bool) {
    if !state.visible {
        return;
    }
    let body = if html {
        state.content.clone()
    } else {
        plain_text(&state.content)
    };
    let mut out = std::io::stdout().lock();
    let _ = writeln!(out, "{}", "AI-generated answer".bold());
    let _ = writeln!(
        out,
        "{}",
        "May contain mistakes. Please check the references.".dimmed()
    );
    let _ = writeln!(out, "{body}");
}
