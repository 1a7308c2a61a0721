//! Internal documentation links in an answer are replaced by the page title.
//!
//! An anchor whose `href` starts with the documentation base URL is looked up
//! by its page path (base and `.html` removed). On a hit the anchor text
//! becomes `[<b>Title</b>]`; the `href` and other attributes are kept, so
//! a second pass produces the same markup. On a miss the anchor is left as
//! it is.

use std::borrow::Cow;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use super::{AnswerTarget, html_escape};
use crate::index::DocumentIndex;

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<a\b(?P<attrs>[^>]*?\bhref="(?P<href>[^"]*)"[^>]*)>(?P<inner>.*?)</a>"#)
        .expect("anchor regex compiles")
});

const PAGE_SUFFIX: &str = ".html";

#[derive(Debug, Clone)]
pub struct LinkRewriter {
    base_url: String,
    index: Arc<DocumentIndex>,
}

impl LinkRewriter {
    pub fn new(base_url: impl Into<String>, index: Arc<DocumentIndex>) -> Self {
        Self {
            base_url: base_url.into(),
            index,
        }
    }

    /// Rewrite the anchors currently in the panel.
    pub fn rewrite<T: AnswerTarget + ?Sized>(&self, target: &mut T) {
        let current = target.content();
        if let Cow::Owned(rewritten) = self.rewrite_html(&current) {
            target.set_content(&rewritten);
        }
    }

    /// Rewrite anchors in an HTML string; borrows when nothing matched.
    pub fn rewrite_html<'a>(&self, html: &'a str) -> Cow<'a, str> {
        let rewritten = ANCHOR_RE.replace_all(html, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let Some(title) = self.title_for_href(&caps["href"]) else {
                return whole.to_string();
            };
            format!("<a{}>[<b>{}</b>]</a>", &caps["attrs"], html_escape(title))
        });
        match rewritten {
            Cow::Owned(out) if out != html => Cow::Owned(out),
            _ => Cow::Borrowed(html),
        }
    }

    /// Index title for an internal link, if the page is known.
    pub fn title_for_href(&self, href: &str) -> Option<&str> {
        let rest = href.strip_prefix(self.base_url.as_str())?;
        let path = rest.replacen(PAGE_SUFFIX, "", 1);
        let title = self.index.title_for(&path);
        trace!(href, path = %path, found = title.is_some(), "link lookup");
        title
    }
}
