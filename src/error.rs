//! Error type shared by the answer stream, the result sequencer and the
//! backend selector.
//!
//! Network failures are mostly absorbed where they happen (the UI simply stops
//! updating), so only a handful of these variants ever reach a caller:
//! malformed stream fragments, bad configuration, and misuse of the stream
//! state machine.

use thiserror::Error;

use crate::assistant::StreamState;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// A stream event whose data was not a JSON-encoded string.
    #[error("malformed answer fragment {payload:?}: {source}")]
    Decode {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed search results: {0}")]
    Results(#[source] serde_json::Error),

    #[error("search index error: {0}")]
    Index(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("answer stream cannot start from state {0:?}")]
    AlreadyStarted(StreamState),
}

pub type Result<T, E = AssistError> = std::result::Result<T, E>;
