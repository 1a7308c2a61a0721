//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `DOCSEARCH_*` environment variables (read through `dotenvy`, so a `.env`
//! file in the working directory is honoured), then command-line flags applied
//! by the caller. The result is treated as immutable once handed to the
//! components.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{AssistError, Result};

/// Default location of the documentation API (the site that serves
/// `/api_check`, `/api/assistant` and `/api/ragsearch`).
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/";

/// Default prefix of internal documentation links inside generated answers.
pub const DEFAULT_DOCS_BASE_URL: &str = "https://docs.pip.distribution.sol.onetick.com/";

/// Delay between two result-list render steps.
pub const DEFAULT_STEP_DELAY_MS: u64 = 5;

/// Static-site layout convention, which decides how result URLs are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Builder {
    /// One file per page (`page.html`).
    #[default]
    #[serde(alias = "default")]
    Html,
    /// One directory per page (`page/index.html`, linked as `page/`).
    Dirhtml,
}

impl FromStr for Builder {
    type Err = AssistError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "default" => Ok(Self::Html),
            "dirhtml" => Ok(Self::Dirhtml),
            other => Err(AssistError::Config(format!(
                "unknown builder '{other}' (expected html or dirhtml)"
            ))),
        }
    }
}

/// Builder options of the documentation site, mirroring what the site
/// generator publishes for its own search page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentationOptions {
    pub builder: Builder,
    /// Prefix for page URLs; may be relative to the API base (often empty).
    pub url_root: String,
    /// Suffix appended to a page path when fetching its raw content.
    pub file_suffix: String,
    /// Suffix appended to a page path when linking to it.
    pub link_suffix: String,
    /// Fetch and show a page summary for results without a description.
    pub show_summary: bool,
}

impl Default for DocumentationOptions {
    fn default() -> Self {
        Self {
            builder: Builder::Html,
            url_root: String::new(),
            file_suffix: ".html".to_string(),
            link_suffix: ".html".to_string(),
            show_summary: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    /// Origin of the documentation site and its API endpoints.
    pub api_base: Url,
    /// Links in answers starting with this prefix are rewritten to titles.
    pub docs_base_url: String,
    /// Site generator options used by the result list.
    pub options: DocumentationOptions,
    /// Pause between result-list render steps, in milliseconds.
    pub step_delay_ms: u64,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url"),
            docs_base_url: DEFAULT_DOCS_BASE_URL.to_string(),
            options: DocumentationOptions::default(),
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
        }
    }
}

impl AssistConfig {
    /// Defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AssistError::Config(format!("reading {}: {e}", path.display()))
                })?;
                debug!(path = %path.display(), "loaded config file");
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        cfg.apply_env()?;
        cfg.normalize()?;
        Ok(cfg)
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut cfg: Self =
            toml::from_str(raw).map_err(|e| AssistError::Config(format!("invalid TOML: {e}")))?;
        cfg.normalize()?;
        Ok(cfg)
    }

    /// Overlay `DOCSEARCH_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(val) = dotenvy::var("DOCSEARCH_API_BASE") {
            self.set_api_base(&val)?;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_DOCS_BASE_URL") {
            self.docs_base_url = val;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_BUILDER") {
            self.options.builder = val.parse()?;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_URL_ROOT") {
            self.options.url_root = val;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_FILE_SUFFIX") {
            self.options.file_suffix = val;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_LINK_SUFFIX") {
            self.options.link_suffix = val;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_SHOW_SUMMARY") {
            self.options.show_summary = parse_flag(&val).ok_or_else(|| {
                AssistError::Config(format!("DOCSEARCH_SHOW_SUMMARY: not a boolean: {val}"))
            })?;
        }
        if let Ok(val) = dotenvy::var("DOCSEARCH_STEP_DELAY_MS") {
            self.step_delay_ms = val.parse().map_err(|_| {
                AssistError::Config(format!("DOCSEARCH_STEP_DELAY_MS: not a number: {val}"))
            })?;
        }
        Ok(())
    }

    /// Replace the API base, validating the scheme.
    pub fn set_api_base(&mut self, raw: &str) -> Result<()> {
        self.api_base = Url::parse(raw)?;
        self.normalize()
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// `url_root` resolved against the API base, for fetching pages.
    pub fn resolved_url_root(&self) -> Result<Url> {
        Ok(self.api_base.join(&self.options.url_root)?)
    }

    fn normalize(&mut self) -> Result<()> {
        match self.api_base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(AssistError::Config(format!(
                    "api base must be http or https, got {other}"
                )));
            }
        }
        // Url::join drops the last path segment unless it ends with '/'.
        if !self.api_base.path().ends_with('/') {
            let path = format!("{}/", self.api_base.path());
            self.api_base.set_path(&path);
        }
        Ok(())
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
