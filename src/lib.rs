pub mod assistant;
pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod index;
pub mod model;
pub mod page;
pub mod render;
pub mod results;
pub mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use once_cell::sync::Lazy;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use backend::{Backend, SearchBackendSelector, TitleMatchSearch};
use config::AssistConfig;
use http::ApiClient;
use index::DocumentIndex;
use model::Query;
use page::SearchPage;
use render::AnswerPanel;
use ui::{StdoutResults, print_answer};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "docsearch-assist",
    version,
    long_version = LONG_VERSION.as_str(),
    about = "Streamed AI answers and vector search for a static documentation site"
)]
pub struct Cli {
    /// TOML config file (defaults, then this file, then DOCSEARCH_* env)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the documentation API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream the AI answer for a query
    Ask {
        query: String,

        /// Print the panel HTML instead of plain text
        #[arg(long, default_value_t = false)]
        html: bool,
    },
    /// Run a search through whichever backend the probe selects
    Search {
        query: String,

        /// Print item HTML instead of plain text
        #[arg(long, default_value_t = false)]
        html: bool,
    },
    /// Run the full page-load flow for a page URL
    Page {
        /// e.g. http://localhost:8000/search.html?q=join
        url: String,

        #[arg(long, default_value_t = false)]
        html: bool,
    },
    /// Report whether vector search is available
    Probe,
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

static LONG_VERSION: Lazy<String> = Lazy::new(|| {
    let mut version = env!("CARGO_PKG_VERSION").to_string();
    if let Some(triple) = option_env!("VERGEN_CARGO_TARGET_TRIPLE") {
        version.push_str(&format!(" {triple}"));
    }
    if let Some(ts) = option_env!("VERGEN_BUILD_TIMESTAMP") {
        version.push_str(&format!(" (built {ts})"));
    }
    version
});

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "docsearch-assist", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(cli.config.as_deref(), cli.api_base.as_deref())?;
    let client = ApiClient::new(config.api_base.clone()).context("building HTTP client")?;

    match cli.command {
        Commands::Probe => {
            let available = SearchBackendSelector::new(client).probe().await;
            println!("{}", if available { "vector" } else { "keyword" });
        }
        Commands::Ask { query, html } => {
            let page = search_page(client, config).await;
            let panel = AnswerPanel::new();
            let mut controller = page.answer_controller(panel.clone());
            controller
                .start(&Query::new(query))
                .await
                .context("streaming answer")?;
            print_answer(&panel.snapshot(), html);
        }
        Commands::Search { query, html } => {
            let page = search_page(client, config).await;
            let mut results = StdoutResults::new(html);
            let backend = page
                .search(&Query::new(query), &mut results)
                .await
                .context("running search")?;
            log_backend(backend);
        }
        Commands::Page { url, html } => {
            let page = search_page(client, config).await;
            let panel = AnswerPanel::new();
            let mut results = StdoutResults::new(html);
            let session = page
                .load(&url, panel.clone(), &mut results)
                .await
                .with_context(|| format!("loading {url}"))?;
            log_backend(session.backend);
            if session.query.is_some() {
                print_answer(&panel.snapshot(), html);
            }
        }
        Commands::Completions { .. } | Commands::Man => {}
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&std::path::Path>, api_base: Option<&str>) -> Result<AssistConfig> {
    let mut config = AssistConfig::load(path).context("loading configuration")?;
    if let Some(base) = api_base {
        config
            .set_api_base(base)
            .with_context(|| format!("invalid --api-base {base}"))?;
    }
    Ok(config)
}

/// Page wired with the site's search index and the title-match keyword search.
async fn search_page(client: ApiClient, config: AssistConfig) -> SearchPage {
    let index = match config.resolved_url_root() {
        Ok(root) => DocumentIndex::fetch(&client, &root).await,
        Err(e) => Err(e),
    };
    let index = Arc::new(index.unwrap_or_else(|e| {
        warn!(error = %e, "search index unavailable, links and keyword search disabled");
        DocumentIndex::default()
    }));
    let keyword = Arc::new(TitleMatchSearch::new(
        Arc::clone(&index),
        config.options.clone(),
    ));
    SearchPage::new(client, Arc::new(config), index, keyword)
}

fn log_backend(backend: Backend) {
    tracing::info!(?backend, "search served");
}
