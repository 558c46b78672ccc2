//! Scrape-n-Serve main entry point
//!
//! This is the command-line interface for crawling a site into SQLite and
//! querying what was collected.

use anyhow::{bail, Context};
use clap::Parser;
use scrape_n_serve::config::{load_config_with_hash, Config};
use scrape_n_serve::crawler::CrawlService;
use scrape_n_serve::output;
use scrape_n_serve::storage::{ItemQuery, SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Scrape-n-Serve: a bounded product-page crawler
///
/// Crawls a site within its allowed domains, extracts one record per page and
/// upserts it into SQLite. Without a URL, the query flags read the store.
#[derive(Parser, Debug)]
#[command(name = "scrape-n-serve")]
#[command(version)]
#[command(about = "A bounded product-page crawler", long_about = None)]
struct Cli {
    /// Start URL to crawl (defaults to target-website from config or env)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured maximum crawl depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Show item statistics and exit
    #[arg(long, conflicts_with_all = ["list", "search", "show", "sessions"])]
    stats: bool,

    /// List stored items and exit
    #[arg(long, conflicts_with_all = ["search", "show", "sessions"])]
    list: bool,

    /// Search titles and descriptions and exit
    #[arg(long, value_name = "Q", conflicts_with_all = ["show", "sessions"])]
    search: Option<String>,

    /// Show one item by ID and exit
    #[arg(long, value_name = "ID", conflicts_with = "sessions")]
    show: Option<i64>,

    /// Show crawl session history and exit
    #[arg(long)]
    sessions: bool,

    /// Page size for --list, --search and --sessions
    #[arg(long)]
    limit: Option<i64>,

    /// Rows to skip for --list and --search
    #[arg(long, default_value_t = 0)]
    offset: i64,

    /// Sort column for --list (scraped_at, title, price, id)
    #[arg(long, default_value = "scraped_at")]
    sort: String,

    /// Sort direction for --list (asc, desc)
    #[arg(long, default_value = "desc")]
    order: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn is_query(&self) -> bool {
        self.stats || self.list || self.search.is_some() || self.show.is_some() || self.sessions
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    let storage = Arc::new(
        SqliteStorage::new(Path::new(&config.output.database_path)).with_context(|| {
            format!("Failed to open database {}", config.output.database_path)
        })?,
    );

    if cli.is_query() {
        return handle_query(&cli, storage.as_ref());
    }

    handle_crawl(&cli, config, config_hash, storage).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrape_n_serve=info,warn"),
            1 => EnvFilter::new("scrape_n_serve=debug,info"),
            2 => EnvFilter::new("scrape_n_serve=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the crawl mode: runs one session and prints its summary
async fn handle_crawl(
    cli: &Cli,
    config: Config,
    config_hash: String,
    storage: Arc<SqliteStorage>,
) -> anyhow::Result<()> {
    let Some(start_url) = cli
        .url
        .clone()
        .or_else(|| config.crawler.target_website.clone())
    else {
        bail!("No start URL given; pass one or set target-website / TARGET_WEBSITE");
    };

    tracing::info!("Database: {}", config.output.database_path);
    let service = CrawlService::new(config, config_hash, storage)?;
    let summary = service
        .run_crawl(&start_url, cli.max_depth)
        .await
        .with_context(|| format!("Crawl of {} failed", start_url))?;

    if cli.json {
        println!("{}", output::to_json(&summary)?);
    } else {
        output::print_crawl_summary(&summary);
    }
    Ok(())
}

/// Handles the query modes: reads the store and exits
fn handle_query(cli: &Cli, storage: &SqliteStorage) -> anyhow::Result<()> {
    if cli.stats {
        let stats = storage.item_stats()?;
        if cli.json {
            println!("{}", output::to_json(&stats)?);
        } else {
            output::print_item_stats(&stats);
        }
    } else if cli.list {
        let query = ItemQuery::from_raw(cli.limit.unwrap_or(0), cli.offset, &cli.sort, &cli.order);
        let (items, total) = storage.list_items(&query)?;
        if cli.json {
            println!("{}", output::to_json(&items)?);
        } else {
            print!("{}", output::render_items(&items, total, query.offset));
        }
    } else if let Some(text) = &cli.search {
        if text.trim().is_empty() {
            bail!("Search query cannot be empty");
        }
        let (items, total) = storage.search_items(text, cli.limit.unwrap_or(0), cli.offset)?;
        if cli.json {
            println!("{}", output::to_json(&items)?);
        } else {
            print!("{}", output::render_items(&items, total, cli.offset));
        }
    } else if let Some(id) = cli.show {
        let item = storage.get_item(id)?;
        if cli.json {
            println!("{}", output::to_json(&item)?);
        } else {
            print!("{}", output::render_item_detail(&item));
        }
    } else if cli.sessions {
        let sessions = storage.list_sessions(cli.limit.unwrap_or(20))?;
        if cli.json {
            println!("{}", output::to_json(&sessions)?);
        } else {
            print!("{}", output::render_sessions(&sessions));
        }
    }

    Ok(())
}
