//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML analysis, record extraction and link discovery
//! - Request scheduling and rate limiting
//! - Session coordination and the `CrawlService` entry point

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, FetchError, FetchRequest, FetchedPage, Fetcher, HttpFetcher};
pub use parser::{analyze_page, PageAnalysis};
pub use scheduler::{FrontierEntry, Scheduler};

use crate::config::{Config, MAX_DEPTH_LIMIT};
use crate::state::{SessionGuard, SessionPermit};
use crate::storage::{SessionStatus, Storage};
use crate::url::normalize_url;
use crate::{ConfigError, ScrapeError};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use url::Url;

/// Entry point for running crawl sessions
///
/// Holds the process-wide session guard, so at most one crawl runs per
/// service. Completed summaries are kept for later inspection.
pub struct CrawlService<S: Storage + 'static> {
    guard: Arc<SessionGuard>,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<S>,
    config: Config,
    config_hash: String,
    last_summary: Arc<Mutex<Option<CrawlSummary>>>,
    background: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Storage + 'static> CrawlService<S> {
    /// Creates a service that fetches over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `config_hash` - Hash recorded with every session
    /// * `storage` - Store for items and session history
    pub fn new(config: Config, config_hash: String, storage: Arc<S>) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.crawler.follow_redirects)?;
        Ok(Self::with_fetcher(config, config_hash, storage, Arc::new(fetcher)))
    }

    /// Creates a service with a custom transport
    pub fn with_fetcher(
        config: Config,
        config_hash: String,
        storage: Arc<S>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            guard: Arc::new(SessionGuard::new()),
            fetcher,
            storage,
            config,
            config_hash,
            last_summary: Arc::new(Mutex::new(None)),
            background: Mutex::new(None),
        }
    }

    /// Starts a crawl in the background
    ///
    /// Must be called from within a tokio runtime. Never waits for the crawl.
    ///
    /// # Arguments
    ///
    /// * `start_url` - Seed URL, must be absolute http(s)
    /// * `max_depth` - Overrides the configured depth when given
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The crawl was started
    /// * `Ok(false)` - A crawl is already running
    /// * `Err(ScrapeError)` - The seed or depth is invalid
    pub fn start_crawl(&self, start_url: &str, max_depth: Option<u32>) -> Result<bool, ScrapeError> {
        let (url, depth) = self.prepare(start_url, max_depth)?;

        let Some(permit) = self.guard.try_acquire() else {
            tracing::info!("Crawl already running, not starting {}", url);
            return Ok(false);
        };

        let session = self.session(url, depth, permit);
        let handle = tokio::spawn(async move {
            if let Err(e) = session.await {
                tracing::error!("Background crawl failed: {}", e);
            }
        });

        let mut background = self
            .background
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *background = Some(handle);

        Ok(true)
    }

    /// Runs a crawl to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl finished
    /// * `Err(ScrapeError::AlreadyRunning)` - Another crawl holds the guard
    pub async fn run_crawl(
        &self,
        start_url: &str,
        max_depth: Option<u32>,
    ) -> Result<CrawlSummary, ScrapeError> {
        let (url, depth) = self.prepare(start_url, max_depth)?;
        let permit = self.guard.try_acquire().ok_or(ScrapeError::AlreadyRunning)?;
        self.session(url, depth, permit).await
    }

    /// Waits for the crawl started by [`CrawlService::start_crawl`], if any
    pub async fn wait_for_completion(&self) -> Result<(), ScrapeError> {
        let handle = self
            .background
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match handle {
            Some(handle) => handle
                .await
                .map_err(|e| ScrapeError::Task(e.to_string())),
            None => Ok(()),
        }
    }

    /// Returns whether a crawl currently holds the session guard
    pub fn is_crawl_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Returns the summary of the most recently completed crawl
    pub fn crawl_summary(&self) -> Option<CrawlSummary> {
        self.last_summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The store this service writes to
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Validates and normalizes the seed and resolves the depth
    fn prepare(&self, start_url: &str, max_depth: Option<u32>) -> Result<(Url, u32), ScrapeError> {
        let url = normalize_url(start_url.trim()).map_err(|e| ScrapeError::InvalidStartUrl {
            url: start_url.to_string(),
            reason: e.to_string(),
        })?;

        let depth = max_depth.unwrap_or(self.config.crawler.max_depth);
        if depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_depth must be <= {}, got {}",
                MAX_DEPTH_LIMIT, depth
            ))
            .into());
        }

        Ok((url, depth))
    }

    /// Builds the session future; it owns everything it touches
    fn session(
        &self,
        url: Url,
        max_depth: u32,
        permit: SessionPermit,
    ) -> impl std::future::Future<Output = Result<CrawlSummary, ScrapeError>> + Send + 'static {
        let storage = Arc::clone(&self.storage);
        let fetcher = Arc::clone(&self.fetcher);
        let crawler_config = self.config.crawler.clone();
        let config_hash = self.config_hash.clone();
        let last_summary = Arc::clone(&self.last_summary);

        async move {
            let session_id = match storage.create_session(url.as_str(), max_depth, &config_hash) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!("Failed to record crawl session: {}", e);
                    None
                }
            };

            let coordinator = Coordinator::new(
                url,
                max_depth,
                &crawler_config,
                fetcher,
                storage.clone(),
            );
            let result = coordinator.run(permit).await;

            if let Some(id) = session_id {
                let (status, items) = match &result {
                    Ok(summary) => (SessionStatus::Completed, summary.items_processed),
                    Err(_) => (SessionStatus::Failed, 0),
                };
                if let Err(e) = storage.complete_session(id, status, items) {
                    tracing::warn!("Failed to update crawl session {}: {}", id, e);
                }
            }

            if let Ok(summary) = &result {
                *last_summary
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(summary.clone());
            }

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn service() -> CrawlService<SqliteStorage> {
        let storage = Arc::new(SqliteStorage::open_in_memory().unwrap());
        CrawlService::new(Config::default(), "hash".to_string(), storage).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_seed_rejected() {
        let service = service();
        for bad in ["not a url", "ftp://a.com/file", "http://"] {
            assert!(matches!(
                service.start_crawl(bad, None),
                Err(ScrapeError::InvalidStartUrl { .. })
            ));
        }
        assert!(!service.is_crawl_running());
    }

    #[tokio::test]
    async fn test_depth_over_limit_rejected() {
        let service = service();
        assert!(matches!(
            service.run_crawl("https://a.com/", Some(MAX_DEPTH_LIMIT + 1)).await,
            Err(ScrapeError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_no_summary_before_first_crawl() {
        let service = service();
        assert!(service.crawl_summary().is_none());
        assert!(service.wait_for_completion().await.is_ok());
    }
}
