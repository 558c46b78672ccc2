//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! a crawl session, including:
//! - Driving the session through its phases
//! - Seeding and draining the frontier
//! - Dispatching page tasks within the scheduler's limits
//! - Feeding discovered links back through scope and dedup checks
//!
//! The scheduler is owned by the loop alone. Page tasks share only the
//! concurrency-safe pieces (dedup store, counters, sink, fetcher) through
//! an `Arc<CrawlContext>` and hand their discovered children back.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchError, FetchRequest, Fetcher};
use crate::crawler::parser::{analyze_page, PageAnalysis};
use crate::crawler::scheduler::{FrontierEntry, Scheduler};
use crate::state::{DedupNamespace, DedupStore, PageCounters, PageState, SessionPermit, SessionPhase};
use crate::storage::ItemSink;
use crate::url::{extract_domain, normalize_url, ScopePolicy};
use crate::ScrapeError;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Upper bound on a single idle wait in the crawl loop
const MAX_IDLE_WAIT: Duration = Duration::from_millis(500);

/// Aggregate results of a finished crawl session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlSummary {
    /// Records newly created in the sink
    pub items_processed: usize,

    /// Wall-clock duration of the session
    pub elapsed: Duration,

    /// Pages fetched successfully (including redirect duplicates)
    pub pages_fetched: usize,

    /// Pages that failed, timed out or were not HTML
    pub pages_failed: usize,

    /// Distinct product links seen on listing pages
    pub product_candidates: usize,

    /// Distinct image URLs across extracted records
    pub unique_images: usize,
}

/// State shared between the crawl loop and its page tasks
struct CrawlContext {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn ItemSink>,
    dedup: DedupStore,
    scope: ScopePolicy,
    counters: PageCounters,
    items_processed: AtomicUsize,
    request_timeout: Duration,
    max_depth: u32,
}

/// What a page task reports back to the loop
struct PageOutcome {
    domain: String,
    state: PageState,
    children: Vec<FrontierEntry>,
}

impl PageOutcome {
    fn terminal(domain: String, state: PageState) -> Self {
        Self {
            domain,
            state,
            children: Vec::new(),
        }
    }
}

/// Main crawler coordinator structure
///
/// One coordinator runs exactly one session; the dedup store and
/// scheduler it owns are discarded with it.
pub struct Coordinator {
    ctx: Arc<CrawlContext>,
    scheduler: Scheduler,
    start_url: Url,
    phase: SessionPhase,
}

impl Coordinator {
    /// Creates a coordinator for one session
    ///
    /// # Arguments
    ///
    /// * `start_url` - The normalized seed URL
    /// * `max_depth` - Links at this depth are fetched but not expanded
    /// * `config` - Crawler settings (limits, delays, domains)
    /// * `fetcher` - Transport used for every page
    /// * `sink` - Destination for extracted records
    pub fn new(
        start_url: Url,
        max_depth: u32,
        config: &CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn ItemSink>,
    ) -> Self {
        let scope = ScopePolicy::for_session(&start_url, config);
        tracing::debug!(
            "Session scope: allowed={:?} disallowed={:?}",
            scope.allowed(),
            scope.disallowed()
        );

        let ctx = CrawlContext {
            fetcher,
            sink,
            dedup: DedupStore::new(),
            scope,
            counters: PageCounters::new(),
            items_processed: AtomicUsize::new(0),
            request_timeout: config.request_timeout(),
            max_depth,
        };

        Self {
            ctx: Arc::new(ctx),
            scheduler: Scheduler::new(config),
            start_url,
            phase: SessionPhase::Idle,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn advance(&mut self, to: SessionPhase) -> Result<(), ScrapeError> {
        if !self.phase.can_transition_to(to) {
            return Err(ScrapeError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!("Session phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }

    /// Runs the session to completion
    ///
    /// The permit proves the caller holds the session guard; it is released
    /// when the session reaches `Completed` (or on any early exit).
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The frontier drained
    /// * `Err(ScrapeError)` - The session was driven through an illegal phase change
    pub async fn run(mut self, permit: SessionPermit) -> Result<CrawlSummary, ScrapeError> {
        let start_time = Instant::now();

        self.advance(SessionPhase::Seeding)?;
        self.seed();
        self.advance(SessionPhase::Running)?;
        tracing::info!(
            "Starting crawl of {} (max depth {})",
            self.start_url,
            self.ctx.max_depth
        );

        self.crawl_loop().await;

        self.advance(SessionPhase::Draining)?;
        let summary = self.summarize(start_time.elapsed());
        self.advance(SessionPhase::Completed)?;
        drop(permit);

        tracing::info!(
            "Crawl completed: {} new items, {} pages fetched, {} failed in {:?}",
            summary.items_processed,
            summary.pages_fetched,
            summary.pages_failed,
            summary.elapsed
        );

        Ok(summary)
    }

    fn seed(&mut self) {
        let Some(domain) = extract_domain(&self.start_url) else {
            tracing::warn!("Start URL {} has no host, nothing to crawl", self.start_url);
            return;
        };
        self.ctx
            .dedup
            .check_and_mark(DedupNamespace::Visited, self.start_url.as_str());
        self.scheduler.push(FrontierEntry {
            url: self.start_url.clone(),
            domain,
            depth: 0,
            referer: None,
        });
    }

    /// Dispatches ready entries until the frontier drains and nothing is in flight
    async fn crawl_loop(&mut self) {
        let mut tasks: JoinSet<PageOutcome> = JoinSet::new();
        let mut pages_done = 0usize;

        loop {
            let now = Instant::now();
            while let Some(entry) = self.scheduler.pop_ready(now) {
                let ctx = Arc::clone(&self.ctx);
                tasks.spawn(async move {
                    let domain = entry.domain.clone();
                    match tokio::spawn(process_page(ctx, entry)).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::error!("Page task for {} failed: {}", domain, e);
                            PageOutcome::terminal(domain, PageState::Failed)
                        }
                    }
                });
            }

            if self.scheduler.is_empty() && tasks.is_empty() {
                tracing::debug!("Frontier drained, no fetch in flight");
                break;
            }

            let wait = self
                .scheduler
                .time_until_next_ready(Instant::now())
                .map(|d| d.min(MAX_IDLE_WAIT));

            tokio::select! {
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok(outcome) => {
                            pages_done += 1;
                            self.handle_outcome(outcome);
                            if pages_done % 10 == 0 {
                                tracing::info!(
                                    "Progress: {} pages done, {} in frontier, {} in flight",
                                    pages_done,
                                    self.scheduler.len(),
                                    tasks.len()
                                );
                            }
                        }
                        Err(e) => tracing::error!("Page task aborted: {}", e),
                    }
                }
                _ = tokio::time::sleep(wait.unwrap_or(MAX_IDLE_WAIT)), if wait.is_some() => {}
                else => {
                    tracing::warn!(
                        "{} frontier entries unreachable, stopping",
                        self.scheduler.len()
                    );
                    break;
                }
            }
        }
    }

    fn handle_outcome(&mut self, outcome: PageOutcome) {
        self.scheduler.complete(&outcome.domain);
        self.ctx.counters.record(outcome.state);
        for child in outcome.children {
            self.scheduler.push(child);
        }
    }

    fn summarize(&self, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            items_processed: self.ctx.items_processed.load(Ordering::Relaxed),
            elapsed,
            pages_fetched: self.ctx.counters.fetched(),
            pages_failed: self.ctx.counters.failed(),
            product_candidates: self.ctx.dedup.len(DedupNamespace::ProductCandidate),
            unique_images: self.ctx.dedup.len(DedupNamespace::SeenImage),
        }
    }
}

/// Fetches, analyzes and persists one page
async fn process_page(ctx: Arc<CrawlContext>, entry: FrontierEntry) -> PageOutcome {
    let request = FetchRequest {
        url: entry.url.clone(),
        timeout: ctx.request_timeout,
        referer: entry.referer.clone(),
    };

    tracing::debug!("Fetching {} (depth {})", entry.url, entry.depth);
    let fetched = match tokio::time::timeout(ctx.request_timeout, ctx.fetcher.fetch(&request)).await
    {
        Ok(Ok(page)) => page,
        Ok(Err(e)) => {
            tracing::warn!("{}", e);
            let state = match e {
                FetchError::Timeout { .. } => PageState::TimedOut,
                FetchError::ContentMismatch { .. } => PageState::ContentMismatch,
                _ => PageState::Failed,
            };
            return PageOutcome::terminal(entry.domain, state);
        }
        Err(_) => {
            tracing::warn!("Request timeout for {}", entry.url);
            return PageOutcome::terminal(entry.domain, PageState::TimedOut);
        }
    };

    let page_url = match normalize_url(fetched.final_url.as_str()) {
        Ok(final_url) if final_url != entry.url => {
            if !redirect_in_scope(&ctx.scope, &entry.url, &final_url) {
                tracing::warn!(
                    "{} redirected out of scope to {}",
                    entry.url,
                    final_url
                );
                return PageOutcome::terminal(entry.domain, PageState::Failed);
            }
            if !ctx
                .dedup
                .check_and_mark(DedupNamespace::Visited, final_url.as_str())
            {
                tracing::debug!(
                    "{} redirected to already visited {}",
                    entry.url,
                    final_url
                );
                return PageOutcome::terminal(entry.domain, PageState::Duplicate);
            }
            final_url
        }
        _ => entry.url.clone(),
    };

    let body = fetched.body;
    let analysis_url = page_url.clone();
    let analysis = match tokio::task::spawn_blocking(move || analyze_page(&body, &analysis_url)).await
    {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!("Failed to analyze {}: {}", page_url, e);
            return PageOutcome::terminal(entry.domain, PageState::Failed);
        }
    };

    tracing::trace!(
        "{} classified as {:?}",
        page_url,
        analysis.classification.strategies()
    );

    persist_item(&ctx, &analysis).await;

    let children = if entry.depth < ctx.max_depth {
        discover_children(&ctx, &analysis, &page_url, entry.depth + 1)
    } else {
        Vec::new()
    };

    PageOutcome {
        domain: entry.domain,
        state: PageState::Processed,
        children,
    }
}

/// Upserts the page's record, if it produced one
async fn persist_item(ctx: &Arc<CrawlContext>, analysis: &PageAnalysis) {
    let Some(item) = analysis.item.clone() else {
        return;
    };

    if !item.image_url.is_empty() {
        ctx.dedup
            .check_and_mark(DedupNamespace::SeenImage, &item.image_url);
    }

    let sink = Arc::clone(&ctx.sink);
    let url = item.url.clone();
    let title = item.title.clone();
    match tokio::task::spawn_blocking(move || sink.upsert_by_url(&item)).await {
        Ok(Ok(true)) => {
            ctx.items_processed.fetch_add(1, Ordering::Relaxed);
            tracing::info!("New item: {} ({})", title, url);
        }
        Ok(Ok(false)) => tracing::debug!("Updated item: {}", url),
        Ok(Err(e)) => tracing::warn!("Failed to save item {}: {}", url, e),
        Err(e) => tracing::warn!("Save task for {} failed: {}", url, e),
    }
}

/// Turns the page's links into new frontier entries
///
/// Product-grid links go first, then pagination, then everything else.
/// Each candidate must pass the scope policy and be new to the session.
fn discover_children(
    ctx: &CrawlContext,
    analysis: &PageAnalysis,
    page_url: &Url,
    child_depth: u32,
) -> Vec<FrontierEntry> {
    let mut children = Vec::new();

    for href in &analysis.listing.products {
        if let Some(url) = admit(ctx, href, page_url) {
            if !ctx
                .dedup
                .check_and_mark(DedupNamespace::ProductCandidate, url.as_str())
            {
                continue;
            }
            enqueue_new(ctx, url, page_url, child_depth, &mut children);
        }
    }

    for href in analysis.listing.pagination.iter().chain(&analysis.links) {
        if let Some(url) = admit(ctx, href, page_url) {
            enqueue_new(ctx, url, page_url, child_depth, &mut children);
        }
    }

    children
}

/// Whether a redirect from `requested` may be followed to `landed`
///
/// Staying on the requested host is always fine; any other host must pass
/// the allow and deny lists.
fn redirect_in_scope(scope: &ScopePolicy, requested: &Url, landed: &Url) -> bool {
    match (extract_domain(requested), extract_domain(landed)) {
        (Some(from), Some(to)) if from == to => true,
        (_, Some(to)) => scope.host_allowed(&to),
        (_, None) => false,
    }
}

/// Resolves and normalizes an in-scope href
///
/// Host-relative links stay on the page's own host and are admitted even
/// when that host is not in the allow list.
fn admit(ctx: &CrawlContext, href: &str, page_url: &Url) -> Option<Url> {
    let Some(resolved) = ctx.scope.resolve(href, page_url) else {
        tracing::trace!("Out of scope: {}", href);
        return None;
    };
    match normalize_url(resolved.as_str()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::trace!("Skipping {}: {}", href, e);
            None
        }
    }
}

fn enqueue_new(
    ctx: &CrawlContext,
    url: Url,
    referer: &Url,
    depth: u32,
    children: &mut Vec<FrontierEntry>,
) {
    if !ctx.dedup.check_and_mark(DedupNamespace::Visited, url.as_str()) {
        return;
    }
    let Some(domain) = extract_domain(&url) else {
        return;
    };
    tracing::trace!("Enqueue {} at depth {}", url, depth);
    children.push(FrontierEntry {
        url,
        domain,
        depth,
        referer: Some(referer.to_string()),
    });
}
