//! Scheduler for managing the crawl frontier and rate limiting
//!
//! This module handles:
//! - Per-domain FIFO queues of frontier entries
//! - Round-robin selection across domains so none starves
//! - Per-domain concurrency limits
//! - Spacing dispatches by the request delay plus random jitter

use crate::config::CrawlerConfig;
use crate::state::DomainState;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use url::Url;

/// A URL accepted into the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL to fetch
    pub url: Url,

    /// Lowercase host of `url`
    pub domain: String,

    /// Distance from the start URL
    pub depth: u32,

    /// Page on which the link was found
    pub referer: Option<String>,
}

/// Scheduler manages the frontier queue and rate limiting
///
/// The coordinator is the only owner, so no locking is needed here. Page
/// tasks report back through the coordinator, which calls [`Scheduler::complete`].
pub struct Scheduler {
    /// Pending entries per domain, in discovery order
    queues: HashMap<String, VecDeque<FrontierEntry>>,

    /// Domains with pending entries, in rotation order
    rotation: VecDeque<String>,

    /// Per-domain state tracking
    domain_states: HashMap<String, DomainState>,

    /// Total pending entries across all domains
    pending: usize,

    parallelism: u32,
    request_delay: Duration,
    random_delay: Duration,
}

impl Scheduler {
    /// Creates an empty scheduler from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            queues: HashMap::new(),
            rotation: VecDeque::new(),
            domain_states: HashMap::new(),
            pending: 0,
            parallelism: config.parallelism.max(1),
            request_delay: config.request_delay(),
            random_delay: config.random_delay(),
        }
    }

    /// Adds an entry to the back of its domain's queue
    pub fn push(&mut self, entry: FrontierEntry) {
        let queue = self.queues.entry(entry.domain.clone()).or_default();
        if queue.is_empty() && !self.rotation.contains(&entry.domain) {
            self.rotation.push_back(entry.domain.clone());
        }
        queue.push_back(entry);
        self.pending += 1;
    }

    /// Pops the next entry whose domain may be dispatched at `now`
    ///
    /// Domains are visited in rotation; a domain that dispatches moves to
    /// the back. The dispatch is recorded against the domain immediately.
    ///
    /// # Returns
    ///
    /// * `Some(FrontierEntry)` - An entry that may be fetched now
    /// * `None` - Nothing is ready (or the frontier is empty)
    pub fn pop_ready(&mut self, now: Instant) -> Option<FrontierEntry> {
        for _ in 0..self.rotation.len() {
            let domain = self.rotation.pop_front()?;
            let ready = self
                .domain_states
                .get(&domain)
                .map(|state| state.can_request(now, self.parallelism))
                .unwrap_or(true);

            let Some(queue) = self.queues.get_mut(&domain) else {
                continue;
            };

            if !ready {
                if !queue.is_empty() {
                    self.rotation.push_back(domain);
                }
                continue;
            }

            let Some(entry) = queue.pop_front() else {
                continue;
            };
            if !queue.is_empty() {
                self.rotation.push_back(domain.clone());
            }
            self.pending -= 1;

            let spacing = self.spacing();
            self.domain_states
                .entry(domain)
                .or_default()
                .record_dispatch(now, spacing);

            tracing::trace!("Dispatching {} (depth {})", entry.url, entry.depth);
            return Some(entry);
        }

        None
    }

    /// Records that a fetch against `domain` finished
    pub fn complete(&mut self, domain: &str) {
        if let Some(state) = self.domain_states.get_mut(domain) {
            state.record_completion();
        }
    }

    /// Calculates how long until some pending domain's spacing allows a dispatch
    ///
    /// Domains at their concurrency limit are skipped since they wait on a
    /// completion rather than on time.
    ///
    /// # Returns
    ///
    /// * `Some(Duration)` - Sleep this long before trying again
    /// * `None` - No pending domain can become ready by waiting
    pub fn time_until_next_ready(&self, now: Instant) -> Option<Duration> {
        self.rotation
            .iter()
            .filter_map(|domain| match self.domain_states.get(domain) {
                None => Some(Duration::ZERO),
                Some(state) if state.in_flight >= self.parallelism => None,
                Some(state) => Some(state.time_until_next_request(now).unwrap_or(Duration::ZERO)),
            })
            .min()
    }

    /// Fixed delay plus a random jitter in `0..=random_delay`
    fn spacing(&self) -> Duration {
        let max_jitter = self.random_delay.as_millis() as u64;
        let jitter = if max_jitter == 0 {
            0
        } else {
            rand::random_range(0..=max_jitter)
        };
        self.request_delay + Duration::from_millis(jitter)
    }

    /// Returns the number of URLs in the frontier
    pub fn len(&self) -> usize {
        self.pending
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Gets the domain state for a specific domain
    pub fn domain_state(&self, domain: &str) -> Option<&DomainState> {
        self.domain_states.get(domain)
    }
}
