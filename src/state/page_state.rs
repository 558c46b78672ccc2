//! Page outcome tracking
//!
//! Pages are never persisted; their states only feed the session summary
//! and the log.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Represents the state of one frontier entry as it moves through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Entry accepted into the frontier
    Queued,

    /// Fetch dispatched and not yet finished
    Fetching,

    // ===== Terminal Success States =====
    /// Page fetched and analyzed; a record may or may not have been kept
    Processed,

    /// Page fetched but redirected to a URL this session already handled
    Duplicate,

    // ===== Terminal Error States =====
    /// Network error or non-2xx status
    Failed,

    /// Fetch exceeded the request timeout
    TimedOut,

    /// Response was not HTML
    ContentMismatch,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the entry is still queued or in flight
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Fetching)
    }

    /// Returns true if a response body was received
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::Processed | Self::Duplicate)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut | Self::ContentMismatch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Processed => "processed",
            Self::Duplicate => "duplicate",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::ContentMismatch => "content_mismatch",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free tallies of terminal page states for one session
#[derive(Debug, Default)]
pub struct PageCounters {
    processed: AtomicUsize,
    duplicate: AtomicUsize,
    failed: AtomicUsize,
    timed_out: AtomicUsize,
    content_mismatch: AtomicUsize,
}

impl PageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a terminal state; active states are ignored
    pub fn record(&self, state: PageState) {
        let counter = match state {
            PageState::Processed => &self.processed,
            PageState::Duplicate => &self.duplicate,
            PageState::Failed => &self.failed,
            PageState::TimedOut => &self.timed_out,
            PageState::ContentMismatch => &self.content_mismatch,
            PageState::Queued | PageState::Fetching => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, state: PageState) -> usize {
        match state {
            PageState::Processed => self.processed.load(Ordering::Relaxed),
            PageState::Duplicate => self.duplicate.load(Ordering::Relaxed),
            PageState::Failed => self.failed.load(Ordering::Relaxed),
            PageState::TimedOut => self.timed_out.load(Ordering::Relaxed),
            PageState::ContentMismatch => self.content_mismatch.load(Ordering::Relaxed),
            PageState::Queued | PageState::Fetching => 0,
        }
    }

    /// Pages whose body was received
    pub fn fetched(&self) -> usize {
        self.count(PageState::Processed) + self.count(PageState::Duplicate)
    }

    /// Pages that ended in any error state
    pub fn failed(&self) -> usize {
        self.count(PageState::Failed)
            + self.count(PageState::TimedOut)
            + self.count(PageState::ContentMismatch)
    }
}
