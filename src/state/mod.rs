//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `DedupStore`: concurrency-safe membership sets for one session
//! - `SessionGuard`: process-wide "at most one crawl" flag
//! - `SessionPhase`: lifecycle of a crawl session
//! - `PageState`: outcome of an individual page fetch
//! - `DomainState`: per-domain dispatch bookkeeping for rate limiting

mod dedup;
mod domain_state;
mod page_state;
mod session_guard;
mod session_phase;

// Re-export main types
pub use dedup::{DedupNamespace, DedupStore};
pub use domain_state::DomainState;
pub use page_state::{PageCounters, PageState};
pub use session_guard::{SessionGuard, SessionPermit};
pub use session_phase::SessionPhase;
