//! URL handling module for Scrape-n-Serve
//!
//! This module provides URL normalization, domain extraction, wildcard matching,
//! and the scope policy that decides which discovered links may be followed.

mod domain;
mod matcher;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::{matches_any, matches_wildcard};
pub use normalize::normalize_url;
pub use scope::{is_in_scope, ScopePolicy};
