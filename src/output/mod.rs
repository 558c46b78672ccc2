//! Output module for rendering crawl results and store queries
//!
//! This module handles:
//! - Store statistics and crawl summaries
//! - Item tables, item detail and session history
//! - JSON output for scripting

mod listing;
pub mod stats;

pub use listing::{render_item_detail, render_items, render_sessions};
pub use stats::{print_crawl_summary, print_item_stats, render_crawl_summary, render_item_stats};

use serde::Serialize;

/// Serializes any output value as pretty-printed JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ItemStats;

    #[test]
    fn test_stats_as_json() {
        let json = to_json(&ItemStats {
            total_items: 2,
            latest_scrape: None,
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_items"], 2);
        assert!(value["latest_scrape"].is_null());
    }
}
