//! Statistics rendering for the store and for finished crawls
//!
//! This module turns `ItemStats` and `CrawlSummary` into the plain-text
//! reports the CLI prints.

use crate::crawler::CrawlSummary;
use crate::storage::ItemStats;
use std::fmt::Write;

/// Renders store statistics
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn render_item_stats(stats: &ItemStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Item Statistics ===\n");
    let _ = writeln!(out, "  Total items: {}", stats.total_items);
    match stats.latest_scrape {
        Some(latest) => {
            let _ = writeln!(out, "  Latest scrape: {}", latest.to_rfc3339());
        }
        None => {
            let _ = writeln!(out, "  Latest scrape: never");
        }
    }
    out
}

/// Renders the summary of a finished crawl
pub fn render_crawl_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Summary ===\n");
    let _ = writeln!(out, "  New items: {}", summary.items_processed);
    let _ = writeln!(out, "  Elapsed: {:.2}s", summary.elapsed.as_secs_f64());
    let _ = writeln!(out, "  Pages fetched: {}", summary.pages_fetched);
    let _ = writeln!(out, "  Pages failed: {}", summary.pages_failed);
    let _ = writeln!(out, "  Product candidates: {}", summary.product_candidates);
    let _ = writeln!(out, "  Unique images: {}", summary.unique_images);

    let attempted = summary.pages_fetched + summary.pages_failed;
    if attempted > 0 {
        let success_rate = summary.pages_fetched as f64 / attempted as f64 * 100.0;
        let _ = writeln!(
            out,
            "\nSuccess Rate: {:.1}% ({} / {} pages fetched)",
            success_rate, summary.pages_fetched, attempted
        );
    }
    out
}

/// Prints store statistics to stdout
pub fn print_item_stats(stats: &ItemStats) {
    print!("{}", render_item_stats(stats));
}

/// Prints a crawl summary to stdout
pub fn print_crawl_summary(summary: &CrawlSummary) {
    print!("{}", render_crawl_summary(summary));
}
