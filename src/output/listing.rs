//! Text rendering of stored items and session history

use crate::storage::{SessionRecord, StoredItem};
use std::fmt::Write;

/// Longest title shown in a table row
const TITLE_WIDTH: usize = 48;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", cut)
}

/// Renders a page of items as a table
///
/// # Arguments
///
/// * `items` - The rows to show
/// * `total` - Total matching rows, for the footer
/// * `offset` - Position of the first row within `total`
pub fn render_items(items: &[StoredItem], total: usize, offset: i64) -> String {
    let mut out = String::new();
    if items.is_empty() {
        let _ = writeln!(out, "No items ({} total)", total);
        return out;
    }

    let _ = writeln!(
        out,
        "{:>6}  {:<width$}  {:>10}  {}",
        "ID",
        "TITLE",
        "PRICE",
        "URL",
        width = TITLE_WIDTH
    );
    for stored in items {
        let _ = writeln!(
            out,
            "{:>6}  {:<width$}  {:>10.2}  {}",
            stored.id,
            truncate(&stored.item.title, TITLE_WIDTH),
            stored.item.price,
            stored.item.url,
            width = TITLE_WIDTH
        );
    }

    let first = offset.max(0) as usize + 1;
    let last = first + items.len() - 1;
    let _ = writeln!(out, "\nShowing {}-{} of {}", first, last, total);
    out
}

/// Renders every field of one item
pub fn render_item_detail(stored: &StoredItem) -> String {
    let item = &stored.item;
    let mut out = String::new();
    let _ = writeln!(out, "=== Item {} ===\n", stored.id);
    let _ = writeln!(out, "  Title: {}", item.title);
    let _ = writeln!(out, "  URL: {}", item.url);
    let _ = writeln!(out, "  Price: {:.2}", item.price);
    if !item.image_url.is_empty() {
        let _ = writeln!(out, "  Image: {}", item.image_url);
    }
    if !item.description.is_empty() {
        let _ = writeln!(out, "  Description: {}", item.description);
    }
    let _ = writeln!(out, "  Scraped at: {}", item.scraped_at.to_rfc3339());
    let _ = writeln!(out, "  Created at: {}", stored.created_at.to_rfc3339());
    let _ = writeln!(out, "  Updated at: {}", stored.updated_at.to_rfc3339());

    if !item.metadata.is_empty() {
        let _ = writeln!(out, "\nMetadata:");
        for (key, value) in &item.metadata {
            let _ = writeln!(out, "  {}: {}", key, value);
        }
    }
    out
}

/// Renders crawl session history, newest first
pub fn render_sessions(sessions: &[SessionRecord]) -> String {
    let mut out = String::new();
    if sessions.is_empty() {
        let _ = writeln!(out, "No crawl sessions recorded");
        return out;
    }

    let _ = writeln!(out, "=== Crawl Sessions ===\n");
    for session in sessions {
        let finished = session
            .finished_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  #{} {} depth={} status={} items={}",
            session.id,
            session.start_url,
            session.max_depth,
            session.status.to_db_string(),
            session.items_processed
        );
        let _ = writeln!(
            out,
            "      started {} finished {}",
            session.started_at.to_rfc3339(),
            finished
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedItem;
    use crate::storage::SessionStatus;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn stored(id: i64, title: &str) -> StoredItem {
        let now = Utc::now();
        let mut metadata = BTreeMap::new();
        metadata.insert("sku".to_string(), "W-1".to_string());
        StoredItem {
            id,
            item: ExtractedItem {
                title: title.to_string(),
                description: String::new(),
                url: format!("https://a.com/{}", id),
                image_url: String::new(),
                price: 12.0,
                scraped_at: now,
                metadata,
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_render_items_table() {
        let out = render_items(&[stored(1, "Widget"), stored(2, "Gadget")], 10, 4);
        assert!(out.contains("Widget"));
        assert!(out.contains("12.00"));
        assert!(out.contains("https://a.com/2"));
        assert!(out.contains("Showing 5-6 of 10"));
    }

    #[test]
    fn test_render_empty_items() {
        assert_eq!(render_items(&[], 0, 0), "No items (0 total)\n");
    }

    #[test]
    fn test_long_titles_truncated() {
        let long = "x".repeat(100);
        let out = render_items(&[stored(1, &long)], 1, 0);
        assert!(!out.contains(&long));
        assert!(out.contains('…'));
    }

    #[test]
    fn test_render_item_detail() {
        let out = render_item_detail(&stored(7, "Widget"));
        assert!(out.contains("=== Item 7 ==="));
        assert!(out.contains("sku: W-1"));
        assert!(!out.contains("Image:"));
    }

    #[test]
    fn test_render_sessions() {
        let session = SessionRecord {
            id: 3,
            start_url: "https://a.com/".to_string(),
            max_depth: 2,
            started_at: Utc::now(),
            finished_at: None,
            status: SessionStatus::Running,
            config_hash: "abc".to_string(),
            items_processed: 0,
        };
        let out = render_sessions(&[session]);
        assert!(out.contains("#3 https://a.com/ depth=2 status=running items=0"));
        assert!(out.contains("finished -"));
        assert_eq!(render_sessions(&[]), "No crawl sessions recorded\n");
    }
}
