//! Page classification and record extraction
//!
//! Each fetched page is classified into a set of strategies. Product and
//! Generic strategies build an [`ExtractedItem`] through ordered selector
//! fallback chains; the Listing strategy only yields links to follow.

mod classifier;
mod generic;
mod listing;
mod metadata;
mod price;
mod product;
mod selectors;

pub use classifier::{classify, PageClassification, Strategy};
pub use generic::extract_generic;
pub use listing::{extract_listing_links, ListingLinks};
pub use metadata::{meta_content, social_meta};
pub use price::parse_price;
pub use product::extract_product;
pub use selectors::{first_non_empty, FieldSource};

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// One record extracted from one page
///
/// `url` is the natural key. A `price` of 0 means the price was absent,
/// unparsable or genuinely zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub price: f64,
    pub scraped_at: DateTime<Utc>,
    pub metadata: BTreeMap<String, String>,
}

impl ExtractedItem {
    /// Returns None unless both title and url are non-empty
    pub(crate) fn build(
        title: String,
        description: String,
        url: &Url,
        image_url: String,
        price: f64,
        metadata: BTreeMap<String, String>,
    ) -> Option<Self> {
        let url = url.to_string();
        if title.trim().is_empty() || url.is_empty() {
            return None;
        }

        Some(Self {
            title,
            description,
            url,
            image_url,
            price,
            scraped_at: Utc::now(),
            metadata,
        })
    }
}

/// Resolves a possibly relative image reference against the page URL
pub(crate) fn absolute_image_url(raw: &str, page_url: &Url) -> String {
    if raw.is_empty() {
        return String::new();
    }
    page_url
        .join(raw)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Inserts `value` under `key` unless it is empty
pub(crate) fn insert_non_empty(map: &mut BTreeMap<String, String>, key: &str, value: String) {
    if !value.is_empty() {
        map.insert(key.to_string(), value);
    }
}

/// Picks the record to persist for a page
///
/// The Product record wins when the page classifies as a product and yields
/// one; otherwise the Generic record is used. At most one record exists per
/// page URL.
pub fn select_record(
    classification: &PageClassification,
    document: &Html,
    page_url: &Url,
) -> Option<ExtractedItem> {
    let mut record = None;
    for strategy in classification.strategies() {
        let candidate = match strategy {
            Strategy::Product => extract_product(document, page_url),
            Strategy::Generic => extract_generic(document, page_url),
            Strategy::Listing => None,
        };
        if record.is_none() {
            record = candidate;
        }
    }
    record
}
