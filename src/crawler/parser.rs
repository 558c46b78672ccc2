//! HTML analysis for fetched pages
//!
//! This module parses a page once and runs everything that needs the DOM:
//! - Classification into extraction strategies
//! - Record extraction (Product, falling back to Generic)
//! - Listing link discovery (pagination and product grid)
//! - General link discovery (`<a href>` and the canonical link)
//!
//! `scraper::Html` is not `Send`, so the whole analysis runs synchronously
//! and returns owned data.

use crate::extract::{
    classify, extract_listing_links, select_record, ExtractedItem, ListingLinks,
    PageClassification,
};
use scraper::{Html, Selector};
use url::Url;

/// Everything the crawler needs from one page
#[derive(Debug, Clone)]
pub struct PageAnalysis {
    /// Strategies that matched the page
    pub classification: PageClassification,

    /// The single record to persist, if any
    pub item: Option<ExtractedItem>,

    /// Links found by the Listing strategy
    pub listing: ListingLinks,

    /// All other raw hrefs on the page, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the record and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
///
/// Hrefs are returned as written; scope filtering and resolution happen
/// when they are offered to the frontier.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The final URL of the page
///
/// # Example
///
/// ```
/// use scrape_n_serve::crawler::analyze_page;
/// use url::Url;
///
/// let html = r#"<h1 class="product-title">Widget</h1><span class="price">$12.00</span>"#;
/// let page = Url::parse("https://a.com/p").unwrap();
/// let analysis = analyze_page(html, &page);
/// assert_eq!(analysis.item.unwrap().price, 12.0);
/// ```
pub fn analyze_page(html: &str, page_url: &Url) -> PageAnalysis {
    let document = Html::parse_document(html);

    let classification = classify(&document);
    let item = select_record(&classification, &document, page_url);
    let listing = if classification.listing {
        extract_listing_links(&document)
    } else {
        ListingLinks::default()
    };
    let links = extract_links(&document);

    PageAnalysis {
        classification,
        item,
        listing,
        links,
    }
}

/// Extracts every followable href from the document
fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                links.push(href.trim().to_string());
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(href) = element.value().attr("href") {
                links.push(href.trim().to_string());
            }
        }
    }

    links.retain(|href| !href.is_empty());
    links
}
