//! Listing-page link discovery

use crate::extract::classifier::{PAGINATION_LINKS, PRODUCT_GRID_LINKS};
use crate::extract::selectors::selector;
use scraper::Html;

/// Raw hrefs found by the Listing strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingLinks {
    /// Links to other pages of the same listing
    pub pagination: Vec<String>,
    /// Links to individual products in the grid
    pub products: Vec<String>,
}

fn hrefs(document: &Html, css: &str) -> Vec<String> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collects pagination and product-grid hrefs in document order
///
/// Hrefs are returned unresolved; scope checks and resolution happen when
/// they are offered to the frontier.
pub fn extract_listing_links(document: &Html) -> ListingLinks {
    ListingLinks {
        pagination: hrefs(document, PAGINATION_LINKS),
        products: hrefs(document, PRODUCT_GRID_LINKS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_links() {
        let doc = Html::parse_document(
            r#"<div class="product-grid">
                   <a href="/p/1">One</a>
                   <a href=" /p/2 ">Two</a>
                   <a>No href</a>
               </div>
               <a class="product-link" href="/p/3">Three</a>
               <nav class="pagination"><a href="?page=2">2</a></nav>
               <a class="page" href="?page=3">3</a>"#,
        );

        let links = extract_listing_links(&doc);
        assert_eq!(links.products, vec!["/p/1", "/p/2", "/p/3"]);
        assert_eq!(links.pagination, vec!["?page=2", "?page=3"]);
    }

    #[test]
    fn test_plain_page_has_no_listing_links() {
        let doc = Html::parse_document(r#"<a href="/about">About</a>"#);
        assert_eq!(extract_listing_links(&doc), ListingLinks::default());
    }
}
