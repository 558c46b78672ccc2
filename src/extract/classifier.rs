//! Page classification
//!
//! A page is not put into one bucket. Product and Listing signals are
//! checked independently and Generic extraction always runs, so the result
//! is an explicit union of strategies.

use crate::extract::selectors::exists;
use scraper::Html;

/// Elements that carry a price
pub const PRICE_INDICATORS: &str = ".price, span.amount, .product-price";

/// Elements that start a purchase
pub const PURCHASE_INDICATORS: &str = "button.add-to-cart, .add-to-basket, .buy-now";

/// Elements that hold a product title
pub const PRODUCT_TITLE_INDICATORS: &str = "h1.product-title, .product-name, .product h1";

/// Pagination links on category pages
pub const PAGINATION_LINKS: &str = "a.page, a.pagination__item, .pagination a";

/// Product links inside listing grids
pub const PRODUCT_GRID_LINKS: &str = "a.product-link, a.product-item, .product-grid a";

/// Extraction strategy selected for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    Product,
    Listing,
    Generic,
}

/// Independent signals found on a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageClassification {
    pub product: bool,
    pub listing: bool,
}

impl PageClassification {
    /// Strategies to run, in dispatch order; Generic is always last
    pub fn strategies(&self) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(3);
        if self.product {
            strategies.push(Strategy::Product);
        }
        if self.listing {
            strategies.push(Strategy::Listing);
        }
        strategies.push(Strategy::Generic);
        strategies
    }
}

/// Classifies a parsed page
///
/// * Product iff a price element is present together with a purchase element
///   or a product-title element
/// * Listing iff pagination or product-grid links are present
pub fn classify(document: &Html) -> PageClassification {
    let has_price = exists(document, PRICE_INDICATORS);
    let has_purchase = exists(document, PURCHASE_INDICATORS);
    let has_product_title = exists(document, PRODUCT_TITLE_INDICATORS);

    let has_pagination = exists(document, PAGINATION_LINKS);
    let has_product_grid = exists(document, PRODUCT_GRID_LINKS);

    PageClassification {
        product: has_price && (has_purchase || has_product_title),
        listing: has_pagination || has_product_grid,
    }
}
