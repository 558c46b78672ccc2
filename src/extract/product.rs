//! Product-page extraction

use crate::extract::metadata::social_meta;
use crate::extract::price::parse_price;
use crate::extract::selectors::{first_non_empty, FieldSource};
use crate::extract::{absolute_image_url, insert_non_empty, ExtractedItem};
use scraper::Html;
use std::collections::BTreeMap;
use url::Url;

use FieldSource::{Attr, Text};

const TITLE: &[FieldSource] = &[
    Text("h1.product-title"),
    Text(".product-name"),
    Text(".product h1"),
    Text("h1"),
];

const DESCRIPTION: &[FieldSource] = &[
    Text(".product-description"),
    Text(".description"),
    Attr("meta[name='description']", "content"),
    Text("#product-description"),
    Text(".product-details p"),
];

const IMAGE: &[FieldSource] = &[
    Attr(".product-image img", "src"),
    Attr("img.product-image", "src"),
    Attr(".gallery img", "src"),
    Attr(".carousel img", "src"),
    Attr("#main-image", "src"),
    Attr("img.product", "src"),
];

const PRICE: &[FieldSource] = &[
    Text(".price"),
    Text(".product-price"),
    Text("span.amount"),
    Text(".current-price"),
];

const CATEGORY: &[FieldSource] = &[
    Text(".breadcrumbs"),
    Text(".category"),
    Text(".product-category"),
];

const VENDOR: &[FieldSource] = &[Text(".vendor"), Text(".brand"), Text(".manufacturer")];

const SKU: &[FieldSource] = &[Text(".sku"), Text(".product-sku"), Text("span.sku")];

const AVAILABILITY: &[FieldSource] = &[Text(".stock"), Text(".availability"), Text(".inventory")];

/// Extracts a product record
///
/// # Returns
///
/// * `Some(ExtractedItem)` - A title was found
/// * `None` - No title; the page yields no product record
pub fn extract_product(document: &Html, page_url: &Url) -> Option<ExtractedItem> {
    let title = first_non_empty(document, TITLE);
    let description = first_non_empty(document, DESCRIPTION);
    let image_url = absolute_image_url(&first_non_empty(document, IMAGE), page_url);
    let price = parse_price(&first_non_empty(document, PRICE));

    let mut metadata = BTreeMap::new();
    insert_non_empty(&mut metadata, "category", first_non_empty(document, CATEGORY));
    insert_non_empty(&mut metadata, "vendor", first_non_empty(document, VENDOR));
    insert_non_empty(&mut metadata, "sku", first_non_empty(document, SKU));
    insert_non_empty(&mut metadata, "availability", first_non_empty(document, AVAILABILITY));
    metadata.extend(social_meta(document));

    ExtractedItem::build(title, description, page_url, image_url, price, metadata)
}
