//! Ordered fallback chains over CSS selectors

use scraper::{ElementRef, Html, Selector};

/// One candidate source for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Text content of the first matching element with non-empty text
    Text(&'static str),
    /// Named attribute of the first matching element where it is non-empty
    Attr(&'static str, &'static str),
}

/// Parses a selector, logging and skipping malformed ones
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

/// Returns true if any element matches `css`
pub(crate) fn exists(document: &Html, css: &str) -> bool {
    selector(css)
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false)
}

/// Whitespace-collapsed text of an element
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

fn resolve_source(document: &Html, source: FieldSource) -> Option<String> {
    match source {
        FieldSource::Text(css) => {
            let sel = selector(css)?;
            document
                .select(&sel)
                .map(|el| element_text(&el))
                .find(|text| !text.is_empty())
        }
        FieldSource::Attr(css, attr) => {
            let sel = selector(css)?;
            document
                .select(&sel)
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        }
    }
}

/// Walks `chain` in order and returns the first non-empty value
///
/// # Returns
///
/// The trimmed value of the first source that yields one, or an empty string.
pub fn first_non_empty(document: &Html, chain: &[FieldSource]) -> String {
    chain
        .iter()
        .find_map(|source| resolve_source(document, *source))
        .unwrap_or_default()
}
