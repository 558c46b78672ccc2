//! Social meta tags (`og:*`, `twitter:*`) folded into item metadata

use crate::extract::selectors::selector;
use scraper::Html;
use std::collections::BTreeMap;

/// Collects every `og:*` and `twitter:*` meta tag with its prefix stripped
///
/// Tags are visited in document order, so a later duplicate key overwrites an
/// earlier one. Both the `property` and `name` attributes are consulted since
/// sites use them interchangeably.
pub fn social_meta(document: &Html) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    let Some(sel) = selector("meta") else {
        return tags;
    };

    for element in document.select(&sel) {
        let meta = element.value();
        let Some(content) = meta.attr("content").map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };

        let key = meta
            .attr("property")
            .into_iter()
            .chain(meta.attr("name"))
            .map(str::trim)
            .find_map(|name| {
                name.strip_prefix("og:")
                    .or_else(|| name.strip_prefix("twitter:"))
            })
            .filter(|key| !key.is_empty());

        if let Some(key) = key {
            tags.insert(key.to_string(), content.to_string());
        }
    }

    tags
}

/// Reads one meta tag's content by `property` or `name`
pub fn meta_content(document: &Html, key: &str) -> Option<String> {
    let sel = selector("meta")?;
    document
        .select(&sel)
        .find(|el| {
            let meta = el.value();
            meta.attr("property") == Some(key) || meta.attr("name") == Some(key)
        })
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
