//! Catch-all extraction for articles and plain pages

use crate::extract::metadata::{meta_content, social_meta};
use crate::extract::selectors::{exists, first_non_empty, FieldSource};
use crate::extract::{absolute_image_url, insert_non_empty, ExtractedItem};
use scraper::Html;
use std::collections::BTreeMap;
use url::Url;

use FieldSource::{Attr, Text};

const TITLE: &[FieldSource] = &[
    Text("h1#firstHeading"),
    Text("article h1"),
    Text("h1"),
    Attr("meta[property='og:title']", "content"),
    Text("title"),
];

const DESCRIPTION: &[FieldSource] = &[
    Attr("meta[name='description']", "content"),
    Attr("meta[property='og:description']", "content"),
    Text("#mw-content-text p"),
    Text("article p"),
    Text("main p"),
    Text("p"),
];

const IMAGE: &[FieldSource] = &[
    Attr("meta[property='og:image']", "content"),
    Attr("#mw-content-text img", "src"),
    Attr("article img", "src"),
    Attr("main img", "src"),
    Attr(".infobox img", "src"),
];

const AUTHOR: &[FieldSource] = &[
    Attr("meta[name='author']", "content"),
    Text(".author"),
    Text("[rel='author']"),
    Text(".byline"),
];

const PUBLISH_DATE: &[FieldSource] = &[
    Attr("meta[property='article:published_time']", "content"),
    Attr("time[datetime]", "datetime"),
    Text("#footer-info-lastmod"),
];

/// Extracts a generic record from any page
///
/// Price is always 0. Metadata records the content type, the page's domain
/// and path, and author and publish date when present.
pub fn extract_generic(document: &Html, page_url: &Url) -> Option<ExtractedItem> {
    let title = first_non_empty(document, TITLE);
    let description = first_non_empty(document, DESCRIPTION);
    let image_url = absolute_image_url(&first_non_empty(document, IMAGE), page_url);

    let content_type = meta_content(document, "og:type").unwrap_or_else(|| {
        if exists(document, "article") {
            "article".to_string()
        } else {
            "page".to_string()
        }
    });

    let mut metadata = BTreeMap::new();
    insert_non_empty(&mut metadata, "contentType", content_type);
    insert_non_empty(
        &mut metadata,
        "domain",
        page_url.host_str().unwrap_or_default().to_string(),
    );
    insert_non_empty(&mut metadata, "path", page_url.path().to_string());
    insert_non_empty(&mut metadata, "author", first_non_empty(document, AUTHOR));
    insert_non_empty(&mut metadata, "publishDate", first_non_empty(document, PUBLISH_DATE));
    metadata.extend(social_meta(document));

    ExtractedItem::build(title, description, page_url, image_url, 0.0, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_style_page() {
        let url = Url::parse("https://en.wikipedia.org/wiki/Rust").unwrap();
        let doc = Html::parse_document(
            r#"<html><head><title>Rust - Wikipedia</title></head><body>
                <h1 id="firstHeading">Rust</h1>
                <div id="mw-content-text">
                    <p>Rust is a language.</p>
                    <img src="//upload.wikimedia.org/logo.png">
                </div>
                <li id="footer-info-lastmod">Edited on 1 May</li>
            </body></html>"#,
        );

        let item = extract_generic(&doc, &url).unwrap();
        assert_eq!(item.title, "Rust");
        assert_eq!(item.description, "Rust is a language.");
        assert_eq!(item.image_url, "https://upload.wikimedia.org/logo.png");
        assert_eq!(item.price, 0.0);
        assert_eq!(item.metadata.get("contentType").map(String::as_str), Some("page"));
        assert_eq!(item.metadata.get("domain").map(String::as_str), Some("en.wikipedia.org"));
        assert_eq!(item.metadata.get("path").map(String::as_str), Some("/wiki/Rust"));
        assert_eq!(item.metadata.get("publishDate").map(String::as_str), Some("Edited on 1 May"));
    }

    #[test]
    fn test_article_with_social_tags() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        let doc = Html::parse_document(
            r#"<html><head>
                <meta name="author" content="Ada">
                <meta property="og:type" content="article">
                <meta property="og:image" content="/cover.jpg">
                <meta name="twitter:creator" content="@ada">
            </head><body><article>
                <h1>Post title</h1>
                <time datetime="2024-03-01">March 1</time>
                <p>Body text.</p>
            </article></body></html>"#,
        );

        let item = extract_generic(&doc, &url).unwrap();
        assert_eq!(item.title, "Post title");
        assert_eq!(item.image_url, "https://blog.example.com/cover.jpg");
        assert_eq!(item.metadata.get("author").map(String::as_str), Some("Ada"));
        assert_eq!(item.metadata.get("publishDate").map(String::as_str), Some("2024-03-01"));
        assert_eq!(item.metadata.get("type").map(String::as_str), Some("article"));
        assert_eq!(item.metadata.get("creator").map(String::as_str), Some("@ada"));
    }

    #[test]
    fn test_article_element_sets_content_type() {
        let url = Url::parse("https://a.com/x").unwrap();
        let doc = Html::parse_document("<article><h1>T</h1></article>");
        let item = extract_generic(&doc, &url).unwrap();
        assert_eq!(item.metadata.get("contentType").map(String::as_str), Some("article"));
    }

    #[test]
    fn test_page_without_title_yields_nothing() {
        let url = Url::parse("https://a.com/x").unwrap();
        let doc = Html::parse_document("<html><body><p>No heading here</p></body></html>");
        assert!(extract_generic(&doc, &url).is_none());
    }
}
