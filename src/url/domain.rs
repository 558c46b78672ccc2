use url::Url;

/// Extracts the lowercase hostname from a URL
///
/// The port is not part of the result, so `http://127.0.0.1:8080/` and
/// `http://127.0.0.1:9090/` share one domain for rate limiting and scope.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_n_serve::url::extract_domain;
///
/// let url = Url::parse("https://Shop.Example.com:8443/cart").unwrap();
/// assert_eq!(extract_domain(&url), Some("shop.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}
