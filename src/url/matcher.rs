/// Checks if a hostname matches a domain pattern
///
/// Two pattern forms are supported:
/// 1. Exact: "shop.example.com" matches only that host
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain of it
///
/// Comparison ignores ASCII case.
///
/// # Examples
///
/// ```
/// use scrape_n_serve::url::matches_wildcard;
///
/// assert!(matches_wildcard("example.com", "EXAMPLE.com"));
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "cdn.shop.example.com"));
/// assert!(!matches_wildcard("*.example.com", "notexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}

/// Returns true if `host` matches at least one of `patterns`
pub fn matches_any<S: AsRef<str>>(patterns: &[S], host: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_wildcard(pattern.as_ref(), host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_wildcard("a.com", "a.com"));
        assert!(!matches_wildcard("a.com", "b.com"));
        assert!(!matches_wildcard("a.com", "sub.a.com"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches_wildcard("Shop.Example.com", "shop.example.COM"));
        assert!(matches_wildcard("*.EXAMPLE.com", "Cdn.example.com"));
    }

    #[test]
    fn test_wildcard_matches_bare_and_nested() {
        assert!(matches_wildcard("*.example.com", "example.com"));
        assert!(matches_wildcard("*.example.com", "blog.example.com"));
        assert!(matches_wildcard("*.example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_wildcard_rejects_suffix_lookalikes() {
        assert!(!matches_wildcard("*.example.com", "myexample.com"));
        assert!(!matches_wildcard("*.example.com", "example.com.org"));
        assert!(!matches_wildcard("*.example.com", ""));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["a.com".to_string(), "*.b.com".to_string()];
        assert!(matches_any(&patterns, "a.com"));
        assert!(matches_any(&patterns, "x.b.com"));
        assert!(!matches_any(&patterns, "c.com"));

        let empty: Vec<String> = vec![];
        assert!(!matches_any(&empty, "a.com"));
    }
}
