//! Scope policy for discovered links
//!
//! Decides whether a link found on a page may enter the frontier. Links are
//! judged by their raw `href` so that host-relative links never depend on how
//! the base page was reached.

use crate::config::CrawlerConfig;
use crate::url::domain::extract_domain;
use crate::url::matcher::matches_any;
use url::Url;

/// Schemes that never lead to a crawlable page
const REJECTED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// The allowed and disallowed host sets of one crawl session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePolicy {
    allowed: Vec<String>,
    disallowed: Vec<String>,
}

impl ScopePolicy {
    /// Creates a policy from explicit host lists (wildcards allowed)
    pub fn new(allowed: Vec<String>, disallowed: Vec<String>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|h| h.to_lowercase()).collect(),
            disallowed: disallowed.into_iter().map(|h| h.to_lowercase()).collect(),
        }
    }

    /// Builds the policy for a session seeded at `start`
    ///
    /// Without configured allowed domains the session is confined to the
    /// start host. Every allowed host pulls in the other members of its
    /// domain group.
    pub fn for_session(start: &Url, config: &CrawlerConfig) -> Self {
        let mut allowed: Vec<String> = if config.allowed_domains.is_empty() {
            extract_domain(start).into_iter().collect()
        } else {
            config.allowed_domains.clone()
        };

        let grouped: Vec<String> = allowed
            .iter()
            .flat_map(|host| config.domain_group_for(host))
            .collect();
        for host in grouped {
            if !allowed.iter().any(|h| h.eq_ignore_ascii_case(&host)) {
                allowed.push(host);
            }
        }

        Self::new(allowed, config.disallowed_domains.clone())
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    pub fn disallowed(&self) -> &[String] {
        &self.disallowed
    }

    /// Whether a host passes the allow and deny lists
    pub fn host_allowed(&self, host: &str) -> bool {
        (self.allowed.is_empty() || matches_any(&self.allowed, host))
            && !matches_any(&self.disallowed, host)
    }

    /// Checks a raw link found on the page at `base`
    pub fn is_in_scope(&self, candidate: &str, base: &Url) -> bool {
        is_in_scope(candidate, base, &self.allowed, &self.disallowed)
    }

    /// Resolves an in-scope link to an absolute URL
    ///
    /// Returns None when the link is out of scope or cannot be resolved.
    pub fn resolve(&self, candidate: &str, base: &Url) -> Option<Url> {
        if !self.is_in_scope(candidate, base) {
            return None;
        }
        base.join(candidate.trim())
            .ok()
            .filter(|url| url.scheme() == "http" || url.scheme() == "https")
    }
}

/// Decides whether a discovered link may be followed
///
/// # Rules
///
/// - Empty links, pure fragments and `javascript:`/`mailto:`/`tel:`/`data:`
///   links are rejected
/// - Host-relative links (a single leading `/`) are accepted unconditionally
/// - Protocol-relative links (`//host/...`) are treated as absolute
/// - Other links are resolved against `base` and their hostname must be in
///   `allowed` (or `allowed` is empty) and not in `disallowed`
/// - Malformed links are rejected without error
///
/// # Examples
///
/// ```
/// use scrape_n_serve::url::is_in_scope;
/// use url::Url;
///
/// let base = Url::parse("https://a.com/").unwrap();
/// let allowed = vec!["a.com".to_string()];
/// assert!(is_in_scope("https://a.com/x", &base, &allowed, &[]));
/// assert!(!is_in_scope("https://b.com/y", &base, &allowed, &[]));
/// assert!(is_in_scope("/x", &base, &allowed, &[]));
/// ```
pub fn is_in_scope(candidate: &str, base: &Url, allowed: &[String], disallowed: &[String]) -> bool {
    let candidate = candidate.trim();

    if candidate.is_empty() || candidate.starts_with('#') {
        return false;
    }

    let lowered = candidate.to_ascii_lowercase();
    if REJECTED_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return false;
    }

    if candidate.starts_with('/') && !candidate.starts_with("//") {
        return true;
    }

    let resolved = match base.join(candidate) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!("Dropping malformed link {}: {}", candidate, e);
            return false;
        }
    };

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return false;
    }

    match extract_domain(&resolved) {
        Some(host) => {
            (allowed.is_empty() || matches_any(allowed, &host)) && !matches_any(disallowed, &host)
        }
        None => false,
    }
}
