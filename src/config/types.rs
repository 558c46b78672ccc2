use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Scrape-n-Serve
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of concurrent fetches per domain
    pub parallelism: u32,

    /// Fixed spacing between dispatches to the same domain (milliseconds)
    #[serde(rename = "request-delay")]
    pub request_delay: u64,

    /// Upper bound of the random jitter added to the spacing (milliseconds)
    #[serde(rename = "random-delay")]
    pub random_delay: u64,

    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Whether the HTTP client follows redirects
    #[serde(rename = "follow-redirects")]
    pub follow_redirects: bool,

    /// Hostnames a discovered link may point at (empty means the start host)
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Hostnames that are never crawled
    #[serde(rename = "disallowed-domains")]
    pub disallowed_domains: Vec<String>,

    /// Sets of hostnames treated as one logical site
    #[serde(rename = "domain-groups")]
    pub domain_groups: Vec<Vec<String>>,

    /// Default start URL when none is given on the command line
    #[serde(rename = "target-website")]
    pub target_website: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            parallelism: 5,
            request_delay: 1000,
            random_delay: 500,
            request_timeout: 10_000,
            follow_redirects: true,
            allowed_domains: Vec::new(),
            disallowed_domains: Vec::new(),
            domain_groups: Vec::new(),
            target_website: None,
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn random_delay(&self) -> Duration {
        Duration::from_millis(self.random_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    /// Returns every hostname that shares a domain group with `host`
    ///
    /// The host itself is not included unless it appears in a group.
    pub fn domain_group_for(&self, host: &str) -> Vec<String> {
        self.domain_groups
            .iter()
            .filter(|group| group.iter().any(|member| member.eq_ignore_ascii_case(host)))
            .flat_map(|group| group.iter().map(|member| member.to_lowercase()))
            .collect()
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Optional user-agent strings rotated at random per request
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ScrapeNServe".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/crawler".to_string(),
            contact_email: "crawler@example.com".to_string(),
            pool: Vec::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the identifying user agent: `Name/Version (+ContactURL; ContactEmail)`
    pub fn identity(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./scrape-n-serve.db".to_string(),
        }
    }
}
