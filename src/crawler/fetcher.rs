//! HTTP fetcher implementation
//!
//! This module owns the transport seam of the crawler:
//! - The `Fetcher` trait the coordinator depends on
//! - `HttpFetcher`, the reqwest-backed implementation
//! - Building HTTP clients with the configured identity
//! - Error classification into `FetchError`

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed when redirects are enabled
const MAX_REDIRECTS: usize = 10;

/// A single page request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// The URL to fetch
    pub url: Url,
    /// Abort the fetch after this long
    pub timeout: Duration,
    /// Page that linked here, sent as `Referer`
    pub referer: Option<String>,
}

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Reasons a fetch produced no page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got '{content_type}'")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Transport used by the crawler to retrieve pages
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `follow_redirects` - Follow up to 10 redirects when true, none otherwise
///
/// # Example
///
/// ```no_run
/// use scrape_n_serve::config::UserAgentConfig;
/// use scrape_n_serve::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), true).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    follow_redirects: bool,
) -> Result<Client, reqwest::Error> {
    let policy = if follow_redirects {
        Policy::limited(MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(config.identity())
        .connect_timeout(Duration::from_secs(10))
        .redirect(policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for content types the extractors can handle
///
/// A missing header is given the benefit of the doubt.
fn is_html(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    lowered.is_empty() || lowered.contains("text/html") || lowered.contains("application/xhtml")
}

/// reqwest-backed `Fetcher`
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
}

impl HttpFetcher {
    /// Creates a fetcher from the identity config
    ///
    /// When the config carries a user-agent pool, each request picks one of
    /// them at random instead of the identity string.
    pub fn new(config: &UserAgentConfig, follow_redirects: bool) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, follow_redirects)?,
            user_agents: config.pool.clone(),
        })
    }

    fn pick_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let index = rand::random_range(0..self.user_agents.len());
        self.user_agents.get(index).map(String::as_str)
    }

    fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let mut builder = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout);

        if let Some(agent) = self.pick_user_agent() {
            builder = builder.header(USER_AGENT, agent);
        }
        if let Some(referer) = &request.referer {
            builder = builder.header(REFERER, referer.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify_error(&request.url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: final_url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: final_url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: final_url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(url: &str) -> FetchRequest {
        FetchRequest {
            url: Url::parse(url).unwrap(),
            timeout: Duration::from_secs(5),
            referer: None,
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&UserAgentConfig::default(), true).is_ok());
        assert!(build_http_client(&UserAgentConfig::default(), false).is_ok());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(is_html(""));
        assert!(!is_html("application/pdf"));
        assert!(!is_html("image/png"));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/p"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>Hi</h1>", "text/html"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), true).unwrap();
        let page = fetcher
            .fetch(&request(&format!("{}/p", server.uri())))
            .await
            .unwrap();

        assert_eq!(page.status_code, 200);
        assert_eq!(page.body, "<h1>Hi</h1>");
        assert!(page.content_type.contains("text/html"));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), true).unwrap();
        let result = fetcher.fetch(&request(&format!("{}/gone", server.uri()))).await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_non_html_is_content_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), true).unwrap();
        let result = fetcher.fetch(&request(&format!("{}/doc.pdf", server.uri()))).await;
        assert!(matches!(result, Err(FetchError::ContentMismatch { .. })));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>slow</p>", "text/html")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), true).unwrap();
        let mut req = request(&format!("{}/slow", server.uri()));
        req.timeout = Duration::from_millis(100);
        let result = fetcher.fetch(&req).await;
        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_referer_and_pool_agent_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("referer", "https://a.com/list"))
            .and(header("user-agent", "PoolAgent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>ok</p>", "text/html"))
            .expect(1)
            .mount(&server)
            .await;

        let config = UserAgentConfig {
            pool: vec!["PoolAgent/1.0".to_string()],
            ..UserAgentConfig::default()
        };
        let fetcher = HttpFetcher::new(&config, true).unwrap();
        let mut req = request(&format!("{}/item", server.uri()));
        req.referer = Some("https://a.com/list".to_string());

        assert!(fetcher.fetch(&req).await.is_ok());
    }

    #[tokio::test]
    async fn test_redirect_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", "/new"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>new</p>", "text/html"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&UserAgentConfig::default(), true).unwrap();
        let page = fetcher
            .fetch(&request(&format!("{}/old", server.uri())))
            .await
            .unwrap();
        assert_eq!(page.final_url.path(), "/new");

        let strict = HttpFetcher::new(&UserAgentConfig::default(), false).unwrap();
        let result = strict.fetch(&request(&format!("{}/old", server.uri()))).await;
        assert!(matches!(result, Err(FetchError::Status { status: 301, .. })));
    }
}
