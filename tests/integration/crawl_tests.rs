//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawl
//! sessions end-to-end through `CrawlService` into an in-memory store.

use scrape_n_serve::config::{Config, CrawlerConfig};
use scrape_n_serve::crawler::CrawlService;
use scrape_n_serve::storage::{ItemQuery, SessionStatus, SqliteStorage, Storage};
use scrape_n_serve::ScrapeError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delays
fn create_test_config(max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            request_delay: 0,
            random_delay: 0,
            request_timeout: 2_000,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn create_service(max_depth: u32) -> CrawlService<SqliteStorage> {
    service_with_config(create_test_config(max_depth))
}

fn service_with_config(config: Config) -> CrawlService<SqliteStorage> {
    let storage = Arc::new(SqliteStorage::open_in_memory().expect("in-memory database"));
    CrawlService::new(config, "test-hash".to_string(), storage).expect("service")
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_product_page_yields_one_item() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><body><div class="product">
            <h1 class="product-title">Widget</h1><span class="price">$12.00</span>
        </div></body></html>"#,
    )
    .await;

    let service = create_service(2);
    let summary = service
        .run_crawl(&format!("{}/", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 1);
    assert_eq!(summary.pages_fetched, 1);

    let (items, total) = service.storage().list_items(&ItemQuery::default()).unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].item.title, "Widget");
    assert_eq!(items[0].item.price, 12.0);
    assert_eq!(items[0].item.url, format!("{}/", server.uri()));
}

#[tokio::test]
async fn test_page_without_title_persists_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body><article><p>Hello</p></article></body></html>").await;

    let service = create_service(2);
    let summary = service
        .run_crawl(&format!("{}/", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 0);
    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(service.storage().item_stats().unwrap().total_items, 0);
}

#[tokio::test]
async fn test_depth_bound_is_respected() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<h1>Root</h1><a href="/a">a</a>"#).await;
    mount_page(&server, "/a", r#"<h1>A</h1><a href="/b">b</a>"#).await;
    mount_page(&server, "/b", r#"<h1>B</h1><a href="/c">c</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html("<h1>C</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service(10);
    let summary = service
        .run_crawl(&format!("{}/", server.uri()), Some(2))
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 3);
    assert_eq!(summary.pages_fetched, 3);
}

#[tokio::test]
async fn test_out_of_scope_host_never_fetched() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;

    // Same loopback interface, reached through a different hostname
    let other_port = url::Url::parse(&other.uri()).unwrap().port().unwrap();
    mount_page(
        &site,
        "/",
        format!(
            r##"<h1>Home</h1>
               <a href="/x">relative</a>
               <a href="http://localhost:{}/y">elsewhere</a>
               <a href="javascript:void(0)">js</a>
               <a href="#top">top</a>"##,
            other_port
        ),
    )
    .await;
    mount_page(&site, "/x", "<h1>X</h1>").await;

    Mock::given(method("GET"))
        .respond_with(html("<h1>Y</h1>"))
        .expect(0)
        .mount(&other)
        .await;

    let service = create_service(2);
    let summary = service
        .run_crawl(&format!("{}/", site.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 2);
    assert_eq!(summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_relative_links_followed_outside_allow_list() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<h1>Home</h1><a href="/x">x</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html("<h1>X</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(2);
    config.crawler.allowed_domains = vec!["a.com".to_string()];
    let service = service_with_config(config);
    let summary = service
        .run_crawl(&format!("{}/", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.items_processed, 2);
}

#[tokio::test]
async fn test_redirect_to_other_host_not_persisted() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    let other_port = url::Url::parse(&other.uri()).unwrap().port().unwrap();
    let foreign = format!("http://localhost:{}/y", other_port);

    mount_page(&site, "/", r#"<h1>Home</h1><a href="/go">go</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", foreign.as_str()))
        .mount(&site)
        .await;
    mount_page(&other, "/y", "<h1>Foreign</h1>").await;

    let service = create_service(2);
    let summary = service
        .run_crawl(&format!("{}/", site.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 1);
    assert_eq!(summary.pages_failed, 1);

    let storage = service.storage();
    assert!(storage.get_item_by_url(&foreign).unwrap().is_none());
    assert_eq!(storage.item_stats().unwrap().total_items, 1);
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<h1>Shop</h1><a href="/p/1">one</a><a href="/p/2">two</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/p/1",
        r#"<h1 class="product-title">One</h1><span class="price">$1.00</span>"#,
    )
    .await;
    mount_page(
        &server,
        "/p/2",
        r#"<h1 class="product-title">Two</h1><span class="price">£2,000.50</span>"#,
    )
    .await;

    let service = create_service(1);
    let start = format!("{}/", server.uri());

    let first = service.run_crawl(&start, None).await.unwrap();
    assert_eq!(first.items_processed, 3);

    let second = service.run_crawl(&start, None).await.unwrap();
    assert_eq!(second.items_processed, 0);

    let storage = service.storage();
    assert_eq!(storage.item_stats().unwrap().total_items, 3);
    let two = storage
        .get_item_by_url(&format!("{}/p/2", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(two.item.price, 2000.5);

    let sessions = storage.list_sessions(10).unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.status == SessionStatus::Completed));
    assert_eq!(sessions[0].items_processed, 0);
    assert_eq!(sessions[1].items_processed, 3);
    assert_eq!(sessions[1].config_hash, "test-hash");
}

#[tokio::test]
async fn test_only_one_session_at_a_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<h1>Slow</h1>").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let service = create_service(1);
    let start = format!("{}/", server.uri());

    assert!(service.start_crawl(&start, None).unwrap());
    assert!(service.is_crawl_running());
    assert!(!service.start_crawl(&start, None).unwrap());
    assert!(matches!(
        service.run_crawl(&start, None).await,
        Err(ScrapeError::AlreadyRunning)
    ));
    assert!(service.crawl_summary().is_none());

    service.wait_for_completion().await.unwrap();

    assert!(!service.is_crawl_running());
    let summary = service.crawl_summary().unwrap();
    assert_eq!(summary.items_processed, 1);

    // The guard is free again
    assert!(service.run_crawl(&start, None).await.is_ok());
}

#[tokio::test]
async fn test_failures_do_not_abort_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<h1>Home</h1>
           <a href="/missing">404</a>
           <a href="/broken">500</a>
           <a href="/doc.pdf">pdf</a>
           <a href="/ok">ok</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<h1>Fine</h1>").await;

    let service = create_service(1);
    let summary = service
        .run_crawl(&format!("{}/", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 2);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.pages_failed, 3);
}

#[tokio::test]
async fn test_listing_page_feeds_products() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/shop",
        r#"<h1>Catalog</h1>
           <div class="product-grid">
               <a href="/item/1?utm_source=grid">One</a>
               <a href="/item/1#reviews">One again</a>
           </div>
           <nav class="pagination"><a href="/shop?page=2">2</a></nav>"#,
    )
    .await;
    mount_page(
        &server,
        "/item/1",
        r#"<h1 class="product-title">One</h1><span class="price">$5</span>
           <img class="product-image" src="/img/1.png">
           <meta property="og:site_name" content="Test Shop">"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/shop"))
        .and(wiremock::matchers::query_param("page", "2"))
        .respond_with(html("<h1>Catalog page 2</h1>"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(1);
    let summary = service
        .run_crawl(&format!("{}/shop", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(summary.items_processed, 3);
    assert_eq!(summary.product_candidates, 1);
    assert_eq!(summary.unique_images, 1);

    let item = service
        .storage()
        .get_item_by_url(&format!("{}/item/1", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(item.item.image_url, format!("{}/img/1.png", server.uri()));
    assert_eq!(
        item.item.metadata.get("site_name").map(String::as_str),
        Some("Test Shop")
    );
}

#[tokio::test]
async fn test_referer_sent_for_child_pages() {
    let server = MockServer::start().await;
    let start = format!("{}/", server.uri());
    mount_page(&server, "/", r#"<h1>Home</h1><a href="/child">child</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/child"))
        .and(header("referer", start.as_str()))
        .respond_with(html("<h1>Child</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let service = create_service(1);
    let summary = service.run_crawl(&start, None).await.unwrap();
    assert_eq!(summary.items_processed, 2);
}

#[tokio::test]
async fn test_invalid_start_url_rejected() {
    let service = create_service(1);
    assert!(matches!(
        service.start_crawl("mailto:someone@example.com", None),
        Err(ScrapeError::InvalidStartUrl { .. })
    ));
    assert!(!service.is_crawl_running());
}
