//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use keyword_crawler::config::{CrawlConfig, Preferences};
use keyword_crawler::crawler::run_crawl;
use keyword_crawler::output::CollectingSink;
use keyword_crawler::worker::{ChannelListener, WorkerEventKind};
use keyword_crawler::Crawler;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration seeded at the server root
fn create_test_config(server: &MockServer, keywords: &[&str], max_pages: usize) -> CrawlConfig {
    let mut config = CrawlConfig::new(
        format!("{}/", server.uri()),
        keywords.iter().map(|k| k.to_string()).collect(),
    );
    config.crawl.max_pages = max_pages;
    config.workers.fetchers = 2;
    config.workers.parsers = 2;
    config.workers.poll_interval_ms = 5;
    config.workers.shutdown_grace_ms = 500;
    config
}

fn prefs_for(config: &CrawlConfig) -> Arc<Preferences> {
    let prefs = Arc::new(Preferences::new());
    prefs.set_max_pages(config.crawl.max_pages);
    prefs
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/plain"))
        .mount(server)
        .await;
}

async fn mount_html(server: &MockServer, page: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

async fn crawl(config: CrawlConfig) -> (keyword_crawler::CrawlSummary, CollectingSink) {
    let prefs = prefs_for(&config);
    let sink = CollectingSink::new();
    let summary = run_crawl(config, prefs, sink.clone())
        .await
        .expect("crawl failed");
    (summary, sink)
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <p>Rust is fast</p>
        <a href="/page1">Page 1</a>
        <a href="/page2">Page 2</a>
        <a href="mailto:team@example.com">Mail</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/page1", "<p>Rust and more rust</p>").await;
    mount_html(&server, "/page2", "<p>Nothing here</p>").await;

    let config = create_test_config(&server, &["rust", "absent"], 100);
    let (summary, sink) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 3);
    assert_eq!(summary.total_links, 2);
    assert_eq!(summary.keywords["rust"].total_hits, 3);
    assert_eq!(summary.keywords["absent"].total_hits, 0);
    assert!((summary.keywords["rust"].avg_hits - 1.0).abs() < 1e-9);
    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(summary.robots_requests, 1);

    let reports = sink.reports();
    assert_eq!(reports.len(), 3);
    let counts: Vec<u64> = reports.iter().map(|r| r.pages_retrieved).collect();
    assert_eq!(counts, vec![1, 2, 3]);
    assert!(reports.iter().all(|r| r.page_limit == 100));
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private").await;

    mount_html(
        &server,
        "/",
        r#"<a href="/public">Public</a><a href="/private/secret">Secret</a>"#,
    )
    .await;
    mount_html(&server, "/public", "<p>open page</p>").await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hidden", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &[], 100);
    let (summary, _) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 2);
    assert_eq!(summary.fetch_failures, 1);
}

#[tokio::test]
async fn test_missing_robots_txt_is_permissive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    mount_html(&server, "/", r#"<a href="/next">next</a>"#).await;
    mount_html(&server, "/next", "<p>done</p>").await;

    let config = create_test_config(&server, &[], 100);
    let (summary, _) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 2);
    assert_eq!(summary.robots_requests, 1);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_html(
        &server,
        "/",
        r#"<a href="/doc.pdf">PDF</a><a href="/notes.txt">Notes</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("plain keyword notes", "text/plain"))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &["keyword"], 100);
    let (summary, _) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 2);
    assert_eq!(summary.keywords["keyword"].total_hits, 1);
    assert_eq!(summary.fetch_failures, 1);
}

#[tokio::test]
async fn test_page_limit_is_never_exceeded() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_html(&server, "/", &links).await;
    for i in 0..10 {
        mount_html(&server, &format!("/p{}", i), "<p>leaf</p>").await;
    }

    let mut config = create_test_config(&server, &[], 3);
    config.workers.fetchers = 4;
    let (summary, sink) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 3);
    assert_eq!(summary.page_limit, 3);
    assert_eq!(sink.len(), 3);
    assert!(sink.reports().iter().all(|r| r.pages_retrieved <= 3));
}

#[tokio::test]
async fn test_robots_fetched_once_per_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("User-agent: *\nAllow: /", "text/plain")
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_html(&server, "/", &links).await;
    for i in 0..8 {
        mount_html(&server, &format!("/p{}", i), "<p>leaf</p>").await;
    }

    let mut config = create_test_config(&server, &[], 100);
    config.workers.fetchers = 6;
    let (summary, _) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 9);
    assert_eq!(summary.robots_requests, 1);
}

#[tokio::test]
async fn test_crawl_delay_spaces_requests() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1").await;

    mount_html(&server, "/", r#"<a href="/next">next</a>"#).await;
    mount_html(&server, "/next", "<p>done</p>").await;

    let config = create_test_config(&server, &[], 100);
    let started = Instant::now();
    let (summary, _) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 2);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_blacklisted_urls_are_skipped() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    mount_html(
        &server,
        "/",
        r#"<a href="/blocked/page">Blocked</a><a href="/fine">Fine</a>"#,
    )
    .await;
    mount_html(&server, "/fine", "<p>fine</p>").await;
    Mock::given(method("GET"))
        .and(path("/blocked/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("nope", "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &[], 100);
    config.network.blacklist = vec!["BLOCKED".to_string()];
    let (summary, _) = crawl(config).await;

    assert_eq!(summary.pages_retrieved, 2);
    assert_eq!(summary.fetch_failures, 0);
}

#[tokio::test]
async fn test_shutdown_during_slow_read() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<p>late</p>", "text/html")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, &[], 100);
    config.workers.shutdown_grace_ms = 200;
    config.network.request_timeout_ms = 60_000;
    let prefs = prefs_for(&config);

    let mut crawler = Crawler::new(config, prefs).unwrap();
    let (listener, mut events) = ChannelListener::channel();
    crawler.add_listener(Arc::new(listener));
    crawler.start(CollectingSink::new()).unwrap();
    assert!(crawler.seed());

    // Wait until a fetcher is blocked on the slow page
    let mut working = false;
    for _ in 0..200 {
        if let Ok(event) = events.try_recv() {
            if matches!(event.kind, WorkerEventKind::Working) {
                working = true;
                break;
            }
        } else {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
    assert!(working, "no fetcher started working");
    assert!(!crawler.is_quiescent());

    let started = Instant::now();
    let summary = crawler.shutdown().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.pages_retrieved, 0);

    let mut shutdowns = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event.kind, WorkerEventKind::Shutdown) {
            shutdowns += 1;
        }
    }
    assert_eq!(shutdowns, 4);
}

#[tokio::test]
async fn test_worker_listener_sees_outcomes() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_html(&server, "/", r#"<a href="/gone">gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(&server, &[], 100);
    let prefs = prefs_for(&config);
    let mut crawler = Crawler::new(config, prefs).unwrap();
    let (listener, mut events) = ChannelListener::channel();
    crawler.add_listener(Arc::new(listener));

    crawler.start(CollectingSink::new()).unwrap();
    crawler.seed();
    crawler.wait_until_idle().await.unwrap();
    let summary = crawler.shutdown().await.unwrap();

    let mut succeeded = 0;
    let mut failed = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event.kind {
            WorkerEventKind::Succeeded { .. } => succeeded += 1,
            WorkerEventKind::Failed { url, .. } => failed.push(url),
            _ => {}
        }
    }

    // One fetch and one parse of the root page
    assert_eq!(succeeded, 2);
    assert_eq!(failed, vec![format!("{}/gone", server.uri())]);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.parse_failures, 0);
}
