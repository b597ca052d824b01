//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the package index and the
//! GitHub API, and exercise the full crawl cycle end-to-end: pagination,
//! dedup, enrichment, retry classification, caching, and checkpointing.

use pypi_harvester::config::{Config, GithubConfig, HarvesterConfig, OutputConfig};
use pypi_harvester::engine::{CrawlEngine, CrawlProgress, CrawlState, ProgressStore};
use pypi_harvester::fetch::{fetch_with_retry, CachingFetcher, RateLimiter, RetryPolicy};
use pypi_harvester::record::Record;
use pypi_harvester::sink::{RecordSink, SinkError, SinkResult};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory sink that records every insert, optionally failing on one title
#[derive(Default)]
struct MemorySink {
    records: Vec<Record>,
    fail_on_title: Option<String>,
}

impl RecordSink for MemorySink {
    fn insert(&mut self, record: &Record) -> SinkResult<()> {
        if self.fail_on_title.as_deref() == Some(record.title.as_str()) {
            return Err(SinkError::Rejected(format!(
                "test sink rejects {}",
                record.title
            )));
        }
        self.records.push(record.clone());
        Ok(())
    }
}

/// Test configuration pointed at the mock servers, with no delays
fn test_config(index_url: &str, github_url: &str, checkpoint_path: &str) -> Config {
    Config {
        harvester: HarvesterConfig {
            search_url: format!("{}/search/?q=python", index_url),
            index_base_url: index_url.to_string(),
            request_timeout_secs: 5,
            retry_attempts: 3,
            backoff_base_secs: 0,
            cooldown_secs: 0,
            jitter_min_secs: 0.0,
            jitter_max_secs: 0.0,
            cache_expiry_secs: 3600,
            rate_limit_calls: 1000,
            rate_limit_period_secs: 60,
        },
        github: GithubConfig {
            api_base_url: github_url.to_string(),
            // No token in the environment of these tests, so the
            // unauthenticated quota applies; keep it high enough to never
            // throttle.
            rate_limit_calls_unauthenticated: 1000,
            ..GithubConfig::default()
        },
        output: OutputConfig {
            database_path: ":memory:".to_string(),
            checkpoint_path: checkpoint_path.to_string(),
        },
    }
}

fn listing_page(links: &[&str]) -> String {
    let cards: String = links
        .iter()
        .map(|link| format!(r#"<a class="package-snippet" href="{}">card</a>"#, link))
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

async fn mount_listing(server: &MockServer, page: u32, links: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path("/search/"))
        .and(query_param("q", "python"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(links)))
        .expect(expected)
        .mount(server)
        .await;
}

fn no_delay_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        backoff_base: Duration::ZERO,
        cooldown: Duration::ZERO,
        jitter_min: 0.0,
        jitter_max: 0.0,
    }
}

fn quick_fetcher(cache_expiry: Duration, timeout: Duration) -> CachingFetcher {
    let limiter = RateLimiter::new(1000, Duration::from_secs(60));
    CachingFetcher::new(limiter, cache_expiry, timeout).expect("failed to build fetcher")
}

#[tokio::test]
async fn test_end_to_end_two_page_crawl() {
    let index = MockServer::start().await;
    let github = MockServer::start().await;

    mount_listing(&index, 1, &["/project/a/", "/project/b/"], 1).await;
    mount_listing(&index, 2, &[], 1).await;

    Mock::given(method("GET"))
        .and(path("/project/a/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <h1 class="package-header__name">a</h1>
                <a class="vertical-tabs__tabs" href="https://github.com/x/a">Repo</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&index)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/b/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><h1 class="package-header__name">b</h1></body></html>"#,
        ))
        .expect(1)
        .mount(&index)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/x/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"name": "a", "stargazers_count": 42}"#),
        )
        .expect(1)
        .mount(&github)
        .await;

    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("progress.json");
    let config = test_config(&index.uri(), &github.uri(), checkpoint.to_str().unwrap());

    let mut engine =
        CrawlEngine::new(config, MemorySink::default(), false).expect("failed to build engine");
    engine.run().await.expect("crawl failed");

    assert_eq!(engine.state(), CrawlState::Exhausted);

    let records = &engine.sink().records;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "a");
    assert_eq!(
        records[0].repo.as_ref().map(|r| r.stargazers_count),
        Some(42)
    );
    assert_eq!(records[1].title, "b");
    assert_eq!(records[1].repo, None);

    // Checkpoint on disk reflects the finished run
    let saved = ProgressStore::new(&checkpoint).load();
    assert!(saved.visited_projects.contains("/project/a/"));
    assert!(saved.visited_projects.contains("/project/b/"));
    assert_eq!(saved.last_page, 2);
}

#[tokio::test]
async fn test_resume_skips_visited_projects() {
    let index = MockServer::start().await;
    let github = MockServer::start().await;

    mount_listing(&index, 1, &["/project/a/", "/project/b/"], 1).await;
    mount_listing(&index, 2, &[], 1).await;

    // Already-visited project must never be fetched again
    Mock::given(method("GET"))
        .and(path("/project/a/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&index)
        .await;

    Mock::given(method("GET"))
        .and(path("/project/b/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><h1 class="package-header__name">b</h1></body></html>"#,
        ))
        .expect(1)
        .mount(&index)
        .await;

    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("progress.json");

    // Simulate a prior run that processed /project/a/ on page 1
    let store = ProgressStore::new(&checkpoint);
    let mut prior = CrawlProgress::default();
    prior.visited_projects.insert("/project/a/".to_string());
    prior.last_page = 1;
    store.save(&prior).unwrap();

    let config = test_config(&index.uri(), &github.uri(), checkpoint.to_str().unwrap());
    let mut engine =
        CrawlEngine::new(config, MemorySink::default(), false).expect("failed to build engine");
    engine.run().await.expect("crawl failed");

    let records = &engine.sink().records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "b");

    let saved = store.load();
    assert_eq!(saved.visited_projects.len(), 2);
    assert_eq!(saved.last_page, 2);
}

#[tokio::test]
async fn test_fresh_flag_ignores_checkpoint() {
    let index = MockServer::start().await;
    let github = MockServer::start().await;

    mount_listing(&index, 1, &[], 1).await;

    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("progress.json");

    let store = ProgressStore::new(&checkpoint);
    let mut prior = CrawlProgress::default();
    prior.last_page = 7;
    store.save(&prior).unwrap();

    let config = test_config(&index.uri(), &github.uri(), checkpoint.to_str().unwrap());
    let mut engine =
        CrawlEngine::new(config, MemorySink::default(), true).expect("failed to build engine");
    engine.run().await.expect("crawl failed");

    // Fresh run started from page 1, not the checkpointed page 7
    assert_eq!(engine.progress().last_page, 1);
}

#[tokio::test]
async fn test_sink_failure_marks_visited_and_continues() {
    let index = MockServer::start().await;
    let github = MockServer::start().await;

    mount_listing(&index, 1, &["/project/a/", "/project/b/"], 1).await;
    mount_listing(&index, 2, &[], 1).await;

    for (route, title) in [("/project/a/", "a"), ("/project/b/", "b")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><body><h1 class="package-header__name">{}</h1></body></html>"#,
                title
            )))
            .expect(1)
            .mount(&index)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("progress.json");
    let config = test_config(&index.uri(), &github.uri(), checkpoint.to_str().unwrap());

    let sink = MemorySink {
        fail_on_title: Some("a".to_string()),
        ..MemorySink::default()
    };
    let mut engine = CrawlEngine::new(config, sink, false).expect("failed to build engine");
    engine.run().await.expect("crawl failed");

    // The failed insert was not retried, but the item still counts as visited
    assert_eq!(engine.sink().records.len(), 1);
    assert_eq!(engine.sink().records[0].title, "b");
    assert!(engine.progress().visited_projects.contains("/project/a/"));
    assert!(engine.progress().visited_projects.contains("/project/b/"));
}

#[tokio::test]
async fn test_enrichment_not_found_leaves_record_unenriched() {
    let index = MockServer::start().await;
    let github = MockServer::start().await;

    mount_listing(&index, 1, &["/project/gone/"], 1).await;
    mount_listing(&index, 2, &[], 1).await;

    Mock::given(method("GET"))
        .and(path("/project/gone/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <h1 class="package-header__name">gone</h1>
                <a href="https://github.com/x/gone">src</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&index)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/x/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"message": "Not Found", "documentation_url": "https://docs.github.com"}"#,
        ))
        .expect(1)
        .mount(&github)
        .await;

    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("progress.json");
    let config = test_config(&index.uri(), &github.uri(), checkpoint.to_str().unwrap());

    let mut engine =
        CrawlEngine::new(config, MemorySink::default(), false).expect("failed to build engine");
    engine.run().await.expect("crawl failed");

    let records = &engine.sink().records;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].repo_url.as_deref(), Some("https://github.com/x/gone"));
    assert_eq!(records[0].repo, None);
}

#[tokio::test]
async fn test_cache_hit_skips_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("cached body"))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_secs(5));
    let url = format!("{}/page", server.uri());

    let first = fetcher.fetch(&url).await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.body, "cached body");

    let second = fetcher.fetch(&url).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.body, "cached body");
}

#[tokio::test]
async fn test_cache_expiry_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .expect(2)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_millis(100), Duration::from_secs(5));
    let url = format!("{}/page", server.uri());

    let first = fetcher.fetch(&url).await.unwrap();
    assert!(!first.from_cache);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let second = fetcher.fetch(&url).await.unwrap();
    assert!(!second.from_cache);
}

#[tokio::test]
async fn test_404_aborts_after_single_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_secs(5));
    let url = format!("{}/missing", server.uri());

    let result = fetch_with_retry(&mut fetcher, &url, &no_delay_policy(3)).await;
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_403_cooldown_then_retries_to_exhaustion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_secs(5));
    let url = format!("{}/limited", server.uri());

    let policy = RetryPolicy {
        cooldown: Duration::from_millis(50),
        ..no_delay_policy(2)
    };
    let start = std::time::Instant::now();
    let result = fetch_with_retry(&mut fetcher, &url, &policy).await;

    assert_eq!(result, None);
    // One cooldown sleep between the two attempts
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_403_on_final_attempt_skips_cooldown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_secs(5));
    let url = format!("{}/limited", server.uri());

    // Single attempt: nothing follows, so the cooldown must not run
    let policy = RetryPolicy {
        cooldown: Duration::from_secs(30),
        ..no_delay_policy(1)
    };
    let start = std::time::Instant::now();
    let result = fetch_with_retry(&mut fetcher, &url, &policy).await;

    assert_eq!(result, None);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_500_exhausts_all_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_secs(5));
    let url = format!("{}/flaky", server.uri());

    let result = fetch_with_retry(&mut fetcher, &url, &no_delay_policy(3)).await;
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_timeout_retries_then_exhausts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_millis(100));
    let url = format!("{}/slow", server.uri());

    let result = fetch_with_retry(&mut fetcher, &url, &no_delay_policy(2)).await;
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_transport_error_aborts_immediately() {
    // Nothing listens on this port; the connection is refused
    let mut fetcher = quick_fetcher(Duration::from_secs(3600), Duration::from_secs(5));

    let start = std::time::Instant::now();
    let result = fetch_with_retry(&mut fetcher, "http://127.0.0.1:1/", &no_delay_policy(5)).await;

    assert_eq!(result, None);
    // Aborted on the first attempt, no backoff sleeps
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_failed_listing_fetch_ends_crawl() {
    let index = MockServer::start().await;
    let github = MockServer::start().await;

    // Listing page 1 is permanently unavailable
    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&index)
        .await;

    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("progress.json");
    let config = test_config(&index.uri(), &github.uri(), checkpoint.to_str().unwrap());

    let mut engine =
        CrawlEngine::new(config, MemorySink::default(), false).expect("failed to build engine");
    engine.run().await.expect("crawl should end cleanly");

    assert_eq!(engine.state(), CrawlState::Exhausted);
    assert!(engine.sink().records.is_empty());

    // The ending page is checkpointed even though it produced nothing
    let saved = ProgressStore::new(&checkpoint).load();
    assert_eq!(saved.last_page, 1);
    assert!(saved.visited_projects.is_empty());
}
