//! Integration tests for the crawler
//!
//! These tests drive the full crawl cycle end-to-end, both with in-process
//! fake collaborators and with the real HTTP fetcher against wiremock mock
//! servers.

use aisans_crawler::config::{Config, ReseedConfig};
use aisans_crawler::crawler::{
    run_crawl, Coordinator, FetchError, HtmlParser, HttpFetcher, PageFetcher, StopReason,
};
use aisans_crawler::llm::{LlmError, Summarizer};
use aisans_crawler::search::{SearchError, SearchProvider, SearchResult};
use aisans_crawler::storage::{open_store, to_match_query, DocumentStore, SqliteDocumentStore};
use aisans_crawler::CrawlState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ===== Fakes =====

/// Serves canned HTML per URL and records every fetch
struct SiteFetcher {
    pages: HashMap<String, String>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl SiteFetcher {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.clone()))
                .collect(),
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.fetched)
    }
}

#[async_trait]
impl PageFetcher for SiteFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(html) => Ok(html.clone()),
            None => Err(FetchError::Network("connection refused".to_string())),
        }
    }
}

struct BrokenSummarizer;

#[async_trait]
impl Summarizer for BrokenSummarizer {
    async fn summarize(&self, _text: &str) -> Result<Option<String>, LlmError> {
        Err(LlmError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

struct EchoSummarizer;

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, text: &str) -> Result<Option<String>, LlmError> {
        Ok(Some(format!("Summary of {}", text)))
    }
}

/// Returns fixed URLs and records the queries it received
struct RecordingSearch {
    urls: Vec<String>,
    queries: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SearchProvider for RecordingSearch {
    async fn search(
        &self,
        query: &str,
        _engines: &[String],
        _limit_per_engine: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self
            .urls
            .iter()
            .map(|url| SearchResult {
                title: String::new(),
                url: url.clone(),
                snippet: String::new(),
                source_engine: "fake".to_string(),
            })
            .collect())
    }
}

struct DownSearch;

#[async_trait]
impl SearchProvider for DownSearch {
    async fn search(&self, _: &str, _: &[String], _: usize) -> Result<Vec<SearchResult>, SearchError> {
        Err(SearchError::AllEnginesFailed)
    }
}

// ===== Helpers =====

fn html(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a> "#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{}</p>{}</body></html>",
        title, body, anchors
    )
}

fn test_config(max_depth: u32, max_pages: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.max_pages = max_pages;
    config.reseed.enabled = false;
    config.summarizer.enabled = false;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.timeout_secs = 2;
    config
}

fn coordinator(config: &Config, seeds: &[&str], fetcher: impl PageFetcher + 'static) -> Coordinator {
    let seeds: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
    Coordinator::new(
        config,
        &seeds,
        Box::new(SqliteDocumentStore::new_in_memory().expect("in-memory store")),
        Box::new(fetcher),
        Box::new(HtmlParser::new()),
    )
    .expect("coordinator")
}

// ===== Fake collaborators =====

#[tokio::test]
async fn test_breadth_first_crawl_to_depth_one() {
    let fetcher = SiteFetcher::new(&[
        ("http://a.test/", html("Home", "welcome home", &["/b", "/c"])),
        ("http://a.test/b", html("B", "bravo page", &["/d"])),
        ("http://a.test/c", html("C", "charlie page", &[])),
        ("http://a.test/d", html("D", "delta page", &[])),
    ]);
    let log = fetcher.log();
    let mut coordinator = coordinator(&test_config(1, 5), &["http://a.test/"], fetcher);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stop, StopReason::FrontierExhausted);
    assert_eq!(report.pages_processed, 3);
    assert_eq!(report.documents_indexed, 3);
    assert_eq!(report.visited, 3);
    assert_eq!(report.frontier_remaining, 0);
    assert_eq!(coordinator.state(), CrawlState::Stopped);

    assert_eq!(
        *log.lock().unwrap(),
        vec!["http://a.test/", "http://a.test/b", "http://a.test/c"]
    );

    let store = coordinator.store();
    assert_eq!(store.count().unwrap(), 3);
    let home = store.get("http://a.test/").unwrap().unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(home.source_engine, "crawler");
    assert!(home.body.contains("welcome home"));
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    // Pages link to each other and to themselves
    let fetcher = SiteFetcher::new(&[
        ("http://a.test/", html("A", "alpha", &["/", "/x", "/x#frag", "http://a.test/x"])),
        ("http://a.test/x", html("X", "xray", &["/", "/x"])),
    ]);
    let log = fetcher.log();
    let mut coordinator = coordinator(&test_config(5, 50), &["http://a.test/", "http://a.test/"], fetcher);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_processed, 2);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_page_budget_is_hard_limit() {
    let links: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    let leaf_urls: Vec<String> = links.iter().map(|l| format!("http://a.test{}", l)).collect();
    let mut pages = vec![("http://a.test/", html("Hub", "hub page", &link_refs))];
    for url in &leaf_urls {
        pages.push((url.as_str(), html("Leaf", "leaf page", &[])));
    }
    let fetcher = SiteFetcher::new(&pages);
    let log = fetcher.log();
    let mut coordinator = coordinator(&test_config(2, 5), &["http://a.test/"], fetcher);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stop, StopReason::PageBudgetReached);
    assert_eq!(report.pages_processed, 5);
    assert_eq!(log.lock().unwrap().len(), 5);
    assert_eq!(coordinator.store().count().unwrap(), 5);
    assert_eq!(report.frontier_remaining, 16);
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_crawl() {
    let fetcher = SiteFetcher::new(&[
        ("http://a.test/", html("A", "alpha", &["/missing", "/ok"])),
        ("http://a.test/ok", html("OK", "still crawling", &[])),
    ]);
    let mut coordinator = coordinator(&test_config(1, 10), &["http://dead.test/", "http://a.test/"], fetcher);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_processed, 4);
    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.documents_indexed, 2);
    assert!(coordinator.store().get("http://a.test/ok").unwrap().is_some());
}

#[tokio::test]
async fn test_summarizer_failure_keeps_document() {
    let fetcher = SiteFetcher::new(&[("http://a.test/", html("A", "alpha", &[]))]);
    let mut coordinator = coordinator(&test_config(1, 5), &["http://a.test/"], fetcher)
        .with_summarizer(Box::new(BrokenSummarizer));

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.documents_indexed, 1);
    assert_eq!(report.summaries_produced, 0);
    let doc = coordinator.store().get("http://a.test/").unwrap().unwrap();
    assert!(doc.summary.is_none());
}

#[tokio::test]
async fn test_summaries_are_searchable() {
    let fetcher = SiteFetcher::new(&[("http://a.test/", html("A", "alpha", &[]))]);
    let mut coordinator = coordinator(&test_config(1, 5), &["http://a.test/"], fetcher)
        .with_summarizer(Box::new(EchoSummarizer));

    coordinator.run().await.unwrap();

    let hits = coordinator
        .store()
        .search(&to_match_query("summary"), 10)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.url, "http://a.test/");
}

#[tokio::test]
async fn test_reseed_queries_with_summary_and_dedups() {
    let fetcher = SiteFetcher::new(&[
        ("http://a.test/", html("A", "alpha", &[])),
        ("http://b.test/", html("B", "bravo", &[])),
        ("http://found.test/", html("Found", "found via search", &[])),
    ]);
    let queries = Arc::new(Mutex::new(Vec::new()));
    let search = RecordingSearch {
        urls: vec![
            "http://a.test/".to_string(),
            "http://b.test/".to_string(),
            "http://found.test/#top".to_string(),
            "not a url".to_string(),
        ],
        queries: Arc::clone(&queries),
    };
    let reseed = ReseedConfig {
        interval_pages: 1,
        ..ReseedConfig::default()
    };
    let mut coordinator = coordinator(&test_config(0, 3), &["http://a.test/", "http://b.test/"], fetcher)
        .with_summarizer(Box::new(EchoSummarizer))
        .with_reseed_config(&reseed)
        .with_search(Box::new(search));

    let report = coordinator.run().await.unwrap();

    // a.test/ is visited and b.test/ already queued: only found.test is new
    assert_eq!(report.reseed_urls_added, 1);
    assert_eq!(report.pages_processed, 3);
    assert!(coordinator.store().get("http://found.test/").unwrap().is_some());

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 3);
    assert!(queries[0].starts_with("Summary of"));
}

#[tokio::test]
async fn test_reseed_failure_is_not_fatal() {
    let fetcher = SiteFetcher::new(&[
        ("http://a.test/", html("A", "alpha", &["/b"])),
        ("http://a.test/b", html("B", "bravo", &[])),
    ]);
    let reseed = ReseedConfig {
        interval_pages: 1,
        ..ReseedConfig::default()
    };
    let mut coordinator = coordinator(&test_config(1, 10), &["http://a.test/"], fetcher)
        .with_reseed_config(&reseed)
        .with_search(Box::new(DownSearch));

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_processed, 2);
    assert_eq!(report.reseed_cycles, 0);
    assert_eq!(report.stop, StopReason::FrontierExhausted);
}

// ===== Real HTTP fetcher =====

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_crawl_respects_robots() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        html("Home", "mock home", &["/page1", "/private/secret", "/gone"]),
    )
    .await;
    mount_page(&server, "/page1", html("Page 1", "first page", &[])).await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = test_config(1, 10);
    let fetcher = HttpFetcher::new(&config.user_agent).unwrap();
    let seed = format!("{}/", server.uri());
    let mut coordinator = coordinator(&config, &[seed.as_str()], fetcher);

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.pages_processed, 4);
    assert_eq!(report.documents_indexed, 2);
    assert_eq!(report.fetch_failures, 2);
    let page1 = coordinator
        .store()
        .get(&format!("{}/page1", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(page1.title, "Page 1");
}

#[tokio::test]
async fn test_run_crawl_writes_file_backed_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/", html("Home", "indexed through files", &["/next"])).await;
    mount_page(&server, "/next", html("Next", "second document", &[])).await;

    let dir = tempfile::tempdir().unwrap();
    let seed_file = dir.path().join("seeds.txt");
    std::fs::write(&seed_file, format!("# seeds\n{}/\n\n", server.uri())).unwrap();
    let db_path = dir.path().join("index").join("aisans.db");

    let mut config = test_config(2, 10);
    config.crawler.seed_file = seed_file.to_string_lossy().to_string();
    config.output.database_path = db_path.to_string_lossy().to_string();

    let report = run_crawl(&config, "testhash").await.unwrap();
    assert_eq!(report.documents_indexed, 2);

    let store = open_store(&db_path).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    let hits = store.search(&to_match_query("second"), 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.title, "Next");

    let run = store.latest_run().unwrap().unwrap();
    assert_eq!(run.config_hash, "testhash");
    assert_eq!(run.pages_processed, 2);
}
