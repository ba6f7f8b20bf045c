//! DuckDuckGo HTML endpoint scraper

use crate::search::{SearchEngine, SearchError, SearchResult, SearchResultList};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";

/// Scrapes results from DuckDuckGo's no-JavaScript HTML endpoint
pub struct DuckDuckGoEngine {
    client: Client,
    base_url: String,
}

impl DuckDuckGoEngine {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Points the engine at a different host (used by tests)
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoEngine {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> SearchResultList {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                engine: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let results = parse_results(&body, limit);
        tracing::debug!("DuckDuckGo returned {} results for '{}'", results.len(), query);
        Ok(results)
    }
}

/// Extracts organic results from a DuckDuckGo HTML results page
fn parse_results(body: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(body);
    let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
        Selector::parse(".result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for block in document.select(&result_sel) {
        if results.len() >= limit {
            break;
        }
        if block.value().classes().any(|class| class == "result--ad") {
            continue;
        }

        let Some(link) = block.select(&link_sel).next() else {
            continue;
        };
        let Some(url) = link.value().attr("href").and_then(unwrap_redirect) else {
            continue;
        };

        results.push(SearchResult {
            title: element_text(&link),
            url,
            snippet: block
                .select(&snippet_sel)
                .next()
                .map(|el| element_text(&el))
                .unwrap_or_default(),
            source_engine: "duckduckgo".to_string(),
        });
    }

    results
}

/// Resolves a result href, unwrapping `/l/?uddg=<target>` redirect links
fn unwrap_redirect(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let resolved = base.join(href).ok()?;

    let target = resolved
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned());

    Some(target.unwrap_or_else(|| resolved.to_string()))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.test/buy">Sponsored</a>
        </div>
        <div class="result results_links">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fapples.test%2Fabout%3Fx%3D1&amp;rut=abc">All <b>about</b> apples</a></h2>
            <a class="result__snippet">Apples are   a fruit.</a>
        </div>
        <div class="result results_links">
            <a class="result__a" href="https://orchard.test/">Orchard</a>
        </div>
        <div class="result results_links">
            <a class="result__a" href="https://third.test/">Third</a>
            <div class="result__snippet">Third snippet</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results() {
        let results = parse_results(RESULTS_PAGE, 10);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "All about apples");
        assert_eq!(results[0].url, "https://apples.test/about?x=1");
        assert_eq!(results[0].snippet, "Apples are a fruit.");
        assert_eq!(results[0].source_engine, "duckduckgo");
        assert_eq!(results[1].url, "https://orchard.test/");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let results = parse_results(RESULTS_PAGE, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_parse_results_on_unrelated_page() {
        assert!(parse_results("<html><body><p>No results.</p></body></html>", 5).is_empty());
    }

    #[test]
    fn test_unwrap_redirect() {
        assert_eq!(
            unwrap_redirect("/l/?uddg=https%3A%2F%2Fa.test%2F"),
            Some("https://a.test/".to_string())
        );
        assert_eq!(
            unwrap_redirect("https://b.test/page"),
            Some("https://b.test/page".to_string())
        );
        assert_eq!(unwrap_redirect(""), None);
    }

    #[tokio::test]
    async fn test_search_against_mock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("q", "apples"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .mount(&server)
            .await;

        let engine = DuckDuckGoEngine::with_base_url(Client::new(), &server.uri());
        let results = engine.search("apples", 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://apples.test/about?x=1");
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let engine = DuckDuckGoEngine::with_base_url(Client::new(), &server.uri());
        let result = engine.search("apples", 2).await;

        assert!(matches!(result, Err(SearchError::Status { status: 403, .. })));
    }
}
