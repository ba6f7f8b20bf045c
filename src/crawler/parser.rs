//! HTML parser for extracting text, links and the page title
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Visible text for indexing
//! - Links to follow (from <a> tags)

use crate::crawler::{PageParser, ParseError, ParsedPage};
use crate::url::resolve_link;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never counts as page content
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// HTML implementation of `PageParser` built on `scraper`
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that is not HTTP(S) after resolution
///
/// Links are de-duplicated in first-seen order. `rel="nofollow"` links are
/// followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for HtmlParser {
    fn parse(&self, content: &str, base_url: &Url) -> Result<ParsedPage, ParseError> {
        if content.contains('\0') {
            return Err(ParseError::Unsupported("binary content".to_string()));
        }

        let document = Html::parse_document(content);

        Ok(ParsedPage {
            title: extract_title(&document),
            text: extract_text(&document),
            links: extract_links(&document, base_url),
        })
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| normalize_whitespace(element.text()))
        .filter(|s| !s.is_empty())
}

/// Extracts visible text from `<body>` (or the whole document when there is
/// no body), skipping non-content elements
fn extract_text(document: &Html) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                ElementRef::wrap(ancestor)
                    .map_or(false, |el| NON_CONTENT_TAGS.contains(&el.value().name()))
            });
            if !hidden {
                words.extend(text.split_whitespace());
            }
        }
    }

    words.join(" ")
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(absolute_url) = resolve_link(href, base_url) {
            let absolute_url = absolute_url.to_string();
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

fn normalize_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn parse(html: &str) -> ParsedPage {
        HtmlParser::new().parse(html, &base_url()).unwrap()
    }

    #[test]
    fn test_extract_title() {
        let parsed = parse(r#"<html><head><title>Test Page</title></head><body></body></html>"#);
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let parsed = parse("<html><head><title>\n  Test \n Page  </title></head><body></body></html>");
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let parsed = parse(r#"<html><head></head><body></body></html>"#);
        assert_eq!(parsed.title, None);

        let parsed = parse(r#"<html><head><title>   </title></head><body></body></html>"#);
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_extract_text_normalizes_whitespace() {
        let parsed = parse(
            "<html><head><title>T</title></head><body><h1>Hello</h1>\n\n<p>  big\tworld </p></body></html>",
        );
        assert_eq!(parsed.text, "Hello big world");
    }

    #[test]
    fn test_text_skips_script_and_style() {
        let parsed = parse(
            r#"<html><head><style>body { color: red; }</style></head>
            <body><script>var x = 1;</script><p>Visible</p>
            <noscript>enable js</noscript><template><p>hidden</p></template></body></html>"#,
        );
        assert_eq!(parsed.text, "Visible");
    }

    #[test]
    fn test_empty_body_gives_empty_text() {
        let parsed = parse("<html><head><title>Only title</title></head><body></body></html>");
        assert_eq!(parsed.text, "");
    }

    #[test]
    fn test_extract_absolute_link() {
        let parsed = parse(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_extract_relative_link() {
        let parsed = parse(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_relative_path_link() {
        let parsed = parse(r#"<html><body><a href="other">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let parsed = parse(
            r#"<html><body>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="tel:+1234567890">Call</a>
            <a href="data:text/html,<h1>Test</h1>">Data</a>
            <a href="ftp://example.com/file">FTP</a>
            </body></html>"#,
        );
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_download_link() {
        let parsed = parse(r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#);
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_fragment_only() {
        let parsed = parse(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_follow_nofollow_links() {
        let parsed = parse(r#"<html><body><a href="/page2" rel="nofollow">Link</a></body></html>"#);
        assert_eq!(parsed.links, vec!["https://example.com/page2"]);
    }

    #[test]
    fn test_links_deduplicated_in_order() {
        let parsed = parse(
            r#"<html><body>
                <a href="/b">B</a>
                <a href="/c">C</a>
                <a href="/b#frag">B again</a>
                <a href="https://example.com/c">C again</a>
                <a href="/d">D</a>
            </body></html>"#,
        );
        assert_eq!(
            parsed.links,
            vec![
                "https://example.com/b",
                "https://example.com/c",
                "https://example.com/d"
            ]
        );
    }

    #[test]
    fn test_malformed_markup_is_tolerated() {
        let parsed = parse("<html><body><p>Unclosed <b>tags <a href='/x'>link</body>");
        assert_eq!(parsed.links, vec!["https://example.com/x"]);
        assert!(parsed.text.contains("Unclosed"));
    }

    #[test]
    fn test_plain_text_content() {
        let parsed = parse("just some words");
        assert_eq!(parsed.text, "just some words");
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_binary_content_rejected() {
        let result = HtmlParser::new().parse("PNG\0\0\0", &base_url());
        assert!(matches!(result, Err(ParseError::Unsupported(_))));
    }
}
