use url::Url;

/// Extracts the robots.txt origin key from a URL
///
/// robots.txt is scoped to scheme, host and port, so the key keeps all three.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use aisans_crawler::url::robots_origin;
///
/// let url = Url::parse("https://Example.com/path?q=1").unwrap();
/// assert_eq!(robots_origin(&url), Some("https://example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(robots_origin(&url), Some("http://127.0.0.1:8080".to_string()));
/// ```
pub fn robots_origin(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Some(format!("{}://{}", url.scheme(), host)),
    }
}

/// Builds the robots.txt URL for an origin key
pub fn robots_url(origin: &str) -> Option<Url> {
    Url::parse(&format!("{}/robots.txt", origin)).ok()
}
