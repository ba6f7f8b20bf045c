use crate::UrlError;
use url::Url;

/// Schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Canonicalizes a URL into the form used as a frontier and store key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove fragment (everything after #)
///
/// Host lowercasing and default-port removal come from the `url` crate's
/// own serialization.
///
/// # Examples
///
/// ```
/// use aisans_crawler::url::canonicalize_url;
///
/// let url = canonicalize_url("http://A.TEST/page#top").unwrap();
/// assert_eq!(url.as_str(), "http://a.test/page");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_parsed(url)
}

fn canonicalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - fragment-only links (same page anchors)
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .and_then(|absolute| canonicalize_parsed(absolute).ok())
}
