//! URL handling for the crawler
//!
//! This module provides URL parsing, host keys for the politeness cache,
//! link resolution and blacklist matching.

mod blacklist;
mod links;

use crate::CrawlError;
use url::Url;

// Re-export main functions
pub use blacklist::is_blacklisted;
pub use links::resolve_link;

/// Parses `raw` as an absolute http(s) URL
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(CrawlError::InvalidUrl)` - The string is not a URL
/// * `Err(CrawlError::UnsupportedScheme)` - The URL is not http or https
pub fn parse_http_url(raw: &str) -> Result<Url, CrawlError> {
    let url = Url::parse(raw).map_err(|source| CrawlError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    if is_http(&url) {
        Ok(url)
    } else {
        Err(CrawlError::UnsupportedScheme {
            url: raw.to_string(),
        })
    }
}

pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Returns the politeness key for `url`: `scheme://host[:port]`
///
/// Default ports are omitted and other ports are kept. Returns `None` for
/// URLs with an opaque origin, such as `data:` URLs.
///
/// # Examples
///
/// ```
/// use keyword_crawler::url::origin_key;
/// use url::Url;
///
/// let url = Url::parse("http://Example.com:8080/a/b?c").unwrap();
/// assert_eq!(origin_key(&url).as_deref(), Some("http://example.com:8080"));
/// ```
pub fn origin_key(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

/// Returns the robots.txt location for the host serving `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    let key = origin_key(url)?;
    Url::parse(&format!("{}/robots.txt", key)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("http://example.com/").is_ok());
        assert!(parse_http_url("https://example.com/a?b=c").is_ok());
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        assert!(matches!(
            parse_http_url("ftp://example.com/file"),
            Err(CrawlError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            parse_http_url("mailto:someone@example.com"),
            Err(CrawlError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_parse_http_url_rejects_garbage() {
        assert!(matches!(
            parse_http_url("not a url"),
            Err(CrawlError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_http_url("/relative/path"),
            Err(CrawlError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_origin_key_keeps_explicit_port() {
        let url = Url::parse("http://127.0.0.1:4321/page").unwrap();
        assert_eq!(origin_key(&url).as_deref(), Some("http://127.0.0.1:4321"));
    }

    #[test]
    fn test_origin_key_drops_default_port() {
        let url = Url::parse("https://example.com:443/page").unwrap();
        assert_eq!(origin_key(&url).as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_origin_key_distinguishes_scheme() {
        let http = Url::parse("http://example.com/").unwrap();
        let https = Url::parse("https://example.com/").unwrap();
        assert_ne!(origin_key(&http), origin_key(&https));
    }

    #[test]
    fn test_origin_key_opaque() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert_eq!(origin_key(&url), None);
        assert_eq!(robots_url(&url), None);
    }

    #[test]
    fn test_robots_url() {
        let url = Url::parse("http://example.com:8080/deep/page.html?x=1#top").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "http://example.com:8080/robots.txt"
        );
    }
}
