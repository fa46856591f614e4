use url::Url;

/// Resolves an anchor's `href` against the page it was found on
///
/// # Resolution Steps
///
/// 1. Skip `mailto:` links
/// 2. Keep only `http://`, `https://` and scheme-less hrefs
/// 3. Strip the fragment (everything after `#`); skip if nothing is left
/// 4. Join against `base` (relative paths resolve against the page's
///    directory, root-relative paths against its origin)
/// 5. Keep the result only if it is http or https
///
/// # Examples
///
/// ```
/// use keyword_crawler::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/docs/index.html").unwrap();
/// let link = resolve_link(&base, "guide.html#intro").unwrap();
/// assert_eq!(link.as_str(), "http://example.com/docs/guide.html");
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();

    if lower.contains("mailto:") {
        return None;
    }

    let absolute = lower.starts_with("http://") || lower.starts_with("https://");
    if !absolute && lower.contains("://") {
        return None;
    }

    let without_fragment = match href.find('#') {
        Some(index) => &href[..index],
        None => href,
    };
    if without_fragment.is_empty() {
        return None;
    }

    let resolved = base.join(without_fragment).ok()?;
    if super::is_http(&resolved) {
        Some(resolved)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/dir/page.html").unwrap()
    }

    fn resolve(href: &str) -> Option<String> {
        resolve_link(&base(), href).map(|u| u.to_string())
    }

    #[test]
    fn test_absolute_links() {
        assert_eq!(
            resolve("https://other.com/x").as_deref(),
            Some("https://other.com/x")
        );
        assert_eq!(
            resolve("HTTP://other.com/").as_deref(),
            Some("http://other.com/")
        );
    }

    #[test]
    fn test_relative_links() {
        assert_eq!(
            resolve("next.html").as_deref(),
            Some("http://example.com/dir/next.html")
        );
        assert_eq!(
            resolve("/top.html").as_deref(),
            Some("http://example.com/top.html")
        );
        assert_eq!(
            resolve("../up.html").as_deref(),
            Some("http://example.com/up.html")
        );
        assert_eq!(
            resolve("?q=1").as_deref(),
            Some("http://example.com/dir/page.html?q=1")
        );
    }

    #[test]
    fn test_scheme_relative_link() {
        assert_eq!(
            resolve("//cdn.example.com/a").as_deref(),
            Some("http://cdn.example.com/a")
        );
    }

    #[test]
    fn test_fragment_stripped() {
        assert_eq!(
            resolve("other.html#section").as_deref(),
            Some("http://example.com/dir/other.html")
        );
        assert_eq!(resolve("#top"), None);
        assert_eq!(resolve("#"), None);
    }

    #[test]
    fn test_skipped_links() {
        assert_eq!(resolve("mailto:someone@example.com"), None);
        assert_eq!(resolve("MAILTO:someone@example.com"), None);
        assert_eq!(resolve("ftp://example.com/file"), None);
        assert_eq!(resolve("javascript:void(0)"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("   "), None);
    }
}
