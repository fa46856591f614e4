/// Checks whether a URL is on the blacklist
///
/// Each entry is matched case-insensitively anywhere in the URL string, so an
/// entry naming a host also covers every page on that host.
///
/// # Examples
///
/// ```
/// use keyword_crawler::url::is_blacklisted;
///
/// let blacklist = vec!["questioneverything.typepad.com".to_string()];
/// assert!(is_blacklisted("http://QuestionEverything.typepad.com/a", &blacklist));
/// assert!(!is_blacklisted("http://example.com/", &blacklist));
/// ```
pub fn is_blacklisted(url: &str, blacklist: &[String]) -> bool {
    if blacklist.is_empty() {
        return false;
    }

    let url = url.to_lowercase();
    blacklist
        .iter()
        .filter(|entry| !entry.is_empty())
        .any(|entry| url.contains(&entry.to_lowercase()))
}
