use url::Url;

/// Parse an absolute URL. Relative or malformed input gives `None`.
pub fn parse_url(input: &str) -> Option<Url> {
    Url::parse(input).ok()
}

/// Whether `url` leads away from the site served at `site_host`.
///
/// Input that does not parse, or has no host (`mailto:`, `data:`), is never
/// external.
pub fn is_external_url(url: &str, site_host: &str) -> bool {
    match parse_url(url).as_ref().and_then(Url::host_str) {
        Some(host) => !host.eq_ignore_ascii_case(site_host),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_urls_only() {
        let url = parse_url("https://example.com/path?q=1").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/path");

        assert!(parse_url("invalid-url").is_none());
        assert!(parse_url("/relative/path").is_none());
    }

    #[test]
    fn external_means_another_host() {
        assert!(is_external_url("https://google.com", "example.com"));
        assert!(!is_external_url("https://example.com/path", "example.com"));
        assert!(!is_external_url("https://EXAMPLE.com/path", "example.com"));
        assert!(!is_external_url("http://localhost:3000/start", "localhost"));
    }

    #[test]
    fn unparseable_or_hostless_is_internal() {
        assert!(!is_external_url("not-a-url", "example.com"));
        assert!(!is_external_url("/next", "example.com"));
        assert!(!is_external_url("mailto:someone@example.org", "example.com"));
    }
}
