use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use steeple::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a candidate URL lives on the same host as the base URL
///
/// Same-domain means hostname equality: ports and schemes are ignored and
/// subdomains count as different hosts. Unparseable candidates are never
/// same-domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use steeple::url::is_same_domain;
///
/// let base = Url::parse("https://church.example/").unwrap();
/// assert!(is_same_domain("https://church.example/about", &base));
/// assert!(!is_same_domain("https://other.example/about", &base));
/// ```
pub fn is_same_domain(candidate: &str, base: &Url) -> bool {
    let Ok(candidate) = Url::parse(candidate) else {
        return false;
    };

    match (extract_domain(&candidate), extract_domain(base)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_domain_ignores_port_and_scheme() {
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert!(is_same_domain("https://127.0.0.1:9090/page", &base));
    }

    #[test]
    fn test_subdomain_is_different_domain() {
        let base = Url::parse("https://church.example/").unwrap();
        assert!(!is_same_domain("https://m.church.example/", &base));
    }

    #[test]
    fn test_unparseable_candidate() {
        let base = Url::parse("https://church.example/").unwrap();
        assert!(!is_same_domain("/relative/only", &base));
        assert!(!is_same_domain("", &base));
    }
}
