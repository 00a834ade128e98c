use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL points to a private/internal IP address.
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    /// The URL points to localhost.
    #[error("Localhost not allowed")]
    Localhost,
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a user-supplied alternate news source before it is forwarded.
///
/// The backend fetches this URL on the user's behalf, so anything that would
/// point it at its own network is refused:
/// - Non-HTTP(S) schemes (e.g., `file://`, `gopher://`)
/// - Localhost addresses (`localhost`, `127.0.0.1`, `::1`)
/// - Private IP ranges (RFC 1918, link-local, unique local IPv6)
///
/// # Examples
///
/// ```
/// use newsdesk::util::validate_source_url;
///
/// let url = validate_source_url("https://newsapi.example.com/v2/top").unwrap();
/// assert_eq!(url.host_str(), Some("newsapi.example.com"));
///
/// assert!(validate_source_url("http://localhost:8080/admin").is_err());
/// assert!(validate_source_url("http://192.168.1.1/").is_err());
/// assert!(validate_source_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_source_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = parse_web_url(url_str)?;

    let host = url.host_str().ok_or(UrlValidationError::MissingHost)?;
    if host.eq_ignore_ascii_case("localhost") || host.ends_with(".localhost") {
        return Err(UrlValidationError::Localhost);
    }

    // IPv6 hosts come back bracketed
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = host_for_parse.parse::<IpAddr>() {
        if ip.is_loopback() {
            return Err(UrlValidationError::Localhost);
        }
        if is_private_ip(&ip) {
            return Err(UrlValidationError::PrivateIp(ip.to_string()));
        }
    }

    Ok(url)
}

/// Validates an article link before handing it to the system browser.
///
/// Only http/https links with a host are opened; anything else could make
/// the OS launch an arbitrary handler.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = parse_web_url(url_str)?;
    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}

fn parse_web_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private() || ipv4.is_loopback() || ipv4.is_link_local() || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => {
            if ipv6.is_loopback() || ipv6.is_unspecified() {
                return true;
            }
            let segments = ipv6.segments();
            // fc00::/7
            let is_unique_local = (segments[0] & 0xfe00) == 0xfc00;
            // fe80::/10
            let is_link_local = (segments[0] & 0xffc0) == 0xfe80;
            is_unique_local || is_link_local
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_sources_accepted() {
        assert!(validate_source_url("https://newsapi.org/v2/top-headlines").is_ok());
        assert!(validate_source_url("http://feeds.example.org:8080/api").is_ok());
        assert!(validate_source_url("  https://example.com/  ").is_ok());
    }

    #[test]
    fn test_non_web_schemes_rejected() {
        assert!(matches!(
            validate_source_url("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_source_url("gopher://example.com").is_err());
    }

    #[test]
    fn test_localhost_rejected() {
        assert_eq!(
            validate_source_url("http://localhost/admin"),
            Err(UrlValidationError::Localhost)
        );
        assert_eq!(
            validate_source_url("http://api.localhost/"),
            Err(UrlValidationError::Localhost)
        );
        assert_eq!(
            validate_source_url("http://127.0.0.1:5000/apps/news/admin"),
            Err(UrlValidationError::Localhost)
        );
        assert!(validate_source_url("http://[::1]/").is_err());
    }

    #[test]
    fn test_private_ranges_rejected() {
        for url in [
            "http://10.0.0.1/",
            "http://172.16.0.1/",
            "http://192.168.1.1:8080/",
            "http://169.254.169.254/latest/meta-data",
            "http://0.0.0.0/",
            "http://[fe80::1]/",
            "http://[fd00::1]/",
        ] {
            assert!(validate_source_url(url).is_err(), "{url} should be rejected");
        }
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_source_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_open_allows_any_web_host() {
        assert!(validate_url_for_open("https://example.com/story").is_ok());
        // Opening a local link in the browser is harmless
        assert!(validate_url_for_open("http://localhost:3000/story").is_ok());
    }

    #[test]
    fn test_open_rejects_other_schemes() {
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
        assert!(validate_url_for_open("file:///tmp/x.html").is_err());
    }
}
