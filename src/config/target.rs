use std::fmt;

use url::{Host, Url};

use crate::error::{HttpingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

/// The URL being pinged, split into the pieces the prober needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: Url,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path plus query, as sent on the request line.
    pub path: String,
}

impl Target {
    /// Parse and validate a target URL.
    ///
    /// The scheme prefix is checked on the raw input so that anything other
    /// than `http://` or `https://` is rejected before the URL is even parsed.
    pub fn parse(input: &str) -> Result<Target> {
        let lowered = input.to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            return Err(HttpingError::InvalidUrl(
                "url needs to start with 'http://' or 'https://'".to_string(),
            ));
        }

        let url = Url::parse(input)
            .map_err(|e| HttpingError::InvalidUrl(format!("invalid url '{input}': {e}")))?;

        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => {
                return Err(HttpingError::InvalidUrl(format!(
                    "unsupported scheme '{other}'"
                )));
            }
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => {
                return Err(HttpingError::InvalidUrl(format!(
                    "url '{input}' has no host"
                )));
            }
        };

        let port = url
            .port_or_known_default()
            .ok_or_else(|| HttpingError::InvalidUrl(format!("url '{input}' has no port")))?;

        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        Ok(Target {
            url,
            scheme,
            host,
            port,
            path,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_defaults() {
        let target = Target::parse("http://example.test").expect("valid url");
        assert_eq!(target.scheme, Scheme::Http);
        assert_eq!(target.host, "example.test");
        assert_eq!(target.port, 80);
        assert_eq!(target.path, "/");
    }

    #[test]
    fn test_parse_https_with_port_path_and_query() {
        let target =
            Target::parse("https://example.test:8443/health?full=1").expect("valid url");
        assert_eq!(target.scheme, Scheme::Https);
        assert_eq!(target.port, 8443);
        assert_eq!(target.path, "/health?full=1");
    }

    #[test]
    fn test_parse_https_default_port() {
        let target = Target::parse("https://example.test/").expect("valid url");
        assert_eq!(target.port, 443);
    }

    #[test]
    fn test_parse_ip_literals() {
        let v4 = Target::parse("http://127.0.0.1:8080/").expect("valid url");
        assert_eq!(v4.host, "127.0.0.1");

        let v6 = Target::parse("http://[::1]:8080/").expect("valid url");
        assert_eq!(v6.host, "::1");
    }

    #[test]
    fn test_rejects_missing_scheme() {
        let err = Target::parse("example.test/").unwrap_err();
        assert!(matches!(err, HttpingError::InvalidUrl(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(Target::parse("ftp://example.test/").is_err());
        assert!(Target::parse("httpx://example.test/").is_err());
    }

    #[test]
    fn test_rejects_empty_host() {
        assert!(Target::parse("http://").is_err());
    }
}
