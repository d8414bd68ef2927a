use serde::{Deserialize, Serialize};

use crate::error::{BrowserError, Result};

/// Scheme recognised by [`UrlRef::parse`]. `About` is accepted by the
/// browser frame (`about:blank`) and bypasses HTTP entirely; unlike `Http`/
/// `Https`/`File` it carries no host/port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
    About,
}

/// A parsed, immutable reference to a URL. Network URLs (`http`/`https`)
/// carry `host`+`port`+`path`; `file` URLs carry only `path`; `data` URLs
/// carry only `content`. No percent-decoding or case-folding is performed;
/// this is raw splitting, not RFC 3986 normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRef {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub content: Option<String>,
    pub view_source: bool,
}

impl UrlRef {
    pub fn parse(input: &str) -> Result<Self> {
        let mut view_source = false;
        let mut rest = input;
        if let Some(stripped) = rest.strip_prefix("view-source:") {
            view_source = true;
            rest = stripped;
        }

        if let Some(payload) = rest.strip_prefix("data:") {
            let content = match payload.split_once(',') {
                Some((_, body)) => body.to_string(),
                None => payload.to_string(),
            };
            return Ok(UrlRef {
                scheme: Scheme::Data,
                host: String::new(),
                port: 0,
                path: String::new(),
                content: Some(content),
                view_source,
            });
        }

        if let Some(payload) = rest.strip_prefix("about:") {
            let _ = payload;
            return Ok(UrlRef {
                scheme: Scheme::About,
                host: String::new(),
                port: 0,
                path: String::new(),
                content: None,
                view_source,
            });
        }

        let (scheme_str, after_scheme) = match rest.split_once("://") {
            Some(parts) => parts,
            None => {
                if rest.starts_with('/') {
                    ("file", rest)
                } else {
                    return Err(BrowserError::MalformedUrl(input.to_string()));
                }
            }
        };

        let scheme = match scheme_str {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "file" => Scheme::File,
            other => return Err(BrowserError::UnsupportedScheme(other.to_string())),
        };

        if scheme == Scheme::File {
            let mut path = after_scheme;
            if let Some(stripped) = path.strip_prefix("//") {
                path = stripped;
            }
            let path = if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{path}")
            };
            return Ok(UrlRef {
                scheme,
                host: String::new(),
                port: 0,
                path,
                content: None,
                view_source,
            });
        }

        let mut default_port: u16 = if scheme == Scheme::Https { 443 } else { 80 };
        let (host_part, path) = match after_scheme.split_once('/') {
            Some((h, p)) => (h.to_string(), format!("/{p}")),
            None => (after_scheme.to_string(), "/".to_string()),
        };

        let (host, port) = match host_part.split_once(':') {
            Some((h, p)) => {
                let port: u16 = p
                    .parse()
                    .map_err(|_| BrowserError::MalformedUrl(input.to_string()))?;
                (h.to_string(), port)
            }
            None => {
                let port = std::mem::take(&mut default_port);
                (host_part, port)
            }
        };

        Ok(UrlRef {
            scheme,
            host,
            port,
            path,
            content: None,
            view_source,
        })
    }

    /// Canonical cache-key string: scheme, host, explicit port, path.
    pub fn cache_key(&self) -> String {
        let scheme = match self.scheme {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
            Scheme::About => "about",
        };
        match self.scheme {
            Scheme::Http | Scheme::Https => {
                format!("{scheme}://{}:{}{}", self.host, self.port, self.path)
            }
            Scheme::File => format!("{scheme}://{}", self.path),
            Scheme::Data => format!("{scheme}:{}", self.content.as_deref().unwrap_or("")),
            Scheme::About => scheme.to_string(),
        }
    }

    /// Resolve a `Location` header value against this URL: absolute
    /// locations (`http://`/`https://` prefixed) are used as-is, relative
    /// locations are rebuilt against the current scheme/host/port.
    pub fn resolve_redirect(&self, location: &str) -> Result<UrlRef> {
        if location.starts_with("http://") || location.starts_with("https://") {
            UrlRef::parse(location)
        } else {
            let scheme = match self.scheme {
                Scheme::Https => "https",
                _ => "http",
            };
            UrlRef::parse(&format!(
                "{scheme}://{}:{}{location}",
                self.host, self.port
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_url() {
        let u = UrlRef::parse("file:///path/to/file").unwrap();
        assert_eq!(u.scheme, Scheme::File);
        assert_eq!(u.path, "/path/to/file");
    }

    #[test]
    fn parses_bare_absolute_path_as_file() {
        let u = UrlRef::parse("/path/to/file").unwrap();
        assert_eq!(u.scheme, Scheme::File);
        assert_eq!(u.path, "/path/to/file");
    }

    #[test]
    fn parses_data_url() {
        let u = UrlRef::parse("data:text/html,Hello World").unwrap();
        assert_eq!(u.scheme, Scheme::Data);
        assert_eq!(u.content.as_deref(), Some("Hello World"));
    }

    #[test]
    fn parses_view_source_http() {
        let u = UrlRef::parse("view-source:http://example.com").unwrap();
        assert!(u.view_source);
        assert_eq!(u.scheme, Scheme::Http);
        assert_eq!(u.host, "example.com");
        assert_eq!(u.port, 80);
        assert_eq!(u.path, "/");
    }

    #[test]
    fn parses_host_with_explicit_port() {
        let u = UrlRef::parse("http://example.com:8080/a/b").unwrap();
        assert_eq!(u.host, "example.com");
        assert_eq!(u.port, 8080);
        assert_eq!(u.path, "/a/b");
    }

    #[test]
    fn https_defaults_to_443() {
        let u = UrlRef::parse("https://example.com/p").unwrap();
        assert_eq!(u.port, 443);
    }

    #[test]
    fn rejects_unknown_scheme() {
        let err = UrlRef::parse("ftp://example.com/").unwrap_err();
        assert!(matches!(err, BrowserError::UnsupportedScheme(_)));
    }

    #[test]
    fn rejects_bare_relative_path() {
        let err = UrlRef::parse("not-a-url").unwrap_err();
        assert!(matches!(err, BrowserError::MalformedUrl(_)));
    }

    #[test]
    fn about_blank_has_no_network_fields() {
        let u = UrlRef::parse("about:blank").unwrap();
        assert_eq!(u.scheme, Scheme::About);
        assert_eq!(u.host, "");
    }

    #[test]
    fn resolve_redirect_relative() {
        let base = UrlRef::parse("http://example.com:8080/a").unwrap();
        let next = base.resolve_redirect("/b/c").unwrap();
        assert_eq!(next.host, "example.com");
        assert_eq!(next.port, 8080);
        assert_eq!(next.path, "/b/c");
    }

    #[test]
    fn resolve_redirect_absolute() {
        let base = UrlRef::parse("http://example.com/a").unwrap();
        let next = base.resolve_redirect("https://other.example/x").unwrap();
        assert_eq!(next.host, "other.example");
        assert_eq!(next.scheme, Scheme::Https);
    }
}
