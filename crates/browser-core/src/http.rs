use std::fmt;
use std::str::FromStr;

use crate::error::HttpVersionParseError;

/// HTTP/1.x wire version. Controls both the request line and the
/// `Connection` header (`close` for 1.0, `keep-alive` for 1.1) as well as
/// whether the connection pool is consulted at all — only 1.1 pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    Http10,
    Http11,
}

impl HttpVersion {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
        }
    }

    pub const fn connection_header(self) -> &'static str {
        match self {
            HttpVersion::Http10 => "close",
            HttpVersion::Http11 => "keep-alive",
        }
    }

    pub const fn uses_pool(self) -> bool {
        matches!(self, HttpVersion::Http11)
    }
}

impl Default for HttpVersion {
    /// The library default is conservative (`"1.0"`); callers that want
    /// persistent connections opt into `"1.1"` explicitly.
    fn default() -> Self {
        HttpVersion::Http10
    }
}

impl FromStr for HttpVersion {
    type Err = HttpVersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(HttpVersion::Http10),
            "1.1" => Ok(HttpVersion::Http11),
            other => Err(HttpVersionParseError(other.to_string())),
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
