use std::fmt;

/// Every fallible operation in the pipeline returns this. The tokenizer and
/// tree builder are total (they always produce some tree) and never raise
/// one of these; only `UrlRef::parse` and `HttpFetcher::fetch` do.
#[derive(thiserror::Error, Debug)]
pub enum BrowserError {
    #[error("malformed url: {0}")]
    MalformedUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tls error: {0}")]
    Tls(String),

    #[error("bad status line: {0}")]
    BadStatusLine(String),

    #[error("unsupported http version: {0}")]
    UnsupportedHttpVersion(String),

    #[error("unsupported transfer encoding: {0}")]
    UnsupportedTransfer(String),

    #[error("exceeded maximum redirect count")]
    TooManyRedirects,

    #[error("entity matcher used before compile()")]
    NotCompiled,
}

pub type Result<T> = std::result::Result<T, BrowserError>;

impl fmt::Display for HttpVersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported http version: {}", self.0)
    }
}

/// Marker error kept distinct from [`BrowserError`] so `HttpVersion::parse`
/// can be used in contexts (e.g. `clap` value parsers) that want a plain
/// `std::error::Error` without pulling in the whole error enum.
#[derive(Debug)]
pub struct HttpVersionParseError(pub String);

impl std::error::Error for HttpVersionParseError {}
