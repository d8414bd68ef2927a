//! Synchronous HTTP/1.x fetcher: connection pooling, redirect following,
//! chunked/gzip decoding, and `Cache-Control` aware response caching.
//! Deliberately raw-socket rather than `reqwest`/tokio — the whole point is
//! wire-level control over keep-alive and chunked transfer.

mod fetcher;

pub use fetcher::HttpFetcher;
