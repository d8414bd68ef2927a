//! Backend-agnostic types shared by the content pipeline: URL parsing, the
//! DOM arena, and the error enum. No I/O lives here — see `browser-net` for
//! the HTTP fetcher and `browser-html` for the tokenizer/tree builder.

pub mod dom;
pub mod error;
pub mod http;
pub mod url;

pub use dom::{AttributeMap, Dom, NodeData, NodeId};
pub use error::{BrowserError, HttpVersionParseError, Result};
pub use http::HttpVersion;
pub use url::{Scheme, UrlRef};
