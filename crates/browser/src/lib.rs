//! Facade crate: re-exports `browser-core`, `browser-html`, and
//! `browser-net` under one name, plus [`load`], the end-to-end convenience
//! entry point most callers want.

pub use browser_core as core;
pub use browser_html as html;
pub use browser_net as net;

use browser_core::{Dom, HttpVersion, Result, UrlRef};
use browser_html::{render, EntityMatcher, RenderMode, TreeBuilder};
use browser_net::HttpFetcher;

/// What loading a URL produces: either the raw/entity-decoded source text
/// (`view-source:`) or a parsed [`Dom`].
pub enum Loaded {
    Source(String),
    Document(Dom),
}

/// Fetch `url`, then either hand back its source text (for `view-source:`
/// URLs) or parse it into a DOM. One [`HttpFetcher`] and one
/// [`EntityMatcher`] per call — callers that load many URLs should build
/// those once and drive [`HttpFetcher::fetch`] / [`TreeBuilder::parse`]
/// directly instead.
pub fn load(url: &str, http_version: HttpVersion) -> Result<Loaded> {
    let parsed = UrlRef::parse(url)?;
    let mut fetcher = HttpFetcher::new(http_version)?;
    let body = fetcher.fetch(&parsed)?;

    if parsed.view_source {
        let entities = EntityMatcher::with_html_entities();
        let source = render(&body, RenderMode::Raw, &entities)?;
        return Ok(Loaded::Source(source));
    }

    let entities = EntityMatcher::with_html_entities();
    let dom = TreeBuilder::parse(&body, &entities);
    Ok(Loaded::Document(dom))
}
