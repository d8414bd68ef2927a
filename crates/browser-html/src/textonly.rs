use browser_core::Result;

use crate::entity::EntityMatcher;

/// Which of the two display paths a fetched body takes: shown untouched,
/// or with entities decoded. Kept separate from the tokenizer/tree-builder
/// pipeline since it backs `view-source:`, which deliberately bypasses
/// parsing altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Show the fetched body exactly as received — no tag stripping, no
    /// entity decoding. What `view-source:` asks for.
    Raw,
    /// Strip markup for a plain-text view of the page. This browser has no
    /// layout engine, so stripped plain text is the closest thing to
    /// "rendering" a document outside of the tokenizer/tree-builder path.
    Rendered,
}

/// Byte-for-byte tag stripper: drops everything between `<` and `>`
/// (inclusive) and keeps the rest verbatim. Does not understand quoted
/// attribute values containing `>`; fine for a best-effort plain-text
/// fallback with no layout engine behind it.
pub fn strip_tags(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Render `content` according to `mode`, without going through the
/// tokenizer/tree builder. `Raw` is the `view-source:` path; `Rendered`
/// decodes entities over the whole body the same way text nodes are
/// decoded during tree building.
pub fn render(content: &str, mode: RenderMode, entities: &EntityMatcher) -> Result<String> {
    match mode {
        RenderMode::Raw => Ok(content.to_string()),
        RenderMode::Rendered => entities.replace_all(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_mode_is_untouched() {
        let entities = EntityMatcher::with_html_entities();
        let body = "<p>Tom &amp; Jerry</p>";
        assert_eq!(render(body, RenderMode::Raw, &entities).unwrap(), body);
    }

    #[test]
    fn rendered_mode_decodes_entities_without_stripping_tags() {
        let entities = EntityMatcher::with_html_entities();
        let out = render("<p>Tom &amp; Jerry</p>", RenderMode::Rendered, &entities).unwrap();
        assert_eq!(out, "<p>Tom & Jerry</p>");
    }

    #[test]
    fn strip_tags_drops_markup_keeps_text() {
        assert_eq!(strip_tags("<p>Hello <b>World</b></p>"), "Hello World");
    }

    #[test]
    fn strip_tags_on_plain_text_is_identity() {
        assert_eq!(strip_tags("just text, no tags"), "just text, no tags");
    }
}
