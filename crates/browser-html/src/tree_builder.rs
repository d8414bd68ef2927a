use browser_core::{AttributeMap, Dom, NodeData, NodeId};

use crate::attributes::parse_attributes;
use crate::constants::{is_head_tag, is_void_element};
use crate::entity::EntityMatcher;
use crate::tokenizer::{TokenEvent, Tokenizer};

/// Implicit-tag DOM tree builder. Consumes [`TokenEvent`]s (from
/// [`Tokenizer`]) and repairs malformed markup rather than rejecting it: it
/// inserts `html`/`head`/`body` as needed, and recovers from a closer that
/// doesn't match the top of the open-element stack by searching down the
/// stack for the matching ancestor.
pub struct TreeBuilder<'a> {
    dom: Dom,
    unfinished: Vec<NodeId>,
    entities: &'a EntityMatcher,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(entities: &'a EntityMatcher) -> Self {
        TreeBuilder {
            dom: Dom::building(),
            unfinished: Vec::new(),
            entities,
        }
    }

    /// Run the tokenizer over `body` and build the resulting DOM in one
    /// shot over the complete body.
    pub fn parse(body: &str, entities: &'a EntityMatcher) -> Dom {
        let mut builder = TreeBuilder::new(entities);
        let mut tokenizer = Tokenizer::new();

        for c in body.chars() {
            if let Some(event) = tokenizer.feed(c) {
                builder.handle_event(event);
            }
        }
        if let Some(event) = tokenizer.finish() {
            builder.handle_event(event);
        }

        builder.finish()
    }

    fn handle_event(&mut self, event: TokenEvent) {
        match event {
            TokenEvent::Text(text) => self.add_text(&text),
            TokenEvent::Tag(raw) => self.add_tag(&raw),
            TokenEvent::Script(text) => self.add_text(&text),
            TokenEvent::Comment(_) => {}
        }
    }

    fn open_tags(&self) -> Vec<&str> {
        self.unfinished
            .iter()
            .map(|&id| self.dom.get(id).tag().unwrap_or(""))
            .collect()
    }

    /// Fires in a loop, examining the open tag stack against the tag about
    /// to open, until no implicit-tag rule applies.
    fn implicit_tags(&mut self, tag: Option<&str>) {
        loop {
            let open = self.open_tags();
            if open.is_empty() && tag != Some("html") {
                self.add_tag("html");
            } else if open == ["html"] && !matches!(tag, Some("head") | Some("body") | Some("/html"))
            {
                if tag.map(is_head_tag).unwrap_or(false) {
                    self.add_tag("head");
                } else {
                    self.add_tag("body");
                }
            } else if open == ["html", "head"]
                && tag != Some("/head")
                && !tag.map(is_head_tag).unwrap_or(false)
            {
                self.add_tag("/head");
            } else if open.last() == Some(&"p") && tag == Some("p") {
                self.add_tag("/p");
            } else if open.last() == Some(&"li") && tag == Some("li") {
                self.add_tag("/li");
            } else {
                break;
            }
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        // `replace_all` only fails if the shared matcher was never
        // compiled, which cannot happen for the fixed instance this crate
        // constructs — degrade to the raw text rather than panic.
        let decoded = self.entities.replace_all(text).unwrap_or_else(|_| text.to_string());
        let Some(&parent) = self.unfinished.last() else {
            return;
        };
        let node = self.dom.push(NodeData::Text {
            text: decoded,
            parent: Some(parent),
        });
        self.dom.append_child(parent, node);
    }

    fn add_tag(&mut self, raw: &str) {
        if raw.starts_with('!') {
            return;
        }

        let mut parts = raw.splitn(2, char::is_whitespace);
        let tag_name = parts.next().unwrap_or("").to_lowercase();
        let attrs_part = parts.next().unwrap_or("");
        let attribute_list = parse_attributes(attrs_part);
        let mut attributes = AttributeMap::default();
        for (k, v) in attribute_list {
            attributes.insert(k, v);
        }

        if let Some(closing) = tag_name.strip_prefix('/') {
            self.close_tag(closing);
        } else if is_void_element(&tag_name) {
            let parent = self.unfinished.last().copied();
            let node = self.dom.push(NodeData::Element {
                tag: tag_name,
                attributes,
                children: Vec::new(),
                parent,
            });
            if let Some(parent) = parent {
                self.dom.append_child(parent, node);
            }
        } else {
            self.implicit_tags(Some(&tag_name));
            let parent = self.unfinished.last().copied();
            let node = self.dom.push(NodeData::Element {
                tag: tag_name,
                attributes,
                children: Vec::new(),
                parent,
            });
            self.unfinished.push(node);
        }
    }

    /// Close `target`. If it matches the top of the stack this is a plain
    /// pop. If something else is on top (misnested inline tags, e.g.
    /// `<b>x<i>y</b>z</i>`), the elements above `target` are closed early
    /// and then reopened as fresh siblings once `target` itself closes, so
    /// the remaining content still ends up inside an element of the right
    /// name. If `target` never appears on the open stack at all, this is a
    /// no-op — a later unmatched closer is simply ignored.
    fn close_tag(&mut self, target: &str) {
        if self.unfinished.len() == 1 {
            return;
        }

        let Some(match_idx) = (1..self.unfinished.len())
            .rev()
            .find(|&i| self.dom.get(self.unfinished[i]).tag() == Some(target))
        else {
            return;
        };

        let reopen: Vec<(String, AttributeMap)> = self.unfinished[match_idx + 1..]
            .iter()
            .map(|&id| match self.dom.get(id) {
                NodeData::Element {
                    tag, attributes, ..
                } => (tag.clone(), attributes.clone()),
                NodeData::Text { .. } => unreachable!("unfinished stack holds only elements"),
            })
            .collect();

        while self.unfinished.len() > match_idx {
            let node = self.unfinished.pop().unwrap();
            if let Some(&parent) = self.unfinished.last() {
                self.dom.append_child(parent, node);
            }
        }

        for (tag, attributes) in reopen {
            let parent = self.unfinished.last().copied();
            let node = self.dom.push(NodeData::Element {
                tag,
                attributes,
                children: Vec::new(),
                parent,
            });
            self.unfinished.push(node);
        }
    }

    fn finish(mut self) -> Dom {
        if self.unfinished.is_empty() {
            self.implicit_tags(None);
        }

        while self.unfinished.len() > 1 {
            if let Some(node) = self.unfinished.pop() {
                if let Some(&parent) = self.unfinished.last() {
                    self.dom.append_child(parent, node);
                }
            }
        }

        let root = self.unfinished.pop().expect("implicit_tags guarantees a root");
        self.dom.finish(root)
    }
}
