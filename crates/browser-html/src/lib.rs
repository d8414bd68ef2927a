//! Character-driven HTML tokenizer, implicit-tag tree builder, and the
//! Aho-Corasick entity matcher. Pure: allocation only, no I/O — fetched
//! bodies come in from `browser-net` as plain `String`s.

mod attributes;
mod constants;
mod entity;
mod textonly;
mod tokenizer;
mod tree_builder;

pub use attributes::parse_attributes;
pub use constants::{is_head_tag, is_void_element, HEAD_TAGS, VOID_ELEMENTS};
pub use entity::{EntityMatcher, ENTITIES};
pub use textonly::{render, strip_tags, RenderMode};
pub use tokenizer::{TokenEvent, Tokenizer, TokenizerState};
pub use tree_builder::TreeBuilder;
