use std::collections::HashMap;

use browser_core::{BrowserError, Result};

/// Fixed dictionary of HTML entities this browser understands —
/// deliberately small; full HTML5 named-entity conformance is out of scope.
pub const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
];

/// One node of the Aho-Corasick trie. Stored in a flat arena ([`EntityMatcher::nodes`])
/// and addressed by index, so failure links (which must outlive the
/// mutation pass that created them) are plain `usize`s rather than
/// self-referential pointers.
#[derive(Debug, Clone)]
struct TrieNode {
    children: HashMap<char, usize>,
    is_terminal: bool,
    replacement: Option<String>,
    failure_link: usize,
}

impl TrieNode {
    fn new() -> Self {
        TrieNode {
            children: HashMap::new(),
            is_terminal: false,
            replacement: None,
            failure_link: 0,
        }
    }
}

/// Multi-pattern matcher for the fixed entity dictionary. Built once with
/// [`EntityMatcher::add_pattern`]/[`EntityMatcher::compile`], then read-only
/// and freely shareable.
#[derive(Debug, Clone)]
pub struct EntityMatcher {
    nodes: Vec<TrieNode>,
    compiled: bool,
}

impl Default for EntityMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMatcher {
    pub fn new() -> Self {
        EntityMatcher {
            nodes: vec![TrieNode::new()], // index 0 is root
            compiled: false,
        }
    }

    const ROOT: usize = 0;

    /// Build a matcher preloaded with the fixed entity dictionary and
    /// already compiled — this is the single shared instance the rest of
    /// the pipeline uses.
    pub fn with_html_entities() -> Self {
        let mut m = EntityMatcher::new();
        for (pattern, replacement) in ENTITIES {
            m.add_pattern(pattern, replacement);
        }
        m.compile();
        m
    }

    /// Insert `pattern` into the trie, marking its terminal node with
    /// `replacement`. Invalidates any previously computed failure links.
    pub fn add_pattern(&mut self, pattern: &str, replacement: &str) {
        let mut node = Self::ROOT;
        for ch in pattern.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&existing) => existing,
                None => {
                    self.nodes.push(TrieNode::new());
                    let new_node = self.nodes.len() - 1;
                    self.nodes[node].children.insert(ch, new_node);
                    new_node
                }
            };
        }
        self.nodes[node].is_terminal = true;
        self.nodes[node].replacement = Some(replacement.to_string());
        self.compiled = false;
    }

    /// Build failure links by breadth-first traversal, then propagate
    /// terminal/replacement status across failure links so that a pattern
    /// which is a suffix of another still matches correctly.
    pub fn compile(&mut self) {
        let mut queue = std::collections::VecDeque::new();

        let root_children: Vec<usize> = self.nodes[Self::ROOT].children.values().copied().collect();
        for &child in &root_children {
            self.nodes[child].failure_link = Self::ROOT;
            queue.push_back(child);
        }

        while let Some(current) = queue.pop_front() {
            let entries: Vec<(char, usize)> = self.nodes[current]
                .children
                .iter()
                .map(|(&c, &n)| (c, n))
                .collect();

            for (ch, child) in entries {
                queue.push_back(child);

                let mut fail_node = self.nodes[current].failure_link;
                while fail_node != Self::ROOT && !self.nodes[fail_node].children.contains_key(&ch)
                {
                    fail_node = self.nodes[fail_node].failure_link;
                }

                let failure_link = self.nodes[fail_node]
                    .children
                    .get(&ch)
                    .copied()
                    .unwrap_or(Self::ROOT);
                self.nodes[child].failure_link = failure_link;

                if self.nodes[failure_link].is_terminal && !self.nodes[child].is_terminal {
                    self.nodes[child].is_terminal = true;
                    self.nodes[child].replacement = self.nodes[failure_link].replacement.clone();
                }
            }
        }

        self.compiled = true;
    }

    /// Scan `text` once and replace every match with its registered
    /// replacement. O(|text| + total pattern length). Fails with
    /// `BrowserError::NotCompiled` if called before [`compile`].
    pub fn replace_all(&self, text: &str) -> Result<String> {
        if !self.compiled {
            return Err(BrowserError::NotCompiled);
        }

        let mut result = String::with_capacity(text.len());
        let mut node = Self::ROOT;

        for ch in text.chars() {
            while node != Self::ROOT && !self.nodes[node].children.contains_key(&ch) {
                node = self.nodes[node].failure_link;
            }

            match self.nodes[node].children.get(&ch) {
                Some(&next) => node = next,
                None => {
                    result.push(ch);
                    continue;
                }
            }

            if self.nodes[node].is_terminal {
                if let Some(replacement) = &self.nodes[node].replacement {
                    result.push_str(replacement);
                }
                node = Self::ROOT;
            }
        }

        Ok(result)
    }
}
