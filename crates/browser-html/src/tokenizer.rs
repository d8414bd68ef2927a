/// State of the character-driven tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    Text,
    TagOpen,
    AttributeOpen,
    Comment,
    ScriptData,
}

/// Output of the tokenizer. `Tag` carries the raw inside-angle text
/// (including attributes) with outer whitespace trimmed; `Script` carries
/// the raw body between `<script>` and `</script>`; `Comment` carries the
/// full `<!-- ... -->` text including delimiters (the source keeps it
/// verbatim and the tree builder discards it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEvent {
    Text(String),
    Tag(String),
    Script(String),
    Comment(String),
}

/// Character-driven HTML tokenizer. Feed one `char` at a time with
/// [`Tokenizer::feed`]; call [`Tokenizer::finish`] at EOF to flush any
/// pending text. An `=` immediately followed by a quote character always
/// starts an attribute value, regardless of the character preceding the
/// `=` (so `src="..."` and `src ="..."` both work).
#[derive(Debug, Clone)]
pub struct Tokenizer {
    buffer: Vec<char>,
    state: TokenizerState,
    attribute_quote_char: Option<char>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer {
            buffer: Vec::new(),
            state: TokenizerState::Text,
            attribute_quote_char: None,
        }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    fn next_state(&self, next_char: char) -> TokenizerState {
        match self.state {
            TokenizerState::Text => {
                if next_char == '<' {
                    TokenizerState::TagOpen
                } else {
                    TokenizerState::Text
                }
            }
            TokenizerState::TagOpen => {
                let mut tmp = self.buffer.clone();
                tmp.push(next_char);
                let ends_with = |suffix: &str| {
                    let suffix: Vec<char> = suffix.chars().collect();
                    tmp.len() >= suffix.len() && tmp[tmp.len() - suffix.len()..] == suffix[..]
                };
                if ends_with("<!--") {
                    TokenizerState::Comment
                } else if ends_with("<script>") {
                    TokenizerState::ScriptData
                } else if next_char == '>' {
                    TokenizerState::Text
                } else if (next_char == '"' || next_char == '\'')
                    && tmp.len() >= 2
                    && tmp[tmp.len() - 2] == '='
                {
                    TokenizerState::AttributeOpen
                } else {
                    TokenizerState::TagOpen
                }
            }
            TokenizerState::AttributeOpen => {
                let quote = self.attribute_quote_char;
                let escaped = self.buffer.last() == Some(&'\\');
                if Some(next_char) == quote && !escaped {
                    TokenizerState::TagOpen
                } else {
                    TokenizerState::AttributeOpen
                }
            }
            TokenizerState::Comment => {
                let mut tmp = self.buffer.clone();
                tmp.push(next_char);
                if tmp.len() >= 3 && tmp[tmp.len() - 3..] == ['-', '-', '>'] {
                    TokenizerState::Text
                } else {
                    TokenizerState::Comment
                }
            }
            TokenizerState::ScriptData => {
                let mut tmp = self.buffer.clone();
                tmp.push(next_char);
                let needle: Vec<char> = "</script>".chars().collect();
                if tmp.len() >= needle.len() && tmp[tmp.len() - needle.len()..] == needle[..] {
                    TokenizerState::Text
                } else {
                    TokenizerState::ScriptData
                }
            }
        }
    }

    fn trigger_action(
        &mut self,
        from: TokenizerState,
        to: TokenizerState,
    ) -> Option<TokenEvent> {
        use TokenizerState::*;
        match (from, to) {
            (TagOpen, ScriptData) => {
                let new_len = self.buffer.len() - 8;
                self.buffer.truncate(new_len);
                Some(TokenEvent::Tag("script".to_string()))
            }
            (TagOpen, Text) => {
                let content: String = self.buffer[1..self.buffer.len() - 1]
                    .iter()
                    .collect::<String>()
                    .trim()
                    .to_string();
                self.buffer.clear();
                Some(TokenEvent::Tag(content))
            }
            (Text, TagOpen) => {
                let content: String = self.buffer[..self.buffer.len() - 1].iter().collect();
                let last = *self.buffer.last().unwrap();
                self.buffer = vec![last];
                Some(TokenEvent::Text(content))
            }
            (Comment, Text) => {
                let content: String = self.buffer.drain(..).collect();
                Some(TokenEvent::Comment(content))
            }
            (ScriptData, Text) => {
                let new_len = self.buffer.len() - 9;
                self.buffer.truncate(new_len);
                let content: String = self.buffer.iter().collect();
                Some(TokenEvent::Script(content))
            }
            _ => None,
        }
    }

    /// Feed one character, returning an event if this character completed
    /// one. Transitions are decided before the character is appended to the
    /// buffer, and the emission action runs between the current and next
    /// state.
    pub fn feed(&mut self, c: char) -> Option<TokenEvent> {
        let next = self.next_state(c);

        if self.state == TokenizerState::TagOpen && next == TokenizerState::AttributeOpen {
            self.attribute_quote_char = Some(c);
        }

        self.buffer.push(c);

        let result = self.trigger_action(self.state, next);
        self.state = next;
        result
    }

    /// Flush any buffered text at EOF. Only meaningful in `Text` state with
    /// a non-empty buffer.
    pub fn finish(&mut self) -> Option<TokenEvent> {
        if self.state == TokenizerState::Text && !self.buffer.is_empty() {
            let content: String = self.buffer.drain(..).collect();
            Some(TokenEvent::Text(content))
        } else {
            None
        }
    }

    /// Tokenize a complete, already-buffered string in one shot — no
    /// streaming output, so this is the entry point tree builders use.
    pub fn tokenize(input: &str) -> Vec<TokenEvent> {
        let mut tokenizer = Tokenizer::new();
        let mut events = Vec::new();
        for c in input.chars() {
            if let Some(ev) = tokenizer.feed(c) {
                events.push(ev);
            }
        }
        if let Some(ev) = tokenizer.finish() {
            events.push(ev);
        }
        events
    }
}
