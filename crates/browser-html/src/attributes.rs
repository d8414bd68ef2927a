/// States of the small machine that parses the attribute substring of a raw
/// tag (everything after the tag name).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrState {
    Idle,
    Name,
    EqualSign,
    Value,
}

/// Parse `text` (the raw substring after the tag name) into an ordered
/// `name -> value` list. Boolean attributes (no `=value`) get `""`. Names
/// are case-folded; `\` immediately before the closing quote is consumed
/// and the quote character is taken literally rather than ending the
/// value.
pub fn parse_attributes(text: &str) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut state = AttrState::Idle;
    let mut name = String::new();
    let mut value = String::new();
    let mut quote_char: Option<char> = None;

    let chars: Vec<char> = text.chars().collect();
    for i in 0..chars.len() {
        let c = chars[i];
        match state {
            AttrState::Idle => {
                if c.is_whitespace() {
                    continue;
                } else if c.is_alphanumeric() || c == '-' || c == '_' {
                    name.push(c);
                    state = AttrState::Name;
                }
            }
            AttrState::Name => {
                if c == '=' {
                    state = AttrState::EqualSign;
                } else if c.is_whitespace() {
                    push_attr(&mut attributes, &mut name, String::new());
                    state = AttrState::Idle;
                } else {
                    name.push(c);
                }
            }
            AttrState::EqualSign => {
                if c == '"' || c == '\'' {
                    quote_char = Some(c);
                    state = AttrState::Value;
                }
            }
            AttrState::Value => {
                if Some(c) == quote_char {
                    if i > 0 && chars[i - 1] == '\\' {
                        value.pop();
                        value.push(c);
                        continue;
                    }
                    push_attr(&mut attributes, &mut name, std::mem::take(&mut value));
                    quote_char = None;
                    state = AttrState::Idle;
                } else {
                    value.push(c);
                }
            }
        }
    }

    if !name.is_empty() {
        push_attr(&mut attributes, &mut name, value);
    }

    attributes
}

fn push_attr(attributes: &mut Vec<(String, String)>, name: &mut String, value: String) {
    let key = name.to_lowercase();
    name.clear();
    if let Some(slot) = attributes.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        attributes.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_attributes() {
        let attrs = parse_attributes("class='container' id=\"main\"");
        assert_eq!(
            attrs,
            vec![
                ("class".to_string(), "container".to_string()),
                ("id".to_string(), "main".to_string()),
            ]
        );
    }

    #[test]
    fn boolean_attribute_gets_empty_value() {
        let attrs = parse_attributes("disabled");
        assert_eq!(attrs, vec![("disabled".to_string(), "".to_string())]);
    }

    #[test]
    fn value_with_escaped_quote() {
        let attrs = parse_attributes(r#"title='Example \'Site\''"#);
        assert_eq!(attrs[0].0, "title");
        assert_eq!(attrs[0].1, "Example 'Site'");
    }

    #[test]
    fn casefolds_attribute_names() {
        let attrs = parse_attributes("HREF=\"/x\"");
        assert_eq!(attrs[0].0, "href");
    }

    #[test]
    fn double_quoted_value_containing_nothing_special() {
        let attrs = parse_attributes(r#"href="http://example.com" title='Example "Site"'"#);
        assert_eq!(attrs[0], ("href".to_string(), "http://example.com".to_string()));
        assert_eq!(attrs[1], ("title".to_string(), "Example \"Site\"".to_string()));
    }
}
