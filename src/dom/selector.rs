//! Minimal CSS selector support: type, `#id`, `.class`, `[attr]`,
//! `[attr='value']` and the descendant combinator.

use super::{DomError, DomResult, Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    // 由左到右，後一個是前一個的後代
    steps: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> DomResult<Self> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut steps = Vec::new();
        let mut chars = source.trim().chars().peekable();
        let mut current = Compound::default();
        let mut current_empty = true;

        while let Some(ch) = chars.next() {
            match ch {
                c if c.is_whitespace() => {
                    if !current_empty {
                        steps.push(std::mem::take(&mut current));
                        current_empty = true;
                    }
                }
                '#' => {
                    let ident = take_ident(&mut chars);
                    if ident.is_empty() {
                        return Err(invalid("expected id after '#'"));
                    }
                    current.id = Some(ident);
                    current_empty = false;
                }
                '.' => {
                    let ident = take_ident(&mut chars);
                    if ident.is_empty() {
                        return Err(invalid("expected class name after '.'"));
                    }
                    current.classes.push(ident);
                    current_empty = false;
                }
                '[' => {
                    current.attrs.push(parse_attr(&mut chars).map_err(|r| invalid(&r))?);
                    current_empty = false;
                }
                '*' if current_empty => {
                    current_empty = false;
                }
                c if is_ident_char(c) && current_empty => {
                    let mut tag = c.to_string();
                    tag.push_str(&take_ident(&mut chars));
                    current.tag = Some(tag.to_ascii_lowercase());
                    current_empty = false;
                }
                other => return Err(invalid(&format!("unexpected character '{}'", other))),
            }
        }
        if !current_empty {
            steps.push(current);
        }
        if steps.is_empty() {
            return Err(invalid("empty selector"));
        }
        Ok(Self { steps })
    }

    /// 最右邊的 compound 比對節點本身，其餘依序往祖先找
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.steps.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }

        let mut cursor = doc.parent(node);
        for step in ancestors.iter().rev() {
            loop {
                match cursor {
                    Some(candidate) if step.matches(doc, candidate) => {
                        cursor = doc.parent(candidate);
                        break;
                    }
                    Some(candidate) => cursor = doc.parent(candidate),
                    None => return false,
                }
            }
        }
        true
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if &element.tag_name != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        let classes = element.classes();
        if !self.classes.iter().all(|class| classes.contains(&class.as_str())) {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Exists(name) => element.attr(name).is_some(),
            AttrMatch::Equals(name, value) => element.attr(name) == Some(value.as_str()),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        out.push(c);
        chars.next();
    }
    out
}

fn parse_attr(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<AttrMatch, String> {
    let name = take_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err("expected attribute name after '['".to_string());
    }

    match chars.next() {
        Some(']') => Ok(AttrMatch::Exists(name)),
        Some('=') => {
            let value = match chars.peek().copied() {
                Some(quote @ ('\'' | '"')) => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some(c) if c == quote => break,
                            Some(c) => value.push(c),
                            None => return Err("unterminated attribute value".to_string()),
                        }
                    }
                    value
                }
                _ => take_ident(chars),
            };
            match chars.next() {
                Some(']') => Ok(AttrMatch::Equals(name, value)),
                _ => Err("expected ']'".to_string()),
            }
        }
        _ => Err("expected ']' or '='".to_string()),
    }
}
