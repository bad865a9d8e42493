//! A small CSS selector engine for [`MemoryDocument`](crate::memory::MemoryDocument).
//!
//! Supports comma-separated groups of compound selectors (`tag`, `*`, `#id`,
//! `.class`, `[attr]`, `[attr=v]`, `[attr*=v]`, `[attr^=v]`, `[attr$=v]`,
//! `[attr~=v]`) joined by descendant (` `) or child (`>`) combinators.

use crate::dom::NodeId;
use crate::error::DomError;

/// Read-only element access needed to evaluate a selector.
pub trait SelectorTarget {
    fn tag(&self, node: NodeId) -> Option<&str>;
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;
    fn parent_element(&self, node: NodeId) -> Option<NodeId>;

    fn has_class_token(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrSelector {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            // Empty needles never match for the substring operators, as in browsers.
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Includes => actual.split_ascii_whitespace().any(|w| w == self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl Compound {
    fn matches<T: SelectorTarget + ?Sized>(&self, target: &T, node: NodeId) -> bool {
        if let Some(tag) = &self.tag
            && target.tag(node) != Some(tag.as_str())
        {
            return false;
        }
        if let Some(id) = &self.id
            && target.attr(node, "id") != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| target.has_class_token(node, c))
            && self.attrs.iter().all(|a| a.matches(target.attr(node, &a.name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One comma-separated group: the rightmost compound plus its ancestors,
/// stored right to left.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches<T: SelectorTarget + ?Sized>(&self, target: &T, node: NodeId) -> bool {
        self.subject.matches(target, node) && Self::match_ancestors(&self.ancestors, target, node)
    }

    fn match_ancestors<T: SelectorTarget + ?Sized>(
        rest: &[(Combinator, Compound)],
        target: &T,
        node: NodeId,
    ) -> bool {
        let Some(((combinator, compound), tail)) = rest.split_first() else {
            return true;
        };
        let mut current = target.parent_element(node);
        while let Some(candidate) = current {
            if compound.matches(target, candidate) && Self::match_ancestors(tail, target, candidate)
            {
                return true;
            }
            if *combinator == Combinator::Child {
                return false;
            }
            current = target.parent_element(candidate);
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let groups = split_top_level(input, ',')
            .into_iter()
            .map(|group| parse_complex(input, group))
            .collect::<Result<Vec<_>, _>>()?;
        if groups.is_empty() {
            return Err(DomError::invalid_selector(input, "empty selector"));
        }
        Ok(Self { groups })
    }

    pub fn matches<T: SelectorTarget + ?Sized>(&self, target: &T, node: NodeId) -> bool {
        self.groups.iter().any(|g| g.matches(target, node))
    }
}

/// Splits on `sep` outside of brackets and quotes.
fn split_top_level(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(full: &str, group: &str) -> Result<Complex, DomError> {
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut chars = group.trim().chars().peekable();

    if group.trim().is_empty() {
        return Err(DomError::invalid_selector(full, "empty selector group"));
    }

    while chars.peek().is_some() {
        match chars.peek() {
            Some(c) if c.is_whitespace() => {
                chars.next();
                if pending.is_none() {
                    pending = Some(Combinator::Descendant);
                }
            }
            Some('>') => {
                chars.next();
                pending = Some(Combinator::Child);
            }
            Some(_) => {
                if !compounds.is_empty() {
                    combinators.push(pending.take().unwrap_or(Combinator::Descendant));
                } else if pending.is_some() {
                    return Err(DomError::invalid_selector(full, "leading combinator"));
                }
                pending = None;
                compounds.push(parse_compound(full, &mut chars)?);
            }
            None => break,
        }
    }

    let Some(subject) = compounds.pop() else {
        return Err(DomError::invalid_selector(full, "empty selector group"));
    };
    if pending == Some(Combinator::Child) {
        return Err(DomError::invalid_selector(full, "trailing combinator"));
    }
    let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
    Ok(Complex { subject, ancestors })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
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

fn parse_compound(
    full: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<Compound, DomError> {
    let mut compound = Compound::default();

    if chars.peek() == Some(&'*') {
        chars.next();
    } else if chars.peek().is_some_and(|c| c.is_alphabetic()) {
        compound.tag = Some(read_ident(chars).to_ascii_lowercase());
    }

    loop {
        match chars.peek() {
            Some('#') => {
                chars.next();
                let id = read_ident(chars);
                if id.is_empty() {
                    return Err(DomError::invalid_selector(full, "expected id after '#'"));
                }
                compound.id = Some(id);
            }
            Some('.') => {
                chars.next();
                let class = read_ident(chars);
                if class.is_empty() {
                    return Err(DomError::invalid_selector(full, "expected class after '.'"));
                }
                compound.classes.push(class);
            }
            Some('[') => {
                chars.next();
                compound.attrs.push(parse_attr(full, chars)?);
            }
            Some(c) if c.is_whitespace() || *c == '>' => break,
            None => break,
            Some(c) => {
                return Err(DomError::invalid_selector(
                    full,
                    format!("unsupported character '{c}'"),
                ));
            }
        }
    }

    Ok(compound)
}

fn parse_attr(
    full: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<AttrSelector, DomError> {
    let name = read_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err(DomError::invalid_selector(full, "expected attribute name"));
    }

    let op = match chars.next() {
        Some(']') => {
            return Ok(AttrSelector {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            });
        }
        Some('=') => AttrOp::Equals,
        Some(prefix @ ('*' | '^' | '$' | '~')) => {
            if chars.next() != Some('=') {
                return Err(DomError::invalid_selector(full, "expected '=' in attribute"));
            }
            match prefix {
                '*' => AttrOp::Contains,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                _ => AttrOp::Includes,
            }
        }
        _ => return Err(DomError::invalid_selector(full, "malformed attribute selector")),
    };

    let value = match chars.peek().copied() {
        Some(q @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == q => break,
                    Some(c) => value.push(c),
                    None => return Err(DomError::invalid_selector(full, "unterminated string")),
                }
            }
            value
        }
        _ => read_ident(chars),
    };

    if chars.next() != Some(']') {
        return Err(DomError::invalid_selector(full, "expected ']'"));
    }

    Ok(AttrSelector { name, op, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_groups_outside_quotes() {
        let parts = split_top_level(r#"a[title="x,y"], .b"#, ',');
        assert_eq!(parts, vec![r#"a[title="x,y"]"#, " .b"]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(SelectorList::parse("a:hover").is_err());
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("[href").is_err());
        assert!(SelectorList::parse("div >").is_err());
    }

    #[test]
    fn parses_partial_href_selector() {
        let list =
            SelectorList::parse(r#".btn-primary[href*="Win11_25H2_Chinese_Simplified_x64.iso"]"#)
                .unwrap();
        let subject = &list.groups[0].subject;
        assert_eq!(subject.classes, vec!["btn-primary".to_string()]);
        assert_eq!(subject.attrs[0].op, AttrOp::Contains);
        assert_eq!(subject.attrs[0].value, "Win11_25H2_Chinese_Simplified_x64.iso");
    }
}
