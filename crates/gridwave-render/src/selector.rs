// crates/gridwave-render/src/selector.rs
//! Minimal CSS selector matching for the headless document.
//!
//! Supports type, universal, `#id`, `.class`, `[attr]` and `[attr=value]`
//! simple selectors, compounds of those, and comma-separated lists.
//! Combinators are rejected.

use std::iter::Peekable;
use std::str::Chars;

use crate::{RenderError, RenderResult};

/// Element data a selector can inspect.
pub trait SelectorTarget {
    fn tag(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

impl CompoundSelector {
    fn matches<T: SelectorTarget>(&self, target: &T) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(target.tag()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if target.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| target.has_class(class))
            && self.attributes.iter().all(|attribute| {
                match (target.attribute(&attribute.name), &attribute.value) {
                    (Some(actual), Some(expected)) => actual == expected,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<CompoundSelector>);

impl SelectorList {
    pub fn parse(input: &str) -> RenderResult<Self> {
        let invalid = |reason: &str| RenderError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut compounds = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector in list"));
            }
            compounds.push(parse_compound(part).map_err(|reason| invalid(&reason))?);
        }

        Ok(Self(compounds))
    }

    pub fn matches<T: SelectorTarget>(&self, target: &T) -> bool {
        self.0.iter().any(|compound| compound.matches(target))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    if ident.is_empty() {
        Err("expected an identifier".to_string())
    } else {
        Ok(ident)
    }
}

fn read_attribute_value(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            for c in chars.by_ref() {
                if c == quote {
                    return Ok(value);
                }
                value.push(c);
            }
            Err("unterminated attribute value".to_string())
        }
        _ => read_ident(chars),
    }
}

fn parse_compound(input: &str) -> Result<CompoundSelector, String> {
    let mut compound = CompoundSelector::default();
    let mut chars = input.chars().peekable();

    match chars.peek() {
        Some('*') => {
            chars.next();
        }
        Some(&c) if is_ident_char(c) => compound.tag = Some(read_ident(&mut chars)?),
        _ => {}
    }

    while let Some(c) = chars.next() {
        match c {
            '.' => compound.classes.push(read_ident(&mut chars)?),
            '#' => compound.id = Some(read_ident(&mut chars)?),
            '[' => {
                let name = read_ident(&mut chars)?;
                let value = match chars.next() {
                    Some(']') => None,
                    Some('=') => {
                        let value = read_attribute_value(&mut chars)?;
                        if chars.next() != Some(']') {
                            return Err("expected ']'".to_string());
                        }
                        Some(value)
                    }
                    _ => return Err("expected ']' or '='".to_string()),
                };
                compound.attributes.push(AttributeSelector { name, value });
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                return Err("combinators are not supported".to_string());
            }
            other => return Err(format!("unexpected character {:?}", other)),
        }
    }

    Ok(compound)
}
