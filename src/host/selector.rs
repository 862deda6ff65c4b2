//! Minimal CSS selector engine for the in-memory document
//!
//! Supported: type (`img`, `*`), class, id, attribute presence and equality
//! (`[data-src]`, `[type="submit"]`), compounds of those, the descendant
//! combinator, and comma-separated lists. Anything else fails to parse, and an
//! unparseable selector simply matches nothing.

use super::ElementId;
use regex::Regex;
use std::sync::OnceLock;

/// Read access to the element properties selectors can test
pub trait ElementView {
    fn tag_name(&self, el: ElementId) -> Option<&str>;
    fn has_class_name(&self, el: ElementId, class: &str) -> bool;
    fn attribute_value(&self, el: ElementId, name: &str) -> Option<&str>;
    fn parent_of(&self, el: ElementId) -> Option<ElementId>;
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeTest {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

impl Compound {
    fn matches(&self, view: &impl ElementView, el: ElementId) -> bool {
        let Some(tag) = view.tag_name(el) else {
            return false;
        };
        if let Some(want) = &self.tag {
            if !want.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.ids
            .iter()
            .all(|id| view.attribute_value(el, "id") == Some(id.as_str()))
            && self.classes.iter().all(|c| view.has_class_name(el, c))
            && self.attributes.iter().all(|test| {
                match (view.attribute_value(el, &test.name), &test.value) {
                    (Some(_), None) => true,
                    (Some(actual), Some(want)) => actual == want,
                    (None, _) => false,
                }
            })
    }
}

/// Compounds joined by descendant combinators, left to right
#[derive(Debug, Clone, PartialEq)]
struct Complex(Vec<Compound>);

impl Complex {
    fn matches(&self, view: &impl ElementView, el: ElementId) -> bool {
        let Some((last, ancestors)) = self.0.split_last() else {
            return false;
        };
        if !last.matches(view, el) {
            return false;
        }

        // Descendant-only chains can be matched greedily from the right
        let mut cursor = el;
        for compound in ancestors.iter().rev() {
            loop {
                match view.parent_of(cursor) {
                    Some(parent) => {
                        cursor = parent;
                        if compound.matches(view, parent) {
                            break;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    }
}

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<Complex>);

impl SelectorList {
    /// Parse a selector list. Returns `None` for unsupported syntax.
    pub fn parse(input: &str) -> Option<Self> {
        let mut list = Vec::new();
        for part in split_outside_brackets(input, |c| c == ',') {
            let compounds = split_outside_brackets(&part, char::is_whitespace)
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| parse_compound(s))
                .collect::<Option<Vec<_>>>()?;
            if compounds.is_empty() {
                return None;
            }
            list.push(Complex(compounds));
        }
        if list.is_empty() {
            None
        } else {
            Some(Self(list))
        }
    }

    pub fn matches(&self, view: &impl ElementView, el: ElementId) -> bool {
        self.0.iter().any(|complex| complex.matches(view, el))
    }
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"^(\*|[a-zA-Z][a-zA-Z0-9-]*)").expect("valid tag pattern"))
}

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(
            r#"^(?:\.([\w-]+)|#([\w-]+)|\[\s*([\w-]+)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([\w-]+))\s*)?\])"#,
        )
        .expect("valid selector token pattern")
    })
}

fn parse_compound(input: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = input;

    if let Some(m) = tag_pattern().find(rest) {
        if m.as_str() != "*" {
            compound.tag = Some(m.as_str().to_ascii_lowercase());
        }
        rest = &rest[m.end()..];
    }

    while !rest.is_empty() {
        let caps = token_pattern().captures(rest)?;
        if let Some(class) = caps.get(1) {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(id) = caps.get(2) {
            compound.ids.push(id.as_str().to_string());
        } else if let Some(name) = caps.get(3) {
            let value = caps
                .get(4)
                .or_else(|| caps.get(5))
                .or_else(|| caps.get(6))
                .map(|v| v.as_str().to_string());
            compound.attributes.push(AttributeTest {
                name: name.as_str().to_string(),
                value,
            });
        }
        rest = &rest[caps.get(0)?.end()..];
    }

    Some(compound)
}

/// Split on `is_separator`, ignoring separators inside `[...]` or quotes
fn split_outside_brackets(input: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && is_separator(c) => {
                parts.push(std::mem::take(&mut current).trim().to_string());
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    parts.push(current.trim().to_string());
    parts
}
