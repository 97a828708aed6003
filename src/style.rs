use crate::error::PrintPrepError;
use cssparser::{Delimiter, ParseError, Parser, ParserInput};
use kuchiki::NodeRef;
use lightningcss::stylesheet::{ParserOptions, StyleAttribute};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
    // Source text, kept until the declaration is overwritten.
    source: Option<String>,
}

impl Declaration {
    fn from_source(text: &str) -> Self {
        let (property, value, important) = match text.split_once(':') {
            Some((name, rest)) => {
                let (value, important) = split_important(rest);
                (name.trim().to_ascii_lowercase(), value.to_string(), important)
            }
            None => (String::new(), String::new(), false),
        };
        Self {
            property,
            value,
            important,
            source: Some(text.to_string()),
        }
    }

    fn write_to(&self, out: &mut String) {
        if let Some(source) = &self.source {
            out.push_str(source);
            return;
        }
        out.push_str(&self.property);
        out.push_str(": ");
        out.push_str(&self.value);
        if self.important {
            out.push_str(" !important");
        }
    }
}

/// Declarations of an element's `style` attribute, in attribute order.
///
/// Declarations that are never overwritten are written back exactly as they
/// were read, vendor prefixes and value spelling included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    pub fn parse(raw: &str) -> Result<Self, PrintPrepError> {
        let mut style = InlineStyle::default();
        if raw.trim().is_empty() {
            return Ok(style);
        }
        StyleAttribute::parse(raw, ParserOptions::default())
            .map_err(|err| PrintPrepError::InvalidStyle(format!("{raw:?}: {err}")))?;
        style.declarations = declaration_sources(raw)
            .into_iter()
            .map(Declaration::from_source)
            .collect();
        Ok(style)
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|decl| decl.property.eq_ignore_ascii_case(property))
            .map(|decl| decl.value.as_str())
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Sets `property` to `value`, replacing the last declaration of that
    /// property in place. Returns false when it already had exactly this value.
    pub fn set(&mut self, property: &str, value: &str) -> bool {
        if let Some(decl) = self
            .declarations
            .iter_mut()
            .rev()
            .find(|decl| decl.property.eq_ignore_ascii_case(property))
        {
            if decl.value == value && !decl.important {
                return false;
            }
            decl.value = value.to_string();
            decl.important = false;
            decl.source = None;
            return true;
        }
        self.declarations.push(Declaration {
            property: property.to_ascii_lowercase(),
            value: value.to_string(),
            important: false,
            source: None,
        });
        true
    }

    pub fn to_attribute(&self) -> String {
        let mut out = String::new();
        for (idx, decl) in self.declarations.iter().enumerate() {
            if idx > 0 {
                out.push_str("; ");
            }
            decl.write_to(&mut out);
        }
        out
    }
}

/// Source text of each declaration, split on top-level semicolons only.
fn declaration_sources(raw: &str) -> Vec<&str> {
    let mut input = ParserInput::new(raw);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();
    while !parser.is_exhausted() {
        let start = parser.position();
        let _ = parser.parse_until_after(Delimiter::Semicolon, skip_declaration);
        let text = parser.slice_from(start).trim().trim_end_matches(';').trim_end();
        if !text.is_empty() {
            out.push(text);
        }
    }
    out
}

fn skip_declaration<'i>(parser: &mut Parser<'i, '_>) -> Result<(), ParseError<'i, ()>> {
    while parser.next().is_ok() {}
    Ok(())
}

fn split_important(value: &str) -> (&str, bool) {
    let trimmed = value.trim();
    if trimmed.to_ascii_lowercase().ends_with("important") {
        let head = trimmed[..trimmed.len() - "important".len()].trim_end();
        if let Some(rest) = head.strip_suffix('!') {
            return (rest.trim_end(), true);
        }
    }
    (trimmed, false)
}

/// A set of property assignments applied to one element as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePatch {
    entries: Vec<(String, String)>,
}

impl StylePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((property.into(), value.into()));
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Writes every entry of `patch` into the node's `style` attribute.
///
/// The attribute is parsed once, all entries are merged, and it is written
/// back once, so an observer never sees a partially applied patch. When the
/// merge changes nothing the attribute is left byte-for-byte as it was.
pub fn apply_style_patch(node: &NodeRef, patch: &StylePatch) -> Result<bool, PrintPrepError> {
    let Some(element) = node.as_element() else {
        return Ok(false);
    };
    let mut attrs = element.attributes.borrow_mut();
    let mut style = InlineStyle::parse(attrs.get("style").unwrap_or(""))?;
    let mut changed = false;
    for (property, value) in patch.iter() {
        changed |= style.set(property, value);
    }
    if changed {
        attrs.insert("style", style.to_attribute());
    }
    Ok(changed)
}

pub fn inline_style(node: &NodeRef) -> Result<InlineStyle, PrintPrepError> {
    let Some(element) = node.as_element() else {
        return Ok(InlineStyle::default());
    };
    let attrs = element.attributes.borrow();
    InlineStyle::parse(attrs.get("style").unwrap_or(""))
}

pub fn style_property(node: &NodeRef, property: &str) -> Result<Option<String>, PrintPrepError> {
    Ok(inline_style(node)?.get(property).map(str::to_string))
}
