//! A small CSS-like selector language for locating structural cues.
//!
//! Supported: comma-separated alternatives, descendant (whitespace) and child
//! (`>`) combinators, and compounds made of an optional tag or `*`, `#id`,
//! `.class`, `[attr]` and `[attr=value]` (value optionally single or double
//! quoted). Pseudo-classes are not supported.

use std::{
    fmt::{Display as FmtDisplay, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::{HostTree, NodeId, SelectorError};

/// How a compound relates to the compound on its left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    /// Any ancestor.
    Descendant,
    /// Direct parent.
    Child,
}

/// Attribute presence or equality test.
#[derive(Clone, Debug, PartialEq, Eq)]
struct AttrTest {
    /// Attribute name.
    name: String,
    /// Required value; `None` tests presence only.
    value: Option<String>,
}

/// A run of simple selectors with no combinator between them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    /// Lower-case tag name; `None` matches any element.
    tag: Option<String>,
    /// Required `id` attribute.
    id: Option<String>,
    /// Classes that must all be present.
    classes: Vec<String>,
    /// Attribute tests that must all hold.
    attrs: Vec<AttrTest>,
}

impl Compound {
    /// True when the compound carries no tests at all.
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    /// Test this compound against a single node.
    fn matches<H: HostTree + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        let Some(tag) = host.tag(node) else {
            return false;
        };
        if let Some(want) = &self.tag
            && !tag.eq_ignore_ascii_case(want)
        {
            return false;
        }
        if let Some(id) = &self.id
            && host.attr(node, "id").as_deref() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.is_empty() {
            let have = host.classes(node);
            if !self.classes.iter().all(|c| have.contains(c)) {
                return false;
            }
        }
        self.attrs.iter().all(|t| match (host.attr(node, &t.name), &t.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(v), Some(want)) => &v == want,
        })
    }
}

/// One comma-separated alternative: compounds left to right, each paired with
/// the combinator that joins it to its left neighbour.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    /// Non-empty list of parts; the first combinator is ignored.
    parts: Vec<(Combinator, Compound)>,
}

impl Complex {
    /// Match right-to-left starting from the subject node.
    fn matches<H: HostTree + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        self.match_at(host, node, self.parts.len() - 1)
    }

    /// Match `parts[..=idx]` with `node` as the subject of `parts[idx]`.
    fn match_at<H: HostTree + ?Sized>(&self, host: &H, node: NodeId, idx: usize) -> bool {
        let (comb, compound) = &self.parts[idx];
        if !compound.matches(host, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match comb {
            Combinator::Child => host
                .parent(node)
                .is_some_and(|p| self.match_at(host, p, idx - 1)),
            Combinator::Descendant => {
                let mut cur = host.parent(node);
                while let Some(p) = cur {
                    if self.match_at(host, p, idx - 1) {
                        return true;
                    }
                    cur = host.parent(p);
                }
                false
            }
        }
    }
}

/// A parsed selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    /// Original text, kept for diagnostics.
    source: String,
    /// Alternatives; a node matches if any alternative matches.
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for alt in split_top_level(text)? {
            alternatives.push(Parser::new(text, alt).complex()?);
        }
        if alternatives.is_empty() {
            return Err(SelectorError::new(text, "empty selector"));
        }
        Ok(Self {
            source: text.to_string(),
            alternatives,
        })
    }

    /// The selector text as supplied.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if `node` matches any alternative.
    pub fn matches<H: HostTree + ?Sized>(&self, host: &H, node: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(host, node))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FmtDisplay for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.source)
    }
}

/// Split on commas that are not inside brackets or quotes.
fn split_top_level(text: &str) -> Result<Vec<&str>, SelectorError> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(SelectorError::new(text, "unterminated quote"));
    }
    out.push(&text[start..]);
    if out.iter().any(|s| s.trim().is_empty()) {
        return Err(SelectorError::new(text, "empty alternative"));
    }
    Ok(out)
}

/// Characters allowed in identifiers (tags, classes, ids, attribute names).
fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Cursor over a single alternative.
struct Parser<'a> {
    /// Whole selector, for error messages.
    full: &'a str,
    /// Characters of this alternative.
    chars: Vec<char>,
    /// Current index into `chars`.
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Start parsing `alt`, reporting errors against `full`.
    fn new(full: &'a str, alt: &str) -> Self {
        Self {
            full,
            chars: alt.chars().collect(),
            pos: 0,
        }
    }

    /// Build an error for the current alternative.
    fn err(&self, msg: &str) -> SelectorError {
        SelectorError::new(self.full, format!("{msg} at offset {}", self.pos))
    }

    /// Current character.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Skip whitespace; returns true if any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Consume an identifier.
    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.err("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Parse a full alternative.
    fn complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut comb = Combinator::Descendant;
        self.skip_ws();
        loop {
            let compound = self.compound()?;
            parts.push((comb, compound));
            let had_ws = self.skip_ws();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    comb = Combinator::Child;
                }
                Some(_) if had_ws => comb = Combinator::Descendant,
                Some(_) => return Err(self.err("unexpected character")),
            }
            if self.peek().is_none() {
                return Err(self.err("dangling combinator"));
            }
        }
        Ok(Complex { parts })
    }

    /// Parse one compound selector.
    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut c = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(ch) if is_ident(ch) => c.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    c.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.pos += 1;
                    c.id = Some(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    c.attrs.push(self.attr()?);
                }
                _ => break,
            }
        }
        if c.is_empty() && !universal {
            return Err(self.err("expected selector"));
        }
        Ok(c)
    }

    /// Parse the inside of `[...]`; the opening bracket is already consumed.
    fn attr(&mut self) -> Result<AttrTest, SelectorError> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let value = match self.peek() {
            Some(']') => None,
            Some('=') => {
                self.pos += 1;
                self.skip_ws();
                Some(self.attr_value()?)
            }
            _ => return Err(self.err("expected ']' or '='")),
        };
        self.skip_ws();
        if self.peek() != Some(']') {
            return Err(self.err("expected ']'"));
        }
        self.pos += 1;
        Ok(AttrTest { name, value })
    }

    /// Parse a quoted or bare attribute value.
    fn attr_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.err("unterminated quote"));
                }
                let v = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(v)
            }
            _ => self.ident(),
        }
    }
}
