//! Markup IR consumed by the tagging pipeline.
//!
//! A closed set of node kinds lowered from the parser's AST by
//! [`crate::parse`]. The classifier and the attribute pipeline only ever see
//! these types, never parser internals.

use serde::Serialize;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// POSITIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Byte range `[start, end)` into the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl Default for SourcePosition {
    fn default() -> Self {
        SourcePosition { line: 1, column: 0 }
    }
}

/// Maps byte offsets to line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn position(&self, source: &str, offset: usize) -> SourcePosition {
        let offset = offset.min(source.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let column = source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - line_start);

        SourcePosition {
            line: line_idx as u32 + 1,
            column: column as u32,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub kind: ImportKind,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub source: String,
    pub bindings: Vec<ImportBinding>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ELEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagName {
    Identifier(String),
    /// `Namespace.Tag`, outermost object first.
    Member(Vec<String>),
    Namespaced { namespace: String, name: String },
}

impl TagName {
    /// First dotted segment, used for namespace-import exclusion.
    pub fn root_segment(&self) -> &str {
        match self {
            TagName::Identifier(name) => name,
            TagName::Member(parts) => parts.first().map(String::as_str).unwrap_or(""),
            TagName::Namespaced { namespace, .. } => namespace,
        }
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagName::Identifier(name) => f.write_str(name),
            TagName::Member(parts) => f.write_str(&parts.join(".")),
            TagName::Namespaced { namespace, name } => write!(f, "{}:{}", namespace, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl LiteralValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            LiteralValue::String(s) => serde_json::Value::String(s.clone()),
            LiteralValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            LiteralValue::Bool(b) => serde_json::Value::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeNode {
    /// `name="v"`, `name={1}`, `name={true}` or a bare `name`.
    Literal { name: String, value: LiteralValue },
    /// `name={expr}` with a non-literal expression.
    Expression { name: String },
    Spread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub name: TagName,
    /// Span of the opening tag only, `<` through its closing `>` or `/>`.
    pub opening_span: ByteSpan,
    pub self_closing: bool,
    pub location: Option<SourcePosition>,
    pub attributes: Vec<AttributeNode>,
    pub children: Vec<MarkupNode>,
}

impl ElementNode {
    /// Direct text children, trimmed and joined by single spaces.
    pub fn flattened_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .children
            .iter()
            .filter_map(|child| match child {
                MarkupNode::Text(text) => Some(text.value.trim()),
                MarkupNode::Element(_) => None,
            })
            .filter(|t| !t.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(ElementNode),
    Text(TextNode),
}

/// Everything the tagging pass needs from one parsed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupModule {
    pub imports: Vec<ImportDecl>,
    pub elements: Vec<MarkupNode>,
}
