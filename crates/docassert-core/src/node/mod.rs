//! Uniform comparable node model.
//!
//! JSON trees, XML element trees and CSV tables are all normalized into
//! [`ComparableNode`] so that one engine can compare any of them. Nodes are
//! built once per load and never mutated afterwards.
//!
//! ## Shapes per format
//!
//! | Format | Scalar | Object | Array |
//! |---|---|---|---|
//! | JSON | string/number/bool/null | object | array |
//! | XML | attribute value, text content | element, document | same-name sibling group |
//! | CSV | cell, header name | row, table | rows, header |

pub mod csv;
pub mod json;
pub mod xml;

use crate::errors::{ExError, ExErrorKind, Result};
use crate::options::ComparisonOptions;
use docassert_core_types::DocumentFormat;
use serde::{Deserialize, Serialize};

pub use self::csv::load_csv;
pub use self::json::load_json;
pub use self::xml::load_xml;

/// Scalar class; values of different classes never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarClass {
    Null,
    Bool,
    Number,
    Text,
}

/// A leaf value: raw literal for display plus a normalized form for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarValue {
    class: ScalarClass,
    raw: String,
    normalized: String,
}

impl ScalarValue {
    pub fn null() -> Self {
        Self {
            class: ScalarClass::Null,
            raw: "null".to_string(),
            normalized: "null".to_string(),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self {
            class: ScalarClass::Bool,
            raw: value.to_string(),
            normalized: value.to_string(),
        }
    }

    /// A numeric literal. Literals denoting the same number (`1`, `1.0`,
    /// `1e0`) share a normalized form.
    pub fn number(literal: impl Into<String>) -> Self {
        let raw = literal.into();
        let normalized = normalize_number(&raw);
        Self {
            class: ScalarClass::Number,
            raw,
            normalized,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        let raw = value.into();
        Self {
            class: ScalarClass::Text,
            normalized: raw.clone(),
            raw,
        }
    }

    pub fn class(&self) -> ScalarClass {
        self.class
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Equality after format-specific normalization
    pub fn equivalent(&self, other: &ScalarValue) -> bool {
        self.class == other.class && self.normalized == other.normalized
    }
}

fn normalize_number(literal: &str) -> String {
    let trimmed = literal.trim();
    if let Ok(i) = trimmed.parse::<i128>() {
        return i.to_string();
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e18 => (f as i128).to_string(),
        Ok(f) if f.is_finite() => f.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Role of an object member; drives path rendering and report wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    /// JSON object property
    Property,
    /// XML child element group
    Element,
    /// XML attribute
    Attribute,
    /// XML text content
    Text,
    /// CSV cell within a row
    Column,
    /// Structural part of a container (CSV `header` / `rows`)
    Section,
}

/// Role of an array; decides which ordering policy governs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceKind {
    JsonArray,
    XmlSiblings,
    CsvRows,
    CsvHeader,
}

/// One keyed child of an object node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    key: String,
    kind: MemberKind,
    node: ComparableNode,
}

impl Member {
    pub fn new(key: impl Into<String>, kind: MemberKind, node: ComparableNode) -> Self {
        Self {
            key: key.into(),
            kind,
            node,
        }
    }

    /// Identity used to match members across documents
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn node(&self) -> &ComparableNode {
        &self.node
    }

    /// Name shown in paths: the child's own name, falling back to the key
    pub fn display_name(&self) -> &str {
        self.node.name().unwrap_or(&self.key)
    }
}

/// Ordered child nodes and the ordering rule that applies to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    kind: SequenceKind,
    items: Vec<ComparableNode>,
}

impl Sequence {
    pub fn new(kind: SequenceKind, items: Vec<ComparableNode>) -> Self {
        Self { kind, items }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn items(&self) -> &[ComparableNode] {
        &self.items
    }
}

/// Exactly one of scalar, object or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    Scalar(ScalarValue),
    Object(Vec<Member>),
    Array(Sequence),
}

/// Coarse node kind, used for type-mismatch detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Scalar,
    Object,
    Array,
}

/// A normalized document node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableNode {
    name: Option<String>,
    content: NodeContent,
}

impl ComparableNode {
    pub fn scalar(name: Option<String>, value: ScalarValue) -> Self {
        Self {
            name,
            content: NodeContent::Scalar(value),
        }
    }

    pub fn object(name: Option<String>, members: Vec<Member>) -> Self {
        Self {
            name,
            content: NodeContent::Object(members),
        }
    }

    pub fn array(name: Option<String>, kind: SequenceKind, items: Vec<ComparableNode>) -> Self {
        Self {
            name,
            content: NodeContent::Array(Sequence::new(kind, items)),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    pub fn kind(&self) -> NodeKind {
        match &self.content {
            NodeContent::Scalar(_) => NodeKind::Scalar,
            NodeContent::Object(_) => NodeKind::Object,
            NodeContent::Array(_) => NodeKind::Array,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match &self.content {
            NodeContent::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn members(&self) -> &[Member] {
        match &self.content {
            NodeContent::Object(members) => members,
            _ => &[],
        }
    }

    pub fn items(&self) -> &[ComparableNode] {
        match &self.content {
            NodeContent::Array(seq) => seq.items(),
            _ => &[],
        }
    }

    /// Look up a member by key
    pub fn member(&self, key: &str) -> Option<&ComparableNode> {
        self.members()
            .iter()
            .find(|m| m.key() == key)
            .map(|m| m.node())
    }

    /// Maximum nesting depth below and including this node.
    ///
    /// An XML sibling group shares the level of its elements.
    pub fn depth(&self) -> usize {
        match &self.content {
            NodeContent::Scalar(_) => 1,
            NodeContent::Object(members) => {
                1 + members.iter().map(|m| m.node().depth()).max().unwrap_or(0)
            }
            NodeContent::Array(seq) => {
                let deepest = seq.items().iter().map(|n| n.depth()).max().unwrap_or(0);
                match seq.kind() {
                    SequenceKind::XmlSiblings => deepest.max(1),
                    _ => 1 + deepest,
                }
            }
        }
    }
}

/// Parse raw text of the given format into a node tree.
///
/// # Errors
///
/// `InvalidOptions` if `options` fail validation, otherwise the format's load
/// error (`InvalidJson`, `InvalidXml`, `InvalidCsv`, `MissingHeader`,
/// `DuplicateColumn`) naming the offending construct and position.
pub fn load(raw: &str, format: DocumentFormat, options: &ComparisonOptions) -> Result<ComparableNode> {
    match format {
        DocumentFormat::Json => load_json(raw, options),
        DocumentFormat::Xml => load_xml(raw, options),
        DocumentFormat::Csv => load_csv(raw, options),
    }
}

/// Reject a loaded tree deeper than `max_depth`.
pub(crate) fn within_depth(
    node: ComparableNode,
    max_depth: usize,
    op: &str,
    format: DocumentFormat,
) -> Result<ComparableNode> {
    let depth = node.depth();
    if depth > max_depth {
        return Err(depth_exceeded(op, format, max_depth));
    }
    Ok(node)
}

pub(crate) fn depth_exceeded(op: &str, format: DocumentFormat, max_depth: usize) -> ExError {
    ExError::new(ExErrorKind::DepthLimitExceeded)
        .with_op(op)
        .with_format(format)
        .with_message(format!("nesting exceeds max_depth {}", max_depth))
}

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// Columns count characters, not bytes. Offsets past the end clamp to it.
pub(crate) fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = &text[..end];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

pub(crate) fn invalid_input(kind: ExErrorKind, op: &str, message: impl Into<String>) -> ExError {
    ExError::new(kind).with_op(op).with_message(message)
}
