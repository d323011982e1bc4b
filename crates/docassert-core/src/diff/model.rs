//! Difference output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! A [`DiffPath`] keeps structured segments and renders them in the source
//! format's own addressing convention on `Display`. Elements paired by
//! unordered matching keep both positions; a path names the expected position
//! unless it is seen from the actual side, as unexpected nodes are.

use crate::node::{MemberKind, SequenceKind};
use docassert_core_types::{DocumentFormat, DocumentSide};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering of the side a node is missing from
pub const ABSENT: &str = "(absent)";

/// Category of a single discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifferenceKind {
    /// Present in expected, absent in actual
    MissingInActual,
    /// Present in actual, absent in expected
    UnexpectedInActual,
    /// Both scalars, different values
    ValueMismatch,
    /// Scalar vs. object vs. array
    TypeMismatch,
    /// Same content, significant order differs (or an ordered sequence shifted)
    OrderMismatch,
}

/// One step from a parent node to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    Member { name: String, kind: MemberKind },
    Index { index: usize, sequence: SequenceKind },
    /// Elements paired across sides, possibly at different positions
    Paired {
        expected: usize,
        actual: usize,
        sequence: SequenceKind,
    },
}

impl PathSegment {
    /// Position and sequence of an element step as seen from `side`
    fn position(&self, side: DocumentSide) -> Option<(usize, SequenceKind)> {
        match (self, side) {
            (PathSegment::Member { .. }, _) => None,
            (PathSegment::Index { index, sequence }, _) => Some((*index, *sequence)),
            (PathSegment::Paired { expected, sequence, .. }, DocumentSide::Expected) => {
                Some((*expected, *sequence))
            }
            (PathSegment::Paired { actual, sequence, .. }, DocumentSide::Actual) => {
                Some((*actual, *sequence))
            }
        }
    }
}

/// Location of a node, rendered natively per format.
///
/// | Format | Example |
/// |---|---|
/// | JSON | `$.orders[2].id`, `$['odd key']` |
/// | XML | `/order/line[2]/@sku`, `/order/note/text()` |
/// | CSV | `row #1, column 'name'`, `header, column #3` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffPath {
    format: DocumentFormat,
    segments: Vec<PathSegment>,
    side: DocumentSide,
}

impl DiffPath {
    pub fn root(format: DocumentFormat) -> Self {
        Self::new(format, Vec::new())
    }

    pub fn new(format: DocumentFormat, segments: Vec<PathSegment>) -> Self {
        Self {
            format,
            segments,
            side: DocumentSide::Expected,
        }
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// The same location, rendering paired positions from `side`
    pub fn seen_from(mut self, side: DocumentSide) -> Self {
        self.side = side;
        self
    }

    /// Kind of the last member segment, if the path ends at a member
    pub fn last_member_kind(&self) -> Option<MemberKind> {
        match self.segments.last() {
            Some(PathSegment::Member { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    /// Sequence of the last index segment, if the path ends at an element
    pub fn last_sequence(&self) -> Option<SequenceKind> {
        self.segments
            .last()
            .and_then(|seg| seg.position(self.side))
            .map(|(_, sequence)| sequence)
    }

    fn fmt_json(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for seg in &self.segments {
            match seg {
                PathSegment::Member { name, .. } if is_plain_identifier(name) => {
                    write!(f, ".{}", name)?
                }
                PathSegment::Member { name, .. } => {
                    write!(f, "['{}']", name.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
                _ => {
                    if let Some((index, _)) = seg.position(self.side) {
                        write!(f, "[{}]", index)?
                    }
                }
            }
        }
        Ok(())
    }

    fn fmt_xml(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            match seg {
                PathSegment::Member {
                    name,
                    kind: MemberKind::Attribute,
                } => write!(f, "/@{}", name)?,
                PathSegment::Member {
                    kind: MemberKind::Text,
                    ..
                } => f.write_str("/text()")?,
                PathSegment::Member { name, .. } => write!(f, "/{}", name)?,
                // XPath positions are 1-based
                _ => {
                    if let Some((index, _)) = seg.position(self.side) {
                        write!(f, "[{}]", index + 1)?
                    }
                }
            }
        }
        Ok(())
    }

    fn fmt_csv(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .filter_map(|seg| match seg {
                PathSegment::Member {
                    name,
                    kind: MemberKind::Section,
                } if name == "rows" => None,
                PathSegment::Member {
                    name,
                    kind: MemberKind::Column,
                } => Some(format!("column '{}'", name)),
                PathSegment::Member { name, .. } => Some(name.clone()),
                _ => seg.position(self.side).map(|(index, sequence)| match sequence {
                    SequenceKind::CsvHeader => format!("column #{}", index + 1),
                    _ => format!("row #{}", index + 1),
                }),
            })
            .collect();
        if parts.is_empty() {
            f.write_str("table")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl fmt::Display for DiffPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            DocumentFormat::Json => self.fmt_json(f),
            DocumentFormat::Xml => self.fmt_xml(f),
            DocumentFormat::Csv => self.fmt_csv(f),
        }
    }
}

/// One discrepancy between the expected and the actual tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub path: DiffPath,
    pub kind: DifferenceKind,
    /// Short rendering of the expected side (`(absent)` when missing)
    pub expected: String,
    /// Short rendering of the actual side (`(absent)` when missing)
    pub actual: String,
}

impl Difference {
    pub fn new(
        path: DiffPath,
        kind: DifferenceKind,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let path = match kind {
            DifferenceKind::UnexpectedInActual => path.seen_from(DocumentSide::Actual),
            _ => path,
        };
        Self {
            path,
            kind,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Plain-language label, worded for the node's role in its document
    pub fn describe_kind(&self) -> String {
        let noun = self.subject_noun();
        match self.kind {
            DifferenceKind::MissingInActual => format!("missing {}", noun),
            DifferenceKind::UnexpectedInActual => format!("unexpected {}", noun),
            DifferenceKind::ValueMismatch => "value mismatch".to_string(),
            DifferenceKind::TypeMismatch => "type mismatch".to_string(),
            DifferenceKind::OrderMismatch => "order mismatch".to_string(),
        }
    }

    fn subject_noun(&self) -> &'static str {
        if let Some(kind) = self.path.last_member_kind() {
            return match kind {
                MemberKind::Property => "property",
                MemberKind::Element => "element",
                MemberKind::Attribute => "attribute",
                MemberKind::Text => "text",
                MemberKind::Column => "column",
                MemberKind::Section => "section",
            };
        }
        match self.path.last_sequence() {
            Some(SequenceKind::JsonArray) => "array element",
            Some(SequenceKind::XmlSiblings) => "element",
            Some(SequenceKind::CsvRows) => "row",
            Some(SequenceKind::CsvHeader) => "column",
            None => "node",
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (expected: {}, actual: {})",
            self.path,
            self.describe_kind(),
            self.expected,
            self.actual
        )
    }
}
