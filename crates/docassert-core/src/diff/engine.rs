//! Structural comparison engine.
//!
//! The core entry point is [`compare`], which walks an expected and an actual
//! [`ComparableNode`] tree in lock-step and collects every [`Difference`].
//!
//! ## Unordered matching
//!
//! When order is ignored, array elements are paired in two phases:
//!
//! 1. Elements with identical fingerprints pair first, expected elements in
//!    document order each taking the lowest unmatched actual index.
//! 2. Remaining elements of the same node kind are scored by the number of
//!    differences a full comparison yields. The pair with the lowest
//!    `(difference count, smaller fingerprint, larger fingerprint, expected
//!    index, actual index)` is taken, repeatedly. Fingerprints order the
//!    candidates the same way whichever side is called expected, so swapping
//!    the inputs pairs the same elements.
//!
//! Paired elements keep both positions in their path. Leftovers are reported
//! whole, as missing (expected index) or unexpected (actual index).
//!
//! ## Depth
//!
//! The root is at depth 1 and each member or array element one deeper,
//! except that an XML sibling group adds no level of its own: an element sits
//! one level below its parent element.

use crate::diff::model::{DiffPath, Difference, DifferenceKind, PathSegment, ABSENT};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::node::{
    ComparableNode, Member, MemberKind, NodeContent, ScalarClass, ScalarValue, Sequence,
    SequenceKind,
};
use crate::options::{ComparisonOptions, OrderMode};
use crate::{log_op_end, log_op_error, log_op_start};
use docassert_core_types::DocumentFormat;
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;
use std::time::Instant;

/// Longest short rendering of a node in a difference
pub const MAX_DESCRIPTION_CHARS: usize = 80;

/// SHA-256 digest of a subtree under the active ignore and order rules.
type Fingerprint = [u8; 32];

/// Compare two node trees and return every difference, in depth-first
/// visitation order.
///
/// # Errors
///
/// - `InvalidOptions` — `options` fail validation
/// - `DepthLimitExceeded` — nesting deeper than `options.max_depth`
pub fn compare(
    expected: &ComparableNode,
    actual: &ComparableNode,
    format: DocumentFormat,
    options: &ComparisonOptions,
) -> Result<Vec<Difference>> {
    let start = Instant::now();
    log_op_start!("compare", format = format.label());

    let result = options.validate().and_then(|_| {
        let mut walker = Walker::new(format, options);
        let mut out = Vec::new();
        walker.walk(expected, actual, 1, &mut out)?;
        Ok(out)
    });

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(differences) => {
            log_op_end!("compare", duration_ms = duration_ms, diff_count = differences.len());
        }
        Err(e) => {
            log_op_error!("compare", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}

struct Walker<'o> {
    format: DocumentFormat,
    options: &'o ComparisonOptions,
    path: Vec<PathSegment>,
}

impl<'o> Walker<'o> {
    fn new(format: DocumentFormat, options: &'o ComparisonOptions) -> Self {
        Self {
            format,
            options,
            path: Vec::new(),
        }
    }

    fn current_path(&self) -> DiffPath {
        DiffPath::new(self.format, self.path.clone())
    }

    fn record(&self, kind: DifferenceKind, expected: String, actual: String, out: &mut Vec<Difference>) {
        out.push(Difference::new(self.current_path(), kind, expected, actual));
    }

    /// Record a difference one segment below the current path.
    fn record_at(
        &mut self,
        segment: PathSegment,
        kind: DifferenceKind,
        expected: String,
        actual: String,
        out: &mut Vec<Difference>,
    ) {
        self.path.push(segment);
        self.record(kind, expected, actual, out);
        self.path.pop();
    }

    /// Walk a child pair one segment below the current path.
    fn walk_at(
        &mut self,
        segment: PathSegment,
        expected: &ComparableNode,
        actual: &ComparableNode,
        depth: usize,
        out: &mut Vec<Difference>,
    ) -> Result<()> {
        self.path.push(segment);
        let result = self.walk(expected, actual, depth, out);
        self.path.pop();
        result
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(ExError::new(ExErrorKind::DepthLimitExceeded)
                .with_op("compare")
                .with_format(self.format)
                .with_path(self.current_path().to_string())
                .with_message(format!(
                    "nesting exceeds max_depth {}",
                    self.options.max_depth
                )));
        }
        Ok(())
    }

    fn walk(
        &mut self,
        expected: &ComparableNode,
        actual: &ComparableNode,
        depth: usize,
        out: &mut Vec<Difference>,
    ) -> Result<()> {
        self.check_depth(depth)?;

        match (expected.content(), actual.content()) {
            (NodeContent::Scalar(e), NodeContent::Scalar(a)) => {
                if !e.equivalent(a) {
                    self.record(
                        DifferenceKind::ValueMismatch,
                        describe_scalar(e),
                        describe_scalar(a),
                        out,
                    );
                }
                Ok(())
            }
            (NodeContent::Object(e), NodeContent::Object(a)) => {
                self.walk_object(e, a, depth, out)
            }
            (NodeContent::Array(e), NodeContent::Array(a)) => self.walk_array(e, a, depth, out),
            _ => {
                self.record(
                    DifferenceKind::TypeMismatch,
                    describe_node(expected, self.format),
                    describe_node(actual, self.format),
                    out,
                );
                Ok(())
            }
        }
    }

    fn walk_object(
        &mut self,
        expected: &[Member],
        actual: &[Member],
        depth: usize,
        out: &mut Vec<Difference>,
    ) -> Result<()> {
        let expected: Vec<&Member> = expected.iter().filter(|m| !self.skips_member(m)).collect();
        let actual: Vec<&Member> = actual.iter().filter(|m| !self.skips_member(m)).collect();

        if self.options.order == OrderMode::Include {
            self.check_attribute_order(&expected, &actual, out);
        }

        for member in &expected {
            let segment = member_segment(member);
            match actual.iter().find(|m| m.key() == member.key()) {
                Some(other) => self.walk_at(segment, member.node(), other.node(), depth + 1, out)?,
                // Column presence is reported once by the header comparison
                None if member.kind() == MemberKind::Column => {}
                None => self.record_at(
                    segment,
                    DifferenceKind::MissingInActual,
                    describe_node(member.node(), self.format),
                    ABSENT.to_string(),
                    out,
                ),
            }
        }

        for member in &actual {
            if member.kind() == MemberKind::Column || expected.iter().any(|m| m.key() == member.key())
            {
                continue;
            }
            self.record_at(
                member_segment(member),
                DifferenceKind::UnexpectedInActual,
                ABSENT.to_string(),
                describe_node(member.node(), self.format),
                out,
            );
        }
        Ok(())
    }

    /// One `OrderMismatch` at the element when shared attributes appear in a
    /// different relative order.
    fn check_attribute_order(&self, expected: &[&Member], actual: &[&Member], out: &mut Vec<Difference>) {
        let shared_in = |side: &[&Member], other: &[&Member]| -> Vec<String> {
            side.iter()
                .filter(|m| m.kind() == MemberKind::Attribute)
                .filter(|m| other.iter().any(|o| o.key() == m.key()))
                .map(|m| format!("@{}", m.display_name()))
                .collect()
        };
        let e = shared_in(expected, actual);
        let a = shared_in(actual, expected);
        if e != a {
            self.record(DifferenceKind::OrderMismatch, e.join(" "), a.join(" "), out);
        }
    }

    fn walk_array(
        &mut self,
        expected: &Sequence,
        actual: &Sequence,
        depth: usize,
        out: &mut Vec<Difference>,
    ) -> Result<()> {
        let sequence = expected.kind();
        let e = self.kept_items(expected);
        let a = self.kept_items(actual);
        let item_depth = item_depth(sequence, depth);

        if sequence == SequenceKind::XmlSiblings && e.len() == 1 && a.len() == 1 {
            return self.walk(e[0].1, a[0].1, item_depth, out);
        }

        match self.order_for(sequence) {
            OrderMode::Include => self.walk_ordered(sequence, &e, &a, item_depth, out),
            OrderMode::Ignore => self.walk_unordered(sequence, &e, &a, item_depth, out),
        }
    }

    fn fingerprints(&self, items: &[(usize, &ComparableNode)], depth: usize) -> Result<Vec<Fingerprint>> {
        items.iter().map(|(_, n)| self.fingerprint(n, depth)).collect()
    }

    /// `depth` is the depth of the items themselves
    fn walk_ordered(
        &mut self,
        sequence: SequenceKind,
        expected: &[(usize, &ComparableNode)],
        actual: &[(usize, &ComparableNode)],
        depth: usize,
        out: &mut Vec<Difference>,
    ) -> Result<()> {
        if expected.len() != actual.len() {
            self.record(
                DifferenceKind::OrderMismatch,
                describe_items(expected.iter().map(|(_, n)| *n), self.format),
                describe_items(actual.iter().map(|(_, n)| *n), self.format),
                out,
            );
            return Ok(());
        }

        let ef = self.fingerprints(expected, depth)?;
        let af = self.fingerprints(actual, depth)?;
        if ef != af {
            let mut se = ef.clone();
            let mut sa = af.clone();
            se.sort_unstable();
            sa.sort_unstable();
            if se == sa {
                self.record(
                    DifferenceKind::OrderMismatch,
                    describe_items(expected.iter().map(|(_, n)| *n), self.format),
                    describe_items(actual.iter().map(|(_, n)| *n), self.format),
                    out,
                );
                return Ok(());
            }
        }

        for ((index, e), (_, a)) in expected.iter().zip(actual.iter()) {
            self.walk_at(PathSegment::Index { index: *index, sequence }, e, a, depth, out)?;
        }
        Ok(())
    }

    /// `depth` is the depth of the items themselves
    fn walk_unordered(
        &mut self,
        sequence: SequenceKind,
        expected: &[(usize, &ComparableNode)],
        actual: &[(usize, &ComparableNode)],
        depth: usize,
        out: &mut Vec<Difference>,
    ) -> Result<()> {
        let ef = self.fingerprints(expected, depth)?;
        let af = self.fingerprints(actual, depth)?;

        let mut matched: Vec<Option<usize>> = vec![None; expected.len()];
        let mut used = vec![false; actual.len()];

        for (i, fp) in ef.iter().enumerate() {
            if let Some(j) = (0..actual.len()).find(|&j| !used[j] && af[j] == *fp) {
                tracing::trace!(
                    path = %self.current_path(),
                    expected_index = expected[i].0,
                    actual_index = actual[j].0,
                    fingerprint = %hex::encode(fp),
                    "identical elements paired"
                );
                matched[i] = Some(j);
                used[j] = true;
            }
        }

        let mut scored: Vec<Candidate> = Vec::new();
        for (i, (e_index, e)) in expected.iter().enumerate() {
            if matched[i].is_some() {
                continue;
            }
            for (j, (a_index, a)) in actual.iter().enumerate() {
                if used[j] || e.kind() != a.kind() {
                    continue;
                }
                let mut diffs = Vec::new();
                let segment = PathSegment::Paired {
                    expected: *e_index,
                    actual: *a_index,
                    sequence,
                };
                self.walk_at(segment, e, a, depth, &mut diffs)?;
                scored.push(Candidate {
                    count: diffs.len(),
                    low: ef[i].min(af[j]),
                    high: ef[i].max(af[j]),
                    i,
                    j,
                    diffs,
                });
            }
        }
        scored.sort_by(|x, y| x.key().cmp(&y.key()));

        let mut pair_diffs: BTreeMap<usize, Vec<Difference>> = BTreeMap::new();
        for Candidate { count, i, j, diffs, .. } in scored {
            if matched[i].is_some() || used[j] {
                continue;
            }
            tracing::debug!(
                path = %self.current_path(),
                expected_index = expected[i].0,
                actual_index = actual[j].0,
                diff_count = count,
                "closest elements paired"
            );
            matched[i] = Some(j);
            used[j] = true;
            pair_diffs.insert(i, diffs);
        }

        for (i, (index, node)) in expected.iter().enumerate() {
            match matched[i] {
                Some(_) => {
                    if let Some(diffs) = pair_diffs.remove(&i) {
                        out.extend(diffs);
                    }
                }
                None => self.record_at(
                    PathSegment::Index {
                        index: *index,
                        sequence,
                    },
                    DifferenceKind::MissingInActual,
                    describe_node(node, self.format),
                    ABSENT.to_string(),
                    out,
                ),
            }
        }
        for (j, (index, node)) in actual.iter().enumerate() {
            if !used[j] {
                self.record_at(
                    PathSegment::Index {
                        index: *index,
                        sequence,
                    },
                    DifferenceKind::UnexpectedInActual,
                    ABSENT.to_string(),
                    describe_node(node, self.format),
                    out,
                );
            }
        }
        Ok(())
    }

    fn order_for(&self, sequence: SequenceKind) -> OrderMode {
        match sequence {
            SequenceKind::JsonArray | SequenceKind::XmlSiblings => self.options.order,
            SequenceKind::CsvRows => self.options.row_order(),
            SequenceKind::CsvHeader => self.options.column_order(),
        }
    }

    fn skips_member(&self, member: &Member) -> bool {
        self.options.is_ignored(member.key())
            || member.node().name().is_some_and(|n| self.options.is_ignored(n))
    }

    /// Items not excluded by name, with their source indices
    fn kept_items<'n>(&self, sequence: &'n Sequence) -> Vec<(usize, &'n ComparableNode)> {
        sequence
            .items()
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.name().is_some_and(|name| self.options.is_ignored(name)))
            .collect()
    }

    /// Digest of a subtree at `depth`. Equal fingerprints imply the subtrees
    /// compare without differences under the same options.
    fn fingerprint(&self, node: &ComparableNode, depth: usize) -> Result<Fingerprint> {
        self.check_depth(depth)?;
        let mut hasher = Sha256::new();
        match node.content() {
            NodeContent::Scalar(value) => {
                hasher.update(b"S");
                hasher.update([class_tag(value.class())]);
                update_str(&mut hasher, value.normalized());
            }
            NodeContent::Object(members) => {
                hasher.update(b"O");
                let kept: Vec<&Member> = members.iter().filter(|m| !self.skips_member(m)).collect();
                let (mut attributes, mut others): (Vec<&Member>, Vec<&Member>) = kept
                    .into_iter()
                    .partition(|m| m.kind() == MemberKind::Attribute);
                if self.options.order == OrderMode::Ignore {
                    attributes.sort_by(|a, b| a.key().cmp(b.key()));
                }
                others.sort_by(|a, b| a.key().cmp(b.key()));
                for member in attributes.into_iter().chain(others) {
                    update_str(&mut hasher, member.key());
                    hasher.update(self.fingerprint(member.node(), depth + 1)?);
                }
            }
            NodeContent::Array(sequence) => {
                hasher.update(b"A");
                let item_depth = item_depth(sequence.kind(), depth);
                let mut items: Vec<Fingerprint> = self
                    .kept_items(sequence)
                    .into_iter()
                    .map(|(_, n)| self.fingerprint(n, item_depth))
                    .collect::<Result<_>>()?;
                if self.order_for(sequence.kind()) == OrderMode::Ignore {
                    items.sort_unstable();
                }
                hasher.update((items.len() as u64).to_be_bytes());
                for item in items {
                    hasher.update(item);
                }
            }
        }
        Ok(hasher.finalize().into())
    }
}

/// A scored pairing of two leftover elements.
struct Candidate {
    count: usize,
    low: Fingerprint,
    high: Fingerprint,
    i: usize,
    j: usize,
    diffs: Vec<Difference>,
}

impl Candidate {
    fn key(&self) -> (usize, &Fingerprint, &Fingerprint, usize, usize) {
        (self.count, &self.low, &self.high, self.i, self.j)
    }
}

/// Depth of the elements of a sequence at `depth`
fn item_depth(sequence: SequenceKind, depth: usize) -> usize {
    match sequence {
        SequenceKind::XmlSiblings => depth,
        _ => depth + 1,
    }
}

fn update_str(hasher: &mut Sha256, text: &str) {
    hasher.update((text.len() as u64).to_be_bytes());
    hasher.update(text.as_bytes());
}

fn class_tag(class: ScalarClass) -> u8 {
    match class {
        ScalarClass::Null => 0,
        ScalarClass::Bool => 1,
        ScalarClass::Number => 2,
        ScalarClass::Text => 3,
    }
}

fn member_segment(member: &Member) -> PathSegment {
    PathSegment::Member {
        name: member.display_name().to_string(),
        kind: member.kind(),
    }
}

// ---------------------------------------------------------------------------
// Short renderings
// ---------------------------------------------------------------------------

/// Short, single-line rendering of a node for a difference line.
///
/// Text scalars are quoted, other scalars shown raw; XML elements render as a
/// shallow tag; objects list their members one level deep; arrays show their
/// scalars or an element count. Capped at [`MAX_DESCRIPTION_CHARS`].
pub fn describe_node(node: &ComparableNode, format: DocumentFormat) -> String {
    let text = match node.content() {
        NodeContent::Scalar(value) => describe_scalar(value),
        NodeContent::Object(members) => match (format, node.name()) {
            (DocumentFormat::Xml, Some(name)) => describe_element(name, members),
            _ => {
                let parts: Vec<String> = members
                    .iter()
                    .map(|m| format!("{}: {}", m.display_name(), describe_shallow(m.node())))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        },
        NodeContent::Array(sequence) => describe_items(sequence.items().iter(), format),
    };
    cap(text)
}

fn describe_scalar(value: &ScalarValue) -> String {
    match value.class() {
        ScalarClass::Text => format!("{:?}", value.raw()),
        _ => value.raw().to_string(),
    }
}

fn describe_shallow(node: &ComparableNode) -> String {
    match node.content() {
        NodeContent::Scalar(value) => describe_scalar(value),
        NodeContent::Object(_) => "{…}".to_string(),
        NodeContent::Array(sequence) => count_label(sequence.items().len()),
    }
}

fn describe_element(name: &str, members: &[Member]) -> String {
    let mut tag = format!("<{}", name);
    let mut text = String::new();
    let mut has_children = false;
    for member in members {
        match member.kind() {
            MemberKind::Attribute => {
                let value = member.node().as_scalar().map(|v| v.raw()).unwrap_or_default();
                tag.push_str(&format!(" {}={:?}", member.display_name(), value));
            }
            MemberKind::Text => {
                text = member
                    .node()
                    .as_scalar()
                    .map(|v| v.raw().to_string())
                    .unwrap_or_default();
            }
            _ => has_children = true,
        }
    }
    if has_children {
        format!("{}>{}…</{}>", tag, text, name)
    } else if text.is_empty() {
        format!("{}/>", tag)
    } else {
        format!("{}>{}</{}>", tag, text, name)
    }
}

fn describe_items<'n>(items: impl Iterator<Item = &'n ComparableNode>, format: DocumentFormat) -> String {
    let items: Vec<&ComparableNode> = items.collect();
    if items.iter().all(|n| n.as_scalar().is_some()) {
        let parts: Vec<String> = items
            .iter()
            .map(|n| describe_node(n, format))
            .collect();
        let listed = format!("[{}]", parts.join(", "));
        if listed.chars().count() <= MAX_DESCRIPTION_CHARS {
            return listed;
        }
    }
    count_label(items.len())
}

fn count_label(len: usize) -> String {
    if len == 1 {
        "[1 element]".to_string()
    } else {
        format!("[{} elements]", len)
    }
}

fn cap(text: String) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text;
    }
    let mut short: String = text.chars().take(MAX_DESCRIPTION_CHARS - 1).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{load_csv, load_json, load_xml};
    use crate::options::CsvOptions;

    fn json_diffs(e: &str, a: &str, opts: &ComparisonOptions) -> Vec<Difference> {
        let e = load_json(e, opts).unwrap();
        let a = load_json(a, opts).unwrap();
        compare(&e, &a, DocumentFormat::Json, opts).unwrap()
    }

    fn xml_diffs(e: &str, a: &str, opts: &ComparisonOptions) -> Vec<Difference> {
        let e = load_xml(e, opts).unwrap();
        let a = load_xml(a, opts).unwrap();
        compare(&e, &a, DocumentFormat::Xml, opts).unwrap()
    }

    fn csv_diffs(e: &str, a: &str, opts: &ComparisonOptions) -> Vec<Difference> {
        let e = load_csv(e, opts).unwrap();
        let a = load_csv(a, opts).unwrap();
        compare(&e, &a, DocumentFormat::Csv, opts).unwrap()
    }

    fn paths(diffs: &[Difference]) -> Vec<String> {
        diffs.iter().map(|d| d.path.to_string()).collect()
    }

    #[test]
    fn test_scalar_value_mismatch() {
        let diffs = json_diffs(r#"{"a":1}"#, r#"{"a":2}"#, &ComparisonOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::ValueMismatch);
        assert_eq!(diffs[0].path.to_string(), "$.a");
        assert_eq!(diffs[0].expected, "1");
        assert_eq!(diffs[0].actual, "2");
    }

    #[test]
    fn test_numeric_literals_are_equivalent() {
        let diffs = json_diffs(r#"[1, 2.50]"#, r#"[1.0, 2.5]"#, &ComparisonOptions::default());
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_type_mismatch_stops_descent() {
        let diffs = json_diffs(r#"{"a":{"b":1}}"#, r#"{"a":[1]}"#, &ComparisonOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::TypeMismatch);
        assert_eq!(diffs[0].expected, "{b: 1}");
        assert_eq!(diffs[0].actual, "[1]");
    }

    #[test]
    fn test_missing_and_unexpected_members() {
        let diffs = json_diffs(r#"{"a":1,"b":2}"#, r#"{"a":1,"c":3}"#, &ComparisonOptions::default());
        assert_eq!(paths(&diffs), vec!["$.b", "$.c"]);
        assert_eq!(diffs[0].kind, DifferenceKind::MissingInActual);
        assert_eq!(diffs[0].actual, ABSENT);
        assert_eq!(diffs[1].kind, DifferenceKind::UnexpectedInActual);
    }

    #[test]
    fn test_ordered_length_change_is_one_order_mismatch() {
        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = json_diffs("[1,2,3,4]", "[0,1,2,3,4]", &opts);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::OrderMismatch);
        assert_eq!(diffs[0].path.to_string(), "$");
    }

    #[test]
    fn test_ordered_permutation_is_one_order_mismatch() {
        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = json_diffs(r#"[{"a":1},{"a":2}]"#, r#"[{"a":2},{"a":1}]"#, &opts);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::OrderMismatch);
    }

    #[test]
    fn test_ordered_same_length_recurses_by_index() {
        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = json_diffs("[1,2,3]", "[1,5,3]", &opts);
        assert_eq!(paths(&diffs), vec!["$[1]"]);
        assert_eq!(diffs[0].kind, DifferenceKind::ValueMismatch);
    }

    #[test]
    fn test_unordered_permutation_passes() {
        let diffs = json_diffs(
            r#"[{"id":1},{"id":2},{"id":3}]"#,
            r#"[{"id":3},{"id":1},{"id":2}]"#,
            &ComparisonOptions::default(),
        );
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_unordered_pairs_closest_element() {
        let diffs = json_diffs(
            r#"[{"id":1,"n":"a"},{"id":2,"n":"b"}]"#,
            r#"[{"id":2,"n":"b"},{"id":1,"n":"x"}]"#,
            &ComparisonOptions::default(),
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path.to_string(), "$[0].n");
        assert_eq!(diffs[0].expected, "\"a\"");
        assert_eq!(diffs[0].actual, "\"x\"");
    }

    #[test]
    fn test_unordered_leftovers_reported_whole() {
        let diffs = json_diffs(r#"[1, {"a":1}]"#, r#"[1, "x", "y"]"#, &ComparisonOptions::default());
        let kinds: Vec<DifferenceKind> = diffs.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DifferenceKind::MissingInActual,
                DifferenceKind::UnexpectedInActual,
                DifferenceKind::UnexpectedInActual
            ]
        );
        assert_eq!(paths(&diffs), vec!["$[1]", "$[1]", "$[2]"]);
    }

    #[test]
    fn test_ignored_names_skip_at_any_depth() {
        let opts = ComparisonOptions::default().ignore_node("ts");
        let diffs = json_diffs(
            r#"{"ts":1,"items":[{"ts":2,"v":1}]}"#,
            r#"{"ts":9,"items":[{"v":1}]}"#,
            &opts,
        );
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_xml_different_tags_reordered_pass() {
        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = xml_diffs("<r><x>1</x><y>2</y></r>", "<r><y>2</y><x>1</x></r>", &opts);
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_xml_same_tag_reorder_under_include() {
        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = xml_diffs("<r><x>1</x><x>2</x></r>", "<r><x>2</x><x>1</x></r>", &opts);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::OrderMismatch);
        assert_eq!(diffs[0].path.to_string(), "/r/x");

        let diffs = xml_diffs(
            "<r><x>1</x><x>2</x></r>",
            "<r><x>2</x><x>1</x></r>",
            &ComparisonOptions::default(),
        );
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_xml_attribute_paths_and_order() {
        let diffs = xml_diffs(
            r#"<r><x a="1" b="2"/></r>"#,
            r#"<r><x b="2" a="1"/></r>"#,
            &ComparisonOptions::default(),
        );
        assert!(diffs.is_empty());

        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = xml_diffs(r#"<r><x a="1" b="2"/></r>"#, r#"<r><x b="2" a="1"/></r>"#, &opts);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::OrderMismatch);
        assert_eq!(diffs[0].path.to_string(), "/r/x");
        assert_eq!(diffs[0].expected, "@a @b");

        let diffs = xml_diffs(
            r#"<r><x a="1"/></r>"#,
            r#"<r><x a="2">t</x></r>"#,
            &ComparisonOptions::default(),
        );
        assert_eq!(paths(&diffs), vec!["/r/x/@a", "/r/x/text()"]);
        assert_eq!(diffs[1].describe_kind(), "unexpected text");
    }

    #[test]
    fn test_xml_sibling_index_is_one_based() {
        let opts = ComparisonOptions::default().with_order(OrderMode::Include);
        let diffs = xml_diffs("<r><x>1</x><x>2</x></r>", "<r><x>1</x><x>3</x></r>", &opts);
        assert_eq!(paths(&diffs), vec!["/r/x[2]/text()"]);
    }

    #[test]
    fn test_csv_cell_mismatch_path() {
        let diffs = csv_diffs("id,name\n1,Alice\n", "id,name\n1,Bob\n", &ComparisonOptions::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::ValueMismatch);
        assert_eq!(diffs[0].path.to_string(), "row #1, column 'name'");
    }

    #[test]
    fn test_csv_missing_column_reported_once() {
        let diffs = csv_diffs(
            "id,name,age\n1,a,3\n2,b,4\n",
            "id,name\n1,a\n2,b\n",
            &ComparisonOptions::default(),
        );
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::MissingInActual);
        assert_eq!(diffs[0].path.to_string(), "header, column #3");
        assert_eq!(diffs[0].describe_kind(), "missing column");
    }

    #[test]
    fn test_csv_row_and_column_order_are_independent() {
        let opts = ComparisonOptions::default().with_csv(
            CsvOptions::default()
                .with_row_order(OrderMode::Include)
                .with_column_order(OrderMode::Ignore),
        );
        let diffs = csv_diffs("a,b\n1,2\n3,4\n", "b,a\n2,1\n4,3\n", &opts);
        assert!(diffs.is_empty());

        let diffs = csv_diffs("a,b\n1,2\n3,4\n", "a,b\n3,4\n1,2\n", &opts);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::OrderMismatch);
        assert_eq!(diffs[0].path.to_string(), "table");
    }

    #[test]
    fn test_depth_limit_faults() {
        let opts = ComparisonOptions::default().with_max_depth(3);
        let e = load_json(r#"{"a":{"b":{"c":1}}}"#, &ComparisonOptions::default()).unwrap();
        let err = compare(&e, &e, DocumentFormat::Json, &opts).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DepthLimitExceeded);
        assert_eq!(err.path(), Some("$.a.b.c"));
    }

    #[test]
    fn test_depth_limit_applies_before_hashing_array_items() {
        let opts = ComparisonOptions::default().with_max_depth(3);
        let e = load_json("[[[[1]]]]", &ComparisonOptions::default()).unwrap();
        let a = load_json("[[[[2]]]]", &ComparisonOptions::default()).unwrap();
        let err = compare(&e, &a, DocumentFormat::Json, &opts).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DepthLimitExceeded);
    }

    #[test]
    fn test_xml_elements_that_load_also_compare() {
        let opts = ComparisonOptions::default();
        let raw = format!("{}x{}", "<a>".repeat(130), "</a>".repeat(130));
        let doc = load_xml(&raw, &opts).unwrap();
        assert!(compare(&doc, &doc, DocumentFormat::Xml, &opts).unwrap().is_empty());

        // 130 elements under the document, then the text
        let exact = ComparisonOptions::default().with_max_depth(132);
        let doc = load_xml(&raw, &exact).unwrap();
        assert!(compare(&doc, &doc, DocumentFormat::Xml, &exact).unwrap().is_empty());
        let err = load_xml(&raw, &ComparisonOptions::default().with_max_depth(131)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DepthLimitExceeded);
    }

    #[test]
    fn test_paired_paths_mirror_when_sides_swap() {
        let opts = ComparisonOptions::default();
        let left = r#"[{"k":1},{"a":1,"b":2}]"#;
        let right = r#"[{"a":1},{"k":1}]"#;

        let forward = json_diffs(left, right, &opts);
        assert_eq!(paths(&forward), vec!["$[1].b"]);
        assert_eq!(forward[0].kind, DifferenceKind::MissingInActual);

        let backward = json_diffs(right, left, &opts);
        assert_eq!(paths(&backward), vec!["$[1].b"]);
        assert_eq!(backward[0].kind, DifferenceKind::UnexpectedInActual);
    }

    #[test]
    fn test_tied_pairings_agree_in_both_directions() {
        let opts = ComparisonOptions::default();
        let left = r#"[{"v":1,"x":1},{"v":2,"x":1}]"#;
        let right = r#"[{"v":3},{"v":4}]"#;

        let forward = json_diffs(left, right, &opts);
        let backward = json_diffs(right, left, &opts);
        let mut missing: Vec<String> = forward
            .iter()
            .filter(|d| d.kind == DifferenceKind::MissingInActual)
            .map(|d| d.path.to_string())
            .collect();
        let mut unexpected: Vec<String> = backward
            .iter()
            .filter(|d| d.kind == DifferenceKind::UnexpectedInActual)
            .map(|d| d.path.to_string())
            .collect();
        missing.sort();
        unexpected.sort();
        assert_eq!(missing, vec!["$[0].x", "$[1].x"]);
        assert_eq!(missing, unexpected);
    }

    #[test]
    fn test_describe_node_caps_length() {
        let long = format!("\"{}\"", "x".repeat(200));
        let node = load_json(&long, &ComparisonOptions::default()).unwrap();
        let text = describe_node(&node, DocumentFormat::Json);
        assert_eq!(text.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_describe_xml_element() {
        let doc = load_xml(r#"<r><x id="1">hi</x></r>"#, &ComparisonOptions::default()).unwrap();
        let x = doc.members()[0].node().items()[0].member("x").unwrap();
        assert_eq!(describe_node(&x.items()[0], DocumentFormat::Xml), "<x id=\"1\">hi</x>");
    }
}
