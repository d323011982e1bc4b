//! JSON → node adapter.

use super::{depth_exceeded, line_col, ComparableNode, Member, MemberKind, ScalarValue, SequenceKind};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::options::ComparisonOptions;
use crate::{log_op_end, log_op_error, log_op_start};
use docassert_core_types::DocumentFormat;
use serde::Deserialize as _;
use serde_json::Value;
use std::time::Instant;

/// Parse JSON text into a node tree.
///
/// Object members keep document order (for report readability only; key
/// order never affects equality). Arrays become `SequenceKind::JsonArray`.
/// The root is at depth 1 and every member or element one deeper.
///
/// # Errors
///
/// - `InvalidOptions` — `options` fail validation
/// - `InvalidJson` — the text is not a single valid JSON value; carries the
///   parser's line/column
/// - `DepthLimitExceeded` — the tree is deeper than `options.max_depth`
pub fn load_json(raw: &str, options: &ComparisonOptions) -> Result<ComparableNode> {
    let start = Instant::now();
    log_op_start!("load_json", input_len = raw.len());

    let result = options.validate().and_then(|_| parse(raw, options.max_depth));
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(node) => {
            log_op_end!("load_json", duration_ms = duration_ms, depth = node.depth());
        }
        Err(e) => {
            log_op_error!("load_json", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}

fn parse(raw: &str, max_depth: usize) -> Result<ComparableNode> {
    // Containers nest at most max_depth deep in a tree that fits, which bounds
    // the recursion of the unlimited deserializer below.
    if bracket_depth(raw) > max_depth {
        return Err(depth_exceeded("load_json", DocumentFormat::Json, max_depth));
    }

    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)
        .and_then(|value| de.end().map(|_| value))
        .map_err(|e| {
            let (line, column) = if e.line() == 0 {
                line_col(raw, raw.len())
            } else {
                (e.line(), e.column().max(1))
            };
            ExError::new(ExErrorKind::InvalidJson)
                .with_op("load_json")
                .with_format(DocumentFormat::Json)
                .with_position(line, column)
                .with_message(format!("input is not valid JSON: {}", strip_position(&e)))
        })?;
    to_node(None, &value, 1, max_depth)
}

/// Deepest bracket nesting outside string literals.
fn bracket_depth(raw: &str) -> usize {
    let (mut depth, mut deepest) = (0usize, 0usize);
    let (mut in_string, mut escaped) = (false, false);
    for b in raw.bytes() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// serde_json appends " at line X column Y"; the position is carried separately.
fn strip_position(err: &serde_json::Error) -> String {
    let text = err.to_string();
    match text.rfind(" at line ") {
        Some(idx) => text[..idx].to_string(),
        None => text,
    }
}

fn to_node(
    name: Option<String>,
    value: &Value,
    depth: usize,
    max_depth: usize,
) -> Result<ComparableNode> {
    if depth > max_depth {
        return Err(depth_exceeded("load_json", DocumentFormat::Json, max_depth));
    }
    let node = match value {
        Value::Null => ComparableNode::scalar(name, ScalarValue::null()),
        Value::Bool(b) => ComparableNode::scalar(name, ScalarValue::bool(*b)),
        Value::Number(n) => ComparableNode::scalar(name, ScalarValue::number(n.to_string())),
        Value::String(s) => ComparableNode::scalar(name, ScalarValue::text(s.clone())),
        Value::Array(items) => ComparableNode::array(
            name,
            SequenceKind::JsonArray,
            items
                .iter()
                .map(|v| to_node(None, v, depth + 1, max_depth))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => ComparableNode::object(
            name,
            map.iter()
                .map(|(k, v)| {
                    let node = to_node(Some(k.clone()), v, depth + 1, max_depth)?;
                    Ok(Member::new(k.clone(), MemberKind::Property, node))
                })
                .collect::<Result<_>>()?,
        ),
    };
    Ok(node)
}
