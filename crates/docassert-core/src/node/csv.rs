//! CSV → node adapter.
//!
//! A table becomes an object with two `Section` members:
//!
//! - `header`: `CsvHeader` array, one scalar per column, named and valued by
//!   the column name
//! - `rows`: `CsvRows` array of row objects whose `Column` members are keyed
//!   by column name
//!
//! Without a header row, columns are named by their zero-based position in
//! the source (`"0"`, `"1"`, …). Columns listed in
//! `csv.ignored_column_indices` are dropped before anything else sees them.

use super::{
    invalid_input, within_depth, ComparableNode, Member, MemberKind, ScalarValue, SequenceKind,
};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::options::{ComparisonOptions, HeaderMode};
use crate::{log_op_end, log_op_error, log_op_start};
use csv::{ReaderBuilder, StringRecord};
use docassert_core_types::DocumentFormat;
use std::collections::HashSet;
use std::time::Instant;

/// Section key of the header array
pub const HEADER_KEY: &str = "header";
/// Section key of the rows array
pub const ROWS_KEY: &str = "rows";

/// Parse CSV text into a table node.
///
/// # Errors
///
/// - `InvalidOptions` — `options` fail validation
/// - `MissingHeader` — a header row is declared but the input has no records
/// - `DuplicateColumn` — two kept header cells carry the same name
/// - `InvalidCsv` — a row's field count differs from the header's, or the
///   text cannot be read as CSV
/// - `DepthLimitExceeded` — `options.max_depth` is below the table's depth
pub fn load_csv(raw: &str, options: &ComparisonOptions) -> Result<ComparableNode> {
    let start = Instant::now();
    log_op_start!("load_csv", input_len = raw.len());

    let result = options
        .validate()
        .and_then(|_| parse(raw, options))
        .and_then(|node| {
            within_depth(node, options.max_depth, "load_csv", DocumentFormat::Csv)
        });
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(node) => {
            log_op_end!(
                "load_csv",
                duration_ms = duration_ms,
                rows = node.member(ROWS_KEY).map(|r| r.items().len()).unwrap_or(0)
            );
        }
        Err(e) => {
            log_op_error!("load_csv", e.clone(), duration_ms = duration_ms);
        }
    }
    result
}

fn csv_error(kind: ExErrorKind, line: Option<u64>, message: impl Into<String>) -> ExError {
    let err = invalid_input(kind, "load_csv", message).with_format(DocumentFormat::Csv);
    match line {
        Some(line) => err.with_position(line as usize, 1),
        None => err,
    }
}

fn read_error(err: csv::Error) -> ExError {
    let line = err.position().map(|p| p.line());
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => format!(
            "row has {} fields but the first row has {}",
            len, expected_len
        ),
        csv::ErrorKind::Utf8 { .. } => "input is not valid UTF-8".to_string(),
        other => format!("input is not valid CSV: {:?}", other),
    };
    csv_error(ExErrorKind::InvalidCsv, line, message)
}

/// Cells of `record` that survive the ignored-index filter, with their
/// source positions.
fn kept_cells<'r>(
    record: &'r StringRecord,
    options: &'r ComparisonOptions,
) -> impl Iterator<Item = (usize, String)> + 'r {
    record
        .iter()
        .enumerate()
        .filter(move |(idx, _)| !options.csv.ignored_column_indices.contains(idx))
        .map(move |(idx, cell)| {
            let cell = if options.csv.trim_values { cell.trim() } else { cell };
            (idx, cell.to_string())
        })
}

fn parse(raw: &str, options: &ComparisonOptions) -> Result<ComparableNode> {
    // validate() guarantees both are ASCII
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .delimiter(options.csv.separator as u8)
        .quote(options.csv.quote as u8)
        .from_reader(raw.as_bytes());

    let mut records = reader.records();

    let columns: Option<Vec<String>> = match options.csv.header {
        HeaderMode::Present => {
            let record = match records.next() {
                Some(record) => record.map_err(read_error)?,
                None => {
                    return Err(csv_error(
                        ExErrorKind::MissingHeader,
                        None,
                        "a header row is declared but the input has no rows",
                    ))
                }
            };
            let names: Vec<String> = kept_cells(&record, options).map(|(_, c)| c).collect();
            let mut seen = HashSet::new();
            for name in &names {
                if !seen.insert(name.as_str()) {
                    return Err(csv_error(
                        ExErrorKind::DuplicateColumn,
                        record.position().map(|p| p.line()),
                        format!("column '{}' appears more than once in the header", name),
                    ));
                }
            }
            Some(names)
        }
        HeaderMode::Missing => None,
    };

    let mut rows = Vec::new();
    let mut width: Option<usize> = None;
    for record in records {
        let record = record.map_err(read_error)?;
        let cells: Vec<(usize, String)> = kept_cells(&record, options).collect();
        let members = cells
            .into_iter()
            .enumerate()
            .map(|(pos, (source_idx, value))| {
                let name = columns
                    .as_ref()
                    .and_then(|names| names.get(pos).cloned())
                    .unwrap_or_else(|| source_idx.to_string());
                Member::new(
                    name.clone(),
                    MemberKind::Column,
                    ComparableNode::scalar(Some(name), ScalarValue::text(value)),
                )
            })
            .collect::<Vec<_>>();
        width.get_or_insert(record.len());
        rows.push(ComparableNode::object(None, members));
    }

    let header_names: Vec<String> = match columns {
        Some(names) => names,
        None => (0..width.unwrap_or(0))
            .filter(|idx| !options.csv.ignored_column_indices.contains(idx))
            .map(|idx| idx.to_string())
            .collect(),
    };
    let header = header_names
        .into_iter()
        .map(|name| ComparableNode::scalar(Some(name.clone()), ScalarValue::text(name)))
        .collect();

    Ok(ComparableNode::object(
        None,
        vec![
            Member::new(
                HEADER_KEY,
                MemberKind::Section,
                ComparableNode::array(Some(HEADER_KEY.to_string()), SequenceKind::CsvHeader, header),
            ),
            Member::new(
                ROWS_KEY,
                MemberKind::Section,
                ComparableNode::array(Some(ROWS_KEY.to_string()), SequenceKind::CsvRows, rows),
            ),
        ],
    ))
}
