//! Assertion entry points.
//!
//! Each call loads both inputs, compares them and, on failure, returns an
//! [`AssertError`] carrying the full report. Nothing is rendered on success.
//!
//! ```
//! use docassert_core::{assert_json_equal, ComparisonOptions};
//!
//! let options = ComparisonOptions::default().ignore_node("timestamp");
//! assert_json_equal(
//!     r#"{"timestamp":"T1","v":1}"#,
//!     r#"{"timestamp":"T2","v":1}"#,
//!     &options,
//! )
//! .unwrap();
//! ```

use crate::diff::{compare, render_load_failure, render_report, ReportInput};
use crate::errors::AssertError;
use crate::node::{load, ComparableNode};
use crate::options::ComparisonOptions;
use crate::{log_op_end, log_op_error, log_op_start};
use docassert_core_types::{DocumentFormat, DocumentSide};
use std::time::Instant;

/// Assert that two documents of `format` are structurally equal.
///
/// # Errors
///
/// - `AssertError::Load` — either input is not valid for `format`; no
///   comparison is attempted
/// - `AssertError::Mismatch` — at least one difference was found
/// - `AssertError::Engine` — invalid options or nesting beyond `max_depth`
pub fn assert_equal(
    format: DocumentFormat,
    expected_raw: &str,
    actual_raw: &str,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    let op = format.assert_op();
    let start = Instant::now();
    log_op_start!(
        op,
        format = format.label(),
        input_len = expected_raw.len() + actual_raw.len()
    );

    let result = run(format, expected_raw, actual_raw, options);
    finish(op, start, &result);
    result
}

/// [`assert_equal`] for JSON.
///
/// # Errors
///
/// As [`assert_equal`].
pub fn assert_json_equal(
    expected_raw: &str,
    actual_raw: &str,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    assert_equal(DocumentFormat::Json, expected_raw, actual_raw, options)
}

/// [`assert_equal`] for XML.
///
/// # Errors
///
/// As [`assert_equal`].
pub fn assert_xml_equal(
    expected_raw: &str,
    actual_raw: &str,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    assert_equal(DocumentFormat::Xml, expected_raw, actual_raw, options)
}

/// [`assert_equal`] for CSV.
///
/// # Errors
///
/// As [`assert_equal`].
pub fn assert_csv_equal(
    expected_raw: &str,
    actual_raw: &str,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    assert_equal(DocumentFormat::Csv, expected_raw, actual_raw, options)
}

/// Assert that two pre-loaded node trees are structurally equal.
///
/// The report lists the differences but carries no input previews.
///
/// # Errors
///
/// `AssertError::Mismatch` or `AssertError::Engine`, as [`assert_equal`].
pub fn assert_nodes_equal(
    format: DocumentFormat,
    expected: &ComparableNode,
    actual: &ComparableNode,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    let start = Instant::now();
    log_op_start!("assert_nodes_equal", format = format.label());

    let result = compare_loaded(format, expected, actual, None, options);
    finish("assert_nodes_equal", start, &result);
    result
}

fn finish(op: &str, start: Instant, result: &Result<(), AssertError>) {
    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(()) => {
            log_op_end!(op, duration_ms = duration_ms, diff_count = 0usize);
        }
        Err(e) => {
            log_op_error!(
                op,
                e.clone(),
                duration_ms = duration_ms,
                diff_count = e.differences().len()
            );
        }
    }
}

fn run(
    format: DocumentFormat,
    expected_raw: &str,
    actual_raw: &str,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    let load_side = |raw: &str, side: DocumentSide| {
        load(raw, format, options).map_err(|e| {
            let e = e.with_side(side);
            if !e.kind().is_load_failure() {
                return AssertError::Engine(e);
            }
            let report = render_load_failure(format, side, &e, expected_raw, actual_raw, options);
            AssertError::Load { report, source: e }
        })
    };
    let expected = load_side(expected_raw, DocumentSide::Expected)?;
    let actual = load_side(actual_raw, DocumentSide::Actual)?;

    compare_loaded(format, &expected, &actual, Some((expected_raw, actual_raw)), options)
}

fn compare_loaded(
    format: DocumentFormat,
    expected: &ComparableNode,
    actual: &ComparableNode,
    raw: Option<(&str, &str)>,
    options: &ComparisonOptions,
) -> Result<(), AssertError> {
    let differences =
        compare(expected, actual, format, options).map_err(AssertError::Engine)?;
    if differences.is_empty() {
        return Ok(());
    }
    let report = render_report(&ReportInput {
        format,
        differences: &differences,
        expected_raw: raw.map(|(e, _)| e),
        actual_raw: raw.map(|(_, a)| a),
        options,
    });
    Err(AssertError::Mismatch {
        report,
        differences,
    })
}
