#![allow(clippy::unwrap_used, clippy::expect_used)]

use docassert_core::errors::{AssertError, ExError, ExErrorKind};
use docassert_core::{assert_csv_equal, assert_json_equal, ComparisonOptions, DocumentSide};

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidJson, "ERR_INVALID_JSON"),
        (ExErrorKind::InvalidXml, "ERR_INVALID_XML"),
        (ExErrorKind::InvalidCsv, "ERR_INVALID_CSV"),
        (ExErrorKind::MissingHeader, "ERR_MISSING_HEADER"),
        (ExErrorKind::DuplicateColumn, "ERR_DUPLICATE_COLUMN"),
        (ExErrorKind::InvalidOptions, "ERR_INVALID_OPTIONS"),
        (ExErrorKind::DepthLimitExceeded, "ERR_DEPTH_LIMIT_EXCEEDED"),
        (ExErrorKind::AssertionFailed, "ERR_ASSERTION_FAILED"),
        (ExErrorKind::Io, "ERR_IO"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_load_failure_distinct_from_mismatch() {
    let options = ComparisonOptions::default();

    let load = assert_json_equal("{", "{}", &options).unwrap_err();
    let mismatch = assert_json_equal("{}", r#"{"a":1}"#, &options).unwrap_err();

    assert!(load.is_load_failure() && !load.is_mismatch());
    assert!(mismatch.is_mismatch() && !mismatch.is_load_failure());

    let load: ExError = load.into();
    let mismatch: ExError = mismatch.into();
    assert_eq!(load.kind(), ExErrorKind::InvalidJson);
    assert_eq!(mismatch.kind(), ExErrorKind::AssertionFailed);
    assert_ne!(load.code(), mismatch.code());
}

#[test]
fn test_load_error_carries_side_and_position() {
    let err = assert_json_equal("{\n  \"a\": }", "{}", &ComparisonOptions::default()).unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.side(), Some(DocumentSide::Expected));
    assert_eq!(ex.line(), Some(2));
    assert!(ex.column().is_some());
    assert_eq!(ex.op(), Some("load_json"));
}

#[test]
fn test_duplicate_column_structured_fields() {
    let err = assert_csv_equal("a,b\n1,2\n", "a,a\n1,2\n", &ComparisonOptions::default())
        .unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::DuplicateColumn);
    assert_eq!(ex.code(), "ERR_DUPLICATE_COLUMN");
    assert_eq!(ex.side(), Some(DocumentSide::Actual));
    assert!(ex.message().contains("'a'"));
}

#[test]
fn test_display_is_single_line() {
    let err = assert_json_equal("[", "[]", &ComparisonOptions::default()).unwrap_err();
    let ex: ExError = err.into();
    let text = ex.to_string();
    assert!(text.starts_with("[ERR_INVALID_JSON] in operation 'load_json'"));
    assert!(text.contains("(expected input)"));
    assert!(!text.contains('\n'));
}

#[test]
fn test_mismatch_display_is_the_report() {
    let err = assert_json_equal("1", "2", &ComparisonOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), err.report());
    assert!(matches!(err, AssertError::Mismatch { .. }));
}

#[test]
fn test_mismatch_error_points_at_first_difference() {
    let err = assert_json_equal(r#"{"a":1,"b":2}"#, r#"{"a":9,"b":2}"#, &ComparisonOptions::default())
        .unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::AssertionFailed);
    assert_eq!(ex.path(), Some("$.a"));
    assert_eq!(ex.format(), Some(docassert_core::DocumentFormat::Json));
}
