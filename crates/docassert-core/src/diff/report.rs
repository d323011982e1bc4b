//! Human-readable failure reports.
//!
//! Both a mismatch and a load failure render with the same header line
//! (`assert_json_equal failed: …`) so a tester reads one uniform diagnostic
//! whatever went wrong.

use crate::diff::model::Difference;
use crate::errors::ExError;
use crate::options::{ComparisonOptions, ReportFormat};
use docassert_core_types::{DocumentFormat, DocumentSide};

/// Marker appended to a preview cut at `max_input_characters`
pub const TRUNCATION_MARKER: &str = "(truncated)";

const COLUMN_SEPARATOR: &str = " | ";

/// Everything a mismatch report is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub format: DocumentFormat,
    pub differences: &'a [Difference],
    /// Raw expected text; `None` when comparing pre-loaded nodes
    pub expected_raw: Option<&'a str>,
    /// Raw actual text; `None` when comparing pre-loaded nodes
    pub actual_raw: Option<&'a str>,
    pub options: &'a ComparisonOptions,
}

/// Render a mismatch report.
///
/// Differences are grouped by path, groups in order of first occurrence.
pub fn render_report(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    let count = input.differences.len();
    out.push_str(&format!(
        "{} failed: expected and actual {} documents differ ({} difference{})\n",
        input.format.assert_op(),
        input.format.label(),
        count,
        if count == 1 { "" } else { "s" }
    ));

    for (path, group) in group_by_path(input.differences) {
        out.push('\n');
        out.push_str(&path);
        out.push('\n');
        for d in group {
            out.push_str(&format!(
                "  {}: expected {}, actual {}\n",
                d.describe_kind(),
                d.expected,
                d.actual
            ));
        }
    }

    push_previews(&mut out, input.expected_raw, input.actual_raw, input.options);
    out
}

/// Render the report for an input that could not be loaded.
///
/// Names the failing side and, when the parser supplied one, the position.
pub fn render_load_failure(
    format: DocumentFormat,
    side: DocumentSide,
    error: &ExError,
    expected_raw: &str,
    actual_raw: &str,
    options: &ComparisonOptions,
) -> String {
    let mut out = format!(
        "{} failed: {} input could not be loaded as {}\n\n",
        format.assert_op(),
        side,
        format.label()
    );
    match error.position() {
        Some((line, column)) => out.push_str(&format!(
            "  {} at line {}, column {}: {}\n",
            error.code(),
            line,
            column,
            error.message()
        )),
        None => out.push_str(&format!("  {}: {}\n", error.code(), error.message())),
    }
    push_previews(&mut out, Some(expected_raw), Some(actual_raw), options);
    out
}

fn group_by_path(differences: &[Difference]) -> Vec<(String, Vec<&Difference>)> {
    let mut groups: Vec<(String, Vec<&Difference>)> = Vec::new();
    for d in differences {
        let path = d.path.to_string();
        match groups.iter_mut().find(|(p, _)| *p == path) {
            Some((_, group)) => group.push(d),
            None => groups.push((path, vec![d])),
        }
    }
    groups
}

/// Cut `raw` to at most `max` characters, marking the cut.
pub fn truncate_preview(raw: &str, max: usize) -> String {
    match raw.char_indices().nth(max) {
        Some((cut, _)) => format!("{}... {}", &raw[..cut], TRUNCATION_MARKER),
        None => raw.to_string(),
    }
}

fn push_previews(
    out: &mut String,
    expected: Option<&str>,
    actual: Option<&str>,
    options: &ComparisonOptions,
) {
    let (Some(expected), Some(actual)) = (expected, actual) else {
        return;
    };
    let expected = truncate_preview(expected, options.max_input_characters);
    let actual = truncate_preview(actual, options.max_input_characters);

    out.push('\n');
    match options.report_format {
        ReportFormat::Vertical => {
            out.push_str("Expected:\n");
            out.push_str(&expected);
            out.push_str("\n\nActual:\n");
            out.push_str(&actual);
            out.push('\n');
        }
        ReportFormat::Horizontal => out.push_str(&side_by_side(&expected, &actual)),
    }
}

fn side_by_side(expected: &str, actual: &str) -> String {
    let left: Vec<&str> = std::iter::once("Expected:").chain(expected.lines()).collect();
    let right: Vec<&str> = std::iter::once("Actual:").chain(actual.lines()).collect();
    let width = left.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or("");
        let r = right.get(i).copied().unwrap_or("");
        let pad = width - l.chars().count();
        let line = format!("{}{}{}{}", l, " ".repeat(pad), COLUMN_SEPARATOR, r);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::{DiffPath, DifferenceKind, PathSegment, ABSENT};
    use crate::errors::ExErrorKind;
    use crate::node::MemberKind;

    fn json_diff(name: &str, kind: DifferenceKind, expected: &str, actual: &str) -> Difference {
        let path = DiffPath::new(
            DocumentFormat::Json,
            vec![PathSegment::Member {
                name: name.to_string(),
                kind: MemberKind::Property,
            }],
        );
        Difference::new(path, kind, expected, actual)
    }

    #[test]
    fn test_header_counts_differences() {
        let diffs = vec![json_diff("c", DifferenceKind::UnexpectedInActual, ABSENT, "2")];
        let options = ComparisonOptions::default();
        let report = render_report(&ReportInput {
            format: DocumentFormat::Json,
            differences: &diffs,
            expected_raw: Some("{}"),
            actual_raw: Some(r#"{"c":2}"#),
            options: &options,
        });
        assert!(report.starts_with(
            "assert_json_equal failed: expected and actual JSON documents differ (1 difference)\n"
        ));
        assert!(report.contains("$.c\n  unexpected property: expected (absent), actual 2\n"));
        assert!(report.contains("Expected:\n{}\n"));
    }

    #[test]
    fn test_groups_keep_first_occurrence_order() {
        let diffs = vec![
            json_diff("b", DifferenceKind::ValueMismatch, "1", "2"),
            json_diff("a", DifferenceKind::ValueMismatch, "1", "2"),
            json_diff("b", DifferenceKind::TypeMismatch, "1", "[]"),
        ];
        let groups = group_by_path(&diffs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "$.b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "$.a");
    }

    #[test]
    fn test_truncate_preview_counts_chars() {
        assert_eq!(truncate_preview("abc", 3), "abc");
        assert_eq!(truncate_preview("ééééé", 2), "éé... (truncated)");
        assert_eq!(truncate_preview("", 0), "");
    }

    #[test]
    fn test_previews_omitted_without_raw_text() {
        let diffs = vec![json_diff("a", DifferenceKind::ValueMismatch, "1", "2")];
        let options = ComparisonOptions::default();
        let report = render_report(&ReportInput {
            format: DocumentFormat::Json,
            differences: &diffs,
            expected_raw: None,
            actual_raw: None,
            options: &options,
        });
        assert!(!report.contains("Expected:"));
    }

    #[test]
    fn test_horizontal_layout() {
        let text = side_by_side("ab\ncd", "x");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Expected: | Actual:");
        assert_eq!(lines[1], "ab        | x");
        assert_eq!(lines[2], "cd        |");
    }

    #[test]
    fn test_load_failure_names_side_and_position() {
        let err = ExError::new(ExErrorKind::InvalidJson)
            .with_position(1, 1)
            .with_message("input is not valid JSON: expected value");
        let report = render_load_failure(
            DocumentFormat::Json,
            DocumentSide::Actual,
            &err,
            "{}",
            "not-json",
            &ComparisonOptions::default(),
        );
        assert!(report.starts_with(
            "assert_json_equal failed: actual input could not be loaded as JSON\n"
        ));
        assert!(report.contains("ERR_INVALID_JSON at line 1, column 1"));
        assert!(report.contains("not-json"));
    }
}
