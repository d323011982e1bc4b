//! Structural diff engine and failure reporting.
//!
//! ## Entry point
//!
//! ```
//! use docassert_core::diff::{compare, render_report, ReportInput};
//! use docassert_core::node::load_json;
//! use docassert_core::{ComparisonOptions, DocumentFormat};
//!
//! let options = ComparisonOptions::default();
//! let expected = load_json(r#"{"a":{"b":1}}"#, &options).unwrap();
//! let actual = load_json(r#"{"a":{"b":1,"c":2}}"#, &options).unwrap();
//! let differences = compare(&expected, &actual, DocumentFormat::Json, &options).unwrap();
//! assert_eq!(differences[0].path.to_string(), "$.a.c");
//!
//! let report = render_report(&ReportInput {
//!     format: DocumentFormat::Json,
//!     differences: &differences,
//!     expected_raw: None,
//!     actual_raw: None,
//!     options: &options,
//! });
//! assert!(report.contains("unexpected property"));
//! ```
//!
//! ## Guarantees
//!
//! - **Completeness**: traversal never stops at the first mismatch.
//! - **Determinism**: identical inputs and options produce identical
//!   difference lists, including unordered-array pairing.
//! - **Truncation only affects display**: `max_input_characters` is read by
//!   the reporter alone.

pub mod engine;
pub mod model;
pub mod report;

pub use engine::{compare, describe_node};
pub use model::{DiffPath, Difference, DifferenceKind, PathSegment, ABSENT};
pub use report::{render_load_failure, render_report, truncate_preview, ReportInput};
