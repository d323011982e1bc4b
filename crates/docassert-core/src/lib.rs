//! docassert core - structural comparison of JSON, XML and CSV documents
//!
//! This crate backs document-equality assertions in tests:
//! - Loaders that normalize JSON, XML and CSV into one comparable node model
//! - A comparison engine with configurable ordering and ignore rules
//! - A reporter that renders differences with native paths
//!   (`$.root.child[2]`, `/root/@attr`, `row #1, column 'name'`)
//! - Per-call options, loadable from TOML
//!
//! ```
//! use docassert_core::{assert_csv_equal, ComparisonOptions};
//!
//! let err = assert_csv_equal("id,name\n1,Alice\n", "id,name\n1,Bob\n", &ComparisonOptions::default())
//!     .unwrap_err();
//! assert!(err.report().contains("row #1, column 'name'"));
//! ```

pub mod assert;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod node;
pub mod options;

// Paths used by the exported logging macros
pub use docassert_core_types;
#[doc(hidden)]
pub use tracing;

// Re-export commonly used types
pub use assert::{
    assert_csv_equal, assert_equal, assert_json_equal, assert_nodes_equal, assert_xml_equal,
};
pub use diff::{compare, DiffPath, Difference, DifferenceKind, PathSegment};
pub use docassert_core_types::{DocumentFormat, DocumentSide};
pub use errors::{AssertError, ExError, ExErrorKind, Result};
pub use node::{load, load_csv, load_json, load_xml, ComparableNode};
pub use options::{ComparisonOptions, CsvOptions, HeaderMode, OrderMode, ReportFormat};
