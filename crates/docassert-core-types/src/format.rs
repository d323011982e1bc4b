//! Document format vocabulary
//!
//! Every loaded document, difference path and error is tagged with the format
//! it came from so paths and messages can use that format's own addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The textual format a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Xml,
    Csv,
}

impl DocumentFormat {
    /// Upper-case display label used in reports ("JSON", "XML", "CSV")
    pub fn label(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Xml => "XML",
            DocumentFormat::Csv => "CSV",
        }
    }

    /// Name of the assertion operation for this format
    pub fn assert_op(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "assert_json_equal",
            DocumentFormat::Xml => "assert_xml_equal",
            DocumentFormat::Csv => "assert_csv_equal",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which of the two compared inputs something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSide {
    Expected,
    Actual,
}

impl DocumentSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentSide::Expected => "expected",
            DocumentSide::Actual => "actual",
        }
    }
}

impl fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
