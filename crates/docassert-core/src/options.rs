//! Per-call comparison policy.
//!
//! Options are built by the caller, optionally loaded from a TOML file, and
//! passed by shared reference into every load and compare call. Nothing here
//! is process-wide.
//!
//! ```toml
//! order = "include"
//! ignored_node_names = ["timestamp", "etag"]
//! max_input_characters = 200
//!
//! [csv]
//! separator = ";"
//! header = "missing"
//! row_order = "ignore"
//! ```

use crate::errors::{ExError, ExErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Default number of characters of each input shown in a failure report.
pub const DEFAULT_MAX_INPUT_CHARACTERS: usize = 500;

/// Default nesting limit before the engine refuses to descend further.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Whether sibling / array element order affects equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Ignore,
    Include,
}

/// Layout of the expected/actual previews appended to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Expected preview above actual preview
    #[default]
    Vertical,
    /// Expected and actual previews in two side-by-side columns
    Horizontal,
}

/// Whether the first CSV record names the columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    #[default]
    Present,
    Missing,
}

/// CSV dialect and table-specific ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvOptions {
    pub separator: char,
    pub quote: char,
    pub header: HeaderMode,
    /// Row order policy; falls back to [`ComparisonOptions::order`]
    pub row_order: Option<OrderMode>,
    /// Column order policy; falls back to [`ComparisonOptions::order`]
    pub column_order: Option<OrderMode>,
    /// Zero-based column positions dropped while loading
    pub ignored_column_indices: BTreeSet<usize>,
    /// Trim surrounding whitespace of every cell
    pub trim_values: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            quote: '"',
            header: HeaderMode::Present,
            row_order: None,
            column_order: None,
            ignored_column_indices: BTreeSet::new(),
            trim_values: false,
        }
    }
}

impl CsvOptions {
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_header(mut self, header: HeaderMode) -> Self {
        self.header = header;
        self
    }

    pub fn with_row_order(mut self, order: OrderMode) -> Self {
        self.row_order = Some(order);
        self
    }

    pub fn with_column_order(mut self, order: OrderMode) -> Self {
        self.column_order = Some(order);
        self
    }

    pub fn ignore_column_index(mut self, index: usize) -> Self {
        self.ignored_column_indices.insert(index);
        self
    }

    pub fn with_trim_values(mut self, trim: bool) -> Self {
        self.trim_values = trim;
        self
    }
}

/// Comparison policy for one assertion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonOptions {
    /// Names skipped at any depth (JSON keys, XML element/attribute local
    /// names, CSV column headers)
    pub ignored_node_names: BTreeSet<String>,
    pub order: OrderMode,
    /// Preview truncation bound; never affects the comparison itself
    pub max_input_characters: usize,
    pub max_depth: usize,
    pub report_format: ReportFormat,
    pub csv: CsvOptions,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            ignored_node_names: BTreeSet::new(),
            order: OrderMode::Ignore,
            max_input_characters: DEFAULT_MAX_INPUT_CHARACTERS,
            max_depth: DEFAULT_MAX_DEPTH,
            report_format: ReportFormat::Vertical,
            csv: CsvOptions::default(),
        }
    }
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip every node with this name, wherever it occurs
    pub fn ignore_node(mut self, name: impl Into<String>) -> Self {
        self.ignored_node_names.insert(name.into());
        self
    }

    pub fn with_order(mut self, order: OrderMode) -> Self {
        self.order = order;
        self
    }

    pub fn with_max_input_characters(mut self, max: usize) -> Self {
        self.max_input_characters = max;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }

    pub fn with_csv(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_node_names.contains(name)
    }

    /// Effective order policy for CSV rows
    pub fn row_order(&self) -> OrderMode {
        self.csv.row_order.unwrap_or(self.order)
    }

    /// Effective order policy for CSV columns
    pub fn column_order(&self) -> OrderMode {
        self.csv.column_order.unwrap_or(self.order)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` when the CSV separator or quote is not a single ASCII
    /// character, when they are equal, or when `max_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        for (label, c) in [("separator", self.csv.separator), ("quote", self.csv.quote)] {
            if !c.is_ascii() || c == '\n' || c == '\r' {
                return Err(ExError::new(ExErrorKind::InvalidOptions)
                    .with_op("validate_options")
                    .with_message(format!(
                        "csv {} must be a single ASCII character other than a line break, got {:?}",
                        label, c
                    )));
            }
        }
        if self.csv.separator == self.csv.quote {
            return Err(ExError::new(ExErrorKind::InvalidOptions)
                .with_op("validate_options")
                .with_message("csv separator and quote must differ"));
        }
        if self.max_depth == 0 {
            return Err(ExError::new(ExErrorKind::InvalidOptions)
                .with_op("validate_options")
                .with_message("max_depth must be greater than zero"));
        }
        Ok(())
    }

    /// Parse options from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` if the text is not valid TOML, names an unknown key,
    /// or fails [`ComparisonOptions::validate`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: ComparisonOptions = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::InvalidOptions)
                .with_op("from_toml_str")
                .with_message(format!("options are not valid: {}", e.message()))
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`ComparisonOptions::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::from(e)
                .with_op("from_toml_file")
                .with_path(path.display().to_string())
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_path(path.display().to_string()))
    }
}
