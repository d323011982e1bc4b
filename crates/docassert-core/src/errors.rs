use crate::diff::model::Difference;
use docassert_core_types::{DocumentFormat, DocumentSide};
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and for asserting on failures in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Load
    /// Input is not valid JSON
    InvalidJson,
    /// Input is not well-formed XML, or has no single root element
    InvalidXml,
    /// Input is not valid CSV for the configured dialect (e.g. ragged rows)
    InvalidCsv,
    /// A header row was declared but the input has none
    MissingHeader,
    /// Two CSV columns share the same header name
    DuplicateColumn,

    // Configuration
    /// Comparison options are inconsistent or cannot be parsed
    InvalidOptions,

    // Comparison
    /// Nesting exceeded the configured safety depth
    DepthLimitExceeded,
    /// Comparison completed and found differences
    AssertionFailed,

    // Integration/IO
    Io,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidJson => "ERR_INVALID_JSON",
            ExErrorKind::InvalidXml => "ERR_INVALID_XML",
            ExErrorKind::InvalidCsv => "ERR_INVALID_CSV",
            ExErrorKind::MissingHeader => "ERR_MISSING_HEADER",
            ExErrorKind::DuplicateColumn => "ERR_DUPLICATE_COLUMN",
            ExErrorKind::InvalidOptions => "ERR_INVALID_OPTIONS",
            ExErrorKind::DepthLimitExceeded => "ERR_DEPTH_LIMIT_EXCEEDED",
            ExErrorKind::AssertionFailed => "ERR_ASSERTION_FAILED",
            ExErrorKind::Io => "ERR_IO",
        }
    }

    /// True for kinds raised while turning raw input into a node tree
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            ExErrorKind::InvalidJson
                | ExErrorKind::InvalidXml
                | ExErrorKind::InvalidCsv
                | ExErrorKind::MissingHeader
                | ExErrorKind::DuplicateColumn
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional document context (format, side,
/// path, position) for rendering uniform diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    format: Option<DocumentFormat>,
    side: Option<DocumentSide>,
    path: Option<String>,
    position: Option<(usize, usize)>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            format: None,
            side: None,
            path: None,
            position: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add document format context
    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Add which input (expected/actual) the error concerns
    pub fn with_side(mut self, side: DocumentSide) -> Self {
        self.side = Some(side);
        self
    }

    /// Add the rendered node path the error concerns
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a 1-based line/column position
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.position = Some((line, column));
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the document format, if any
    pub fn format(&self) -> Option<DocumentFormat> {
        self.format
    }

    /// Get the document side, if any
    pub fn side(&self) -> Option<DocumentSide> {
        self.side
    }

    /// Get the node path, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the 1-based `(line, column)` position, if any
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    /// Get the line, if any
    pub fn line(&self) -> Option<usize> {
        self.position.map(|(line, _)| line)
    }

    /// Get the column, if any
    pub fn column(&self) -> Option<usize> {
        self.position.map(|(_, column)| column)
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(side) = self.side {
            write!(f, " ({} input)", side)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some((line, column)) = self.position {
            write!(f, " (line {}, column {})", line, column)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Outcome of a failed assertion, as seen by the calling test
///
/// `Load` and `Mismatch` are deliberately distinct: the first means a fixture
/// could not be read, the second that the test's expectation did not hold.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertError {
    /// Expected or actual input could not be loaded for the declared format
    #[error("{report}")]
    Load { report: String, source: ExError },

    /// Both inputs loaded and at least one difference was found
    #[error("{report}")]
    Mismatch {
        report: String,
        differences: Vec<Difference>,
    },

    /// The engine gave up on pathological input
    #[error("comparison aborted: {0}")]
    Engine(ExError),
}

impl AssertError {
    /// Full human-readable diagnostic
    pub fn report(&self) -> String {
        match self {
            AssertError::Load { report, .. } | AssertError::Mismatch { report, .. } => {
                report.clone()
            }
            AssertError::Engine(err) => err.to_string(),
        }
    }

    /// Differences found, empty unless this is a `Mismatch`
    pub fn differences(&self) -> &[Difference] {
        match self {
            AssertError::Mismatch { differences, .. } => differences,
            _ => &[],
        }
    }

    pub fn is_load_failure(&self) -> bool {
        matches!(self, AssertError::Load { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, AssertError::Mismatch { .. })
    }
}

impl From<AssertError> for ExError {
    fn from(err: AssertError) -> Self {
        match err {
            AssertError::Load { source, .. } => source,
            AssertError::Mismatch { differences, .. } => {
                let err = ExError::new(ExErrorKind::AssertionFailed)
                    .with_message(format!("{} difference(s) found", differences.len()));
                match differences.first() {
                    Some(first) => err
                        .with_format(first.path.format())
                        .with_path(first.path.to_string()),
                    None => err,
                }
            }
            AssertError::Engine(inner) => inner,
        }
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}
