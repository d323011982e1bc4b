//! Operation logging macros
//!
//! Every public operation emits one `start` event and exactly one `end` or
//! `end_error` event, all tagged with `component`, `op` and `event`. Extra
//! fields are passed through in `tracing` syntax.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use docassert_core::log_op_start;
/// log_op_start!("load_json");
/// log_op_start!("load_json", input_len = 42);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::docassert_core_types::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use docassert_core::log_op_end;
/// log_op_end!("assert_json_equal", duration_ms = 3);
/// log_op_end!("assert_json_equal", duration_ms = 3, diff_count = 0);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::docassert_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log the failed end of an operation
///
/// The error is converted into an `ExError`; the event carries its kind and
/// code, plus its format, failing input side and node path when known.
///
/// # Example
///
/// ```
/// # use docassert_core::log_op_error;
/// # use docassert_core::errors::{ExError, ExErrorKind};
/// # use docassert_core::DocumentSide;
/// let err = ExError::new(ExErrorKind::InvalidJson).with_side(DocumentSide::Actual);
/// log_op_error!("load_json", err, duration_ms = 1);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::docassert_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            format = ex_err.format().map(|format| format.label()),
            side = ex_err.side().map(|side| side.as_str()),
            path = ex_err.path(),
            $($($field)*)?
        );
    }};
}
