use docassert_core::{AssertError, Difference, DifferenceKind};

/// Unwrap a mismatch failure, panicking on success or any other failure
#[allow(dead_code)]
pub fn expect_mismatch(result: Result<(), AssertError>) -> Vec<Difference> {
    match result {
        Err(AssertError::Mismatch { differences, .. }) => differences,
        Err(other) => panic!("expected a mismatch, got {:?}", other),
        Ok(()) => panic!("expected a mismatch, assertion passed"),
    }
}

/// `(rendered path, kind)` pairs in report order
#[allow(dead_code)]
pub fn summarize(differences: &[Difference]) -> Vec<(String, DifferenceKind)> {
    differences
        .iter()
        .map(|d| (d.path.to_string(), d.kind))
        .collect()
}
