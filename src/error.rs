//! Error types for the validation layer.

use thiserror::Error;

use crate::validate::Violation;

/// Raised when a validator finds at least one violation. Each variant
/// carries the violations in the order they were found.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Missing columns, bad types or domains, duplicate or empty rows
    #[error("Schema validation failed:\n{}", render(.0))]
    Schema(Vec<Violation>),

    /// A column mean or target class proportion drifted out of its band
    #[error("Distribution validation failed:\n{}", render(.0))]
    Distribution(Vec<Violation>),

    /// Two numeric columns are more strongly correlated than allowed
    #[error("Correlation validation failed:\n{}", render(.0))]
    Correlation(Vec<Violation>),
}

impl ValidationError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationError::Schema(v)
            | ValidationError::Distribution(v)
            | ValidationError::Correlation(v) => v,
        }
    }
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
