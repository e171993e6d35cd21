//! Validation layer: schema, distribution and correlation checks.
//!
//! Every validator is stateless and implements [`Validator`]. A caller can
//! run any subset of them through [`validate_all`] and choose whether the
//! run stops at the first failing validator or collects every report.
//!
//! ```text
//!            ┌─────────────────────┐
//!            │       Dataset       │
//!            └─────────────────────┘
//!          ┌──────────┼──────────────┐
//!          ▼          ▼              ▼
//!   ┌──────────┐ ┌──────────────┐ ┌─────────────┐
//!   │  schema  │ │ distribution │ │ correlation │
//!   └──────────┘ └──────────────┘ └─────────────┘
//!          └──────────┼──────────────┘
//!                     ▼
//!            ValidationReport / ValidationError
//! ```

pub mod correlation;
pub mod distribution;
pub mod reference;
pub mod schema;
pub mod stats;

use std::fmt;

use serde::Serialize;

use crate::data::model::Dataset;
use crate::error::ValidationError;

pub use correlation::CorrelationValidator;
pub use distribution::DistributionValidator;
pub use reference::{REFERENCE_STATISTICS, ReferenceStatistics};
pub use schema::{STUDENT_SCHEMA, SchemaValidator};

/// Name of the three-valued label column.
pub const TARGET_COLUMN: &str = "Target";

/// The only labels the target column may hold.
pub const TARGET_CLASSES: [&str; 3] = ["Dropout", "Enrolled", "Graduate"];

// ---------------------------------------------------------------------------
// Violation – one detected deviation
// ---------------------------------------------------------------------------

/// Which rule a [`Violation`] broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    MissingColumn,
    Nullability,
    ValueType,
    Domain,
    DuplicateRows,
    EmptyRows,
    MeanDrift,
    ProportionDrift,
    Correlation,
}

/// A single deviation from a schema rule, tolerance band or correlation
/// threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub check: CheckKind,
    /// Offending column(s); a correlation pair is reported as `"a, b"`.
    pub column: Option<String>,
    /// Offending row indices, empty for column-level checks.
    pub rows: Vec<usize>,
    pub message: String,
}

impl Violation {
    pub fn for_column(check: CheckKind, column: &str, message: String) -> Self {
        Violation {
            check,
            column: Some(column.to_string()),
            rows: Vec::new(),
            message,
        }
    }

    pub fn for_rows(check: CheckKind, rows: Vec<usize>, message: String) -> Self {
        Violation {
            check,
            column: None,
            rows,
            message,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

/// Whether a validator stops at its first violation or reports all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    FailFast,
    #[default]
    Exhaustive,
}

/// Accumulates violations under a [`FailurePolicy`].
#[derive(Debug)]
pub(crate) struct Violations {
    policy: FailurePolicy,
    items: Vec<Violation>,
}

impl Violations {
    pub(crate) fn new(policy: FailurePolicy) -> Self {
        Violations {
            policy,
            items: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        if !self.is_done() {
            self.items.push(violation);
        }
    }

    /// True once a fail-fast collector holds its violation.
    pub(crate) fn is_done(&self) -> bool {
        self.policy == FailurePolicy::FailFast && !self.items.is_empty()
    }

    pub(crate) fn into_vec(self) -> Vec<Violation> {
        self.items
    }
}

// ---------------------------------------------------------------------------
// Validator – the common interface
// ---------------------------------------------------------------------------

/// Which validator produced a set of violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    Schema,
    Distribution,
    Correlation,
}

impl ValidatorKind {
    pub fn into_error(self, violations: Vec<Violation>) -> ValidationError {
        match self {
            ValidatorKind::Schema => ValidationError::Schema(violations),
            ValidatorKind::Distribution => ValidationError::Distribution(violations),
            ValidatorKind::Correlation => ValidationError::Correlation(violations),
        }
    }
}

/// A stateless check over a read-only dataset.
pub trait Validator {
    fn kind(&self) -> ValidatorKind;

    /// Run the check and return every violation the validator's policy
    /// allows it to report. An empty vector means the dataset passed.
    fn validate(&self, dataset: &Dataset) -> Vec<Violation>;

    /// Run the check and turn any violation into a typed error.
    fn check(&self, dataset: &Dataset) -> Result<(), ValidationError> {
        let violations = self.validate(dataset);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(self.kind().into_error(violations))
        }
    }
}

// ---------------------------------------------------------------------------
// Running several validators
// ---------------------------------------------------------------------------

/// How [`validate_all`] treats a failing validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePolicy {
    #[default]
    StopAtFirstFailure,
    CollectAll,
}

/// Outcome of one validator inside a [`ValidationReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorOutcome {
    pub validator: ValidatorKind,
    pub passed: bool,
    pub violations: Vec<Violation>,
}

/// Result of running a set of validators over one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub rows: usize,
    pub columns: usize,
    pub outcomes: Vec<ValidatorOutcome>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// The first failing validator as an error, if any failed.
    pub fn first_error(&self) -> Option<ValidationError> {
        self.outcomes
            .iter()
            .find(|o| !o.passed)
            .map(|o| o.validator.into_error(o.violations.clone()))
    }

    /// Every failing validator as an error, in run order.
    pub fn errors(&self) -> Vec<ValidationError> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed)
            .map(|o| o.validator.into_error(o.violations.clone()))
            .collect()
    }
}

/// Run `validators` in order over `dataset`.
pub fn validate_all(
    dataset: &Dataset,
    validators: &[&dyn Validator],
    policy: PipelinePolicy,
) -> ValidationReport {
    let mut outcomes = Vec::with_capacity(validators.len());

    for validator in validators {
        let violations = validator.validate(dataset);
        let passed = violations.is_empty();
        if passed {
            log::info!("{:?} validation passed", validator.kind());
        } else {
            log::warn!(
                "{:?} validation failed with {} violation(s)",
                validator.kind(),
                violations.len()
            );
        }
        outcomes.push(ValidatorOutcome {
            validator: validator.kind(),
            passed,
            violations,
        });
        if !passed && policy == PipelinePolicy::StopAtFirstFailure {
            break;
        }
    }

    ValidationReport {
        rows: dataset.len(),
        columns: dataset.column_names().len(),
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    struct Always(ValidatorKind, usize);

    impl Validator for Always {
        fn kind(&self) -> ValidatorKind {
            self.0
        }

        fn validate(&self, _dataset: &Dataset) -> Vec<Violation> {
            (0..self.1)
                .map(|i| Violation::for_rows(CheckKind::EmptyRows, vec![i], format!("bad {i}")))
                .collect()
        }
    }

    fn tiny() -> Dataset {
        Dataset::from_columns(vec![("a", vec![Value::Integer(1)])]).unwrap()
    }

    #[test]
    fn fail_fast_collector_keeps_only_the_first() {
        let mut v = Violations::new(FailurePolicy::FailFast);
        v.push(Violation::for_rows(CheckKind::EmptyRows, vec![0], "first".into()));
        assert!(v.is_done());
        v.push(Violation::for_rows(CheckKind::EmptyRows, vec![1], "second".into()));
        let items = v.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].message, "first");
    }

    #[test]
    fn stop_at_first_failure_skips_later_validators() {
        let schema = Always(ValidatorKind::Schema, 2);
        let corr = Always(ValidatorKind::Correlation, 1);
        let report = validate_all(&tiny(), &[&schema, &corr], PipelinePolicy::StopAtFirstFailure);

        assert!(!report.passed());
        assert_eq!(report.outcomes.len(), 1);
        match report.first_error() {
            Some(ValidationError::Schema(v)) => assert_eq!(v.len(), 2),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn collect_all_runs_every_validator() {
        let schema = Always(ValidatorKind::Schema, 0);
        let dist = Always(ValidatorKind::Distribution, 1);
        let corr = Always(ValidatorKind::Correlation, 1);
        let report = validate_all(&tiny(), &[&schema, &dist, &corr], PipelinePolicy::CollectAll);

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.errors().len(), 2);
        assert!(matches!(report.first_error(), Some(ValidationError::Distribution(_))));
    }

    #[test]
    fn check_maps_violations_to_typed_error() {
        let ok = Always(ValidatorKind::Correlation, 0);
        assert!(ok.check(&tiny()).is_ok());

        let bad = Always(ValidatorKind::Correlation, 1);
        let err = bad.check(&tiny()).unwrap_err();
        assert!(matches!(err, ValidationError::Correlation(_)));
        assert!(err.to_string().contains("bad 0"));
    }
}
