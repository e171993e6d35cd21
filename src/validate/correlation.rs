use crate::data::model::{Dataset, Value};

use super::stats::pearson;
use super::{
    CheckKind, FailurePolicy, TARGET_COLUMN, Validator, ValidatorKind, Violation, Violations,
};

/// Default bound on the absolute Pearson correlation of any column pair.
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// Integer codes for the target labels in the correlation matrix.
const TARGET_ENCODING: [(&str, f64); 3] = [("Enrolled", 0.0), ("Dropout", 1.0), ("Graduate", 2.0)];

/// Flags column pairs whose absolute correlation exceeds a threshold.
///
/// Every numeric column takes part, plus the target once its labels are
/// mapped to integers. Pairs with an undefined correlation (too few rows,
/// or a constant column) never fail.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationValidator<'a> {
    threshold: f64,
    target_column: &'a str,
    policy: FailurePolicy,
}

impl Default for CorrelationValidator<'static> {
    fn default() -> Self {
        CorrelationValidator {
            threshold: DEFAULT_THRESHOLD,
            target_column: TARGET_COLUMN,
            policy: FailurePolicy::FailFast,
        }
    }
}

impl CorrelationValidator<'static> {
    pub fn new(threshold: f64) -> Self {
        CorrelationValidator {
            threshold,
            ..Default::default()
        }
    }
}

impl<'a> CorrelationValidator<'a> {
    pub fn with_target_column(mut self, target_column: &'a str) -> Self {
        self.target_column = target_column;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Columns that enter the correlation matrix, as `(name, values)`.
    fn numeric_columns(&self, dataset: &Dataset) -> Vec<(String, Vec<Option<f64>>)> {
        dataset
            .column_names()
            .iter()
            .filter_map(|name| {
                let values = dataset.column(name)?;
                let encoded: Vec<Option<f64>> = if name == self.target_column {
                    values.map(encode_target).collect()
                } else {
                    values
                        .map(|v| match v {
                            Value::String(_) => Err(()),
                            other => Ok(other.as_f64()),
                        })
                        .collect::<Result<Vec<_>, ()>>()
                        .ok()?
                };
                Some((name.clone(), encoded))
            })
            .collect()
    }
}

fn encode_target(value: &Value) -> Option<f64> {
    match value {
        Value::String(label) => TARGET_ENCODING
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, code)| code),
        _ => None,
    }
}

impl Validator for CorrelationValidator<'_> {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Correlation
    }

    fn validate(&self, dataset: &Dataset) -> Vec<Violation> {
        let columns = self.numeric_columns(dataset);
        let mut out = Violations::new(self.policy);

        'scan: for (i, (left, x)) in columns.iter().enumerate() {
            for (right, y) in &columns[i + 1..] {
                let Some(r) = pearson(x, y) else {
                    continue;
                };
                if r.abs() > self.threshold {
                    out.push(Violation::for_column(
                        CheckKind::Correlation,
                        &format!("{left}, {right}"),
                        format!(
                            "Correlation exceeds threshold for: ('{left}', '{right}'). \
                             r = {r:.4}, threshold = {}",
                            self.threshold
                        ),
                    ));
                    if out.is_done() {
                        break 'scan;
                    }
                }
            }
        }

        out.into_vec()
    }
}
