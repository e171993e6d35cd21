use crate::data::model::Dataset;

use super::reference::{REFERENCE_STATISTICS, ReferenceStatistics};
use super::stats::{label_counts, mean};
use super::{
    CheckKind, FailurePolicy, TARGET_COLUMN, Validator, ValidatorKind, Violation, Violations,
};

/// Width of the tolerance band, in reference standard deviations.
pub const BAND_WIDTH: f64 = 2.0;

/// Detects drift of column means and target class proportions away from
/// the frozen baseline. Fails fast unless told otherwise.
///
/// Columns with no entry in the reference table are skipped, so extra
/// columns in the incoming data never fail this check.
#[derive(Debug, Clone, Copy)]
pub struct DistributionValidator<'a> {
    reference: &'a ReferenceStatistics,
    target_column: &'a str,
    policy: FailurePolicy,
}

impl Default for DistributionValidator<'static> {
    fn default() -> Self {
        DistributionValidator {
            reference: &REFERENCE_STATISTICS,
            target_column: TARGET_COLUMN,
            policy: FailurePolicy::FailFast,
        }
    }
}

impl<'a> DistributionValidator<'a> {
    pub fn new(reference: &'a ReferenceStatistics) -> Self {
        DistributionValidator {
            reference,
            target_column: TARGET_COLUMN,
            policy: FailurePolicy::FailFast,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn check_proportions(&self, dataset: &Dataset, out: &mut Violations) {
        let Some(values) = dataset.column(self.target_column) else {
            return;
        };
        let counts = label_counts(values);
        let present: usize = counts.values().sum();
        let allowed = BAND_WIDTH * self.reference.tolerance_std;

        for &(class, expected) in self.reference.class_proportions {
            let observed = match (counts.get(class), present) {
                (Some(&n), total) if total > 0 => n as f64 / total as f64,
                _ => 0.0,
            };
            log::debug!("{} proportion of '{class}': {observed:.4}", self.target_column);

            if (observed - expected).abs() > allowed {
                out.push(Violation::for_column(
                    CheckKind::ProportionDrift,
                    self.target_column,
                    format!(
                        "Proportion for category {class} in {} is {observed:.4}, outside \
                         [{:.4}, {:.4}] (reference {expected}, {BAND_WIDTH} x std {})",
                        self.target_column,
                        expected - allowed,
                        expected + allowed,
                        self.reference.tolerance_std,
                    ),
                ));
                if out.is_done() {
                    return;
                }
            }
        }
    }

    fn check_mean(&self, dataset: &Dataset, name: &str, out: &mut Violations) {
        let Some(reference) = self.reference.column(name) else {
            log::debug!("No reference statistics for column '{name}', skipping");
            return;
        };
        let Some(observed) = dataset.column(name).and_then(mean) else {
            log::debug!("Column '{name}' has no numeric values, skipping");
            return;
        };

        let allowed = BAND_WIDTH * reference.std;
        if (observed - reference.mean).abs() > allowed {
            out.push(Violation::for_column(
                CheckKind::MeanDrift,
                name,
                format!(
                    "Column {name} mean {observed:.4} is outside [{:.4}, {:.4}] \
                     (reference mean {}, {BAND_WIDTH} x std {})",
                    reference.mean - allowed,
                    reference.mean + allowed,
                    reference.mean,
                    reference.std,
                ),
            ));
        }
    }
}

impl Validator for DistributionValidator<'_> {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Distribution
    }

    fn validate(&self, dataset: &Dataset) -> Vec<Violation> {
        let mut out = Violations::new(self.policy);

        for name in dataset.column_names() {
            if name == self.target_column {
                self.check_proportions(dataset, &mut out);
            } else {
                self.check_mean(dataset, name, &mut out);
            }
            if out.is_done() {
                break;
            }
        }

        out.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use crate::validate::reference::ColumnReference;

    fn floats(xs: &[f64]) -> Vec<Value> {
        xs.iter().copied().map(Value::Float).collect()
    }

    fn labels(xs: &[&str]) -> Vec<Value> {
        xs.iter().map(|&s| Value::String(s.into())).collect()
    }

    /// Two graduates, one enrolled, two dropouts: 0.4 / 0.2 / 0.4.
    fn balanced_target() -> Vec<Value> {
        labels(&["Graduate", "Enrolled", "Dropout", "Graduate", "Dropout"])
    }

    #[test]
    fn values_near_reference_pass() {
        let ds = Dataset::from_columns(vec![
            ("Marital status", floats(&[1.2, 1.1, 1.3, 1.2, 1.1])),
            ("Application mode", floats(&[18.6, 18.7, 19.0, 18.5, 18.8])),
            ("Application order", floats(&[1.7, 1.8, 1.7, 1.6, 1.8])),
            ("Course", floats(&[8856.0, 8857.0, 8855.0, 8856.0, 8857.0])),
            ("Target", balanced_target()),
        ])
        .unwrap();

        assert!(DistributionValidator::default().check(&ds).is_ok());
    }

    #[test]
    fn missing_values_are_ignored() {
        let ds = Dataset::from_columns(vec![
            (
                "Marital status",
                vec![
                    Value::Float(1.2),
                    Value::Null,
                    Value::Float(1.3),
                    Value::Float(1.2),
                    Value::Float(1.1),
                ],
            ),
            (
                "Course",
                vec![
                    Value::Integer(8856),
                    Value::Integer(8857),
                    Value::Integer(8855),
                    Value::Null,
                    Value::Integer(8857),
                ],
            ),
            (
                "Target",
                vec![
                    Value::String("Graduate".into()),
                    Value::String("Enrolled".into()),
                    Value::Null,
                    Value::String("Graduate".into()),
                    Value::String("Dropout".into()),
                ],
            ),
        ])
        .unwrap();

        assert!(DistributionValidator::default().validate(&ds).is_empty());
    }

    #[test]
    fn shifted_mean_fails_and_names_column() {
        let ds = Dataset::from_columns(vec![
            ("Marital status", floats(&[10.0, 11.0, 12.0, 13.0, 14.0])),
            ("Application mode", floats(&[100.0, 105.0, 110.0, 120.0, 130.0])),
            ("Target", balanced_target()),
        ])
        .unwrap();

        let err = DistributionValidator::default().check(&ds).unwrap_err();
        let violations = err.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].check, CheckKind::MeanDrift);
        assert_eq!(violations[0].column.as_deref(), Some("Marital status"));
        assert!(err.to_string().contains("Marital status mean 12.0000"));
    }

    #[test]
    fn exhaustive_policy_reports_every_drift() {
        let ds = Dataset::from_columns(vec![
            ("Marital status", floats(&[10.0, 11.0, 12.0, 13.0, 14.0])),
            ("Application mode", floats(&[100.0, 105.0, 110.0, 120.0, 130.0])),
            ("Target", labels(&["Enrolled", "Enrolled", "Enrolled", "Enrolled", "Enrolled"])),
        ])
        .unwrap();

        let violations = DistributionValidator::default()
            .with_policy(FailurePolicy::Exhaustive)
            .validate(&ds);
        let checks: Vec<CheckKind> = violations.iter().map(|v| v.check).collect();
        // Graduate and Dropout are missing, Enrolled is over-represented.
        assert_eq!(
            checks,
            [
                CheckKind::MeanDrift,
                CheckKind::MeanDrift,
                CheckKind::ProportionDrift,
                CheckKind::ProportionDrift,
                CheckKind::ProportionDrift,
            ]
        );
    }

    #[test]
    fn skewed_target_fails() {
        let ds = Dataset::from_columns(vec![(
            "Target",
            labels(&["Dropout", "Dropout", "Dropout", "Dropout", "Graduate"]),
        )])
        .unwrap();

        let violations = DistributionValidator::default().validate(&ds);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].check, CheckKind::ProportionDrift);
        assert!(violations[0].message.contains("category Graduate"));
    }

    #[test]
    fn unknown_columns_are_skipped() {
        let ds = Dataset::from_columns(vec![
            ("Shoe size", floats(&[1e9, 2e9])),
            ("Target", labels(&["Graduate", "Dropout"])),
        ])
        .unwrap();

        assert!(DistributionValidator::default().validate(&ds).is_empty());
    }

    #[test]
    fn band_edges_are_inclusive() {
        static REF: ReferenceStatistics = ReferenceStatistics {
            columns: &[ColumnReference {
                name: "x",
                mean: 0.0,
                std: 1.0,
            }],
            class_proportions: &[],
            tolerance_std: 0.1,
        };
        let at_edge = Dataset::from_columns(vec![("x", floats(&[2.0]))]).unwrap();
        let past_edge = Dataset::from_columns(vec![("x", floats(&[2.5]))]).unwrap();

        let validator = DistributionValidator::new(&REF);
        assert!(validator.validate(&at_edge).is_empty());
        assert_eq!(validator.validate(&past_edge).len(), 1);
    }
}
