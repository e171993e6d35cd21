//! Baseline statistics used as drift anchors.
//!
//! The values were computed once, offline, from the trusted release of the
//! dataset and are frozen here. They are not recomputed at runtime.

/// Reference mean and standard deviation of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnReference {
    pub name: &'static str,
    pub mean: f64,
    pub std: f64,
}

/// Baseline for the distribution check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceStatistics {
    pub columns: &'static [ColumnReference],
    /// Expected share of each target class.
    pub class_proportions: &'static [(&'static str, f64)],
    /// Shared standard deviation for every class proportion.
    pub tolerance_std: f64,
}

impl ReferenceStatistics {
    pub fn column(&self, name: &str) -> Option<&ColumnReference> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const fn col(name: &'static str, mean: f64, std: f64) -> ColumnReference {
    ColumnReference { name, mean, std }
}

pub static REFERENCE_STATISTICS: ReferenceStatistics = ReferenceStatistics {
    columns: &[
        col("Marital status", 1.178571429, 0.605746946),
        col("Application mode", 18.66907776, 17.48468229),
        col("Application order", 1.727848101, 1.313793078),
        col("Course", 8856.642631, 2063.566416),
        col("Daytime/evening attendance", 0.890822785, 0.311896681),
        col("Previous qualification", 4.577757685, 10.21659234),
        col("Previous qualification (grade)", 132.6133137, 13.18833169),
        col("Nacionality", 1.873191682, 6.914514032),
        col("Mother qualification", 19.5619349, 15.60318632),
        col("Father qualification", 22.27531646, 15.34310781),
        col("Mother occupation", 10.96089512, 26.41825291),
        col("Father occupation", 11.03232369, 25.26304024),
        col("Admission grade", 126.9781193, 14.48200082),
        col("Displaced", 0.548372514, 0.497710853),
        col("Educational special needs", 0.011528029, 0.106760057),
        col("Debtor", 0.113698011, 0.31748001),
        col("Tuition fees up to date", 0.880650995, 0.324235383),
        col("Gender", 0.351717902, 0.477560437),
        col("Scholarship holder", 0.248417722, 0.432144154),
        col("Age at enrollment", 23.26514467, 7.587815615),
        col("International", 0.024864376, 0.155729319),
        col("Curricular units 1st sem (credited)", 0.709990958, 2.360506619),
        col("Curricular units 1st sem (enrolled)", 6.27056962, 2.480178175),
        col("Curricular units 1st sem (evaluations)", 8.299050633, 4.179105569),
        col("Curricular units 1st sem (approved)", 4.706600362, 3.09423798),
        col("Curricular units 1st sem (grade)", 10.64082158, 4.843663381),
        col("Curricular units 1st sem (without evaluations)", 0.137658228, 0.690880184),
        col("Curricular units 2nd sem (credited)", 0.54181736, 1.918546144),
        col("Curricular units 2nd sem (enrolled)", 6.232142857, 2.195950751),
        col("Curricular units 2nd sem (evaluations)", 8.063291139, 3.947950941),
        col("Curricular units 2nd sem (approved)", 4.435804702, 3.014763902),
        col("Curricular units 2nd sem (grade)", 10.23020572, 5.210807955),
        col("Curricular units 2nd sem (without evaluations)", 0.150316456, 0.753774069),
        col("Unemployment rate", 11.56613924, 2.663850484),
        col("Inflation rate", 1.228028933, 1.382710692),
        col("GDP", 0.001968807, 2.269935441),
    ],
    class_proportions: &[("Graduate", 0.50), ("Enrolled", 0.18), ("Dropout", 0.32)],
    tolerance_std: 0.10,
};

/// Baseline association statistics of a few features, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBaselines {
    /// Contingency chi-square of each feature against the target.
    pub target_chi2: &'static [(&'static str, f64)],
    /// Pearson correlation of each feature pair.
    pub pair_pearson: &'static [(&'static str, &'static str, f64)],
}

pub static FEATURE_BASELINES: FeatureBaselines = FeatureBaselines {
    target_chi2: &[
        ("Admission grade", 1436.5038834914599),
        ("Age at enrollment", 547.2674289070418),
        ("GDP", 51.965049926087076),
    ],
    pair_pearson: &[
        ("Admission grade", "Age at enrollment", -0.02991535667400831),
        ("Admission grade", "GDP", -0.019519481896555686),
        ("Age at enrollment", "GDP", -0.06467811172086718),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{STUDENT_SCHEMA, TARGET_CLASSES, TARGET_COLUMN};

    #[test]
    fn every_numeric_schema_column_has_a_reference() {
        for spec in STUDENT_SCHEMA.iter().filter(|c| c.name != TARGET_COLUMN) {
            assert!(
                REFERENCE_STATISTICS.column(spec.name).is_some(),
                "no reference for {}",
                spec.name
            );
        }
        assert_eq!(REFERENCE_STATISTICS.columns.len(), 36);
    }

    #[test]
    fn class_proportions_cover_target_and_sum_to_one() {
        let total: f64 = REFERENCE_STATISTICS
            .class_proportions
            .iter()
            .map(|(_, p)| p)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
        for (class, _) in REFERENCE_STATISTICS.class_proportions {
            assert!(TARGET_CLASSES.contains(class));
        }
    }

    #[test]
    fn feature_baselines_pair_every_tracked_feature() {
        let features: Vec<&str> = FEATURE_BASELINES.target_chi2.iter().map(|(f, _)| *f).collect();
        for (a, b, r) in FEATURE_BASELINES.pair_pearson {
            assert!(features.contains(a) && features.contains(b));
            assert!((-1.0..=1.0).contains(r));
        }
        assert_eq!(FEATURE_BASELINES.pair_pearson.len(), 3);
        for (feature, _) in FEATURE_BASELINES.target_chi2 {
            assert!(REFERENCE_STATISTICS.column(feature).is_some());
        }
    }
}
