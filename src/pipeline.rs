use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::loader::{is_csv_file, read_raw, write_csv};
use crate::data::model::{Dataset, Value};
use crate::data::split::{DEFAULT_SEED, DEFAULT_TRAIN_FRACTION, train_test_split};
use crate::validate::correlation::DEFAULT_THRESHOLD;
use crate::validate::reference::{FEATURE_BASELINES, FeatureBaselines};
use crate::validate::stats::{chi_square_contingency, chi_square_uniform, label_counts, pearson};
use crate::validate::{
    CorrelationValidator, DistributionValidator, FailurePolicy, PipelinePolicy, SchemaValidator,
    TARGET_COLUMN, ValidationReport, Validator, validate_all,
};

pub const CLEAN_FILE: &str = "clean_data.csv";
pub const TRAIN_FILE: &str = "train_data.csv";
pub const TEST_FILE: &str = "test_data.csv";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything one pipeline run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw, semicolon-delimited dataset.
    pub raw_path: PathBuf,
    /// Directory receiving the cleaned table and the split.
    pub output_dir: PathBuf,
    pub seed: u64,
    pub train_fraction: f64,
    pub corr_threshold: f64,
    /// Policy of the schema validator; the other two always fail fast.
    pub schema_policy: FailurePolicy,
    pub pipeline_policy: PipelinePolicy,
    /// Optional JSON report of every validator outcome.
    pub report_path: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(raw_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            raw_path: raw_path.into(),
            output_dir: output_dir.into(),
            seed: DEFAULT_SEED,
            train_fraction: DEFAULT_TRAIN_FRACTION,
            corr_threshold: DEFAULT_THRESHOLD,
            schema_policy: FailurePolicy::Exhaustive,
            pipeline_policy: PipelinePolicy::StopAtFirstFailure,
            report_path: None,
        }
    }
}

/// Files written by a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub clean_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub train_rows: usize,
    pub test_rows: usize,
    pub report: ValidationReport,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Ingest, clean, validate and split the dataset.
///
/// The cleaned table is always written. The train/test tables are written
/// only when every validator passes; otherwise the first failure is
/// returned as a [`crate::error::ValidationError`] inside the `anyhow` error.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let raw_path = &config.raw_path;
    if is_csv_file(raw_path) {
        log::info!("{} is a CSV file", raw_path.display());
    } else {
        log::warn!("{} is not a CSV file", raw_path.display());
    }

    let dataset = read_raw(raw_path)?;
    log::info!(
        "Loaded {} rows with {} columns",
        dataset.len(),
        dataset.column_names().len()
    );

    let clean_path = config.output_dir.join(CLEAN_FILE);
    write_csv(&dataset, &clean_path)?;
    log::info!("Clean data saved to {}", clean_path.display());

    if let Some(summary) = target_summary(&dataset) {
        summary.log();
    }
    feature_diagnostics(&dataset, &FEATURE_BASELINES).log();

    log::info!("Starting data validation");
    let report = validate(&dataset, config);

    if let Some(path) = &config.report_path {
        write_report(&report, path)?;
        log::info!("Validation report saved to {}", path.display());
    }

    if let Some(first) = report.first_error() {
        for err in report.errors() {
            log::error!("{err}");
        }
        return Err(first.into());
    }
    log::info!("Data validation success");

    let (train, test) = train_test_split(&dataset, config.train_fraction, config.seed)?;
    let train_path = config.output_dir.join(TRAIN_FILE);
    let test_path = config.output_dir.join(TEST_FILE);
    write_csv(&train, &train_path)?;
    write_csv(&test, &test_path)?;
    log::info!(
        "Train ({} rows) and test ({} rows) data saved under {}",
        train.len(),
        test.len(),
        config.output_dir.display()
    );

    Ok(PipelineOutput {
        clean_path,
        train_path,
        test_path,
        train_rows: train.len(),
        test_rows: test.len(),
        report,
    })
}

/// Run schema, distribution and correlation validation in that order.
pub fn validate(dataset: &Dataset, config: &PipelineConfig) -> ValidationReport {
    let schema = SchemaValidator::default().with_policy(config.schema_policy);
    let distribution = DistributionValidator::default();
    let correlation = CorrelationValidator::new(config.corr_threshold);
    let validators: [&dyn Validator; 3] = [&schema, &distribution, &correlation];
    validate_all(dataset, &validators, config.pipeline_policy)
}

fn write_report(report: &ValidationReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serializing validation report")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Target diagnostics
// ---------------------------------------------------------------------------

/// Observed class frequencies of the target and their chi-square statistic
/// against a uniform spread. Informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSummary {
    pub counts: Vec<(String, usize)>,
    pub chi_square: Option<f64>,
}

impl TargetSummary {
    fn log(&self) {
        for (label, count) in &self.counts {
            log::info!("Observed frequency of {label}: {count}");
        }
        if let Some(chi2) = self.chi_square {
            log::info!("Chi-square statistic against a uniform target: {chi2:.4}");
        }
    }
}

pub fn target_summary(dataset: &Dataset) -> Option<TargetSummary> {
    let counts: Vec<(String, usize)> = label_counts(dataset.column(TARGET_COLUMN)?)
        .into_iter()
        .collect();
    let observed: Vec<usize> = counts.iter().map(|(_, n)| *n).collect();
    Some(TargetSummary {
        chi_square: chi_square_uniform(&observed),
        counts,
    })
}

/// Largest gap between an observed statistic and its baseline that still
/// counts as a match.
pub const BASELINE_TOLERANCE: f64 = 1.5e-7;

/// One observed statistic next to its frozen baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineComparison {
    pub label: String,
    /// `None` when a column is missing or the statistic is undefined.
    pub observed: Option<f64>,
    pub baseline: f64,
}

impl BaselineComparison {
    pub fn matches(&self) -> bool {
        self.observed
            .is_some_and(|o| (o - self.baseline).abs() < BASELINE_TOLERANCE)
    }

    fn log(&self, statistic: &str) {
        match self.observed {
            Some(o) if self.matches() => {
                log::info!("{statistic} for {}: {o:.6} (matches baseline)", self.label)
            }
            Some(o) => log::warn!(
                "{statistic} for {}: {o:.6} differs from baseline {:.6}",
                self.label,
                self.baseline
            ),
            None => log::warn!("{statistic} for {} could not be computed", self.label),
        }
    }
}

/// Feature-to-target chi-square and feature-to-feature Pearson statistics,
/// compared with their baselines. Informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDiagnostics {
    pub target_chi2: Vec<BaselineComparison>,
    pub pair_pearson: Vec<BaselineComparison>,
}

impl FeatureDiagnostics {
    fn log(&self) {
        for c in &self.target_chi2 {
            c.log("Chi-square against Target");
        }
        for c in &self.pair_pearson {
            c.log("Pearson correlation");
        }
    }
}

pub fn feature_diagnostics(dataset: &Dataset, baselines: &FeatureBaselines) -> FeatureDiagnostics {
    let target_chi2 = baselines
        .target_chi2
        .iter()
        .map(|&(feature, baseline)| BaselineComparison {
            label: feature.to_string(),
            observed: contingency_against_target(dataset, feature),
            baseline,
        })
        .collect();

    let pair_pearson = baselines
        .pair_pearson
        .iter()
        .map(|&(a, b, baseline)| BaselineComparison {
            label: format!("{a}_{b}"),
            observed: numeric(dataset, a)
                .zip(numeric(dataset, b))
                .and_then(|(x, y)| pearson(&x, &y)),
            baseline,
        })
        .collect();

    FeatureDiagnostics {
        target_chi2,
        pair_pearson,
    }
}

fn contingency_against_target(dataset: &Dataset, feature: &str) -> Option<f64> {
    let values = dataset.column(feature)?;
    let labels = dataset.column(TARGET_COLUMN)?;
    chi_square_contingency(
        values
            .zip(labels)
            .filter(|(v, label)| !v.is_null() && !label.is_null()),
    )
}

fn numeric(dataset: &Dataset, name: &str) -> Option<Vec<Option<f64>>> {
    Some(dataset.column(name)?.map(Value::as_f64).collect())
}
