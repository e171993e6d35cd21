use std::path::Path;

use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::validate::schema::{ColumnSpec, Domain, ValueKind};
use crate::validate::{REFERENCE_STATISTICS, ReferenceStatistics, STUDENT_SCHEMA, TARGET_COLUMN};

// ---------------------------------------------------------------------------
// RawSample – a synthetic export in the raw file layout
// ---------------------------------------------------------------------------

/// Synthetic rows with the raw export's header (tab token, `'s` suffixes).
///
/// Every numeric column is drawn independently around its reference mean
/// and snapped into its schema domain; the target follows the reference
/// class proportions. The result passes all three validators.
#[derive(Debug, Clone)]
pub struct RawSample {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSample {
    pub fn generate(n_rows: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let header = STUDENT_SCHEMA.iter().map(|spec| raw_header(spec.name)).collect();
        let rows = (0..n_rows)
            .map(|_| {
                STUDENT_SCHEMA
                    .iter()
                    .map(|spec| draw_cell(spec, &REFERENCE_STATISTICS, &mut rng))
                    .collect()
            })
            .collect();
        RawSample { header, rows }
    }

    /// Overwrite one cell, addressing the column by its cleaned name.
    pub fn set(&mut self, row: usize, column: &str, value: &str) -> Result<()> {
        let Some(idx) = STUDENT_SCHEMA.iter().position(|spec| spec.name == column) else {
            bail!("Unknown column '{column}'");
        };
        let cells = self
            .rows
            .get_mut(row)
            .with_context(|| format!("Row {row} out of range"))?;
        cells[idx] = value.to_string();
        Ok(())
    }

    /// Write the rows semicolon-delimited, as the raw export is.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Header as it appears in the raw export, before cleaning.
fn raw_header(name: &str) -> String {
    match name {
        "Daytime/evening attendance" => "Daytime/evening attendance\t".to_string(),
        "Mother qualification" => "Mother's qualification".to_string(),
        "Father qualification" => "Father's qualification".to_string(),
        "Mother occupation" => "Mother's occupation".to_string(),
        "Father occupation" => "Father's occupation".to_string(),
        other => other.to_string(),
    }
}

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn draw_label(reference: &ReferenceStatistics, rng: &mut StdRng) -> String {
    let mut u: f64 = rng.gen();
    for &(label, share) in reference.class_proportions {
        if u < share {
            return label.to_string();
        }
        u -= share;
    }
    reference
        .class_proportions
        .last()
        .map_or_else(String::new, |(label, _)| label.to_string())
}

/// Draw around the reference mean/std, then snap into the column's domain.
fn draw_cell(spec: &ColumnSpec, reference: &ReferenceStatistics, rng: &mut StdRng) -> String {
    if spec.name == TARGET_COLUMN {
        return draw_label(reference, rng);
    }
    let (mean, std) = reference
        .column(spec.name)
        .map_or((0.0, 1.0), |r| (r.mean, r.std));
    let x = gauss(rng, mean, std);

    match (spec.kind, spec.domain) {
        (_, Domain::OneOf(codes)) => codes
            .iter()
            .copied()
            .min_by(|a, b| (*a as f64 - x).abs().total_cmp(&(*b as f64 - x).abs()))
            .unwrap_or_default()
            .to_string(),
        (ValueKind::Integer, Domain::Between { min, max }) => {
            format!("{}", x.round().clamp(min, max) as i64)
        }
        (ValueKind::Integer, _) => format!("{}", x.round().max(0.0) as i64),
        (_, Domain::Between { min, max }) => format!("{:.1}", x.clamp(min, max)),
        _ => format!("{x:.2}"),
    }
}
