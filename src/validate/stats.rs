//! Small numeric helpers shared by the validators.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::data::model::Value;

/// Arithmetic mean of the numeric values, skipping absent ones.
/// `None` when nothing numeric is present.
pub fn mean<'a, I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Value>,
{
    let (sum, n) = values
        .into_iter()
        .filter_map(Value::as_f64)
        .fold((0.0, 0usize), |(sum, n), x| (sum + x, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Pearson correlation over the rows where both sides are present.
///
/// `None` when fewer than two complete pairs exist or either side has zero
/// variance. The result is clamped to `[-1, 1]` so rounding never pushes
/// an exact linear relation past 1.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Count each present text label. Non-text values are counted under their
/// display form so that they still weigh in the denominator.
pub fn label_counts<'a, I>(values: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut counts = BTreeMap::new();
    for value in values.into_iter().filter(|v| !v.is_null()) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Chi-square goodness-of-fit statistic of `observed` against a uniform
/// expectation over the same categories.
pub fn chi_square_uniform(observed: &[usize]) -> Option<f64> {
    let total: usize = observed.iter().sum();
    if observed.is_empty() || total == 0 {
        return None;
    }
    let expected = total as f64 / observed.len() as f64;
    Some(
        observed
            .iter()
            .map(|&o| (o as f64 - expected).powi(2) / expected)
            .sum(),
    )
}

/// Chi-square statistic of independence over a contingency table built from
/// `(row, column)` observations. Tables with a single degree of freedom get
/// Yates' continuity correction.
///
/// `None` when the table has fewer than two rows or two columns.
pub fn chi_square_contingency<R, C, I>(observations: I) -> Option<f64>
where
    R: Eq + Hash,
    C: Eq + Hash,
    I: IntoIterator<Item = (R, C)>,
{
    let mut row_ids: HashMap<R, usize> = HashMap::new();
    let mut col_ids: HashMap<C, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), usize> = HashMap::new();
    for (r, c) in observations {
        let next = row_ids.len();
        let i = *row_ids.entry(r).or_insert(next);
        let next = col_ids.len();
        let j = *col_ids.entry(c).or_insert(next);
        *cells.entry((i, j)).or_insert(0) += 1;
    }

    let (n_rows, n_cols) = (row_ids.len(), col_ids.len());
    if n_rows < 2 || n_cols < 2 {
        return None;
    }

    let mut row_totals = vec![0usize; n_rows];
    let mut col_totals = vec![0usize; n_cols];
    for (&(i, j), &n) in &cells {
        row_totals[i] += n;
        col_totals[j] += n;
    }
    let total = row_totals.iter().sum::<usize>() as f64;
    let yates = (n_rows - 1) * (n_cols - 1) == 1;

    let mut chi2 = 0.0;
    for (i, &row_total) in row_totals.iter().enumerate() {
        for (j, &col_total) in col_totals.iter().enumerate() {
            let expected = row_total as f64 * col_total as f64 / total;
            let observed = cells.get(&(i, j)).copied().unwrap_or(0) as f64;
            let mut diff = (observed - expected).abs();
            if yates {
                diff = (diff - 0.5).max(0.0);
            }
            chi2 += diff * diff / expected;
        }
    }
    Some(chi2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    #[test]
    fn mean_skips_nulls_and_text() {
        let values = [
            Value::Integer(1),
            Value::Null,
            Value::Float(2.0),
            Value::String("x".into()),
        ];
        assert_eq!(mean(&values), Some(1.5));
        assert_eq!(mean(&[Value::Null]), None);
    }

    #[test]
    fn mean_skips_non_finite_floats() {
        let values = [Value::Float(10.0), Value::Float(f64::NAN), Value::Float(14.0)];
        assert_eq!(mean(&values), Some(12.0));
        assert_eq!(mean(&[Value::Float(f64::INFINITY)]), None);
    }

    #[test]
    fn pearson_of_linear_relation_is_exactly_one() {
        let x = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let y = some(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let z = some(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(pearson(&x, &y), Some(1.0));
        assert_eq!(pearson(&x, &z), Some(-1.0));
    }

    #[test]
    fn pearson_uses_pairwise_complete_rows() {
        let x = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let y = vec![Some(1.0), Some(2.0), Some(100.0), Some(4.0)];
        let r = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_is_undefined_for_constant_or_short_columns() {
        assert_eq!(pearson(&some(&[3.0, 3.0, 3.0]), &some(&[1.0, 2.0, 3.0])), None);
        assert_eq!(pearson(&some(&[1.0]), &some(&[2.0])), None);
        assert_eq!(pearson(&[None, None], &some(&[1.0, 2.0])), None);
    }

    #[test]
    fn label_counts_ignore_nulls() {
        let values = [
            Value::String("Dropout".into()),
            Value::Null,
            Value::String("Dropout".into()),
            Value::String("Graduate".into()),
        ];
        let counts = label_counts(&values);
        assert_eq!(counts.get("Dropout"), Some(&2));
        assert_eq!(counts.get("Graduate"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 3);
    }

    #[test]
    fn chi_square_against_uniform() {
        assert_eq!(chi_square_uniform(&[10, 10, 10]), Some(0.0));
        // expected 10 each: (20-10)^2/10 + (5-10)^2/10 + (5-10)^2/10
        assert_eq!(chi_square_uniform(&[20, 5, 5]), Some(15.0));
        assert_eq!(chi_square_uniform(&[]), None);
    }

    fn table(cells: &[(&'static str, &'static str, usize)]) -> Vec<(&'static str, &'static str)> {
        cells
            .iter()
            .flat_map(|&(r, c, n)| std::iter::repeat((r, c)).take(n))
            .collect()
    }

    #[test]
    fn contingency_chi_square_of_two_by_three_table() {
        // row totals 60/60, column totals 30/40/50, expected 15/20/25 per row
        let observations = table(&[
            ("a", "x", 10),
            ("a", "y", 20),
            ("a", "z", 30),
            ("b", "x", 20),
            ("b", "y", 20),
            ("b", "z", 20),
        ]);
        let chi2 = chi_square_contingency(observations).unwrap();
        assert!((chi2 - 16.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn contingency_chi_square_applies_yates_on_two_by_two() {
        let diagonal = table(&[("a", "x", 10), ("b", "y", 10)]);
        // |10 - 5| - 0.5 = 4.5 in each of four cells: 4 * 4.5^2 / 5
        let chi2 = chi_square_contingency(diagonal).unwrap();
        assert!((chi2 - 16.2).abs() < 1e-12);

        let independent = table(&[
            ("a", "x", 10),
            ("a", "y", 10),
            ("b", "x", 10),
            ("b", "y", 10),
        ]);
        assert_eq!(chi_square_contingency(independent), Some(0.0));
    }

    #[test]
    fn contingency_chi_square_needs_two_rows_and_columns() {
        assert_eq!(chi_square_contingency(table(&[("a", "x", 3), ("a", "y", 4)])), None);
        assert_eq!(chi_square_contingency(Vec::<(&str, &str)>::new()), None);
    }
}
