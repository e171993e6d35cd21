use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::{Dataset, Value};

/// Header token in the raw file that carries a trailing tab.
const MALFORMED_ATTENDANCE_HEADER: &str = "Daytime/evening attendance\t";
const ATTENDANCE_HEADER: &str = "Daytime/evening attendance";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the raw, semicolon-delimited dataset and normalise its header.
///
/// The raw export names one column `"Daytime/evening attendance\t"` and
/// writes possessives such as `"Mother's qualification"`; both are cleaned
/// by [`clean_header`] so the table lines up with the validation schema.
pub fn read_raw(path: &Path) -> Result<Dataset> {
    let dataset = read_table(path, b';').context("reading raw dataset")?;
    dataset.rename_columns(clean_header)
}

/// Load a comma-delimited table such as the cleaned copy or a split.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    read_table(path, b',')
}

/// Persist a dataset as a comma-delimited table. Absent values are written
/// as empty cells.
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(dataset.column_names())
        .context("writing CSV header")?;

    for (row_no, row) in dataset.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(format_cell))
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV writer")?;
    Ok(())
}

/// Whether `path` names a `.csv` file that parses as a CSV table.
pub fn is_csv_file(path: &Path) -> bool {
    let is_csv_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv_ext {
        return false;
    }

    let Ok(mut reader) = csv::Reader::from_path(path) else {
        return false;
    };
    reader.headers().is_ok() && reader.records().all(|r| r.is_ok())
}

/// Fix the known malformed header token and drop the `'s` suffixes.
pub fn clean_header(name: &str) -> String {
    let name = if name == MALFORMED_ATTENDANCE_HEADER {
        ATTENDANCE_HEADER
    } else {
        name
    };
    name.replace("'s", "")
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_table(path: &Path, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        bail!("{} has no header row", path.display());
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(Value::parse).collect());
    }

    Dataset::new(headers, rows)
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        // Debug keeps the decimal point so floats read back as floats.
        Value::Float(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{
        CheckKind, CorrelationValidator, DistributionValidator, STUDENT_SCHEMA, SchemaValidator,
        Validator,
    };

    fn write_raw(contents: &str) -> (tempfile::TempDir, Dataset) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, contents).unwrap();
        let ds = read_raw(&path).unwrap();
        (dir, ds)
    }

    #[test]
    fn clean_header_fixes_known_tokens() {
        assert_eq!(
            clean_header("Daytime/evening attendance\t"),
            "Daytime/evening attendance"
        );
        assert_eq!(clean_header("Mother's qualification"), "Mother qualification");
        assert_eq!(clean_header("Nacionality"), "Nacionality");
    }

    #[test]
    fn raw_file_is_cleaned_and_typed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "Marital status;Daytime/evening attendance\t;Father's occupation;Admission grade;Target\n\
             1;1;10;127.3;Dropout\n\
             2;;5;;Graduate\n",
        )
        .unwrap();

        let ds = read_raw(&path).unwrap();
        assert_eq!(
            ds.column_names(),
            [
                "Marital status",
                "Daytime/evening attendance",
                "Father occupation",
                "Admission grade",
                "Target"
            ]
        );
        assert_eq!(
            ds.rows()[0],
            vec![
                Value::Integer(1),
                Value::Integer(1),
                Value::Integer(10),
                Value::Float(127.3),
                Value::String("Dropout".into()),
            ]
        );
        assert!(ds.rows()[1][1].is_null());
        assert!(ds.rows()[1][3].is_null());
    }

    #[test]
    fn written_table_reads_back_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("clean.csv");
        let ds = Dataset::from_columns(vec![
            ("grade", vec![Value::Float(180.0), Value::Null]),
            ("label", vec![Value::String("Enrolled".into()), Value::String("Dropout".into())]),
        ])
        .unwrap();

        write_csv(&ds, &path).unwrap();
        let back = read_csv(&path).unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn csv_detection_checks_extension_and_content() {
        let dir = tempfile::tempdir().unwrap();

        let valid = dir.path().join("valid.csv");
        std::fs::write(&valid, "name,age\nJohn,25\nAlice,30").unwrap();
        assert!(is_csv_file(&valid));

        let text = dir.path().join("invalid.txt");
        std::fs::write(&text, "This is not a CSV file!").unwrap();
        assert!(!is_csv_file(&text));

        let ragged = dir.path().join("ragged.csv");
        std::fs::write(&ragged, "a,b\n1,2,3\n").unwrap();
        assert!(!is_csv_file(&ragged));

        assert!(!is_csv_file(&dir.path().join("missing.csv")));
    }

    #[test]
    fn nan_cell_is_missing_and_does_not_hide_drift() {
        let (_dir, ds) = write_raw(
            "Marital status;Target\n\
             10;Dropout\n\
             12;Graduate\n\
             14;Graduate\n\
             NaN;Dropout\n\
             12;Enrolled\n",
        );
        assert!(ds.rows()[3][0].is_null());

        let violations = DistributionValidator::default().validate(&ds);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].check, CheckKind::MeanDrift);
        assert!(violations[0].message.contains("Marital status mean 12.0000"));
    }

    #[test]
    fn na_tokens_are_nulls_for_schema_and_correlation() {
        let (_dir, ds) = write_raw(
            "Marital status;Course;Target\n\
             1;2;Dropout\n\
             2;4;Graduate\n\
             NA;N/A;Graduate\n\
             3;6;Dropout\n\
             4;8;Enrolled\n",
        );
        assert!(ds.rows()[2][0].is_null());
        assert!(ds.rows()[2][1].is_null());

        // Marital status is nullable, so the NA cell passes its contract.
        let schema = SchemaValidator::new(&STUDENT_SCHEMA[..1]);
        assert_eq!(schema.validate(&ds), vec![]);

        // Both columns stay numeric and their perfect correlation is caught.
        let violations = CorrelationValidator::default().validate(&ds);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].column.as_deref(), Some("Marital status, Course"));
    }
}
