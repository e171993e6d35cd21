use std::collections::HashSet;
use std::fmt;

use crate::data::model::{Dataset, Value};

use super::{
    CheckKind, FailurePolicy, TARGET_CLASSES, TARGET_COLUMN, Validator, ValidatorKind, Violation,
    Violations,
};

/// At most this many offending values are quoted in one message.
const MAX_SAMPLES: usize = 5;

// ---------------------------------------------------------------------------
// ColumnSpec – the per-column contract
// ---------------------------------------------------------------------------

/// The value type a column must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Text => write!(f, "string"),
        }
    }
}

/// The set of values a column may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    Any,
    OneOf(&'static [i64]),
    OneOfText(&'static [&'static str]),
    /// Closed interval `[min, max]`.
    Between { min: f64, max: f64 },
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Any => write!(f, "any value"),
            Domain::OneOf(codes) => write!(f, "isin {codes:?}"),
            Domain::OneOfText(labels) => write!(f, "isin {labels:?}"),
            Domain::Between { min, max } => write!(f, "between [{min}, {max}]"),
        }
    }
}

/// Static contract for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub nullable: bool,
    pub domain: Domain,
}

impl ColumnSpec {
    const fn int(name: &'static str, domain: Domain, nullable: bool) -> Self {
        ColumnSpec {
            name,
            kind: ValueKind::Integer,
            nullable,
            domain,
        }
    }

    const fn float(name: &'static str, domain: Domain, nullable: bool) -> Self {
        ColumnSpec {
            name,
            kind: ValueKind::Float,
            nullable,
            domain,
        }
    }

    /// Check one cell against this contract.
    pub fn check(&self, value: &Value) -> Result<(), CheckKind> {
        if value.is_null() {
            return if self.nullable {
                Ok(())
            } else {
                Err(CheckKind::Nullability)
            };
        }

        match (self.kind, value) {
            (ValueKind::Text, Value::String(s)) => match self.domain {
                Domain::OneOfText(labels) if !labels.contains(&s.as_str()) => {
                    Err(CheckKind::Domain)
                }
                _ => Ok(()),
            },
            (ValueKind::Integer, v) => {
                let code = as_integer(v).ok_or(CheckKind::ValueType)?;
                self.check_number(code as f64, Some(code))
            }
            (ValueKind::Float, v) => {
                let x = v.as_f64().ok_or(CheckKind::ValueType)?;
                self.check_number(x, None)
            }
            _ => Err(CheckKind::ValueType),
        }
    }

    fn check_number(&self, x: f64, code: Option<i64>) -> Result<(), CheckKind> {
        let ok = match self.domain {
            Domain::Any => true,
            Domain::OneOf(codes) => code.is_some_and(|c| codes.contains(&c)),
            Domain::Between { min, max } => (min..=max).contains(&x),
            Domain::OneOfText(_) => false,
        };
        if ok { Ok(()) } else { Err(CheckKind::Domain) }
    }
}

/// Integer columns also accept floats with no fractional part, which is how
/// a column with missing values comes back from many CSV writers. Floats
/// beyond the `i64` range are rejected rather than saturated.
fn as_integer(value: &Value) -> Option<i64> {
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = -(i64::MIN as f64);
    match value {
        Value::Integer(i) => Some(*i),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 && (LOWER..UPPER).contains(f) => {
            Some(*f as i64)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// STUDENT_SCHEMA – the fixed 37-column contract
// ---------------------------------------------------------------------------

const BINARY: Domain = Domain::OneOf(&[0, 1]);

const GRADE_200: Domain = Domain::Between {
    min: 0.0,
    max: 200.0,
};

const GRADE_20: Domain = Domain::Between {
    min: 0.0,
    max: 20.0,
};

const MARITAL_STATUS: &[i64] = &[1, 2, 3, 4, 5, 6];

const APPLICATION_MODE: &[i64] = &[
    1, 2, 5, 7, 10, 15, 16, 17, 18, 26, 27, 39, 42, 43, 44, 51, 53, 57,
];

const APPLICATION_ORDER: &[i64] = &[0, 1, 2, 3, 4, 5, 6, 9];

const COURSE: &[i64] = &[
    33, 171, 8014, 9003, 9070, 9085, 9119, 9130, 9147, 9238, 9254, 9500, 9556, 9670, 9773, 9853,
    9991,
];

const PREVIOUS_QUALIFICATION: &[i64] = &[
    1, 2, 3, 4, 5, 6, 9, 10, 12, 14, 15, 19, 38, 39, 40, 42, 43,
];

const NATIONALITY: &[i64] = &[
    1, 2, 6, 11, 13, 14, 17, 21, 22, 24, 25, 26, 32, 41, 62, 100, 101, 103, 105, 108, 109,
];

const MOTHER_QUALIFICATION: &[i64] = &[
    1, 2, 3, 4, 5, 6, 9, 10, 11, 12, 14, 18, 19, 22, 26, 27, 29, 30, 34, 35, 36, 37, 38, 39, 40,
    41, 42, 43, 44,
];

const FATHER_QUALIFICATION: &[i64] = &[
    1, 2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 14, 18, 19, 20, 22, 25, 26, 27, 29, 30, 31, 33, 34, 35,
    36, 37, 38, 39, 40, 41, 42, 43, 44,
];

const MOTHER_OCCUPATION: &[i64] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 90, 99, 122, 123, 125, 131, 132, 134, 141, 143, 144, 151,
    152, 153, 171, 173, 175, 191, 192, 193, 194,
];

const FATHER_OCCUPATION: &[i64] = &[
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 90, 99, 101, 102, 103, 112, 114, 121, 122, 123, 124, 131,
    132, 134, 135, 141, 143, 144, 151, 152, 153, 154, 161, 163, 171, 172, 174, 175, 181, 182, 183,
    192, 193, 194, 195,
];

/// Column contracts of the cleaned student dataset, in file order.
pub static STUDENT_SCHEMA: [ColumnSpec; 37] = [
    ColumnSpec::int("Marital status", Domain::OneOf(MARITAL_STATUS), true),
    ColumnSpec::int("Application mode", Domain::OneOf(APPLICATION_MODE), false),
    ColumnSpec::int("Application order", Domain::OneOf(APPLICATION_ORDER), false),
    ColumnSpec::int("Course", Domain::OneOf(COURSE), true),
    ColumnSpec::int("Daytime/evening attendance", BINARY, true),
    ColumnSpec::int("Previous qualification", Domain::OneOf(PREVIOUS_QUALIFICATION), false),
    ColumnSpec::float("Previous qualification (grade)", GRADE_200, false),
    ColumnSpec::int("Nacionality", Domain::OneOf(NATIONALITY), true),
    ColumnSpec::int("Mother qualification", Domain::OneOf(MOTHER_QUALIFICATION), true),
    ColumnSpec::int("Father qualification", Domain::OneOf(FATHER_QUALIFICATION), true),
    ColumnSpec::int("Mother occupation", Domain::OneOf(MOTHER_OCCUPATION), true),
    ColumnSpec::int("Father occupation", Domain::OneOf(FATHER_OCCUPATION), true),
    ColumnSpec::float("Admission grade", GRADE_200, true),
    ColumnSpec::int("Displaced", BINARY, true),
    ColumnSpec::int("Educational special needs", BINARY, true),
    ColumnSpec::int("Debtor", BINARY, true),
    ColumnSpec::int("Tuition fees up to date", BINARY, true),
    ColumnSpec::int("Gender", BINARY, true),
    ColumnSpec::int("Scholarship holder", BINARY, true),
    ColumnSpec::int(
        "Age at enrollment",
        Domain::Between {
            min: 15.0,
            max: 100.0,
        },
        true,
    ),
    ColumnSpec::int("International", BINARY, true),
    ColumnSpec::int("Curricular units 1st sem (credited)", Domain::Any, true),
    ColumnSpec::int("Curricular units 1st sem (enrolled)", Domain::Any, true),
    ColumnSpec::int("Curricular units 1st sem (evaluations)", Domain::Any, true),
    ColumnSpec::int("Curricular units 1st sem (approved)", Domain::Any, true),
    ColumnSpec::float("Curricular units 1st sem (grade)", GRADE_20, true),
    ColumnSpec::int("Curricular units 1st sem (without evaluations)", Domain::Any, true),
    ColumnSpec::int("Curricular units 2nd sem (credited)", Domain::Any, true),
    ColumnSpec::int("Curricular units 2nd sem (enrolled)", Domain::Any, true),
    ColumnSpec::int("Curricular units 2nd sem (evaluations)", Domain::Any, true),
    ColumnSpec::int("Curricular units 2nd sem (approved)", Domain::Any, true),
    ColumnSpec::float("Curricular units 2nd sem (grade)", GRADE_20, true),
    ColumnSpec::int("Curricular units 2nd sem (without evaluations)", Domain::Any, true),
    ColumnSpec::float("Unemployment rate", Domain::Any, true),
    ColumnSpec::float("Inflation rate", Domain::Any, true),
    ColumnSpec::float("GDP", Domain::Any, true),
    ColumnSpec {
        name: TARGET_COLUMN,
        kind: ValueKind::Text,
        nullable: false,
        domain: Domain::OneOfText(&TARGET_CLASSES),
    },
];

// ---------------------------------------------------------------------------
// SchemaValidator
// ---------------------------------------------------------------------------

/// Checks column presence, per-column contracts, and that the table has
/// neither duplicate nor fully-empty rows. Exhaustive unless asked to fail
/// fast.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator {
    columns: &'static [ColumnSpec],
    policy: FailurePolicy,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        SchemaValidator {
            columns: &STUDENT_SCHEMA,
            policy: FailurePolicy::Exhaustive,
        }
    }
}

impl SchemaValidator {
    pub fn new(columns: &'static [ColumnSpec]) -> Self {
        SchemaValidator {
            columns,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn check_column(&self, spec: &ColumnSpec, dataset: &Dataset, out: &mut Violations) {
        let Some(values) = dataset.column(spec.name) else {
            out.push(Violation::for_column(
                CheckKind::MissingColumn,
                spec.name,
                format!("Column '{}' not in dataframe", spec.name),
            ));
            return;
        };

        let fail_fast = self.policy == FailurePolicy::FailFast;
        let mut nulls = Failures::default();
        let mut wrong_type = Failures::default();
        let mut out_of_domain = Failures::default();

        for (row, value) in values.enumerate() {
            let bucket = match spec.check(value) {
                Ok(()) => continue,
                Err(CheckKind::Nullability) => &mut nulls,
                Err(CheckKind::ValueType) => &mut wrong_type,
                Err(_) => &mut out_of_domain,
            };
            bucket.record(row, value);
            if fail_fast {
                break;
            }
        }

        if !nulls.is_empty() {
            out.push(nulls.into_violation(
                CheckKind::Nullability,
                spec.name,
                format!("Column '{}' is not nullable but contains null values", spec.name),
            ));
        }
        if !wrong_type.is_empty() {
            out.push(wrong_type.into_violation(
                CheckKind::ValueType,
                spec.name,
                format!("Column '{}' expected values of type {}", spec.name, spec.kind),
            ));
        }
        if !out_of_domain.is_empty() {
            out.push(out_of_domain.into_violation(
                CheckKind::Domain,
                spec.name,
                format!("Column '{}' failed check {}", spec.name, spec.domain),
            ));
        }
    }
}

impl Validator for SchemaValidator {
    fn kind(&self) -> ValidatorKind {
        ValidatorKind::Schema
    }

    fn validate(&self, dataset: &Dataset) -> Vec<Violation> {
        let mut out = Violations::new(self.policy);

        for spec in self.columns {
            self.check_column(spec, dataset, &mut out);
            if out.is_done() {
                return out.into_vec();
            }
        }

        let duplicates = duplicate_rows(dataset);
        if !duplicates.is_empty() {
            let message = format!("Duplicate rows found. Rows: {}", format_rows(&duplicates));
            out.push(Violation::for_rows(CheckKind::DuplicateRows, duplicates, message));
        }

        let empty = empty_rows(dataset);
        if !empty.is_empty() {
            let message = format!("Empty rows found. Rows: {}", format_rows(&empty));
            out.push(Violation::for_rows(CheckKind::EmptyRows, empty, message));
        }

        out.into_vec()
    }
}

// -- Dataset-wide checks --

/// Rows that repeat an earlier row across every column.
fn duplicate_rows(dataset: &Dataset) -> Vec<usize> {
    let mut seen: HashSet<&[Value]> = HashSet::with_capacity(dataset.len());
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| !seen.insert(row.as_slice()))
        .map(|(i, _)| i)
        .collect()
}

/// Rows whose every cell is absent.
fn empty_rows(dataset: &Dataset) -> Vec<usize> {
    if dataset.column_names().is_empty() {
        return Vec::new();
    }
    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.iter().all(Value::is_null))
        .map(|(i, _)| i)
        .collect()
}

// -- Failure collection for one column and one rule --

#[derive(Default)]
struct Failures {
    rows: Vec<usize>,
    samples: Vec<String>,
}

impl Failures {
    fn record(&mut self, row: usize, value: &Value) {
        self.rows.push(row);
        let sample = value.to_string();
        if self.samples.len() < MAX_SAMPLES && !self.samples.contains(&sample) {
            self.samples.push(sample);
        }
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn into_violation(self, check: CheckKind, column: &str, cause: String) -> Violation {
        let message = format!(
            "{cause}; failure cases [{}] at rows {}",
            self.samples.join(", "),
            format_rows(&self.rows)
        );
        Violation {
            check,
            column: Some(column.to_string()),
            rows: self.rows,
            message,
        }
    }
}

fn format_rows(rows: &[usize]) -> String {
    const SHOWN: usize = 10;
    let head: Vec<String> = rows.iter().take(SHOWN).map(|r| r.to_string()).collect();
    if rows.len() > SHOWN {
        format!("[{}, ... ({} total)]", head.join(", "), rows.len())
    } else {
        format!("[{}]", head.join(", "))
    }
}
