use std::fmt;

use polars::prelude::PolarsError;

/// A required field that was absent, or present but unreadable, in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Row index, `None` when the column is missing from the whole table.
    pub row: Option<usize>,
    pub field: &'static str,
    /// The cell held a value that could not be read as the field's type.
    pub unparseable: bool,
}

impl MissingField {
    pub fn absent(row: Option<usize>, field: &'static str) -> Self {
        Self { row, field, unparseable: false }
    }

    pub fn unparseable(row: usize, field: &'static str) -> Self {
        Self { row: Some(row), field, unparseable: true }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, self.unparseable) {
            (Some(row), true) => write!(f, "{} (row {}, unparseable value)", self.field, row),
            (Some(row), false) => write!(f, "{} (row {})", self.field, row),
            (None, _) => write!(f, "{} (column absent)", self.field),
        }
    }
}

/// A categorical value that fell outside its closed domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedCategory {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl fmt::Display for UnmatchedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: `{}` is not a level of {}", self.row, self.value, self.column)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("missing required field(s): {}", join(.missing))]
    Schema { missing: Vec<MissingField> },

    #[error("sequence length mismatch{}: expected {expected}, found {found}", .row.map(|r| format!(" at row {r}")).unwrap_or_default())]
    ShapeMismatch {
        row: Option<usize>,
        expected: usize,
        found: usize,
    },

    #[error("{} value(s) outside their categorical domain: {}", .unmatched.len(), join(.unmatched))]
    UnmatchedCategory { unmatched: Vec<UnmatchedCategory> },

    #[error("feature matrix does not match the classifier schema: {}", .problems.join("; "))]
    InferenceSchema { problems: Vec<String> },

    #[error("classifier `{classifier}` returned unusable output: {reason}")]
    ClassifierOutput { classifier: String, reason: String },

    #[error("cannot predict an empty batch")]
    EmptyBatch,

    #[error("threshold must be a finite value in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type PredictorResult<T> = Result<T, PredictorError>;

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
