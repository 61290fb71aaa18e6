use polars::prelude::*;
use tracing::debug;

use crate::error::{PredictorError, PredictorResult, UnmatchedCategory};
use crate::models::{position_column, Categorical, Nucleotide};

/// Positional encoding of a batch of fixed-length nucleotide strings.
///
/// `rows[i][p]` is the base at 1-based position `p + 1` of input `i`, or
/// `None` when the character is not one of `A`, `T`, `C`, `G`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSequences {
    k: usize,
    rows: Vec<Vec<Option<Nucleotide>>>,
    unmatched: Vec<UnmatchedCategory>,
}

impl EncodedSequences {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> &[Option<Nucleotide>] {
        &self.rows[i]
    }

    pub fn column_names(&self) -> Vec<String> {
        (1..=self.k).map(position_column).collect()
    }

    /// Positions that held a character outside the alphabet.
    pub fn unmatched(&self) -> &[UnmatchedCategory] {
        &self.unmatched
    }

    /// One String column per position; unmatched bases become nulls.
    pub fn to_columns(&self) -> Vec<Column> {
        self.column_names()
            .into_iter()
            .enumerate()
            .map(|(p, name)| {
                let values: Vec<Option<&str>> = self
                    .rows
                    .iter()
                    .map(|row| row[p].map(|n| n.level()))
                    .collect();
                Column::new(PlSmallStr::from(name), values)
            })
            .collect()
    }
}

/// Encode every sequence into `k` positional categorical values, with `k`
/// taken from the first sequence.
///
/// The whole batch is checked for length before anything is encoded, so a
/// single short or long sequence fails the call with `ShapeMismatch`.
pub fn encode_sequences<S: AsRef<str>>(sequences: &[S]) -> PredictorResult<EncodedSequences> {
    let k = match sequences.first() {
        Some(first) => first.as_ref().chars().count(),
        None => {
            return Ok(EncodedSequences { k: 0, rows: Vec::new(), unmatched: Vec::new() });
        }
    };

    for (row, seq) in sequences.iter().enumerate() {
        let found = seq.as_ref().chars().count();
        if found != k {
            return Err(PredictorError::ShapeMismatch { row: Some(row), expected: k, found });
        }
    }

    let mut unmatched = Vec::new();
    let rows: Vec<Vec<Option<Nucleotide>>> = sequences
        .iter()
        .enumerate()
        .map(|(row, seq)| {
            seq.as_ref()
                .chars()
                .enumerate()
                .map(|(p, c)| {
                    let base = Nucleotide::from_char(c);
                    if base.is_none() {
                        unmatched.push(UnmatchedCategory {
                            row,
                            column: position_column(p + 1),
                            value: c.to_string(),
                        });
                    }
                    base
                })
                .collect()
        })
        .collect();

    debug!("Encoded {} sequences into {} positional columns", sequences.len(), k);

    Ok(EncodedSequences { k, rows, unmatched })
}
