//! Classifier capability and the adapter that calls it.

use tracing::{debug, error, info};

use crate::encoding::assembler::AssembledFeatureMatrix;
use crate::error::{PredictorError, PredictorResult};
use crate::schema::FeatureSchema;

pub mod logistic;

pub const POSITIVE_LABEL: &str = "Positive";
pub const NEGATIVE_LABEL: &str = "Negative";

/// Probability assigned to one class label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub probability: f64,
}

/// Per-row distribution over class labels.
pub type ClassProbabilities = Vec<LabelScore>;

/// A pre-trained, frozen classifier.
///
/// Implementations receive a matrix that already matches `schema()` and must
/// return one distribution per row, in row order.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> &FeatureSchema;

    fn predict_proba(&self, matrix: &AssembledFeatureMatrix) -> PredictorResult<Vec<ClassProbabilities>>;
}

/// Probability of the `Positive` class for every row of `matrix`.
pub fn positive_probabilities<C: Classifier + ?Sized>(
    classifier: &C,
    matrix: &AssembledFeatureMatrix,
) -> PredictorResult<Vec<f64>> {
    let expected = classifier.schema();
    if matrix.sequences().k() != expected.sequence_length {
        return Err(PredictorError::ShapeMismatch {
            row: None,
            expected: expected.sequence_length,
            found: matrix.sequences().k(),
        });
    }

    let problems = matrix.schema().differences(expected);
    if !problems.is_empty() {
        error!("Feature matrix rejected by {}: {:?}", classifier.name(), problems);
        return Err(PredictorError::InferenceSchema { problems });
    }

    info!("Scoring {} sites with {}", matrix.height(), classifier.name());
    let distributions = classifier.predict_proba(matrix)?;

    let output_error = |reason: String| PredictorError::ClassifierOutput {
        classifier: classifier.name().to_string(),
        reason,
    };

    if distributions.len() != matrix.height() {
        return Err(output_error(format!(
            "expected {} rows, got {}",
            matrix.height(),
            distributions.len()
        )));
    }

    let probs = distributions
        .iter()
        .enumerate()
        .map(|(row, dist)| {
            let p = dist
                .iter()
                .find(|s| s.label == POSITIVE_LABEL)
                .map(|s| s.probability)
                .ok_or_else(|| output_error(format!("row {} has no `{}` class", row, POSITIVE_LABEL)))?;
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(output_error(format!("row {} probability {} is outside [0, 1]", row, p)));
            }
            Ok(p)
        })
        .collect::<PredictorResult<Vec<f64>>>()?;

    debug!("Positive-class probabilities: {:?}", probs);
    Ok(probs)
}
