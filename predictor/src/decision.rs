use polars::prelude::*;

use crate::error::{PredictorError, PredictorResult};
use crate::models::{FeatureRecord, PredictionResult, PredictionStatus, PREDICTED_PROB, PREDICTED_STATUS};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

pub fn check_threshold(threshold: f64) -> PredictorResult<f64> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(PredictorError::InvalidThreshold(threshold))
    }
}

/// `Positive` only when the probability is strictly above the threshold.
pub fn decide(probability: f64, threshold: f64) -> PredictionStatus {
    if probability > threshold {
        PredictionStatus::Positive
    } else {
        PredictionStatus::Negative
    }
}

/// Pair every record with its probability and label, order preserved.
pub fn map_decisions(
    records: &[FeatureRecord],
    probabilities: &[f64],
    threshold: f64,
) -> Vec<PredictionResult> {
    records
        .iter()
        .zip(probabilities)
        .map(|(record, &p)| PredictionResult {
            record: record.clone(),
            predicted_m6a_prob: p,
            predicted_m6a_status: decide(p, threshold),
        })
        .collect()
}

/// Append `predicted_m6A_prob` and `predicted_m6A_status` to a frame whose
/// rows line up with `probabilities`.
pub fn attach_predictions(
    mut df: DataFrame,
    probabilities: &[f64],
    threshold: f64,
) -> PredictorResult<DataFrame> {
    let status: Vec<&str> = probabilities
        .iter()
        .map(|&p| decide(p, threshold).as_str())
        .collect();

    df.with_column(Series::new(PlSmallStr::from(PREDICTED_PROB), probabilities))?;
    df.with_column(Series::new(PlSmallStr::from(PREDICTED_STATUS), status))?;
    Ok(df)
}
