//! Batch and single-site entry points: assemble, score, decide.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::data_handling::site_table::records_from_frame;
use crate::decision::{attach_predictions, check_threshold, map_decisions, DEFAULT_THRESHOLD};
use crate::encoding::assembler::{assemble, assemble_one, Assembled};
use crate::error::{PredictorError, PredictorResult, UnmatchedCategory};
use crate::inference::{positive_probabilities, Classifier};
use crate::models::{PredictionResult, PredictionStatus, RawSiteRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictOptions {
    pub threshold: f64,
    pub strict_categories: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD, strict_categories: false }
    }
}

impl PredictOptions {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold, ..Self::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    /// One result per input record, in input order.
    pub results: Vec<PredictionResult>,
    /// Out-of-domain values that were scored as unmatched.
    pub warnings: Vec<UnmatchedCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinglePrediction {
    pub predicted_m6a_prob: f64,
    pub predicted_m6a_status: PredictionStatus,
    pub warnings: Vec<UnmatchedCategory>,
}

#[derive(Debug, Clone)]
pub struct FramePrediction {
    pub frame: DataFrame,
    pub warnings: Vec<UnmatchedCategory>,
}

pub fn predict_batch<C: Classifier + ?Sized>(
    classifier: &C,
    records: &[RawSiteRecord],
    threshold: f64,
) -> PredictorResult<BatchPrediction> {
    predict_batch_with(classifier, records, &PredictOptions::with_threshold(threshold))
}

/// Score a batch. Any fatal problem aborts the whole batch; no partial
/// results are returned.
pub fn predict_batch_with<C: Classifier + ?Sized>(
    classifier: &C,
    records: &[RawSiteRecord],
    options: &PredictOptions,
) -> PredictorResult<BatchPrediction> {
    let threshold = check_threshold(options.threshold)?;
    if records.is_empty() {
        return Err(PredictorError::EmptyBatch);
    }

    score(classifier, assemble(records)?, threshold, options.strict_categories)
}

#[allow(clippy::too_many_arguments)]
pub fn predict_one<C: Classifier + ?Sized>(
    classifier: &C,
    gc_content: f64,
    rna_type: &str,
    rna_region: &str,
    exon_length: f64,
    distance_to_junction: f64,
    evolutionary_conservation: f64,
    dna_5mer: &str,
    threshold: f64,
) -> PredictorResult<SinglePrediction> {
    let threshold = check_threshold(threshold)?;
    let assembled = assemble_one(
        gc_content,
        rna_type,
        rna_region,
        exon_length,
        distance_to_junction,
        evolutionary_conservation,
        dna_5mer,
    )?;
    let batch = score(classifier, assembled, threshold, false)?;

    let result = batch
        .results
        .into_iter()
        .next()
        .ok_or(PredictorError::EmptyBatch)?;
    Ok(SinglePrediction {
        predicted_m6a_prob: result.predicted_m6a_prob,
        predicted_m6a_status: result.predicted_m6a_status,
        warnings: batch.warnings,
    })
}

fn score<C: Classifier + ?Sized>(
    classifier: &C,
    assembled: Assembled,
    threshold: f64,
    strict_categories: bool,
) -> PredictorResult<BatchPrediction> {
    if !assembled.unmatched.is_empty() {
        if strict_categories {
            return Err(PredictorError::UnmatchedCategory { unmatched: assembled.unmatched });
        }
        report_unmatched(&assembled.unmatched);
    }

    let probabilities = positive_probabilities(classifier, &assembled.matrix)?;
    let results = map_decisions(assembled.matrix.records(), &probabilities, threshold);

    let positives = results
        .iter()
        .filter(|r| r.predicted_m6a_status == PredictionStatus::Positive)
        .count();
    info!(
        "Predicted {} of {} sites as m6A positive (threshold {})",
        positives,
        results.len(),
        threshold
    );

    Ok(BatchPrediction { results, warnings: assembled.unmatched })
}

/// Score every row of a site table and append the prediction columns to it.
pub fn predict_frame<C: Classifier + ?Sized>(
    classifier: &C,
    df: &DataFrame,
    options: &PredictOptions,
) -> PredictorResult<FramePrediction> {
    let records = records_from_frame(df)?;
    let batch = predict_batch_with(classifier, &records, options)?;

    let probabilities: Vec<f64> = batch.results.iter().map(|r| r.predicted_m6a_prob).collect();
    let frame = attach_predictions(df.clone(), &probabilities, options.threshold)?;
    Ok(FramePrediction { frame, warnings: batch.warnings })
}

fn report_unmatched(unmatched: &[UnmatchedCategory]) {
    let mut per_column: BTreeMap<&str, usize> = BTreeMap::new();
    for u in unmatched {
        *per_column.entry(u.column.as_str()).or_default() += 1;
    }
    for (column, count) in per_column {
        warn!("{} value(s) in {} matched no known level and were scored as missing", count, column);
    }
}
