use std::collections::HashMap;

use m6a_predictor::encoding::assembler::AssembledFeatureMatrix;
use m6a_predictor::inference::logistic::{LogisticClassifier, LogisticModelData, NumericTerm};
use m6a_predictor::inference::{ClassProbabilities, Classifier, LabelScore};
use m6a_predictor::models::{PREDICTED_PROB, PREDICTED_STATUS};
use m6a_predictor::schema::{ColumnKind, FeatureSchema};
use m6a_predictor::{
    predict_batch, predict_batch_with, predict_frame, predict_one, PredictOptions, PredictionStatus,
    PredictorError, PredictorResult, RawSiteRecord,
};
use polars::df;

/// Returns the same Positive probability for every row.
struct FixedProbability {
    schema: FeatureSchema,
    p: f64,
}

impl FixedProbability {
    fn new(p: f64) -> Self {
        Self { schema: FeatureSchema::m6a(5), p }
    }
}

impl Classifier for FixedProbability {
    fn name(&self) -> &str {
        "fixed"
    }

    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(&self, matrix: &AssembledFeatureMatrix) -> PredictorResult<Vec<ClassProbabilities>> {
        Ok((0..matrix.height())
            .map(|_| {
                vec![
                    LabelScore { label: "Negative".into(), probability: 1.0 - self.p },
                    LabelScore { label: "Positive".into(), probability: self.p },
                ]
            })
            .collect())
    }
}

fn example_record() -> RawSiteRecord {
    RawSiteRecord {
        gc_content: Some(0.45),
        rna_type: Some("mRNA".into()),
        rna_region: Some("CDS".into()),
        exon_length: Some(120.0),
        distance_to_junction: Some(30.0),
        evolutionary_conservation: Some(0.8),
        dna_5mer: Some("ATGCC".into()),
    }
}

fn logistic() -> LogisticClassifier {
    let schema = FeatureSchema::m6a(5);
    let numeric = HashMap::from([
        ("gc_content".to_string(), NumericTerm { beta: 1.2, mean: 0.5, std: 0.1 }),
        ("exon_length".to_string(), NumericTerm { beta: -0.3, mean: 150.0, std: 60.0 }),
        ("distance_to_junction".to_string(), NumericTerm { beta: 0.4, mean: 50.0, std: 25.0 }),
        ("evolutionary_conservation".to_string(), NumericTerm { beta: 0.9, mean: 0.5, std: 0.2 }),
    ]);
    let categorical: HashMap<String, Vec<f64>> = schema
        .columns
        .iter()
        .filter_map(|c| match &c.kind {
            ColumnKind::Categorical { levels } => Some((
                c.name.clone(),
                (0..levels.len()).map(|i| 0.1 * i as f64 - 0.15).collect(),
            )),
            ColumnKind::Numeric => None,
        })
        .collect();

    LogisticClassifier::new(
        "logistic",
        LogisticModelData { schema, intercept: 0.2, numeric, categorical },
    )
    .unwrap()
}

#[test]
fn end_to_end_positive() {
    let out = predict_one(&FixedProbability::new(0.82), 0.45, "mRNA", "CDS", 120.0, 30.0, 0.8, "ATGCC", 0.5)
        .unwrap();
    assert_eq!(out.predicted_m6a_prob, 0.82);
    assert_eq!(out.predicted_m6a_status, PredictionStatus::Positive);
    assert!(out.warnings.is_empty());
}

#[test]
fn probability_at_threshold_is_negative() {
    let out = predict_one(&FixedProbability::new(0.5), 0.45, "mRNA", "CDS", 120.0, 30.0, 0.8, "ATGCC", 0.5)
        .unwrap();
    assert_eq!(out.predicted_m6a_status, PredictionStatus::Negative);

    let out = predict_batch(&FixedProbability::new(0.5 + 1e-9), &[example_record()], 0.5).unwrap();
    assert_eq!(out.results[0].predicted_m6a_status, PredictionStatus::Positive);
}

#[test]
fn single_and_batch_paths_agree() {
    let clf = logistic();
    let one = predict_one(&clf, 0.45, "mRNA", "CDS", 120.0, 30.0, 0.8, "ATGCC", 0.5).unwrap();
    let batch = predict_batch(&clf, &[example_record()], 0.5).unwrap();

    assert_eq!(one.predicted_m6a_prob, batch.results[0].predicted_m6a_prob);
    assert_eq!(one.predicted_m6a_status, batch.results[0].predicted_m6a_status);
}

#[test]
fn missing_gc_content_aborts_the_batch() {
    let mut broken = example_record();
    broken.gc_content = None;

    let err = predict_batch(&FixedProbability::new(0.9), &[example_record(), broken], 0.5).unwrap_err();
    assert!(matches!(err, PredictorError::Schema { .. }));
    assert!(err.to_string().contains("gc_content"));
}

#[test]
fn mixed_kmer_lengths_abort_the_batch() {
    let mut longer = example_record();
    longer.dna_5mer = Some("ATGCCA".into());

    let err = predict_batch(&FixedProbability::new(0.9), &[example_record(), longer], 0.5).unwrap_err();
    assert!(matches!(err, PredictorError::ShapeMismatch { row: Some(1), expected: 5, found: 6 }));
}

#[test]
fn ambiguity_code_still_predicts_with_warning() {
    let mut ambiguous = example_record();
    ambiguous.dna_5mer = Some("ATGCN".into());

    let out = predict_batch(&logistic(), &[ambiguous], 0.5).unwrap();
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].column, "nt_pos5");
    assert_eq!(out.warnings[0].value, "N");
}

#[test]
fn strict_categories_turn_warnings_into_errors() {
    let mut odd = example_record();
    odd.rna_type = Some("snoRNA".into());
    let options = PredictOptions { threshold: 0.5, strict_categories: true };

    let err = predict_batch_with(&FixedProbability::new(0.9), &[odd.clone()], &options).unwrap_err();
    assert!(matches!(err, PredictorError::UnmatchedCategory { .. }));

    let lenient = predict_batch(&FixedProbability::new(0.9), &[odd], 0.5).unwrap();
    assert_eq!(lenient.warnings[0].column, "RNA_type");
}

#[test]
fn empty_batch_and_bad_threshold_are_rejected() {
    let clf = FixedProbability::new(0.9);
    assert!(matches!(predict_batch(&clf, &[], 0.5), Err(PredictorError::EmptyBatch)));
    assert!(matches!(
        predict_batch(&clf, &[example_record()], 1.5),
        Err(PredictorError::InvalidThreshold(_))
    ));
}

#[test]
fn batch_preserves_order() {
    let clf = logistic();
    let mut low = example_record();
    low.gc_content = Some(0.1);
    low.evolutionary_conservation = Some(0.0);
    let mut high = example_record();
    high.gc_content = Some(0.9);
    high.evolutionary_conservation = Some(1.0);

    let out = predict_batch(&clf, &[low, high], 0.5).unwrap();
    assert_eq!(out.results[0].record.gc_content, 0.1);
    assert_eq!(out.results[1].record.gc_content, 0.9);
    assert!(out.results[0].predicted_m6a_prob < out.results[1].predicted_m6a_prob);
}

#[test]
fn classifier_trained_on_other_k_is_rejected() {
    let clf = FixedProbability { schema: FeatureSchema::m6a(7), p: 0.9 };
    let err = predict_batch(&clf, &[example_record()], 0.5).unwrap_err();
    assert!(matches!(err, PredictorError::ShapeMismatch { row: None, expected: 7, found: 5 }));
}

#[test]
fn frame_gets_prediction_columns() {
    let df = df![
        "site_id" => &["chr1:100", "chr1:250"],
        "gc_content" => &[0.45, 0.52],
        "RNA_type" => &["mRNA", "pseudogene"],
        "RNA_region" => &["CDS", "5'UTR"],
        "exon_length" => &[120.0, 300.0],
        "distance_to_junction" => &[30.0, 5.0],
        "evolutionary_conservation" => &[0.8, 0.3],
        "DNA_5mer" => &["ATGCC", "GGACT"]
    ]
    .unwrap();

    let out = predict_frame(&FixedProbability::new(0.82), &df, &PredictOptions::default()).unwrap();
    assert_eq!(out.frame.shape(), (2, 10));
    assert_eq!(out.frame.column("site_id").unwrap().str().unwrap().get(1), Some("chr1:250"));
    assert_eq!(out.frame.column(PREDICTED_PROB).unwrap().f64().unwrap().get(0), Some(0.82));
    assert_eq!(
        out.frame.column(PREDICTED_STATUS).unwrap().str().unwrap().get(1),
        Some("Positive")
    );
}

#[test]
fn padded_kmer_in_frame_is_a_shape_mismatch() {
    let df = df![
        "gc_content" => &[0.45, 0.52],
        "RNA_type" => &["mRNA", " mRNA "],
        "RNA_region" => &["CDS", "CDS"],
        "exon_length" => &[120.0, 120.0],
        "distance_to_junction" => &[30.0, 30.0],
        "evolutionary_conservation" => &[0.8, 0.8],
        "DNA_5mer" => &["ATGCC", " ATGCC"]
    ]
    .unwrap();
    let clf = FixedProbability::new(0.82);

    let err = predict_frame(&clf, &df, &PredictOptions::default()).unwrap_err();
    assert!(matches!(err, PredictorError::ShapeMismatch { row: Some(1), expected: 5, found: 6 }));

    let mut padded = example_record();
    padded.rna_type = Some(" mRNA ".into());
    padded.dna_5mer = Some(" ATGCC".into());
    let err = predict_batch(&clf, &[example_record(), padded], 0.5).unwrap_err();
    assert!(matches!(err, PredictorError::ShapeMismatch { row: Some(1), expected: 5, found: 6 }));
}

#[test]
fn padded_category_in_frame_is_unmatched() {
    let df = df![
        "gc_content" => &[0.45],
        "RNA_type" => &[" mRNA "],
        "RNA_region" => &["CDS"],
        "exon_length" => &[120.0],
        "distance_to_junction" => &[30.0],
        "evolutionary_conservation" => &[0.8],
        "DNA_5mer" => &["ATGCC"]
    ]
    .unwrap();

    let out = predict_frame(&FixedProbability::new(0.82), &df, &PredictOptions::default()).unwrap();
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].column, "RNA_type");
    assert_eq!(out.warnings[0].value, " mRNA ");
}

#[test]
fn single_site_respects_threshold_validation() {
    let err = predict_one(&FixedProbability::new(0.82), 0.45, "mRNA", "CDS", 120.0, 30.0, 0.8, "ATGCC", f64::NAN)
        .unwrap_err();
    assert!(matches!(err, PredictorError::InvalidThreshold(_)));
}
