//! Frozen logistic model over the assembled m6A features.

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encoding::assembler::AssembledFeatureMatrix;
use crate::error::{PredictorError, PredictorResult};
use crate::inference::{ClassProbabilities, Classifier, LabelScore, NEGATIVE_LABEL, POSITIVE_LABEL};
use crate::schema::{ColumnKind, FeatureSchema};

/// Coefficient and training statistics of one numeric feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTerm {
    pub beta: f64,
    pub mean: f64,
    pub std: f64,
}

/// Complete logistic model data as stored on disk, schema included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModelData {
    pub schema: FeatureSchema,
    pub intercept: f64,
    pub numeric: HashMap<String, NumericTerm>,
    /// One beta per level, in the schema's level order.
    pub categorical: HashMap<String, Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    name: String,
    data: LogisticModelData,
    weights: Array1<f64>,
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl LogisticClassifier {
    pub fn new(name: &str, data: LogisticModelData) -> PredictorResult<Self> {
        let mut weights = Vec::new();
        let mut center = Vec::new();
        let mut scale = Vec::new();
        let mut problems = Vec::new();

        for spec in &data.schema.columns {
            match &spec.kind {
                ColumnKind::Numeric => match data.numeric.get(&spec.name) {
                    Some(term) => {
                        weights.push(term.beta);
                        center.push(term.mean);
                        scale.push(term.std.max(1e-9));
                    }
                    None => problems.push(format!("no coefficient for numeric column `{}`", spec.name)),
                },
                ColumnKind::Categorical { levels } => match data.categorical.get(&spec.name) {
                    Some(betas) if betas.len() == levels.len() => {
                        weights.extend(betas.iter().copied());
                        center.extend(std::iter::repeat(0.0).take(levels.len()));
                        scale.extend(std::iter::repeat(1.0).take(levels.len()));
                    }
                    Some(betas) => problems.push(format!(
                        "column `{}` has {} level coefficients for {} levels",
                        spec.name,
                        betas.len(),
                        levels.len()
                    )),
                    None => problems.push(format!("no coefficients for categorical column `{}`", spec.name)),
                },
            }
        }

        if !problems.is_empty() {
            return Err(PredictorError::InferenceSchema { problems });
        }

        Ok(Self {
            name: name.to_string(),
            data,
            weights: Array1::from(weights),
            center: Array1::from(center),
            scale: Array1::from(scale),
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> PredictorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let data: LogisticModelData = serde_json::from_str(&json)?;
        info!(
            "Loaded logistic model from {} (schema v{}, k = {})",
            path.display(),
            data.schema.version,
            data.schema.sequence_length
        );

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "logistic".to_string());
        Self::new(&name, data)
    }
}

impl Classifier for LogisticClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &FeatureSchema {
        &self.data.schema
    }

    fn predict_proba(&self, matrix: &AssembledFeatureMatrix) -> PredictorResult<Vec<ClassProbabilities>> {
        let x = matrix.design_matrix(&self.data.schema);
        let z = (&x - &self.center) / &self.scale;
        let lin = z.dot(&self.weights) + self.data.intercept;

        Ok(lin
            .iter()
            .map(|&l| {
                let p = 1.0 / (1.0 + (-l).exp());
                vec![
                    LabelScore { label: NEGATIVE_LABEL.to_string(), probability: 1.0 - p },
                    LabelScore { label: POSITIVE_LABEL.to_string(), probability: p },
                ]
            })
            .collect())
    }
}
