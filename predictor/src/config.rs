//! Runtime configuration for the scoring binary

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decision::{check_threshold, DEFAULT_THRESHOLD};
use crate::error::{PredictorError, PredictorResult};
use crate::helper_functions::resolve_path;
use crate::pipeline::PredictOptions;

pub const CONFIG_ENV: &str = "M6A_CONFIG";
pub const MODEL_ENV: &str = "M6A_MODEL";
pub const INPUT_ENV: &str = "M6A_INPUT";
pub const OUTPUT_ENV: &str = "M6A_OUTPUT";
pub const THRESHOLD_ENV: &str = "M6A_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Serialized classifier, schema included.
    pub model_path: String,
    /// Site table to score.
    pub input_path: String,
    pub output_path: String,
    pub threshold: f64,
    /// Fail instead of warn when a categorical value is outside its domain.
    pub strict_categories: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/m6a_logistic.json".to_string(),
            input_path: "./data/m6a_candidate_sites.csv".to_string(),
            output_path: "./results/m6a_predictions.csv".to_string(),
            threshold: DEFAULT_THRESHOLD,
            strict_categories: false,
        }
    }
}

impl PredictorConfig {
    /// Load from the JSON file named by `M6A_CONFIG` (or defaults), then
    /// apply per-value environment overrides.
    pub fn load_from_env_and_defaults() -> PredictorResult<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_json_file(&resolve_path(&path))?,
            Err(_) => {
                debug!("{} not set, using default config", CONFIG_ENV);
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        check_threshold(config.threshold)?;
        Ok(config)
    }

    /// Read a config file; fields it leaves out keep their defaults.
    pub fn from_json_file(path: &Path) -> PredictorResult<Self> {
        info!("Loading predictor config from: {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| {
            PredictorError::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json)
            .map_err(|e| PredictorError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) -> PredictorResult<()> {
        if let Some(v) = lookup(MODEL_ENV) {
            self.model_path = v;
        }
        if let Some(v) = lookup(INPUT_ENV) {
            self.input_path = v;
        }
        if let Some(v) = lookup(OUTPUT_ENV) {
            self.output_path = v;
        }
        if let Some(v) = lookup(THRESHOLD_ENV) {
            self.threshold = v
                .trim()
                .parse()
                .map_err(|_| PredictorError::Config(format!("{} is not a number: {}", THRESHOLD_ENV, v)))?;
        }
        Ok(())
    }

    pub fn model_path(&self) -> PathBuf {
        resolve_path(&self.model_path)
    }

    pub fn input_path(&self) -> PathBuf {
        resolve_path(&self.input_path)
    }

    pub fn output_path(&self) -> PathBuf {
        resolve_path(&self.output_path)
    }

    pub fn options(&self) -> PredictOptions {
        PredictOptions {
            threshold: self.threshold,
            strict_categories: self.strict_categories,
        }
    }
}
