use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use m6a_predictor::config::PredictorConfig;
use m6a_predictor::data_handling::site_table::SiteTable;
use m6a_predictor::data_handling::Dataset;
use m6a_predictor::helper_functions::dataframe_to_csv;
use m6a_predictor::inference::logistic::LogisticClassifier;
use m6a_predictor::predict_frame;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting m6A site prediction");

    let config = PredictorConfig::load_from_env_and_defaults()?;

    let model_path = config.model_path();
    let classifier = LogisticClassifier::from_json_file(&model_path)
        .with_context(|| format!("loading classifier from {}", model_path.display()))?;

    let sites = SiteTable {
        path: config.input_path().to_string_lossy().into_owned(),
    }
    .load()?;

    let mut prediction = match predict_frame(&classifier, &sites, &config.options()) {
        Ok(p) => p,
        Err(e) => {
            error!("Prediction aborted: {}", e);
            return Err(e.into());
        }
    };

    if !prediction.warnings.is_empty() {
        info!(
            "{} categorical value(s) were outside their domain",
            prediction.warnings.len()
        );
    }

    dataframe_to_csv(&mut prediction.frame, &config.output_path())?;
    info!("Done");
    Ok(())
}
