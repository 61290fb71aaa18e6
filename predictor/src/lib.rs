//! m6A site prediction: feature encoding and inference over a frozen classifier.
//!
//! Raw site records go through the feature assembler (which runs the
//! positional sequence encoder), the assembled matrix is scored by a
//! [`inference::Classifier`], and the decision mapper turns the `Positive`
//! class probability into a label.

pub mod config;
pub mod data_handling;
pub mod decision;
pub mod encoding;
pub mod error;
pub mod helper_functions;
pub mod inference;
pub mod models;
pub mod pipeline;
pub mod schema;

pub use error::{PredictorError, PredictorResult};
pub use models::{parse_rna_region, parse_rna_type, PredictionStatus, RawSiteRecord};
pub use pipeline::{predict_batch, predict_batch_with, predict_frame, predict_one, PredictOptions};
