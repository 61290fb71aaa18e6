use polars::frame::DataFrame;

use crate::error::PredictorResult;

pub mod site_table;

/// A tabular source of candidate sites.
pub trait Dataset {
    fn load(&self) -> PredictorResult<DataFrame>;
}
