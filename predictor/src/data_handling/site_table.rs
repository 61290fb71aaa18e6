use polars::prelude::*;
use tracing::{debug, error, info};

use crate::data_handling::Dataset;
use crate::error::{MissingField, PredictorError, PredictorResult};
use crate::helper_functions::read_csv;
use crate::models::{
    RawSiteRecord, DISTANCE_TO_JUNCTION, DNA_5MER, EVOLUTIONARY_CONSERVATION, EXON_LENGTH,
    GC_CONTENT, REQUIRED_FIELDS, RNA_REGION, RNA_TYPE,
};

/// A delimited table with one candidate site per row.
pub struct SiteTable {
    pub path: String,
}

impl Dataset for SiteTable {
    fn load(&self) -> PredictorResult<DataFrame> {
        info!("Reading candidate sites from {}", &self.path);
        let df = match read_csv(&self.path) {
            Ok(df) => df,
            Err(e) => {
                error!("Failed to read site table: {}", e);
                return Err(e.into());
            }
        };
        debug!("Loaded {} rows, columns {:?}", df.height(), df.get_column_names());
        Ok(df)
    }
}

/// Values of a numeric column plus the rows whose cell was present but not
/// a number.
fn numeric_column(df: &DataFrame, name: &str) -> PolarsResult<(Vec<Option<f64>>, Vec<usize>)> {
    let raw = df.column(name)?;
    let values: Vec<Option<f64>> = raw.cast(&DataType::Float64)?.f64()?.into_iter().collect();
    let text = raw.cast(&DataType::String)?;
    let unparseable = text
        .str()?
        .into_iter()
        .zip(&values)
        .enumerate()
        .filter(|(_, (cell, value))| cell.is_some() && value.is_none())
        .map(|(row, _)| row)
        .collect();
    Ok((values, unparseable))
}

// cells are kept verbatim; a padded k-mer must fail the length check
fn string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let col = df.column(name)?.cast(&DataType::String)?;
    Ok(col.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Read raw site records out of a frame.
///
/// Required columns absent from the frame are reported together. Null cells
/// are left as missing values for record validation; numeric cells that hold
/// something other than a number fail here, alongside every other missing
/// value in the table.
pub fn records_from_frame(df: &DataFrame) -> PredictorResult<Vec<RawSiteRecord>> {
    let missing: Vec<MissingField> = REQUIRED_FIELDS
        .iter()
        .filter(|&&field| !df.schema().contains(field))
        .map(|&field| MissingField::absent(None, field))
        .collect();
    if !missing.is_empty() {
        error!("Site table lacks required columns: {:?}", missing);
        return Err(PredictorError::Schema { missing });
    }

    let mut unparseable: Vec<(usize, &'static str)> = Vec::new();
    let mut numeric = |field: &'static str| -> PolarsResult<Vec<Option<f64>>> {
        let (values, bad) = numeric_column(df, field)?;
        unparseable.extend(bad.into_iter().map(|row| (row, field)));
        Ok(values)
    };
    let gc = numeric(GC_CONTENT)?;
    let exon = numeric(EXON_LENGTH)?;
    let dist = numeric(DISTANCE_TO_JUNCTION)?;
    let cons = numeric(EVOLUTIONARY_CONSERVATION)?;
    let rna_type = string_column(df, RNA_TYPE)?;
    let rna_region = string_column(df, RNA_REGION)?;
    let kmer = string_column(df, DNA_5MER)?;

    let records: Vec<RawSiteRecord> = (0..df.height())
        .map(|i| RawSiteRecord {
            gc_content: gc[i],
            rna_type: rna_type[i].clone(),
            rna_region: rna_region[i].clone(),
            exon_length: exon[i],
            distance_to_junction: dist[i],
            evolutionary_conservation: cons[i],
            dna_5mer: kmer[i].clone(),
        })
        .collect();

    if !unparseable.is_empty() {
        let missing: Vec<MissingField> = records
            .iter()
            .enumerate()
            .flat_map(|(row, r)| {
                let unparseable = &unparseable;
                r.missing_fields().into_iter().map(move |field| {
                    if unparseable.contains(&(row, field)) {
                        MissingField::unparseable(row, field)
                    } else {
                        MissingField::absent(Some(row), field)
                    }
                })
            })
            .collect();
        error!("Site table holds unreadable cells: {:?}", unparseable);
        return Err(PredictorError::Schema { missing });
    }

    Ok(records)
}
