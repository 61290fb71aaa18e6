use ndarray::Array2;
use polars::prelude::*;
use tracing::{debug, info};

use crate::encoding::sequence::{encode_sequences, EncodedSequences};
use crate::error::{MissingField, PredictorError, PredictorResult, UnmatchedCategory};
use crate::models::{
    column_position, Categorical, Category, FeatureRecord, RawSiteRecord, DISTANCE_TO_JUNCTION,
    EVOLUTIONARY_CONSERVATION, EXON_LENGTH, GC_CONTENT, RNA_REGION, RNA_TYPE,
};
use crate::schema::{ColumnKind, FeatureSchema};

/// Validated records plus their positional sequence encoding, in the shape
/// the classifier was trained on.
#[derive(Debug, Clone)]
pub struct AssembledFeatureMatrix {
    records: Vec<FeatureRecord>,
    sequences: EncodedSequences,
    schema: FeatureSchema,
}

impl AssembledFeatureMatrix {
    pub fn height(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn sequences(&self) -> &EncodedSequences {
        &self.sequences
    }

    /// Schema describing the columns this matrix actually carries.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Categorical value of a row as a level index, `None` when unmatched.
    pub fn level_index(&self, row: usize, column: &str) -> Option<usize> {
        let record = &self.records[row];
        match column {
            RNA_TYPE => record.rna_type.known().map(|v| v.index()),
            RNA_REGION => record.rna_region.known().map(|v| v.index()),
            _ => {
                let pos = column_position(column)?;
                self.sequences.row(row).get(pos - 1).copied().flatten().map(|n| n.index())
            }
        }
    }

    /// Dense design matrix: numeric columns as-is, categorical columns
    /// one-hot expanded in level order. Unmatched values are all zeros.
    pub fn design_matrix(&self, schema: &FeatureSchema) -> Array2<f64> {
        let width: usize = schema
            .columns
            .iter()
            .map(|c| match &c.kind {
                ColumnKind::Numeric => 1,
                ColumnKind::Categorical { levels } => levels.len(),
            })
            .sum();

        let mut x = Array2::<f64>::zeros((self.height(), width));
        for i in 0..self.height() {
            let mut j = 0;
            for spec in &schema.columns {
                match &spec.kind {
                    ColumnKind::Numeric => {
                        x[[i, j]] = self.records[i].numeric(&spec.name).unwrap_or(f64::NAN);
                        j += 1;
                    }
                    ColumnKind::Categorical { levels } => {
                        if let Some(level) = self.level_index(i, &spec.name) {
                            x[[i, j + level]] = 1.0;
                        }
                        j += levels.len();
                    }
                }
            }
        }
        x
    }

    /// The assembled matrix as a polars frame, unmatched categories as nulls.
    pub fn to_frame(&self) -> PredictorResult<DataFrame> {
        let mut columns = vec![
            Column::new(GC_CONTENT.into(), self.records.iter().map(|r| r.gc_content).collect::<Vec<_>>()),
            Column::new(
                RNA_TYPE.into(),
                self.records
                    .iter()
                    .map(|r| r.rna_type.known().map(|v| v.level()))
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                RNA_REGION.into(),
                self.records
                    .iter()
                    .map(|r| r.rna_region.known().map(|v| v.level()))
                    .collect::<Vec<_>>(),
            ),
            Column::new(EXON_LENGTH.into(), self.records.iter().map(|r| r.exon_length).collect::<Vec<_>>()),
            Column::new(
                DISTANCE_TO_JUNCTION.into(),
                self.records.iter().map(|r| r.distance_to_junction).collect::<Vec<_>>(),
            ),
            Column::new(
                EVOLUTIONARY_CONSERVATION.into(),
                self.records.iter().map(|r| r.evolutionary_conservation).collect::<Vec<_>>(),
            ),
        ];
        columns.extend(self.sequences.to_columns());

        Ok(DataFrame::new(columns)?)
    }
}

/// Result of assembly: the matrix and every out-of-domain value met on the way.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub matrix: AssembledFeatureMatrix,
    pub unmatched: Vec<UnmatchedCategory>,
}

/// Check every record for the seven required fields, collecting all
/// violations before failing.
pub fn validate_records(raw: &[RawSiteRecord]) -> PredictorResult<Vec<FeatureRecord>> {
    let missing: Vec<MissingField> = raw
        .iter()
        .enumerate()
        .flat_map(|(row, r)| {
            r.missing_fields()
                .into_iter()
                .map(move |field| MissingField::absent(Some(row), field))
        })
        .collect();

    if !missing.is_empty() {
        return Err(PredictorError::Schema { missing });
    }

    Ok(raw
        .iter()
        .filter_map(|r| {
            Some(FeatureRecord {
                gc_content: r.gc_content?,
                rna_type: Category::parse(r.rna_type.as_deref()?),
                rna_region: Category::parse(r.rna_region.as_deref()?),
                exon_length: r.exon_length?,
                distance_to_junction: r.distance_to_junction?,
                evolutionary_conservation: r.evolutionary_conservation?,
                dna_5mer: r.dna_5mer.clone()?,
            })
        })
        .collect())
}

/// Validate, coerce and encode a batch of raw records.
pub fn assemble(raw: &[RawSiteRecord]) -> PredictorResult<Assembled> {
    let records = validate_records(raw)?;

    let kmers: Vec<&str> = records.iter().map(|r| r.dna_5mer.as_str()).collect();
    let sequences = encode_sequences(&kmers)?;

    let mut unmatched = Vec::new();
    for (row, record) in records.iter().enumerate() {
        if let Category::Unmatched(value) = &record.rna_type {
            unmatched.push(UnmatchedCategory { row, column: RNA_TYPE.to_string(), value: value.clone() });
        }
        if let Category::Unmatched(value) = &record.rna_region {
            unmatched.push(UnmatchedCategory { row, column: RNA_REGION.to_string(), value: value.clone() });
        }
    }
    unmatched.extend(sequences.unmatched().iter().cloned());

    let schema = FeatureSchema::m6a(sequences.k());
    debug!(
        "Assembled {} rows x {} feature columns ({} unmatched values)",
        records.len(),
        schema.columns.len(),
        unmatched.len()
    );

    Ok(Assembled {
        matrix: AssembledFeatureMatrix { records, sequences, schema },
        unmatched,
    })
}

/// Single-site path: builds a one-row batch and runs the same assembly.
#[allow(clippy::too_many_arguments)]
pub fn assemble_one(
    gc_content: f64,
    rna_type: &str,
    rna_region: &str,
    exon_length: f64,
    distance_to_junction: f64,
    evolutionary_conservation: f64,
    dna_5mer: &str,
) -> PredictorResult<Assembled> {
    info!("Assembling single site {}", dna_5mer);
    assemble(&[single_record(
        gc_content,
        rna_type,
        rna_region,
        exon_length,
        distance_to_junction,
        evolutionary_conservation,
        dna_5mer,
    )])
}

#[allow(clippy::too_many_arguments)]
fn single_record(
    gc_content: f64,
    rna_type: &str,
    rna_region: &str,
    exon_length: f64,
    distance_to_junction: f64,
    evolutionary_conservation: f64,
    dna_5mer: &str,
) -> RawSiteRecord {
    RawSiteRecord {
        gc_content: Some(gc_content),
        rna_type: Some(rna_type.to_string()),
        rna_region: Some(rna_region.to_string()),
        exon_length: Some(exon_length),
        distance_to_junction: Some(distance_to_junction),
        evolutionary_conservation: Some(evolutionary_conservation),
        dna_5mer: Some(dna_5mer.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RnaRegion, RnaType};

    fn site(kmer: &str) -> RawSiteRecord {
        single_record(0.45, "mRNA", "CDS", 120.0, 30.0, 0.8, kmer)
    }

    #[test]
    fn assembles_records_and_positions() {
        let out = assemble(&[site("ATGCC"), site("GGACT")]).unwrap();
        let m = &out.matrix;
        assert_eq!(m.height(), 2);
        assert_eq!(m.schema(), &FeatureSchema::m6a(5));
        assert_eq!(m.records()[0].rna_type, Category::Known(RnaType::MRna));
        assert_eq!(m.records()[0].rna_region, Category::Known(RnaRegion::Cds));
        assert_eq!(m.level_index(1, "nt_pos1"), Some(3)); // G
        assert_eq!(m.level_index(1, "nt_pos5"), Some(1)); // T
        assert_eq!(m.level_index(1, "nt_pos0"), None);
        assert_eq!(m.level_index(1, "nt_pos6"), None);
        assert_eq!(m.level_index(1, "gc_content"), None);
        assert!(out.unmatched.is_empty());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let mut a = site("ATGCC");
        a.gc_content = None;
        let mut b = site("ATGCC");
        b.dna_5mer = None;
        b.rna_region = None;

        let err = assemble(&[a, b]).unwrap_err();
        match err {
            PredictorError::Schema { missing } => {
                assert_eq!(
                    missing,
                    vec![
                        MissingField::absent(Some(0), "gc_content"),
                        MissingField::absent(Some(1), "RNA_region"),
                        MissingField::absent(Some(1), "DNA_5mer"),
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_field_wins_over_bad_shape() {
        let mut a = site("ATGCC");
        a.gc_content = None;
        let err = assemble(&[a, site("ATGCCA")]).unwrap_err();
        assert!(matches!(err, PredictorError::Schema { .. }));
    }

    #[test]
    fn out_of_domain_categories_are_collected() {
        let mut raw = site("ATGCN");
        raw.rna_type = Some("snoRNA".into());
        let out = assemble(&[raw]).unwrap();

        let columns: Vec<&str> = out.unmatched.iter().map(|u| u.column.as_str()).collect();
        assert_eq!(columns, vec!["RNA_type", "nt_pos5"]);
        assert_eq!(out.matrix.level_index(0, "RNA_type"), None);
    }

    #[test]
    fn design_matrix_is_one_hot() {
        let mut raw = site("ATGCN");
        raw.rna_region = Some("3'UTR".into());
        let out = assemble(&[raw]).unwrap();
        let schema = FeatureSchema::m6a(5);
        let x = out.matrix.design_matrix(&schema);

        // 4 numeric + 4 + 4 categorical levels + 5 positions x 4 bases
        assert_eq!(x.shape(), &[1, 32]);
        assert_eq!(x[[0, 0]], 0.45);
        assert_eq!(x[[0, 1]], 1.0); // RNA_type = mRNA
        assert_eq!(x[[0, 5 + 2]], 1.0); // RNA_region = 3'UTR
        assert_eq!(x[[0, 9]], 120.0);
        // nt_pos5 = N -> no level set
        let last: f64 = (28..32).map(|j| x[[0, j]]).sum();
        assert_eq!(last, 0.0);
    }

    #[test]
    fn frame_view() {
        let out = assemble(&[site("ATGCC")]).unwrap();
        let df = out.matrix.to_frame().unwrap();
        assert_eq!(df.shape(), (1, 11));
        assert_eq!(df.column("RNA_region").unwrap().str().unwrap().get(0), Some("CDS"));
    }

    #[test]
    fn single_path_matches_batch_path() {
        let one = assemble_one(0.45, "mRNA", "CDS", 120.0, 30.0, 0.8, "ATGCC").unwrap();
        let batch = assemble(&[site("ATGCC")]).unwrap();
        assert_eq!(one.matrix.records(), batch.matrix.records());
        assert_eq!(one.matrix.sequences(), batch.matrix.sequences());
    }
}
