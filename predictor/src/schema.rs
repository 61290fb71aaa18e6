//! Versioned description of the feature matrix a classifier was trained on.

use serde::{Deserialize, Serialize};

use crate::models::{
    position_column, Categorical, Nucleotide, RnaRegion, RnaType, DISTANCE_TO_JUNCTION,
    EVOLUTIONARY_CONSERVATION, EXON_LENGTH, GC_CONTENT, RNA_REGION, RNA_TYPE,
};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    /// Level order is significant.
    Categorical { levels: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: &str) -> Self {
        Self { name: name.to_string(), kind: ColumnKind::Numeric }
    }

    pub fn categorical<T: Categorical>(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Categorical { levels: T::levels() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    /// Length of the nucleotide window (k).
    pub sequence_length: usize,
    pub columns: Vec<ColumnSpec>,
}

impl FeatureSchema {
    /// The canonical m6A site schema for a k-mer window.
    pub fn m6a(k: usize) -> Self {
        let mut columns = vec![
            ColumnSpec::numeric(GC_CONTENT),
            ColumnSpec::categorical::<RnaType>(RNA_TYPE),
            ColumnSpec::categorical::<RnaRegion>(RNA_REGION),
            ColumnSpec::numeric(EXON_LENGTH),
            ColumnSpec::numeric(DISTANCE_TO_JUNCTION),
            ColumnSpec::numeric(EVOLUTIONARY_CONSERVATION),
        ];
        columns.extend((1..=k).map(|p| ColumnSpec::categorical::<Nucleotide>(&position_column(p))));

        Self { version: SCHEMA_VERSION, sequence_length: k, columns }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Every structural difference between `self` (what is supplied) and
    /// `expected`. Column order is ignored; kinds and level order are not.
    pub fn differences(&self, expected: &FeatureSchema) -> Vec<String> {
        let mut problems = Vec::new();

        if self.version != expected.version {
            problems.push(format!(
                "schema version {} does not match expected version {}",
                self.version, expected.version
            ));
        }

        for want in &expected.columns {
            match self.column(&want.name) {
                None => problems.push(format!("missing column `{}`", want.name)),
                Some(have) if have.kind != want.kind => problems.push(format!(
                    "column `{}` is {} but the classifier expects {}",
                    want.name,
                    describe(&have.kind),
                    describe(&want.kind)
                )),
                Some(_) => {}
            }
        }

        for have in &self.columns {
            if expected.column(&have.name).is_none() {
                problems.push(format!("unexpected column `{}`", have.name));
            }
        }

        problems
    }
}

fn describe(kind: &ColumnKind) -> String {
    match kind {
        ColumnKind::Numeric => "numeric".to_string(),
        ColumnKind::Categorical { levels } => format!("categorical [{}]", levels.join(", ")),
    }
}
