use std::fmt;

use serde::{Deserialize, Serialize};

// Column names of the site table, as the classifier was trained on them
pub const GC_CONTENT: &str = "gc_content";
pub const RNA_TYPE: &str = "RNA_type";
pub const RNA_REGION: &str = "RNA_region";
pub const EXON_LENGTH: &str = "exon_length";
pub const DISTANCE_TO_JUNCTION: &str = "distance_to_junction";
pub const EVOLUTIONARY_CONSERVATION: &str = "evolutionary_conservation";
pub const DNA_5MER: &str = "DNA_5mer";

pub const PREDICTED_PROB: &str = "predicted_m6A_prob";
pub const PREDICTED_STATUS: &str = "predicted_m6A_status";

/// Every field a site record must carry, in table order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    GC_CONTENT,
    RNA_TYPE,
    RNA_REGION,
    EXON_LENGTH,
    DISTANCE_TO_JUNCTION,
    EVOLUTIONARY_CONSERVATION,
    DNA_5MER,
];

pub const POSITION_PREFIX: &str = "nt_pos";

/// Name of the encoded column for a 1-based sequence position.
pub fn position_column(pos: usize) -> String {
    format!("{}{}", POSITION_PREFIX, pos)
}

/// 1-based position encoded in a column name, `None` for any other column.
pub fn column_position(name: &str) -> Option<usize> {
    name.strip_prefix(POSITION_PREFIX)?
        .parse()
        .ok()
        .filter(|&p| p > 0)
}

/// A closed categorical domain with a fixed level order.
///
/// The level order is part of the trained model's contract, so it must never
/// be derived from the data being scored.
pub trait Categorical: Sized + Copy + Eq + fmt::Debug + 'static {
    const LEVELS: &'static [&'static str];
    /// Variants in the same order as `LEVELS`.
    const VARIANTS: &'static [Self];

    fn from_level(s: &str) -> Option<Self> {
        Self::LEVELS
            .iter()
            .position(|l| *l == s)
            .map(|i| Self::VARIANTS[i])
    }

    fn index(&self) -> usize {
        Self::VARIANTS
            .iter()
            .position(|v| v == self)
            .unwrap_or_default()
    }

    fn level(&self) -> &'static str {
        Self::LEVELS[self.index()]
    }

    fn levels() -> Vec<String> {
        Self::LEVELS.iter().map(|l| l.to_string()).collect()
    }
}

/// A parsed categorical value, or the raw text when it is outside the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category<T> {
    Known(T),
    Unmatched(String),
}

impl<T: Categorical> Category<T> {
    pub fn parse(s: &str) -> Self {
        match T::from_level(s) {
            Some(v) => Category::Known(v),
            None => Category::Unmatched(s.to_string()),
        }
    }

    pub fn known(&self) -> Option<T> {
        match self {
            Category::Known(v) => Some(*v),
            Category::Unmatched(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Known(v) => v.level(),
            Category::Unmatched(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RnaType {
    MRna,
    LincRna,
    LncRna,
    Pseudogene,
}

impl Categorical for RnaType {
    const LEVELS: &'static [&'static str] = &["mRNA", "lincRNA", "lncRNA", "pseudogene"];
    const VARIANTS: &'static [Self] = &[
        RnaType::MRna,
        RnaType::LincRna,
        RnaType::LncRna,
        RnaType::Pseudogene,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RnaRegion {
    Cds,
    Intron,
    Utr3,
    Utr5,
}

impl Categorical for RnaRegion {
    const LEVELS: &'static [&'static str] = &["CDS", "intron", "3'UTR", "5'UTR"];
    const VARIANTS: &'static [Self] = &[
        RnaRegion::Cds,
        RnaRegion::Intron,
        RnaRegion::Utr3,
        RnaRegion::Utr5,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    T,
    C,
    G,
}

impl Categorical for Nucleotide {
    const LEVELS: &'static [&'static str] = &["A", "T", "C", "G"];
    const VARIANTS: &'static [Self] = &[Nucleotide::A, Nucleotide::T, Nucleotide::C, Nucleotide::G];
}

impl Nucleotide {
    /// Uppercase only; ambiguity codes and soft-masked bases do not match.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Nucleotide::A),
            'T' => Some(Nucleotide::T),
            'C' => Some(Nucleotide::C),
            'G' => Some(Nucleotide::G),
            _ => None,
        }
    }
}

pub fn parse_rna_type(s: &str) -> Category<RnaType> {
    Category::parse(s)
}

pub fn parse_rna_region(s: &str) -> Category<RnaRegion> {
    Category::parse(s)
}

/// One candidate site as it arrives from a table or caller; nothing is
/// guaranteed present until it has been validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSiteRecord {
    pub gc_content: Option<f64>,
    #[serde(rename = "RNA_type")]
    pub rna_type: Option<String>,
    #[serde(rename = "RNA_region")]
    pub rna_region: Option<String>,
    pub exon_length: Option<f64>,
    pub distance_to_junction: Option<f64>,
    pub evolutionary_conservation: Option<f64>,
    #[serde(rename = "DNA_5mer")]
    pub dna_5mer: Option<String>,
}

impl RawSiteRecord {
    /// Names of the required fields this record lacks, in table order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.gc_content.is_some(),
            self.rna_type.is_some(),
            self.rna_region.is_some(),
            self.exon_length.is_some(),
            self.distance_to_junction.is_some(),
            self.evolutionary_conservation.is_some(),
            self.dna_5mer.is_some(),
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, p)| !p)
            .map(|(f, _)| *f)
            .collect()
    }
}

/// A validated site record with its categorical fields parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub gc_content: f64,
    pub rna_type: Category<RnaType>,
    pub rna_region: Category<RnaRegion>,
    pub exon_length: f64,
    pub distance_to_junction: f64,
    pub evolutionary_conservation: f64,
    pub dna_5mer: String,
}

impl FeatureRecord {
    pub fn numeric(&self, name: &str) -> Option<f64> {
        match name {
            GC_CONTENT => Some(self.gc_content),
            EXON_LENGTH => Some(self.exon_length),
            DISTANCE_TO_JUNCTION => Some(self.distance_to_junction),
            EVOLUTIONARY_CONSERVATION => Some(self.evolutionary_conservation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionStatus {
    Negative,
    Positive,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Negative => "Negative",
            PredictionStatus::Positive => "Positive",
        }
    }
}

impl fmt::Display for PredictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input record plus its calibrated decision.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub record: FeatureRecord,
    pub predicted_m6a_prob: f64,
    pub predicted_m6a_status: PredictionStatus,
}
