//! Mutation records and the value types they are built from
//!
//! A [`MutationRecord`] is one row of the standardized somatic mutation
//! table. An [`ExtendedMutationRecord`] wraps it with the annotation
//! columns added by the extension pipeline; the input record is never
//! modified.

use std::fmt;

use log::debug;

use crate::categories::Taxonomy;
use crate::core::error::{ParseError, ParseResult};

/// Column names of the standardized and extended mutation tables
pub mod columns {
    pub const PATIENT: &str = "Patient";
    pub const SAMPLE: &str = "Sample";
    pub const CANCER_TYPE: &str = "Cancer Type";
    pub const PROVENANCE: &str = "Provenance";
    pub const COHORT: &str = "Cohort";
    pub const CHROMOSOME: &str = "Chromosome";
    pub const START: &str = "Start Position";
    pub const END: &str = "End Position";
    pub const REFERENCE: &str = "Reference Sequence";
    pub const VARIANT: &str = "Variant Sequence";
    pub const GENOMIC_STRAND: &str = "Genomic Strand";
    pub const SEQUENCING_STRATEGY: &str = "Sequencing Strategy";
    pub const MUTATION_TYPE: &str = "Mutation Type";
    pub const ASSEMBLY: &str = "Assembly Version";
    pub const FIVE_PRIME: &str = "5' Flanking Bases";
    pub const THREE_PRIME: &str = "3' Flanking Bases";
    pub const TRANSCRIPTION_STRAND: &str = "Transcription Strand";

    /// Standardized table columns, in output order
    pub const STANDARD: [&str; 14] = [
        PATIENT,
        SAMPLE,
        CANCER_TYPE,
        PROVENANCE,
        COHORT,
        CHROMOSOME,
        START,
        END,
        REFERENCE,
        VARIANT,
        GENOMIC_STRAND,
        SEQUENCING_STRATEGY,
        MUTATION_TYPE,
        ASSEMBLY,
    ];

    /// Columns added by extension ahead of the category columns
    pub const EXTENSION: [&str; 3] = [FIVE_PRIME, THREE_PRIME, TRANSCRIPTION_STRAND];
}

/// On-disk representation of a missing value
pub const MISSING_VALUE: &str = "NaN";

/// Check whether a raw cell holds a missing value
pub fn is_missing(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("na")
}

const CHROMOSOME_NAMES: [&str; 24] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y",
];

/// One of the 24 human chromosomes (1-22, X, Y)
///
/// Ordering follows karyotype order, not string order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chromosome(u8);

impl Chromosome {
    /// Parse a chromosome name, with or without a `chr` prefix
    ///
    /// # Examples
    /// ```
    /// use mutation_context::core::Chromosome;
    ///
    /// assert_eq!(Chromosome::from_name("chr7"), Chromosome::from_name("7"));
    /// assert!(Chromosome::from_name("X").is_some());
    /// assert!(Chromosome::from_name("MT").is_none());
    /// assert!(Chromosome::from_name("chr1_gl000191_random").is_none());
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let short = name
            .strip_prefix("chr")
            .or_else(|| name.strip_prefix("Chr"))
            .or_else(|| name.strip_prefix("CHR"))
            .unwrap_or(name);
        CHROMOSOME_NAMES
            .iter()
            .position(|&c| c == short)
            .map(|i| Chromosome(i as u8))
    }

    /// Short name (no `chr` prefix)
    pub fn name(&self) -> &'static str {
        CHROMOSOME_NAMES[self.0 as usize]
    }

    /// All chromosomes in karyotype order
    pub fn all() -> impl Iterator<Item = Chromosome> {
        (0..CHROMOSOME_NAMES.len() as u8).map(Chromosome)
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported human genome assemblies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Assembly {
    GRCh37,
    GRCh38,
}

impl Assembly {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "GRCh37" | "grch37" | "hg19" | "37" => Some(Assembly::GRCh37),
            "GRCh38" | "grch38" | "hg38" | "38" => Some(Assembly::GRCh38),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Assembly::GRCh37 => "GRCh37",
            Assembly::GRCh38 => "GRCh38",
        }
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutation type as assigned by the format-specific importers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationType {
    Sbs,
    Dbs,
    Tbs,
    Ins,
    Del,
    Unknown,
}

impl MutationType {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "SBS" => MutationType::Sbs,
            "DBS" => MutationType::Dbs,
            "TBS" => MutationType::Tbs,
            "INS" => MutationType::Ins,
            "DEL" => MutationType::Del,
            _ => MutationType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationType::Sbs => "SBS",
            MutationType::Dbs => "DBS",
            MutationType::Tbs => "TBS",
            MutationType::Ins => "INS",
            MutationType::Del => "DEL",
            MutationType::Unknown => MISSING_VALUE,
        }
    }
}

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use mutation_context::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Minus));
    /// assert_eq!(Strand::from_char('.'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

/// Transcription strand at a genomic position
///
/// `Both` is the ambiguous case where transcripts on opposite strands
/// overlap the position. A position with no transcript has no value at
/// all (`Option::None` on the record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscriptionStrand {
    Plus,
    Minus,
    Both,
}

impl TranscriptionStrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionStrand::Plus => "+",
            TranscriptionStrand::Minus => "-",
            TranscriptionStrand::Both => "+,-",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "+" => Some(TranscriptionStrand::Plus),
            "-" => Some(TranscriptionStrand::Minus),
            "+,-" => Some(TranscriptionStrand::Both),
            _ => None,
        }
    }
}

impl From<Strand> for TranscriptionStrand {
    fn from(s: Strand) -> Self {
        match s {
            Strand::Plus => TranscriptionStrand::Plus,
            Strand::Minus => TranscriptionStrand::Minus,
        }
    }
}

/// One standardized somatic mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Patient identifier
    pub patient: String,
    /// Sample identifier; count matrix rows are keyed on it
    pub sample: String,
    /// Cancer type label (free text)
    pub cancer_type: String,
    /// Source dataset the row came from
    pub provenance: String,
    /// Cohort or study name
    pub cohort: String,
    /// Standard chromosome (1-22, X, Y)
    pub chromosome: Chromosome,
    /// 1-based, inclusive
    pub start: u64,
    /// 1-based, inclusive
    pub end: u64,
    /// Reference allele, `-` for an insertion
    pub reference: String,
    /// Variant allele, `-` for a deletion
    pub variant: String,
    /// Genomic strand the alleles are reported on
    pub strand: Strand,
    /// Sequencing strategy (e.g. WXS, WGS)
    pub sequencing_strategy: String,
    pub mutation_type: MutationType,
    /// Reference assembly the coordinates refer to
    pub assembly: Assembly,
}

impl MutationRecord {
    /// Minimal record for a single sample; remaining metadata left empty
    pub fn new(
        sample: &str,
        chromosome: Chromosome,
        start: u64,
        reference: &str,
        variant: &str,
        mutation_type: MutationType,
        assembly: Assembly,
    ) -> Self {
        let span = if crate::core::dna::is_placeholder(reference) {
            1
        } else {
            reference.len() as u64
        };
        Self {
            patient: sample.to_string(),
            sample: sample.to_string(),
            cancer_type: String::new(),
            provenance: String::new(),
            cohort: String::new(),
            chromosome,
            start,
            end: start + span - 1,
            reference: reference.to_string(),
            variant: variant.to_string(),
            strand: Strand::Plus,
            sequencing_strategy: String::new(),
            mutation_type,
            assembly,
        }
    }
}

/// Borrowed view of everything a classifier looks at
#[derive(Debug, Clone, Copy)]
pub struct MutationContext<'a> {
    pub reference: &'a str,
    pub variant: &'a str,
    /// 5' flank, read toward the mutation
    pub five_prime: &'a str,
    /// 3' flank, read away from the mutation
    pub three_prime: &'a str,
    pub transcription_strand: Option<TranscriptionStrand>,
}

impl<'a> MutationContext<'a> {
    /// Context with flanks only and no transcription strand
    pub fn new(five_prime: &'a str, reference: &'a str, variant: &'a str, three_prime: &'a str) -> Self {
        Self {
            reference,
            variant,
            five_prime,
            three_prime,
            transcription_strand: None,
        }
    }

    pub fn with_strand(mut self, strand: Option<TranscriptionStrand>) -> Self {
        self.transcription_strand = strand;
        self
    }
}

/// A mutation plus the columns added by the extension pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedMutationRecord {
    pub record: MutationRecord,
    /// Bases immediately 5' of the mutation, nearest base last
    pub five_prime: String,
    /// Bases immediately 3' of the mutation, nearest base first
    pub three_prime: String,
    /// `None` when no transcript covers the mutation
    pub transcription_strand: Option<TranscriptionStrand>,
    /// One entry per requested taxonomy, in request order
    pub categories: Vec<(Taxonomy, Option<String>)>,
}

impl ExtendedMutationRecord {
    pub fn context(&self) -> MutationContext<'_> {
        MutationContext {
            reference: &self.record.reference,
            variant: &self.record.variant,
            five_prime: &self.five_prime,
            three_prime: &self.three_prime,
            transcription_strand: self.transcription_strand,
        }
    }

    /// Category label for a taxonomy, if that column exists and is set
    pub fn category(&self, taxonomy: Taxonomy) -> Option<&str> {
        self.categories
            .iter()
            .find(|(t, _)| *t == taxonomy)
            .and_then(|(_, label)| label.as_deref())
    }

    pub fn has_category_column(&self, taxonomy: Taxonomy) -> bool {
        self.categories.iter().any(|(t, _)| *t == taxonomy)
    }
}

/// A mutation row as read from disk, before standardization
///
/// Cells are kept verbatim; missing values are `None`.
#[derive(Debug, Clone, Default)]
pub struct RawMutationRecord {
    /// 1-based line number in the source file (for error messages)
    pub line: usize,
    pub patient: Option<String>,
    pub sample: Option<String>,
    pub cancer_type: Option<String>,
    pub provenance: Option<String>,
    pub cohort: Option<String>,
    pub chromosome: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub reference: Option<String>,
    pub variant: Option<String>,
    pub strand: Option<String>,
    pub sequencing_strategy: Option<String>,
    pub mutation_type: Option<String>,
    pub assembly: Option<String>,
}

fn drop_message(dropped: usize, reason: &str, column: &str) {
    debug!("Dropping {} rows because {} in {} column", dropped, reason, column);
}

/// Final standardization of a raw mutation table
///
/// Drops rows with a missing chromosome, start or end, then rows whose
/// chromosome is outside the 24 standard names. Survivors are typed and
/// sorted by patient, sample, chromosome and start position.
pub fn standardize(raw: Vec<RawMutationRecord>) -> ParseResult<Vec<MutationRecord>> {
    let before = raw.len();
    let raw: Vec<_> = raw.into_iter().filter(|r| r.chromosome.is_some()).collect();
    drop_message(before - raw.len(), "NaN value", columns::CHROMOSOME);

    let before = raw.len();
    let raw: Vec<_> = raw.into_iter().filter(|r| r.start.is_some()).collect();
    drop_message(before - raw.len(), "NaN value", columns::START);

    let before = raw.len();
    let raw: Vec<_> = raw.into_iter().filter(|r| r.end.is_some()).collect();
    drop_message(before - raw.len(), "NaN value", columns::END);

    let before = raw.len();
    let raw: Vec<_> = raw
        .into_iter()
        .filter(|r| r.chromosome.as_deref().and_then(Chromosome::from_name).is_some())
        .collect();
    drop_message(before - raw.len(), "invalid value", columns::CHROMOSOME);

    let mut records = raw
        .into_iter()
        .map(type_record)
        .collect::<ParseResult<Vec<_>>>()?;
    sort_records(&mut records);
    Ok(records)
}

fn parse_position(value: &str, line: usize, field: &'static str) -> ParseResult<u64> {
    let v = value.trim();
    // Importers sometimes emit positions as floats ("12345.0")
    v.parse::<u64>()
        .ok()
        .or_else(|| {
            v.parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0)
                .map(|f| f as u64)
        })
        .ok_or_else(|| ParseError::InvalidField {
            line,
            field,
            value: value.to_string(),
        })
}

fn type_record(raw: RawMutationRecord) -> ParseResult<MutationRecord> {
    let line = raw.line;
    let chromosome = raw
        .chromosome
        .as_deref()
        .and_then(Chromosome::from_name)
        .ok_or_else(|| ParseError::InvalidField {
            line,
            field: columns::CHROMOSOME,
            value: raw.chromosome.clone().unwrap_or_default(),
        })?;
    let start = parse_position(raw.start.as_deref().unwrap_or_default(), line, columns::START)?;
    let end = parse_position(raw.end.as_deref().unwrap_or_default(), line, columns::END)?;

    let assembly_value = raw.assembly.clone().unwrap_or_default();
    let assembly = Assembly::from_name(&assembly_value).ok_or(ParseError::InvalidField {
        line,
        field: columns::ASSEMBLY,
        value: assembly_value,
    })?;

    // A missing genomic strand defaults to '+'; anything else is kept so
    // the pipeline can reject it as a precondition violation.
    let strand = match raw.strand.as_deref().map(str::trim) {
        None | Some("+") => Strand::Plus,
        Some("-") => Strand::Minus,
        Some(other) => {
            return Err(ParseError::InvalidField {
                line,
                field: columns::GENOMIC_STRAND,
                value: other.to_string(),
            })
        }
    };

    Ok(MutationRecord {
        patient: raw.patient.unwrap_or_default(),
        sample: raw.sample.unwrap_or_default(),
        cancer_type: raw.cancer_type.unwrap_or_default(),
        provenance: raw.provenance.unwrap_or_default(),
        cohort: raw.cohort.unwrap_or_default(),
        chromosome,
        start,
        end,
        reference: raw.reference.unwrap_or_default().to_ascii_uppercase(),
        variant: raw.variant.unwrap_or_default().to_ascii_uppercase(),
        strand,
        sequencing_strategy: raw.sequencing_strategy.unwrap_or_default(),
        mutation_type: raw
            .mutation_type
            .as_deref()
            .map(MutationType::from_name)
            .unwrap_or(MutationType::Unknown),
        assembly,
    })
}

/// Sort by patient, sample, then genomic location
pub fn sort_records(records: &mut [MutationRecord]) {
    records.sort_by(|a, b| {
        a.patient
            .cmp(&b.patient)
            .then_with(|| a.sample.cmp(&b.sample))
            .then_with(|| a.chromosome.cmp(&b.chromosome))
            .then_with(|| a.start.cmp(&b.start))
    });
}
