//! Error types for MutationContext
//!
//! Defines all error types used throughout the library.
//!
//! Errors fall into two groups. Row-level conditions ([`ClassifyError`],
//! [`LookupError::NoTranscriptMatch`]) are recoverable: the pipeline records
//! a missing value for that row and carries on. [`PreconditionError`] means
//! the caller or the input data is broken in a systematic way and aborts
//! the whole pass.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::record::{Assembly, Chromosome};

/// Main error type for MutationContext operations
#[derive(Debug, Error)]
pub enum MutationContextError {
    /// Fatal precondition violations
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionError),

    /// Classification errors escalated by the caller
    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Count matrix schema errors
    #[error("Count matrix error: {0}")]
    Matrix(#[from] MatrixError),

    /// Input parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-row classification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// The alleles do not have the shape this taxonomy classifies
    #[error("{taxonomy} does not apply to {reference}>{variant}")]
    NotApplicable {
        taxonomy: &'static str,
        reference: String,
        variant: String,
    },

    /// The alleles contain something other than A, C, G or T
    #[error("Invalid alleles for {taxonomy}: {reference}>{variant}")]
    InvalidAlleles {
        taxonomy: &'static str,
        reference: String,
        variant: String,
    },

    /// Flanks are too short for repeat or microhomology analysis
    #[error("Insufficient flanking context: need {required} bases on each side, got 5'={five_prime} 3'={three_prime}")]
    InsufficientFlank {
        required: usize,
        five_prime: usize,
        three_prime: usize,
    },
}

/// Errors from a transcription strand lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No transcript overlaps the position
    #[error("No transcript matches found for {chromosome}:{position}")]
    NoTranscriptMatch { chromosome: Chromosome, position: u64 },

    /// The query itself is invalid
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

/// Caller or integration defects that abort the run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// Only plus-strand genomic coordinates are supported
    #[error("Genomic strand must be '+', got '{0}'")]
    NonPlusStrand(char),

    /// The genome disagrees with the stated reference base
    #[error("Reference base mismatch at {chromosome}:{position}: record says '{expected}', genome has '{found}'")]
    ReferenceMismatch {
        chromosome: Chromosome,
        position: u64,
        expected: String,
        found: char,
    },

    /// Position falls outside the chromosome
    #[error("Position {position} out of range for chromosome {chromosome} (length {length})")]
    OutOfBounds {
        chromosome: Chromosome,
        position: u64,
        length: u64,
    },

    /// Chromosome is not present in the loaded genome
    #[error("Chromosome {chromosome} not found in {assembly} genome")]
    UnknownChromosome {
        assembly: Assembly,
        chromosome: Chromosome,
    },

    /// No genome or transcript index loaded for the assembly
    #[error("No {resource} loaded for assembly {assembly}")]
    UnknownAssembly {
        resource: &'static str,
        assembly: Assembly,
    },
}

/// Errors raised before count aggregation begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// The category column is the only column absent
    #[error("Input table is missing the category column '{0}'")]
    MissingCategoryColumn(String),

    /// Required columns other than the category column are absent
    #[error("Input table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Errors that can occur while reading tabular inputs
#[derive(Debug, Error)]
pub enum ParseError {
    /// Header row is absent or lacks a required column
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A data line has fewer fields than the header
    #[error("Too few fields at line {line}: expected {expected}, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A field could not be interpreted
    #[error("Invalid {field} '{value}' at line {line}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// FASTA or FASTA index is malformed
    #[error("Invalid FASTA: {0}")]
    InvalidFasta(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MutationContext operations
pub type Result<T> = std::result::Result<T, MutationContextError>;

/// Result type alias for classification
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;

/// Result type alias for parsing operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;
