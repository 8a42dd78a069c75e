//! Core mutation context functionality
//!
//! This module contains the record model, reference genome access,
//! the transcript strand index and flanking sequence retrieval.

pub mod dna;
mod error;
pub mod flank;
pub mod genome;
mod index;
pub mod io;
mod record;

pub use error::{
    ClassifyError, ClassifyResult, LookupError, MatrixError, MutationContextError, ParseError,
    ParseResult, PreconditionError, Result,
};
pub use flank::{flank_width, Flanks, FlankingSequenceResolver, FLANK_MULTIPLIER};
pub use genome::{GenomeSequenceProvider, GenomeSet, InMemoryGenome, IndexedFastaGenome, ReferenceGenome};
pub use index::{TranscriptIndexSet, TranscriptInterval, TranscriptStrandIndex};
pub use io::{open_reader, CompressionFormat, LineIterator, DEFAULT_BUFFER_SIZE};
pub use record::{
    columns, is_missing, sort_records, standardize, Assembly, Chromosome, ExtendedMutationRecord,
    MutationContext, MutationRecord, MutationType, RawMutationRecord, Strand, TranscriptionStrand,
    MISSING_VALUE,
};
