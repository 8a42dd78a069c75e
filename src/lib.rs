//! MutationContext - Mutation context classification for signature analysis
//!
//! Annotates somatic mutations with their flanking reference sequence and
//! transcription strand, assigns each one a category label under the
//! standard SBS, DBS and indel taxonomies, and aggregates labels into
//! per-sample count matrices.
//!
//! # Features
//!
//! - SBS-6/12/96/192/1536, DBS-10/78 and indel (Alexandrov 16/83,
//!   Haradhvala 8) taxonomies with fixed canonical category orders
//! - Strand-aware transcript index over refFlat annotations
//! - In-memory or memory-mapped indexed FASTA reference access
//! - Parallel extension with rayon
//! - Support for compressed inputs (gzip, bzip2)
//!
//! # Example
//!
//! ```ignore
//! use mutation_context::{extend, build_count_matrix, ExtensionConfig, Taxonomy};
//! use mutation_context::core::{Assembly, GenomeSet, InMemoryGenome, TranscriptIndexSet};
//! use mutation_context::formats::{read_mutations, read_transcripts};
//!
//! let genomes = GenomeSet::new().with(Assembly::GRCh38, InMemoryGenome::from_fasta("hg38.fa")?);
//! let transcripts = TranscriptIndexSet::new()
//!     .with(Assembly::GRCh38, read_transcripts("refFlat.hg38.txt")?);
//!
//! let records = read_mutations("mutations.tsv")?;
//! let table = extend(&records, &ExtensionConfig::default(), &genomes, &transcripts)?;
//! let counts = build_count_matrix(&table, Taxonomy::Sbs96, false)?;
//! ```

pub mod categories;
pub mod core;
pub mod counts;
pub mod formats;
pub mod pipeline;

// Re-export commonly used types
pub use categories::{canonical_labels, classify, IndelLabels, Taxonomy};
pub use core::{
    Assembly, Chromosome, ClassifyError, ExtendedMutationRecord, GenomeSequenceProvider,
    GenomeSet, LookupError, MatrixError, MutationContext, MutationContextError, MutationRecord,
    MutationType, ParseError, PreconditionError, Strand, TranscriptIndexSet,
    TranscriptStrandIndex, TranscriptionStrand,
};
pub use counts::{build_count_matrix, counts_from_table, CountMatrix, CountTriple, Counts};
pub use pipeline::{extend, ExtendedTable, ExtensionConfig, ExtensionStats, MutationSet};
