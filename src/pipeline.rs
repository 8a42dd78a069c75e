//! Mutation table extension
//!
//! Adds flanking bases, transcription strand and one category column per
//! requested taxonomy to every mutation. Rows are independent, so the
//! table is processed in chunks on a rayon pool; chunk results are
//! concatenated in input order.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::categories::{self, Taxonomy};
use crate::core::{
    standardize, ClassifyError, ExtendedMutationRecord, FlankingSequenceResolver,
    GenomeSequenceProvider, LookupError, MatrixError, MutationContextError, MutationRecord,
    ParseResult, RawMutationRecord, Result, TranscriptIndexSet, TranscriptionStrand,
};
use crate::counts::{build_count_matrix, Counts};

/// Records per parallel work unit
const CHUNK_SIZE: usize = 4096;

/// Extension settings
#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    /// Category columns to add, in column order
    pub taxonomies: Vec<Taxonomy>,
    /// Worker threads; 1 or less runs on the calling thread
    pub threads: usize,
    /// Cross-check SBS reference bases against the genome
    pub verify_reference: bool,
    /// Treat short indel flanks as fatal instead of a missing label
    pub abort_on_insufficient_flank: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            taxonomies: Taxonomy::DEFAULT.to_vec(),
            threads: 1,
            verify_reference: true,
            abort_on_insufficient_flank: false,
        }
    }
}

impl ExtensionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taxonomies<I: IntoIterator<Item = Taxonomy>>(mut self, taxonomies: I) -> Self {
        self.taxonomies = taxonomies.into_iter().collect();
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn verify_reference(mut self, verify: bool) -> Self {
        self.verify_reference = verify;
        self
    }

    pub fn abort_on_insufficient_flank(mut self, abort: bool) -> Self {
        self.abort_on_insufficient_flank = abort;
        self
    }
}

/// Extension statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtensionStats {
    pub total: usize,
    /// Rows with no overlapping transcript (or no index for the assembly)
    pub strand_missing: usize,
    /// Rows where transcripts on both strands overlap
    pub strand_ambiguous: usize,
    /// Labels assigned
    pub classified: usize,
    /// Taxonomy/row pairs skipped because the mutation type does not apply
    pub not_applicable: usize,
    /// Classification failures recorded as missing labels
    pub failed: usize,
    /// Of `failed`, how many were short flanks
    pub insufficient_flank: usize,
}

#[derive(Default)]
struct Counters {
    total: AtomicUsize,
    strand_missing: AtomicUsize,
    strand_ambiguous: AtomicUsize,
    classified: AtomicUsize,
    not_applicable: AtomicUsize,
    failed: AtomicUsize,
    insufficient_flank: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ExtensionStats {
        ExtensionStats {
            total: self.total.load(Ordering::Relaxed),
            strand_missing: self.strand_missing.load(Ordering::Relaxed),
            strand_ambiguous: self.strand_ambiguous.load(Ordering::Relaxed),
            classified: self.classified.load(Ordering::Relaxed),
            not_applicable: self.not_applicable.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            insufficient_flank: self.insufficient_flank.load(Ordering::Relaxed),
        }
    }
}

/// A mutation table with extension columns
#[derive(Debug, Clone, Default)]
pub struct ExtendedTable {
    /// Category columns present, in column order
    pub taxonomies: Vec<Taxonomy>,
    /// One record per input mutation, in input order
    pub records: Vec<ExtendedMutationRecord>,
    pub stats: ExtensionStats,
}

impl ExtendedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Extender<'a, G: GenomeSequenceProvider + ?Sized> {
    config: &'a ExtensionConfig,
    resolver: FlankingSequenceResolver<'a, G>,
    transcripts: &'a TranscriptIndexSet,
    counters: Counters,
}

impl<'a, G: GenomeSequenceProvider + ?Sized> Extender<'a, G> {
    fn extend_record(&self, record: &MutationRecord) -> Result<ExtendedMutationRecord> {
        Counters::bump(&self.counters.total);

        let flanks = self.resolver.resolve(record)?;

        let transcription_strand = match self.transcripts.get(record.assembly) {
            None => None,
            Some(index) => match index.strand(record.chromosome, record.start, record.strand) {
                Ok(strand) => Some(strand),
                Err(LookupError::NoTranscriptMatch { .. }) => None,
                Err(LookupError::Precondition(e)) => return Err(e.into()),
            },
        };
        match transcription_strand {
            None => Counters::bump(&self.counters.strand_missing),
            Some(TranscriptionStrand::Both) => {
                Counters::bump(&self.counters.strand_ambiguous)
            }
            Some(_) => {}
        }

        let mut extended = ExtendedMutationRecord {
            record: record.clone(),
            five_prime: flanks.five_prime,
            three_prime: flanks.three_prime,
            transcription_strand,
            categories: Vec::with_capacity(self.config.taxonomies.len()),
        };

        for &taxonomy in &self.config.taxonomies {
            let label = self.label(taxonomy, &extended)?;
            extended.categories.push((taxonomy, label));
        }
        Ok(extended)
    }

    fn label(&self, taxonomy: Taxonomy, extended: &ExtendedMutationRecord) -> Result<Option<String>> {
        if !taxonomy.applies_to(extended.record.mutation_type) {
            Counters::bump(&self.counters.not_applicable);
            return Ok(None);
        }
        match categories::classify(taxonomy, extended) {
            Ok(Some(label)) => {
                Counters::bump(&self.counters.classified);
                Ok(Some(label))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                let short_flank = matches!(e, ClassifyError::InsufficientFlank { .. });
                if short_flank && self.config.abort_on_insufficient_flank {
                    return Err(MutationContextError::Classify(e));
                }
                debug!(
                    "{} unclassified at {}:{} ({}): {}",
                    taxonomy,
                    extended.record.chromosome,
                    extended.record.start,
                    extended.record.sample,
                    e
                );
                Counters::bump(&self.counters.failed);
                if short_flank {
                    Counters::bump(&self.counters.insufficient_flank);
                }
                Ok(None)
            }
        }
    }

    fn extend_chunk(&self, chunk: &[MutationRecord]) -> Result<Vec<ExtendedMutationRecord>> {
        chunk.iter().map(|r| self.extend_record(r)).collect()
    }
}

/// Extend a standardized mutation table
///
/// Precondition violations (non-plus genomic strand, reference mismatch,
/// unknown chromosome or missing genome) abort the whole pass. Per-row
/// classification failures and transcript misses leave a missing value
/// in that row and are counted in the returned statistics.
pub fn extend<G>(
    records: &[MutationRecord],
    config: &ExtensionConfig,
    genome: &G,
    transcripts: &TranscriptIndexSet,
) -> Result<ExtendedTable>
where
    G: GenomeSequenceProvider + ?Sized,
{
    let ids: Vec<&str> = config.taxonomies.iter().map(Taxonomy::id).collect();
    info!(
        "Extending {} mutations with categories [{}]",
        records.len(),
        ids.join(", ")
    );

    let unindexed: BTreeSet<_> = records
        .iter()
        .map(|r| r.assembly)
        .filter(|a| transcripts.get(*a).is_none())
        .collect();
    for assembly in unindexed {
        warn!(
            "No transcript index for {}; transcription strand will be missing",
            assembly
        );
    }

    let extender = Extender {
        config,
        resolver: FlankingSequenceResolver::new(genome).verify_reference(config.verify_reference),
        transcripts,
        counters: Counters::default(),
    };

    let records = if config.threads <= 1 {
        extender.extend_chunk(records)?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to create thread pool: {}", e),
                )
            })?;
        let chunks: Vec<Vec<ExtendedMutationRecord>> = pool.install(|| {
            records
                .par_chunks(CHUNK_SIZE)
                .map(|chunk| extender.extend_chunk(chunk))
                .collect::<Result<_>>()
        })?;
        chunks.into_iter().flatten().collect()
    };

    let stats = extender.counters.snapshot();
    info!(
        "Extended {} mutations: {} labels assigned, {} failures, {} without transcription strand",
        stats.total, stats.classified, stats.failed, stats.strand_missing
    );

    Ok(ExtendedTable {
        taxonomies: config.taxonomies.clone(),
        records,
        stats,
    })
}

/// A standardized mutation table and everything derived from it
///
/// Extension results and count matrices are cached; re-extending clears
/// the cached counts.
#[derive(Debug, Default)]
pub struct MutationSet {
    records: Vec<MutationRecord>,
    extended: Option<ExtendedTable>,
    counts: HashMap<(Taxonomy, bool), Counts>,
}

impl MutationSet {
    pub fn new(records: Vec<MutationRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Standardize raw rows and wrap them
    pub fn from_raw(raw: Vec<RawMutationRecord>) -> ParseResult<Self> {
        Ok(Self::new(standardize(raw)?))
    }

    pub fn records(&self) -> &[MutationRecord] {
        &self.records
    }

    pub fn extended(&self) -> Option<&ExtendedTable> {
        self.extended.as_ref()
    }

    /// Run extension over the set
    pub fn extend<G>(
        &mut self,
        config: &ExtensionConfig,
        genome: &G,
        transcripts: &TranscriptIndexSet,
    ) -> Result<&ExtendedTable>
    where
        G: GenomeSequenceProvider + ?Sized,
    {
        let table = extend(&self.records, config, genome, transcripts)?;
        self.counts.clear();
        Ok(self.extended.insert(table))
    }

    /// Counts for a taxonomy, built on first request
    pub fn to_counts(&mut self, taxonomy: Taxonomy, sparse: bool) -> Result<&Counts> {
        let table = self.extended.as_ref().ok_or_else(|| {
            MatrixError::MissingColumns(
                crate::core::columns::EXTENSION
                    .iter()
                    .map(|c| c.to_string())
                    .chain(std::iter::once(taxonomy.id().to_string()))
                    .collect(),
            )
        })?;
        if !self.counts.contains_key(&(taxonomy, sparse)) {
            let counts = build_count_matrix(table, taxonomy, sparse)?;
            self.counts.insert((taxonomy, sparse), counts);
        }
        self.counts
            .get(&(taxonomy, sparse))
            .ok_or_else(|| MatrixError::MissingCategoryColumn(taxonomy.id().to_string()).into())
    }
}
