//! Transcript interval index for transcription strand lookup
//!
//! Intervals are grouped by chromosome and sorted by end position (ties
//! broken by start). A query binary-searches the end positions for the
//! query position and scans outward from the insertion point, stopping
//! each direction as soon as no further interval can overlap. The
//! rightward bound uses the longest interval on the chromosome: once an
//! interval ends more than that span past the position, neither it nor
//! anything after it can contain the position.

use std::collections::HashMap;

use log::{debug, warn};

use crate::core::error::{LookupError, PreconditionError};
use crate::core::record::{Assembly, Chromosome, Strand, TranscriptionStrand};

/// A transcript's genomic extent and strand (closed interval)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptInterval {
    /// Gene symbol from the annotation
    pub gene: String,
    pub chromosome: Chromosome,
    /// Strand the gene is transcribed from
    pub strand: Strand,
    /// Transcript start (inclusive)
    pub start: u64,
    /// Transcript end (inclusive)
    pub end: u64,
}

impl TranscriptInterval {
    /// Closed-interval containment
    #[inline]
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Per-chromosome intervals ordered by (end, start)
#[derive(Debug, Default)]
struct ChromIntervals {
    intervals: Vec<TranscriptInterval>,
    ends: Vec<u64>,
    /// Largest `end - start` on the chromosome
    max_span: u64,
}

/// Read-only transcription strand index for one assembly
#[derive(Debug, Default)]
pub struct TranscriptStrandIndex {
    chroms: HashMap<Chromosome, ChromIntervals>,
}

impl TranscriptStrandIndex {
    /// Build the index from transcript intervals in any order
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = TranscriptInterval>,
    {
        let mut by_chrom: HashMap<Chromosome, Vec<TranscriptInterval>> = HashMap::new();
        for interval in intervals {
            by_chrom
                .entry(interval.chromosome)
                .or_default()
                .push(interval);
        }

        let chroms = by_chrom
            .into_iter()
            .map(|(chrom, mut intervals)| {
                intervals.sort_by(|a, b| a.end.cmp(&b.end).then_with(|| a.start.cmp(&b.start)));
                let ends = intervals.iter().map(|iv| iv.end).collect();
                let max_span = intervals
                    .iter()
                    .map(|iv| iv.end.saturating_sub(iv.start))
                    .max()
                    .unwrap_or(0);
                (
                    chrom,
                    ChromIntervals {
                        intervals,
                        ends,
                        max_span,
                    },
                )
            })
            .collect();

        Self { chroms }
    }

    /// Transcription strand at a plus-strand genomic position
    ///
    /// Returns `Both` when transcripts on opposite strands overlap the
    /// position. A non-plus `genomic_strand` is a precondition violation.
    pub fn strand(
        &self,
        chromosome: Chromosome,
        position: u64,
        genomic_strand: Strand,
    ) -> Result<TranscriptionStrand, LookupError> {
        if genomic_strand != Strand::Plus {
            return Err(PreconditionError::NonPlusStrand(genomic_strand.to_char()).into());
        }

        let no_match = LookupError::NoTranscriptMatch {
            chromosome,
            position,
        };
        let chrom = self.chroms.get(&chromosome).ok_or(no_match.clone())?;

        let (mut plus, mut minus) = (false, false);
        for interval in chrom.overlapping(position) {
            match interval.strand {
                Strand::Plus => plus = true,
                Strand::Minus => minus = true,
            }
        }

        match (plus, minus) {
            (true, true) => Ok(TranscriptionStrand::Both),
            (true, false) => Ok(TranscriptionStrand::Plus),
            (false, true) => Ok(TranscriptionStrand::Minus),
            (false, false) => Err(no_match),
        }
    }

    /// Intervals containing `position` on a chromosome
    pub fn overlapping(&self, chromosome: Chromosome, position: u64) -> Vec<&TranscriptInterval> {
        self.chroms
            .get(&chromosome)
            .map(|c| c.overlapping(position))
            .unwrap_or_default()
    }

    /// Number of intervals on a chromosome
    pub fn interval_count(&self, chromosome: Chromosome) -> usize {
        self.chroms
            .get(&chromosome)
            .map(|c| c.intervals.len())
            .unwrap_or(0)
    }

    /// Total number of intervals across all chromosomes
    pub fn total_intervals(&self) -> usize {
        self.chroms.values().map(|c| c.intervals.len()).sum()
    }
}

impl ChromIntervals {
    /// Intervals containing `position`
    ///
    /// The rightward scan runs until an interval ends past
    /// `position + max_span`. No interval beyond that can start at or
    /// before `position`, even one enclosing shorter intervals sorted
    /// ahead of it.
    fn overlapping(&self, position: u64) -> Vec<&TranscriptInterval> {
        let insertion = self.ends.partition_point(|&end| end < position);
        let mut found = Vec::new();

        // Leftward: stop once an interval ends before the position
        let mut i = insertion;
        while i > 0 {
            i -= 1;
            let interval = &self.intervals[i];
            if interval.end < position {
                break;
            }
            if interval.contains(position) {
                found.push(interval);
            }
        }

        // Rightward: stop once an interval ends too far out to reach back
        let horizon = position.saturating_add(self.max_span);
        for interval in &self.intervals[insertion..] {
            if interval.end > horizon {
                break;
            }
            if interval.contains(position) {
                found.push(interval);
            }
        }

        found
    }
}

/// Transcript indexes keyed by assembly
#[derive(Debug, Default)]
pub struct TranscriptIndexSet {
    indexes: HashMap<Assembly, TranscriptStrandIndex>,
}

impl TranscriptIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, assembly: Assembly, index: TranscriptStrandIndex) {
        debug!(
            "Registered {} transcripts for {}",
            index.total_intervals(),
            assembly
        );
        if index.total_intervals() == 0 {
            warn!("Transcript index for {} is empty", assembly);
        }
        self.indexes.insert(assembly, index);
    }

    pub fn with(mut self, assembly: Assembly, index: TranscriptStrandIndex) -> Self {
        self.insert(assembly, index);
        self
    }

    pub fn get(&self, assembly: Assembly) -> Option<&TranscriptStrandIndex> {
        self.indexes.get(&assembly)
    }

    /// Strand lookup routed to the assembly's index
    pub fn strand(
        &self,
        assembly: Assembly,
        chromosome: Chromosome,
        position: u64,
        genomic_strand: Strand,
    ) -> Result<TranscriptionStrand, LookupError> {
        let index = self.get(assembly).ok_or(PreconditionError::UnknownAssembly {
            resource: "transcript index",
            assembly,
        })?;
        index.strand(chromosome, position, genomic_strand)
    }
}
