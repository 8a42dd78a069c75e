//! Property-based tests for TranscriptStrandIndex point queries
//!
//! **Property: strand lookup agrees with an interval tree**
//!
//! Every query is checked against a `rust_lapper::Lapper` built from the
//! same transcripts. Intervals are allowed to nest and overlap freely.

use mutation_context::core::{
    Chromosome, LookupError, PreconditionError, Strand, TranscriptInterval, TranscriptStrandIndex,
    TranscriptionStrand,
};
use proptest::prelude::*;
use rust_lapper::{Interval, Lapper};

fn chr(name: &str) -> Chromosome {
    Chromosome::from_name(name).unwrap()
}

fn arb_strand() -> impl Strategy<Value = Strand> {
    prop_oneof![Just(Strand::Plus), Just(Strand::Minus)]
}

/// Closed intervals anywhere in 1..10000, lengths up to 3000
fn arb_transcripts() -> impl Strategy<Value = Vec<(u64, u64, Strand)>> {
    prop::collection::vec(
        (1u64..10_000, 0u64..3_000, arb_strand()).prop_map(|(start, len, strand)| {
            (start, start + len, strand)
        }),
        0..40,
    )
}

fn build(transcripts: &[(u64, u64, Strand)]) -> (TranscriptStrandIndex, Lapper<u64, u8>) {
    let index = TranscriptStrandIndex::from_intervals(transcripts.iter().enumerate().map(
        |(i, &(start, end, strand))| TranscriptInterval {
            gene: format!("G{}", i),
            chromosome: chr("1"),
            strand,
            start,
            end,
        },
    ));
    // Lapper intervals are half-open
    let oracle = Lapper::new(
        transcripts
            .iter()
            .map(|&(start, end, strand)| Interval {
                start,
                stop: end + 1,
                val: strand.to_char() as u8,
            })
            .collect(),
    );
    (index, oracle)
}

fn expected_strand(oracle: &Lapper<u64, u8>, position: u64) -> Option<TranscriptionStrand> {
    let (mut plus, mut minus) = (false, false);
    for hit in oracle.find(position, position + 1) {
        match hit.val {
            b'+' => plus = true,
            _ => minus = true,
        }
    }
    match (plus, minus) {
        (true, true) => Some(TranscriptionStrand::Both),
        (true, false) => Some(TranscriptionStrand::Plus),
        (false, true) => Some(TranscriptionStrand::Minus),
        (false, false) => None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Lookup returns exactly the strand set of the overlapping transcripts
    #[test]
    fn prop_strand_matches_interval_tree(
        transcripts in arb_transcripts(),
        position in 1u64..13_500,
    ) {
        let (index, oracle) = build(&transcripts);
        let result = index.strand(chr("1"), position, Strand::Plus);

        match expected_strand(&oracle, position) {
            Some(strand) => prop_assert_eq!(result, Ok(strand)),
            None => prop_assert!(
                matches!(result, Err(LookupError::NoTranscriptMatch { .. })),
                "position {} should have no match, got {:?}", position, result
            ),
        }
    }

    /// Overlap count matches the interval tree
    #[test]
    fn prop_overlap_count_matches_interval_tree(
        transcripts in arb_transcripts(),
        position in 1u64..13_500,
    ) {
        let (index, oracle) = build(&transcripts);
        let found = index.overlapping(chr("1"), position);
        prop_assert_eq!(found.len(), oracle.find(position, position + 1).count());
        for interval in found {
            prop_assert!(interval.contains(position));
        }
    }

    /// Both ends of every transcript are inside it
    #[test]
    fn prop_boundaries_are_inclusive(transcripts in arb_transcripts()) {
        let (index, _) = build(&transcripts);
        for &(start, end, _) in &transcripts {
            prop_assert!(index.strand(chr("1"), start, Strand::Plus).is_ok());
            prop_assert!(index.strand(chr("1"), end, Strand::Plus).is_ok());
        }
    }

    /// Queries on another chromosome never match
    #[test]
    fn prop_other_chromosome_has_no_match(
        transcripts in arb_transcripts(),
        position in 1u64..13_500,
    ) {
        let (index, _) = build(&transcripts);
        let result = index.strand(chr("2"), position, Strand::Plus);
        prop_assert!(
            matches!(result, Err(LookupError::NoTranscriptMatch { .. })),
            "chr2:{} should have no match, got {:?}", position, result
        );
    }

    /// A minus genomic strand is rejected whatever the position
    #[test]
    fn prop_minus_genomic_strand_rejected(
        transcripts in arb_transcripts(),
        position in 1u64..13_500,
    ) {
        let (index, _) = build(&transcripts);
        prop_assert_eq!(
            index.strand(chr("1"), position, Strand::Minus),
            Err(LookupError::Precondition(PreconditionError::NonPlusStrand('-')))
        );
    }
}

#[test]
fn test_between_and_around_intervals() {
    let (index, _) = build(&[
        (100, 200, Strand::Plus),
        (300, 400, Strand::Minus),
        (350, 360, Strand::Plus),
    ]);
    let lookup = |pos| index.strand(chr("1"), pos, Strand::Plus).ok();

    assert_eq!(lookup(99), None);
    assert_eq!(lookup(100), Some(TranscriptionStrand::Plus));
    assert_eq!(lookup(200), Some(TranscriptionStrand::Plus));
    assert_eq!(lookup(201), None);
    assert_eq!(lookup(250), None);
    assert_eq!(lookup(300), Some(TranscriptionStrand::Minus));
    assert_eq!(lookup(349), Some(TranscriptionStrand::Minus));
    assert_eq!(lookup(355), Some(TranscriptionStrand::Both));
    assert_eq!(lookup(361), Some(TranscriptionStrand::Minus));
    assert_eq!(lookup(400), Some(TranscriptionStrand::Minus));
    assert_eq!(lookup(401), None);
}
