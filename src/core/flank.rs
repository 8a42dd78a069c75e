//! Flanking sequence retrieval
//!
//! Fetches the bases immediately 5' of a mutation's start and 3' of its
//! end from the reference genome of the mutation's assembly.

use crate::core::error::PreconditionError;
use crate::core::genome::GenomeSequenceProvider;
use crate::core::record::{MutationRecord, MutationType, Strand};

/// Flank width per allele base; covers the widest repeat scan (5 units)
/// with one unit of slack.
pub const FLANK_MULTIPLIER: usize = 6;

/// Number of flanking bases to fetch on each side of a mutation
///
/// # Examples
/// ```
/// use mutation_context::core::flank::flank_width;
///
/// assert_eq!(flank_width("C", "T"), 6);
/// assert_eq!(flank_width("-", "ACG"), 18);
/// ```
pub fn flank_width(reference: &str, variant: &str) -> usize {
    FLANK_MULTIPLIER * reference.len().max(variant.len())
}

/// 5' and 3' flanking bases of one mutation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Flanks {
    pub five_prime: String,
    pub three_prime: String,
}

/// Resolves flanks for mutations against a shared genome provider
pub struct FlankingSequenceResolver<'a, G: GenomeSequenceProvider + ?Sized> {
    genome: &'a G,
    verify_reference: bool,
}

impl<'a, G: GenomeSequenceProvider + ?Sized> FlankingSequenceResolver<'a, G> {
    pub fn new(genome: &'a G) -> Self {
        Self {
            genome,
            verify_reference: true,
        }
    }

    /// Enable or disable the reference base cross-check for SBS
    pub fn verify_reference(mut self, verify: bool) -> Self {
        self.verify_reference = verify;
        self
    }

    /// Fetch both flanks for a mutation
    ///
    /// For SBS mutations (when verification is on) the genome base at the
    /// mutation position must equal the stated reference base, or be `N`.
    /// A mismatch almost always means a coordinate convention mix-up
    /// between the mutation table and the reference, so it is fatal.
    pub fn resolve(&self, record: &MutationRecord) -> Result<Flanks, PreconditionError> {
        if record.strand != Strand::Plus {
            return Err(PreconditionError::NonPlusStrand(record.strand.to_char()));
        }

        if self.verify_reference && record.mutation_type == MutationType::Sbs {
            self.check_reference(record)?;
        }

        let width = flank_width(&record.reference, &record.variant) as u64;

        let five_prime = if record.start > 1 {
            self.genome.sequence(
                record.assembly,
                record.chromosome,
                record.start.saturating_sub(width),
                record.start - 1,
            )?
        } else {
            String::new()
        };
        let three_prime = self.genome.sequence(
            record.assembly,
            record.chromosome,
            record.end + 1,
            record.end + width,
        )?;

        Ok(Flanks {
            five_prime,
            three_prime,
        })
    }

    fn check_reference(&self, record: &MutationRecord) -> Result<(), PreconditionError> {
        let found = self
            .genome
            .base_at(record.assembly, record.chromosome, record.start)?;
        if found == 'N' || (record.reference.len() == 1 && record.reference.starts_with(found)) {
            return Ok(());
        }
        Err(PreconditionError::ReferenceMismatch {
            chromosome: record.chromosome,
            position: record.start,
            expected: record.reference.clone(),
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::genome::{GenomeSet, InMemoryGenome};
    use crate::core::record::{Assembly, Chromosome};

    //                 1234567890123456789012345
    const CHR1: &str = "AAAAAGGGGGCTTTTTNCCCCCACGT";

    fn genomes() -> GenomeSet {
        let c1 = Chromosome::from_name("1").unwrap();
        GenomeSet::new().with(Assembly::GRCh37, InMemoryGenome::from_sequences([(c1, CHR1)]))
    }

    fn sbs(pos: u64, reference: &str, variant: &str) -> MutationRecord {
        MutationRecord::new(
            "s1",
            Chromosome::from_name("1").unwrap(),
            pos,
            reference,
            variant,
            MutationType::Sbs,
            Assembly::GRCh37,
        )
    }

    #[test]
    fn test_sbs_flanks() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        let flanks = resolver.resolve(&sbs(11, "C", "A")).unwrap();
        assert_eq!(flanks.five_prime, "AGGGGG");
        assert_eq!(flanks.three_prime, "TTTTTN");
    }

    #[test]
    fn test_flanks_clipped_at_chromosome_start() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        let flanks = resolver.resolve(&sbs(3, "A", "C")).unwrap();
        assert_eq!(flanks.five_prime, "AA");
        assert_eq!(flanks.three_prime, "AAGGGG");

        let flanks = resolver.resolve(&sbs(1, "A", "C")).unwrap();
        assert_eq!(flanks.five_prime, "");
    }

    #[test]
    fn test_flanks_clipped_at_chromosome_end() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        let flanks = resolver.resolve(&sbs(24, "C", "T")).unwrap();
        assert_eq!(flanks.three_prime, "GT");
    }

    #[test]
    fn test_indel_flank_width() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        let c1 = Chromosome::from_name("1").unwrap();
        let del = MutationRecord::new("s1", c1, 12, "TT", "-", MutationType::Del, Assembly::GRCh37);
        let flanks = resolver.resolve(&del).unwrap();
        assert_eq!(flanks.five_prime, "AAAAAGGGGGC");
        assert_eq!(flanks.five_prime.len(), 11);
        assert_eq!(flanks.three_prime, "TTTNCCCCCACG");
    }

    #[test]
    fn test_reference_mismatch_is_fatal() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        let err = resolver.resolve(&sbs(11, "T", "A")).unwrap_err();
        assert!(matches!(err, PreconditionError::ReferenceMismatch { found: 'C', .. }));

        // Disabled verification lets it through
        let lenient = FlankingSequenceResolver::new(&genomes).verify_reference(false);
        assert!(lenient.resolve(&sbs(11, "T", "A")).is_ok());
    }

    #[test]
    fn test_unknown_genome_base_accepted() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        assert!(resolver.resolve(&sbs(17, "G", "A")).is_ok());
    }

    #[test]
    fn test_minus_strand_rejected() {
        let genomes = genomes();
        let resolver = FlankingSequenceResolver::new(&genomes);
        let mut record = sbs(11, "C", "A");
        record.strand = Strand::Minus;
        assert_eq!(
            resolver.resolve(&record),
            Err(PreconditionError::NonPlusStrand('-'))
        );
    }
}
