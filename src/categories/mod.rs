//! Mutation category classification
//!
//! Pure functions mapping a mutation's alleles, flanks and transcription
//! strand to a category label under a chosen [`Taxonomy`], plus the
//! canonical label list of every taxonomy.

pub mod dbs;
pub mod indel;
pub mod sbs;
mod taxonomy;

pub use indel::IndelLabels;
pub use taxonomy::Taxonomy;

use crate::core::{ClassifyResult, ExtendedMutationRecord};

/// Classify an extended record under a taxonomy
///
/// Returns `Ok(None)` when the taxonomy does not apply to the record's
/// mutation type, or when a stranded taxonomy has no usable strand.
///
/// # Examples
/// ```
/// use mutation_context::categories::{classify, Taxonomy};
/// use mutation_context::core::{Assembly, Chromosome, ExtendedMutationRecord, MutationRecord, MutationType};
///
/// let chrom = Chromosome::from_name("1").unwrap();
/// let record = ExtendedMutationRecord {
///     record: MutationRecord::new("s1", chrom, 100, "C", "A", MutationType::Sbs, Assembly::GRCh37),
///     five_prime: "AAAAAG".to_string(),
///     three_prime: "TCCCCC".to_string(),
///     transcription_strand: None,
///     categories: Vec::new(),
/// };
/// assert_eq!(classify(Taxonomy::Sbs96, &record).unwrap().as_deref(), Some("G[C>A]T"));
/// assert_eq!(classify(Taxonomy::Dbs78, &record).unwrap(), None);
/// ```
pub fn classify(taxonomy: Taxonomy, record: &ExtendedMutationRecord) -> ClassifyResult<Option<String>> {
    if !taxonomy.applies_to(record.record.mutation_type) {
        return Ok(None);
    }
    taxonomy.classify(&record.context())
}

/// The canonical ordered label list of a taxonomy
pub fn canonical_labels(taxonomy: Taxonomy) -> &'static [String] {
    taxonomy.canonical_labels()
}
