//! Doublet-base substitution categories

use crate::core::dna::{is_acgt, revcomp, BASES};
use crate::core::{ClassifyError, ClassifyResult, MutationContext};

/// Reference dinucleotides reported from the opposite strand
pub const NON_CANONICAL_REFERENCES: [&str; 6] = ["AA", "AG", "CA", "GA", "GG", "GT"];

/// Canonical reference dinucleotides, in list order
pub const CANONICAL_REFERENCES: [&str; 10] =
    ["AC", "AT", "CC", "CG", "CT", "GC", "TA", "TC", "TG", "TT"];

/// Variants of a self-complementary reference that read from the other strand
///
/// For each of these the reverse complement of the variant is the
/// canonical form, so only the reverse complement appears in the list.
const SELF_COMPLEMENTARY_FLIPS: [(&str, [&str; 3]); 4] = [
    ("AT", ["TG", "GG", "TC"]),
    ("TA", ["AG", "CC", "AC"]),
    ("CG", ["AC", "AA", "GA"]),
    ("GC", ["CT", "TT", "TG"]),
];

fn flips_variant(reference: &str, variant: &str) -> bool {
    SELF_COMPLEMENTARY_FLIPS
        .iter()
        .any(|(r, variants)| *r == reference && variants.contains(&variant))
}

fn canonical_reference(reference: &str) -> Option<String> {
    NON_CANONICAL_REFERENCES
        .contains(&reference)
        .then(|| revcomp(reference))
}

fn not_applicable(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyError {
    ClassifyError::NotApplicable {
        taxonomy,
        reference: context.reference.to_string(),
        variant: context.variant.to_string(),
    }
}

/// DBS-10: canonical reference dinucleotide only
pub fn reference_label(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyResult<String> {
    let reference = context.reference;
    if reference.len() != 2 {
        return Err(not_applicable(context, taxonomy));
    }
    let reference = canonical_reference(reference).unwrap_or_else(|| reference.to_string());
    Ok(format!("{}>NN", reference))
}

/// DBS-78: canonical reference and variant
pub fn substitution_label(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyResult<String> {
    let (reference, variant) = (context.reference, context.variant);
    if reference.len() != 2 || variant.len() != 2 {
        return Err(not_applicable(context, taxonomy));
    }
    if !is_acgt(reference) || !is_acgt(variant) {
        return Err(ClassifyError::InvalidAlleles {
            taxonomy,
            reference: reference.to_string(),
            variant: variant.to_string(),
        });
    }

    let (reference, variant) = match canonical_reference(reference) {
        Some(canonical) => (canonical, revcomp(variant)),
        None if flips_variant(reference, variant) => (reference.to_string(), revcomp(variant)),
        None => (reference.to_string(), variant.to_string()),
    };
    Ok(format!("{}>{}", reference, variant))
}

/// Canonical DBS-10 labels
pub fn reference_labels() -> Vec<String> {
    CANONICAL_REFERENCES
        .iter()
        .map(|r| format!("{}>NN", r))
        .collect()
}

/// Canonical DBS-78 labels
///
/// References in [`CANONICAL_REFERENCES`] order; for each, every variant
/// that changes both bases, in lexicographic order, minus the flipped
/// variants of self-complementary references.
pub fn substitution_labels() -> Vec<String> {
    let mut labels = Vec::with_capacity(78);
    for reference in CANONICAL_REFERENCES {
        let r = reference.as_bytes();
        for &first in BASES.iter().filter(|&&b| b != r[0]) {
            for &second in BASES.iter().filter(|&&b| b != r[1]) {
                let variant = format!("{}{}", first as char, second as char);
                if flips_variant(reference, &variant) {
                    continue;
                }
                labels.push(format!("{}>{}", reference, variant));
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ctx<'a>(r: &'a str, v: &'a str) -> MutationContext<'a> {
        MutationContext::new("", r, v, "")
    }

    #[test]
    fn test_canonical_reference_unchanged() {
        assert_eq!(substitution_label(&ctx("AC", "CT"), "DBS_78").unwrap(), "AC>CT");
        assert_eq!(reference_label(&ctx("AC", "CT"), "DBS_10").unwrap(), "AC>NN");
    }

    #[test]
    fn test_non_canonical_reference_flipped() {
        // GG>TT is CC>AA on the other strand
        assert_eq!(substitution_label(&ctx("GG", "TT"), "DBS_78").unwrap(), "CC>AA");
        assert_eq!(substitution_label(&ctx("CA", "TG"), "DBS_78").unwrap(), "TG>CA");
        assert_eq!(reference_label(&ctx("GT", "CA"), "DBS_10").unwrap(), "AC>NN");
    }

    #[test]
    fn test_self_complementary_variant_flipped() {
        assert_eq!(substitution_label(&ctx("AT", "TG"), "DBS_78").unwrap(), "AT>CA");
        assert_eq!(substitution_label(&ctx("CG", "AA"), "DBS_78").unwrap(), "CG>TT");
        assert_eq!(substitution_label(&ctx("AT", "CA"), "DBS_78").unwrap(), "AT>CA");
    }

    #[test]
    fn test_wrong_shape() {
        assert!(matches!(
            substitution_label(&ctx("A", "C"), "DBS_78"),
            Err(ClassifyError::NotApplicable { .. })
        ));
        assert!(matches!(
            substitution_label(&ctx("ACG", "TTT"), "DBS_78"),
            Err(ClassifyError::NotApplicable { .. })
        ));
        assert!(matches!(
            substitution_label(&ctx("AN", "CT"), "DBS_78"),
            Err(ClassifyError::InvalidAlleles { .. })
        ));
        assert!(reference_label(&ctx("ACG", "TT"), "DBS_10").is_err());
    }

    #[test]
    fn test_label_lists() {
        let dbs10 = reference_labels();
        assert_eq!(dbs10.len(), 10);
        assert_eq!(dbs10[0], "AC>NN");

        let dbs78 = substitution_labels();
        assert_eq!(dbs78.len(), 78);
        assert_eq!(dbs78.iter().collect::<HashSet<_>>().len(), 78);
        assert_eq!(dbs78[0], "AC>CA");
        assert_eq!(dbs78[77], "TT>GG");
        assert!(!dbs78.iter().any(|l| NON_CANONICAL_REFERENCES.contains(&&l[..2])));
    }

    #[test]
    fn test_every_doublet_lands_in_list() {
        let labels: HashSet<String> = substitution_labels().into_iter().collect();
        for r in crate::core::dna::kmers(2) {
            for v in crate::core::dna::kmers(2) {
                if r.as_bytes()[0] == v.as_bytes()[0] || r.as_bytes()[1] == v.as_bytes()[1] {
                    continue;
                }
                let label = substitution_label(&ctx(&r, &v), "DBS_78").unwrap();
                assert!(labels.contains(&label), "{}>{} gave {}", r, v, label);
            }
        }
    }
}
