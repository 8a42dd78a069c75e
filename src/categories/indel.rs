//! Insertion and deletion categories
//!
//! Two schemes are supported. The coarse 8-class scheme only looks at the
//! indel size. The 16/83-class scheme bins indels by the length of the
//! inserted or deleted sequence, the number of times it is repeated in the
//! adjacent reference, and for deletions outside repeats the length of
//! microhomology at the breakpoint.

use crate::core::dna::{complement_base, is_placeholder, is_purine, is_purine_allele, revcomp};
use crate::core::{ClassifyError, ClassifyResult, MutationContext};

/// Largest repeat count and indel length with their own bin
pub const MAX_BIN: usize = 5;

/// Coarse and fine labels from a single classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndelLabels {
    /// 16-class label (e.g. `DEL_T_1`)
    pub category: String,
    /// 83-class label (e.g. `DEL_T_1_5+`)
    pub subcategory: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndelKind {
    Insertion,
    Deletion,
}

impl IndelKind {
    fn prefix(self) -> &'static str {
        match self {
            IndelKind::Insertion => "INS",
            IndelKind::Deletion => "DEL",
        }
    }
}

/// `n`, or `5+` at the cap
fn bin(n: usize) -> String {
    if n == MAX_BIN {
        format!("{}+", n)
    } else {
        n.to_string()
    }
}

/// Bases equal to `base` at the start of `seq`
fn run_length(seq: impl Iterator<Item = u8>, base: u8) -> usize {
    seq.take_while(|&b| b == base).count()
}

/// Whole copies of `unit` at the start of `three` and the end of `five`
fn repeat_units(unit: &str, five: &str, three: &str) -> usize {
    let mut three_prime = 0;
    let mut five_prime = 0;
    let mut repeated = String::with_capacity(unit.len() * MAX_BIN);
    for i in 1..=MAX_BIN {
        repeated.push_str(unit);
        if three.starts_with(&repeated) {
            three_prime = i;
        } else {
            break;
        }
    }
    repeated.clear();
    for i in 1..=MAX_BIN {
        repeated.push_str(unit);
        if five.ends_with(&repeated) {
            five_prime = i;
        } else {
            break;
        }
    }
    three_prime + five_prime
}

/// Longest match between the deleted sequence and either breakpoint
///
/// The 3' side compares prefixes; the 5' side compares suffixes.
fn microhomology(deleted: &str, five: &str, three: &str) -> usize {
    let three_prime = deleted
        .bytes()
        .zip(three.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    let five_prime = deleted
        .bytes()
        .rev()
        .zip(five.bytes().rev())
        .take_while(|(a, b)| a == b)
        .count();
    three_prime.max(five_prime)
}

/// Classify an indel under the 16/83-class scheme
///
/// A single purine reference base is first reported from the opposite
/// strand. Single-base insertions of a purine are flipped a second time,
/// on the inserted base alone, before the homopolymer run is measured.
/// Both flanks must hold at least five copies' worth of the indel.
pub fn alexandrov_labels(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyResult<IndelLabels> {
    let mut reference = context.reference.to_string();
    let mut variant = context.variant.to_string();
    let mut five = context.five_prime.to_string();
    let mut three = context.three_prime.to_string();

    if is_purine_allele(&reference) {
        reference = revcomp(&reference);
        variant = revcomp(&variant);
        (five, three) = (revcomp(&three), revcomp(&five));
    }

    let (kind, mut sequence) = if is_placeholder(&reference) && !is_placeholder(&variant) {
        (IndelKind::Insertion, variant)
    } else if !is_placeholder(&reference) && is_placeholder(&variant) {
        (IndelKind::Deletion, reference)
    } else {
        return Err(ClassifyError::NotApplicable {
            taxonomy,
            reference: context.reference.to_string(),
            variant: context.variant.to_string(),
        });
    };

    let required = MAX_BIN * sequence.len();
    if five.len() < required || three.len() < required {
        return Err(ClassifyError::InsufficientFlank {
            required,
            five_prime: five.len(),
            three_prime: three.len(),
        });
    }

    if sequence.len() == 1 {
        if kind == IndelKind::Insertion && is_purine(sequence.as_bytes()[0]) {
            sequence = (complement_base(sequence.as_bytes()[0]) as char).to_string();
            (five, three) = (revcomp(&three), revcomp(&five));
        }
        let base = sequence.as_bytes()[0];
        let repeats =
            (run_length(three.bytes(), base) + run_length(five.bytes().rev(), base)).min(MAX_BIN);
        let category = format!("{}_{}_1", kind.prefix(), sequence);
        let subcategory = format!("{}_{}", category, bin(repeats));
        return Ok(IndelLabels {
            category,
            subcategory,
        });
    }

    let length = bin(sequence.len().min(MAX_BIN));
    let repeats = repeat_units(&sequence, &five, &three).min(MAX_BIN);

    if kind == IndelKind::Deletion && repeats == 0 {
        let overlap = microhomology(&sequence, &five, &three);
        let category = format!("DEL_MH_{}", length);
        let subcategory = format!("{}_{}", category, bin(overlap));
        return Ok(IndelLabels {
            category,
            subcategory,
        });
    }

    let category = format!("{}_repeats_{}", kind.prefix(), length);
    let subcategory = format!("{}_{}", category, bin(repeats));
    Ok(IndelLabels {
        category,
        subcategory,
    })
}

/// Classify an indel under the 8-class size scheme
pub fn haradhvala_label(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyResult<String> {
    let (reference, variant) = (context.reference, context.variant);
    let (kind, size) = if is_placeholder(reference) {
        (IndelKind::Insertion, variant.len())
    } else if is_placeholder(variant) {
        (IndelKind::Deletion, reference.len())
    } else if variant.len() > reference.len() {
        (IndelKind::Insertion, variant.len() - reference.len())
    } else if reference.len() > variant.len() {
        (IndelKind::Deletion, reference.len() - variant.len())
    } else {
        (IndelKind::Insertion, 0)
    };

    if size == 0 {
        return Err(ClassifyError::NotApplicable {
            taxonomy,
            reference: reference.to_string(),
            variant: variant.to_string(),
        });
    }
    Ok(format!("{}{}", kind.prefix(), size.min(4)))
}

/// Canonical 16-class labels
pub fn alexandrov_category_labels() -> Vec<String> {
    let mut labels = Vec::with_capacity(16);
    for prefix in ["INS", "DEL"] {
        labels.push(format!("{}_C_1", prefix));
        labels.push(format!("{}_T_1", prefix));
        for length in 2..=MAX_BIN {
            labels.push(format!("{}_repeats_{}", prefix, bin(length)));
        }
    }
    for length in 2..=MAX_BIN {
        labels.push(format!("DEL_MH_{}", bin(length)));
    }
    labels
}

/// Canonical 83-class labels
///
/// Microhomology bins run from 1 up to one less than the deletion length;
/// deletions of five or more bases get bins 1 through `5+`.
pub fn alexandrov_subcategory_labels() -> Vec<String> {
    let mut labels = Vec::with_capacity(83);
    for prefix in ["INS", "DEL"] {
        for base in ["C", "T"] {
            for repeats in 0..=MAX_BIN {
                labels.push(format!("{}_{}_1_{}", prefix, base, bin(repeats)));
            }
        }
        for length in 2..=MAX_BIN {
            for repeats in 0..=MAX_BIN {
                labels.push(format!("{}_repeats_{}_{}", prefix, bin(length), bin(repeats)));
            }
        }
    }
    for length in 2..=MAX_BIN {
        let longest = if length == MAX_BIN { MAX_BIN } else { length - 1 };
        for overlap in 1..=longest {
            labels.push(format!("DEL_MH_{}_{}", bin(length), bin(overlap)));
        }
    }
    labels
}

/// Canonical 8-class labels
pub fn haradhvala_labels() -> Vec<String> {
    ["INS", "DEL"]
        .iter()
        .flat_map(|prefix| (1..=4).map(move |size| format!("{}{}", prefix, size)))
        .collect()
}
