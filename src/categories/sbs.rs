//! Single-base substitution categories
//!
//! SBS-6, SBS-96 and SBS-1536 share one labelling routine that differs only
//! in how many flanking bases it keeps on each side. SBS-12 and SBS-192 are
//! reported relative to the transcribed strand instead of the pyrimidine
//! reference.

use crate::core::dna::{complement_base, is_base, is_purine, kmers, revcomp};
use crate::core::{ClassifyError, ClassifyResult, MutationContext, TranscriptionStrand};

/// Pyrimidine-reference substitutions, in canonical list order
pub const SUBSTITUTIONS: [(u8, u8); 6] = [
    (b'C', b'A'),
    (b'C', b'G'),
    (b'C', b'T'),
    (b'T', b'A'),
    (b'T', b'C'),
    (b'T', b'G'),
];

/// Transcribed-strand substitutions, in canonical list order
pub const STRANDED_SUBSTITUTIONS: [(u8, u8); 12] = [
    (b'C', b'A'),
    (b'C', b'G'),
    (b'C', b'T'),
    (b'T', b'A'),
    (b'T', b'C'),
    (b'T', b'G'),
    (b'G', b'A'),
    (b'G', b'C'),
    (b'G', b'T'),
    (b'A', b'C'),
    (b'A', b'G'),
    (b'A', b'T'),
];

/// Last `k` bases of the 5' flank and first `k` of the 3' flank
fn trimmed_flanks<'a>(context: &MutationContext<'a>, k: usize) -> ClassifyResult<(&'a str, &'a str)> {
    let five = context.five_prime;
    let three = context.three_prime;
    let insufficient = || ClassifyError::InsufficientFlank {
        required: k,
        five_prime: five.len(),
        three_prime: three.len(),
    };
    if five.len() < k || three.len() < k {
        return Err(insufficient());
    }
    let five = five.get(five.len() - k..).ok_or_else(insufficient)?;
    let three = three.get(..k).ok_or_else(insufficient)?;
    Ok((five, three))
}

/// Reference and variant as a pair of single unambiguous bases
fn single_bases(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyResult<(u8, u8)> {
    match (context.reference.as_bytes(), context.variant.as_bytes()) {
        ([r], [v]) if is_base(*r) && is_base(*v) => Ok((*r, *v)),
        _ => Err(ClassifyError::InvalidAlleles {
            taxonomy,
            reference: context.reference.to_string(),
            variant: context.variant.to_string(),
        }),
    }
}

/// Label a substitution with `k` flanking bases on each side
///
/// A purine reference is reported from the opposite strand: both alleles
/// are complemented and the flanks are reverse-complemented and swapped.
/// With `k == 0` the label is the bare substitution (`C>A`).
pub fn context_label(
    context: &MutationContext<'_>,
    k: usize,
    taxonomy: &'static str,
) -> ClassifyResult<String> {
    let (mut reference, mut variant) = single_bases(context, taxonomy)?;
    let (five, three) = trimmed_flanks(context, k)?;

    let (five, three) = if is_purine(reference) {
        reference = complement_base(reference);
        variant = complement_base(variant);
        (revcomp(three), revcomp(five))
    } else {
        (five.to_string(), three.to_string())
    };

    if k == 0 {
        return Ok(format!("{}>{}", reference as char, variant as char));
    }
    Ok(format!(
        "{}[{}>{}]{}",
        five, reference as char, variant as char, three
    ))
}

/// SBS-12: substitution on the transcribed strand
///
/// `None` when the transcription strand is unknown or ambiguous.
pub fn stranded_label(context: &MutationContext<'_>, taxonomy: &'static str) -> ClassifyResult<Option<String>> {
    let (reference, variant) = single_bases(context, taxonomy)?;
    let label = match context.transcription_strand {
        Some(TranscriptionStrand::Plus) => (reference, variant),
        Some(TranscriptionStrand::Minus) => (complement_base(reference), complement_base(variant)),
        Some(TranscriptionStrand::Both) | None => return Ok(None),
    };
    Ok(Some(format!("{}>{}", label.0 as char, label.1 as char)))
}

/// SBS-192: transcribed-strand substitution with one flanking base
///
/// `None` when the transcription strand is unknown or ambiguous.
pub fn stranded_context_label(
    context: &MutationContext<'_>,
    taxonomy: &'static str,
) -> ClassifyResult<Option<String>> {
    let (reference, variant) = single_bases(context, taxonomy)?;
    let (five, three) = trimmed_flanks(context, 1)?;
    let label = match context.transcription_strand {
        Some(TranscriptionStrand::Plus) => format!(
            "{}[{}>{}]{}",
            five, reference as char, variant as char, three
        ),
        Some(TranscriptionStrand::Minus) => format!(
            "{}[{}>{}]{}",
            revcomp(three),
            complement_base(reference) as char,
            complement_base(variant) as char,
            revcomp(five)
        ),
        Some(TranscriptionStrand::Both) | None => return Ok(None),
    };
    Ok(Some(label))
}

/// Canonical labels for the pyrimidine-reference schemes
///
/// Substitution varies slowest, then the 5' context, then the 3' context.
pub fn context_labels(k: usize) -> Vec<String> {
    let contexts = kmers(k);
    let mut labels = Vec::with_capacity(SUBSTITUTIONS.len() * contexts.len() * contexts.len());
    for &(reference, variant) in &SUBSTITUTIONS {
        if k == 0 {
            labels.push(format!("{}>{}", reference as char, variant as char));
            continue;
        }
        for five in &contexts {
            for three in &contexts {
                labels.push(format!(
                    "{}[{}>{}]{}",
                    five, reference as char, variant as char, three
                ));
            }
        }
    }
    labels
}

/// Canonical SBS-12 labels
pub fn stranded_labels() -> Vec<String> {
    STRANDED_SUBSTITUTIONS
        .iter()
        .map(|&(r, v)| format!("{}>{}", r as char, v as char))
        .collect()
}

/// Canonical SBS-192 labels
pub fn stranded_context_labels() -> Vec<String> {
    let contexts = kmers(1);
    let mut labels = Vec::with_capacity(STRANDED_SUBSTITUTIONS.len() * 16);
    for &(reference, variant) in &STRANDED_SUBSTITUTIONS {
        for five in &contexts {
            for three in &contexts {
                labels.push(format!(
                    "{}[{}>{}]{}",
                    five, reference as char, variant as char, three
                ));
            }
        }
    }
    labels
}
