//! DNA sequence utilities
//!
//! Provides base complementing, reverse complement, and the fixed
//! base tables used by every classification scheme.

/// The four unambiguous bases in canonical order
pub const BASES: [u8; 4] = *b"ACGT";

/// Placeholder allele used for the empty side of an insertion or deletion
pub const INDEL_PLACEHOLDER: &str = "-";

/// Complement a single DNA base
///
/// Supports standard bases (A, T, G, C) and IUPAC ambiguity codes.
/// Returns the same character for non-DNA characters, so the indel
/// placeholder `-` survives a reverse complement unchanged.
#[inline]
pub fn complement_base(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'G' => b'C',
        b'C' => b'G',
        b'a' => b't',
        b't' => b'a',
        b'g' => b'c',
        b'c' => b'g',
        b'R' => b'Y',
        b'Y' => b'R',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        // S, W, N and anything else map to themselves
        _ => base,
    }
}

/// Compute the reverse complement of a DNA sequence
///
/// # Examples
/// ```
/// use mutation_context::core::dna::revcomp;
///
/// assert_eq!(revcomp("AACGT"), "ACGTT");
/// assert_eq!(revcomp("ATGC"), "GCAT");
/// assert_eq!(revcomp("-"), "-");
/// assert_eq!(revcomp(""), "");
/// ```
pub fn revcomp(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(complement_base)
        .map(|b| b as char)
        .collect()
}

/// Check if a byte is one of A, C, G, T
#[inline]
pub fn is_base(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Check if a byte is a purine (A or G)
#[inline]
pub fn is_purine(base: u8) -> bool {
    matches!(base, b'A' | b'G')
}

/// Check if a string consists only of A, C, G, T (and is non-empty)
///
/// # Examples
/// ```
/// use mutation_context::core::dna::is_acgt;
///
/// assert!(is_acgt("ACGT"));
/// assert!(!is_acgt("ACGN"));
/// assert!(!is_acgt(""));
/// ```
pub fn is_acgt(seq: &str) -> bool {
    !seq.is_empty() && seq.bytes().all(is_base)
}

/// Single-base allele that is a purine
///
/// Only single-base alleles take part in pyrimidine canonicalization;
/// `"AG"` is not a purine allele.
#[inline]
pub fn is_purine_allele(allele: &str) -> bool {
    allele.len() == 1 && is_purine(allele.as_bytes()[0])
}

/// Check whether an allele is the empty side of an indel
#[inline]
pub fn is_placeholder(allele: &str) -> bool {
    allele == INDEL_PLACEHOLDER || allele.is_empty()
}

/// Every string of length `k` over [`BASES`], in lexicographic order
pub fn kmers(k: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    for _ in 0..k {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                BASES.iter().map(move |&b| {
                    let mut s = prefix.clone();
                    s.push(b as char);
                    s
                })
            })
            .collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_base_standard() {
        assert_eq!(complement_base(b'A'), b'T');
        assert_eq!(complement_base(b'T'), b'A');
        assert_eq!(complement_base(b'G'), b'C');
        assert_eq!(complement_base(b'C'), b'G');
    }

    #[test]
    fn test_complement_base_passthrough() {
        assert_eq!(complement_base(b'N'), b'N');
        assert_eq!(complement_base(b'-'), b'-');
        assert_eq!(complement_base(b'R'), b'Y');
    }

    #[test]
    fn test_revcomp_basic() {
        assert_eq!(revcomp("AACGT"), "ACGTT");
        assert_eq!(revcomp("GT"), "AC");
        assert_eq!(revcomp("A"), "T");
        assert_eq!(revcomp(""), "");
    }

    #[test]
    fn test_purines() {
        assert!(is_purine(b'A'));
        assert!(is_purine(b'G'));
        assert!(!is_purine(b'C'));
        assert!(!is_purine(b'T'));
        assert!(is_purine_allele("G"));
        assert!(!is_purine_allele("AG"));
        assert!(!is_purine_allele("-"));
    }

    #[test]
    fn test_placeholder() {
        assert!(is_placeholder("-"));
        assert!(is_placeholder(""));
        assert!(!is_placeholder("A"));
    }

    #[test]
    fn test_kmers() {
        assert_eq!(kmers(0), vec![String::new()]);
        assert_eq!(kmers(1), vec!["A", "C", "G", "T"]);
        let two = kmers(2);
        assert_eq!(two.len(), 16);
        assert_eq!(two[0], "AA");
        assert_eq!(two[1], "AC");
        assert_eq!(two[15], "TT");
    }
}
