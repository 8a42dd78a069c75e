//! File format adapters
//!
//! Adapters for the tab-separated tables at the edges of the pipeline:
//! standardized and extended mutation tables, refFlat transcript
//! annotations, and count matrices.

pub mod matrix;
pub mod mutations;
pub mod transcripts;

use memchr::memchr_iter;

pub use matrix::write_counts;
pub use mutations::{
    read_mutations, read_raw_mutations, read_table, write_extended, ColumnTable,
    MutationColumnIndices,
};
pub use transcripts::{parse_refflat_line, read_transcripts};

/// Split a line on tabs
pub(crate) fn split_tabs(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(16);
    let mut start = 0;
    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[start..tab]);
        start = tab + 1;
    }
    fields.push(&line[start..]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tabs() {
        assert_eq!(split_tabs("a\tb\tc"), ["a", "b", "c"]);
        assert_eq!(split_tabs("a\t\tc"), ["a", "", "c"]);
        assert_eq!(split_tabs("a\t"), ["a", ""]);
        assert_eq!(split_tabs(""), [""]);
    }
}
