//! Count matrix TSV writer

use std::io::{self, Write};

use crate::counts::Counts;

/// Write counts as TSV
///
/// Sparse output has columns `Sample`, the category column name and
/// `Count`. Dense output has a `Sample` column followed by one column per
/// canonical category.
pub fn write_counts<W: Write>(writer: &mut W, counts: &Counts, category_column: &str) -> io::Result<()> {
    match counts {
        Counts::Sparse(triples) => {
            writeln!(writer, "Sample\t{}\tCount", category_column)?;
            for t in triples {
                writeln!(writer, "{}\t{}\t{}", t.sample, t.category, t.count)?;
            }
        }
        Counts::Dense(matrix) => {
            write!(writer, "Sample")?;
            for category in &matrix.categories {
                write!(writer, "\t{}", category)?;
            }
            writeln!(writer)?;
            for (sample, row) in matrix.samples.iter().zip(&matrix.counts) {
                write!(writer, "{}", sample)?;
                for count in row {
                    write!(writer, "\t{}", count)?;
                }
                writeln!(writer)?;
            }
        }
    }
    writer.flush()
}
