//! Count matrix construction
//!
//! Aggregates an extended mutation table into per-sample category counts,
//! either as sparse `(sample, category, count)` triples or as a dense
//! matrix whose columns are exactly a taxonomy's canonical label list.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::categories::Taxonomy;
use crate::core::columns;
use crate::core::is_missing;
use crate::core::MatrixError;
use crate::formats::ColumnTable;
use crate::pipeline::ExtendedTable;

/// One non-zero cell of a count matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTriple {
    pub sample: String,
    pub category: String,
    pub count: u64,
}

/// Dense sample x category count matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMatrix {
    /// Column labels, in canonical order
    pub categories: Vec<String>,
    /// Row labels, sorted
    pub samples: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<u64>>,
}

impl CountMatrix {
    /// Count for one cell; `None` if the sample or category is unknown
    pub fn get(&self, sample: &str, category: &str) -> Option<u64> {
        let row = self.samples.iter().position(|s| s == sample)?;
        let column = self.categories.iter().position(|c| c == category)?;
        Some(self.counts[row][column])
    }

    /// Counts for one sample, in column order
    pub fn row(&self, sample: &str) -> Option<&[u64]> {
        let row = self.samples.iter().position(|s| s == sample)?;
        Some(&self.counts[row])
    }

    /// Sum of all cells
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Output of the count builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Counts {
    Sparse(Vec<CountTriple>),
    Dense(CountMatrix),
}

impl Counts {
    /// Total number of counted mutations
    pub fn total(&self) -> u64 {
        match self {
            Counts::Sparse(triples) => triples.iter().map(|t| t.count).sum(),
            Counts::Dense(matrix) => matrix.total(),
        }
    }
}

/// The fields the builder reads from each row
struct CountRow<'a> {
    sample: &'a str,
    category: Option<&'a str>,
    reference: Option<&'a str>,
    variant: Option<&'a str>,
}

fn present(value: &str) -> Option<&str> {
    (!is_missing(value)).then_some(value)
}

/// Filter, group and count
///
/// Rows with a category outside `labels` are dropped first, then rows
/// with a missing variant, then rows with a missing reference.
fn aggregate<'a, I>(rows: I, category_column: &str, labels: &[String], sparse: bool) -> Counts
where
    I: Iterator<Item = CountRow<'a>>,
{
    let valid: HashSet<&str> = labels.iter().map(String::as_str).collect();
    let rows: Vec<CountRow<'a>> = rows.collect();

    let before = rows.len();
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|r| r.category.map_or(false, |c| valid.contains(c)))
        .collect();
    debug!(
        "Dropping {} rows because invalid value in {} column",
        before - rows.len(),
        category_column
    );

    let before = rows.len();
    let rows: Vec<_> = rows.into_iter().filter(|r| r.variant.is_some()).collect();
    debug!(
        "Dropping {} rows because NaN value in {} column",
        before - rows.len(),
        columns::VARIANT
    );

    let before = rows.len();
    let rows: Vec<_> = rows.into_iter().filter(|r| r.reference.is_some()).collect();
    debug!(
        "Dropping {} rows because NaN value in {} column",
        before - rows.len(),
        columns::REFERENCE
    );

    let mut grouped: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    // Rows without a sample never form a group
    for row in rows.iter().filter(|r| !is_missing(r.sample)) {
        if let Some(category) = row.category {
            *grouped.entry((row.sample, category)).or_insert(0) += 1;
        }
    }

    if sparse {
        return Counts::Sparse(
            grouped
                .into_iter()
                .map(|((sample, category), count)| CountTriple {
                    sample: sample.to_string(),
                    category: category.to_string(),
                    count,
                })
                .collect(),
        );
    }

    let column_of: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let mut samples: Vec<String> = Vec::new();
    let mut counts: Vec<Vec<u64>> = Vec::new();
    // BTreeMap iteration is sorted by sample first
    for ((sample, category), count) in grouped {
        if samples.last().map(String::as_str) != Some(sample) {
            samples.push(sample.to_string());
            counts.push(vec![0; labels.len()]);
        }
        if let (Some(&column), Some(row)) = (column_of.get(category), counts.last_mut()) {
            row[column] = count;
        }
    }

    Counts::Dense(CountMatrix {
        categories: labels.to_vec(),
        samples,
        counts,
    })
}

/// Build counts for one taxonomy from an extended table
pub fn build_count_matrix(
    table: &ExtendedTable,
    taxonomy: Taxonomy,
    sparse: bool,
) -> Result<Counts, MatrixError> {
    if !table.taxonomies.contains(&taxonomy) {
        return Err(MatrixError::MissingCategoryColumn(taxonomy.id().to_string()));
    }

    let rows = table.records.iter().map(|r| CountRow {
        sample: &r.record.sample,
        category: r.category(taxonomy),
        reference: present(&r.record.reference),
        variant: present(&r.record.variant),
    });
    Ok(aggregate(rows, taxonomy.id(), taxonomy.canonical_labels(), sparse))
}

/// Columns a generic table must carry besides the category column
const REQUIRED_COLUMNS: [&str; 11] = [
    columns::PATIENT,
    columns::SAMPLE,
    columns::CHROMOSOME,
    columns::START,
    columns::END,
    columns::TRANSCRIPTION_STRAND,
    columns::REFERENCE,
    columns::VARIANT,
    columns::FIVE_PRIME,
    columns::THREE_PRIME,
    columns::MUTATION_TYPE,
];

/// Check a table's header before any aggregation
pub fn validate_columns(table: &ColumnTable, category_column: &str) -> Result<(), MatrixError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(category_column))
        .filter(|c| table.column(c).is_none())
        .map(String::from)
        .collect();

    match missing.as_slice() {
        [] => Ok(()),
        [only] if only == category_column => {
            Err(MatrixError::MissingCategoryColumn(category_column.to_string()))
        }
        _ => Err(MatrixError::MissingColumns(missing)),
    }
}

/// Build counts from an extended table read back from disk
pub fn counts_from_table(
    table: &ColumnTable,
    category_column: &str,
    labels: &[String],
    sparse: bool,
) -> Result<Counts, MatrixError> {
    validate_columns(table, category_column)?;

    let column = |name: &str| {
        table
            .column(name)
            .ok_or_else(|| MatrixError::MissingColumns(vec![name.to_string()]))
    };
    let sample = column(columns::SAMPLE)?;
    let category = column(category_column)?;
    let reference = column(columns::REFERENCE)?;
    let variant = column(columns::VARIANT)?;

    let rows = table.rows().map(|row| CountRow {
        sample: row.get(sample).map(String::as_str).unwrap_or_default(),
        category: row.get(category).and_then(|v| present(v)),
        reference: row.get(reference).and_then(|v| present(v)),
        variant: row.get(variant).and_then(|v| present(v)),
    });
    Ok(aggregate(rows, category_column, labels, sparse))
}
