//! Mutation table TSV adapter
//!
//! Reads standardized mutation tables (header row with the standard column
//! names, any column order, extra columns ignored), writes extended tables,
//! and reads extended tables back as generic column tables for counting.

use std::io::{self, Write};
use std::path::Path;

use log::debug;

use super::split_tabs;
use crate::core::{
    columns, is_missing, open_reader, standardize, LineIterator, MutationRecord, ParseError,
    ParseResult, RawMutationRecord, MISSING_VALUE,
};
use crate::pipeline::ExtendedTable;

/// Column positions of a standardized mutation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationColumnIndices {
    pub sample: usize,
    pub chromosome: usize,
    pub start: usize,
    pub end: usize,
    pub reference: usize,
    pub variant: usize,
    pub mutation_type: usize,
    pub assembly: usize,
    pub patient: Option<usize>,
    pub cancer_type: Option<usize>,
    pub provenance: Option<usize>,
    pub cohort: Option<usize>,
    pub strand: Option<usize>,
    pub sequencing_strategy: Option<usize>,
}

impl MutationColumnIndices {
    /// Parse column indices from a header line
    pub fn from_header(header: &str, path: &Path) -> ParseResult<Self> {
        let names: Vec<&str> = split_tabs(header).into_iter().map(str::trim).collect();
        let optional = |name: &str| names.iter().position(|&c| c == name);
        let find_col = |name: &str| {
            optional(name).ok_or_else(|| ParseError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
        };

        Ok(Self {
            sample: find_col(columns::SAMPLE)?,
            chromosome: find_col(columns::CHROMOSOME)?,
            start: find_col(columns::START)?,
            end: find_col(columns::END)?,
            reference: find_col(columns::REFERENCE)?,
            variant: find_col(columns::VARIANT)?,
            mutation_type: find_col(columns::MUTATION_TYPE)?,
            assembly: find_col(columns::ASSEMBLY)?,
            patient: optional(columns::PATIENT),
            cancer_type: optional(columns::CANCER_TYPE),
            provenance: optional(columns::PROVENANCE),
            cohort: optional(columns::COHORT),
            strand: optional(columns::GENOMIC_STRAND),
            sequencing_strategy: optional(columns::SEQUENCING_STRATEGY),
        })
    }

    fn max_required(&self) -> usize {
        [
            self.sample,
            self.chromosome,
            self.start,
            self.end,
            self.reference,
            self.variant,
            self.mutation_type,
            self.assembly,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Parse one data line into a raw record
    pub fn parse_line(&self, line: &str, line_number: usize) -> ParseResult<RawMutationRecord> {
        let fields = split_tabs(line);
        let required = self.max_required() + 1;
        if fields.len() < required {
            return Err(ParseError::TooFewFields {
                line: line_number,
                expected: required,
                found: fields.len(),
            });
        }

        let cell = |index: usize| {
            fields
                .get(index)
                .map(|v| v.trim())
                .filter(|v| !is_missing(v))
                .map(String::from)
        };
        let optional_cell = |index: Option<usize>| index.and_then(cell);

        Ok(RawMutationRecord {
            line: line_number,
            patient: optional_cell(self.patient),
            sample: cell(self.sample),
            cancer_type: optional_cell(self.cancer_type),
            provenance: optional_cell(self.provenance),
            cohort: optional_cell(self.cohort),
            chromosome: cell(self.chromosome),
            start: cell(self.start),
            end: cell(self.end),
            reference: cell(self.reference),
            variant: cell(self.variant),
            strand: optional_cell(self.strand),
            sequencing_strategy: optional_cell(self.sequencing_strategy),
            mutation_type: cell(self.mutation_type),
            assembly: cell(self.assembly),
        })
    }
}

fn is_skippable(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}

/// Read a mutation table without standardizing it
pub fn read_raw_mutations<P: AsRef<Path>>(path: P) -> ParseResult<Vec<RawMutationRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ParseError::FileNotFound(path.to_path_buf()));
    }
    let mut lines = LineIterator::new(open_reader(path)?);
    let mut indices: Option<MutationColumnIndices> = None;
    let mut records = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if is_skippable(line) {
            continue;
        }
        match &indices {
            None => indices = Some(MutationColumnIndices::from_header(line, path)?),
            Some(idx) => records.push(idx.parse_line(line, line_number)?),
        }
    }

    if indices.is_none() {
        return Err(ParseError::MissingColumn {
            path: path.to_path_buf(),
            column: columns::CHROMOSOME.to_string(),
        });
    }
    debug!("Read {} mutation rows from {}", records.len(), path.display());
    Ok(records)
}

/// Read and standardize a mutation table
pub fn read_mutations<P: AsRef<Path>>(path: P) -> ParseResult<Vec<MutationRecord>> {
    standardize(read_raw_mutations(path)?)
}

fn or_missing(value: &str) -> &str {
    if value.is_empty() {
        MISSING_VALUE
    } else {
        value
    }
}

/// Write an extended table as TSV
///
/// Columns: the standard columns, the extension columns, then one column
/// per taxonomy named by its id. Missing values are written as `NaN`.
pub fn write_extended<W: Write>(writer: &mut W, table: &ExtendedTable) -> io::Result<()> {
    let mut header: Vec<&str> = columns::STANDARD.to_vec();
    header.extend(columns::EXTENSION);
    header.extend(table.taxonomies.iter().map(|t| t.id()));
    writeln!(writer, "{}", header.join("\t"))?;

    for extended in &table.records {
        let r = &extended.record;
        let start = r.start.to_string();
        let end = r.end.to_string();
        let strand = r.strand.to_char().to_string();
        let mut row: Vec<&str> = vec![
            or_missing(&r.patient),
            or_missing(&r.sample),
            or_missing(&r.cancer_type),
            or_missing(&r.provenance),
            or_missing(&r.cohort),
            r.chromosome.name(),
            start.as_str(),
            end.as_str(),
            or_missing(&r.reference),
            or_missing(&r.variant),
            strand.as_str(),
            or_missing(&r.sequencing_strategy),
            r.mutation_type.as_str(),
            r.assembly.as_str(),
            or_missing(&extended.five_prime),
            or_missing(&extended.three_prime),
            extended
                .transcription_strand
                .map_or(MISSING_VALUE, |s| s.as_str()),
        ];
        for &taxonomy in &table.taxonomies {
            row.push(extended.category(taxonomy).unwrap_or(MISSING_VALUE));
        }
        writeln!(writer, "{}", row.join("\t"))?;
    }
    writer.flush()
}

/// A header-indexed table of string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ColumnTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Index of a named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read any tab-separated table with a header row
pub fn read_table<P: AsRef<Path>>(path: P) -> ParseResult<ColumnTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ParseError::FileNotFound(path.to_path_buf()));
    }
    let mut lines = LineIterator::new(open_reader(path)?);
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if is_skippable(line) {
            continue;
        }
        let fields: Vec<String> = split_tabs(line).into_iter().map(|f| f.trim().to_string()).collect();
        match &header {
            None => header = Some(fields),
            Some(h) if fields.len() < h.len() => {
                return Err(ParseError::TooFewFields {
                    line: line_number,
                    expected: h.len(),
                    found: fields.len(),
                })
            }
            Some(_) => rows.push(fields),
        }
    }

    Ok(ColumnTable::new(header.unwrap_or_default(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::Taxonomy;
    use crate::core::{Assembly, Chromosome, ExtendedMutationRecord, MutationType, TranscriptionStrand};
    use crate::pipeline::ExtensionStats;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Patient\tSample\tCancer Type\tProvenance\tCohort\tChromosome\tStart Position\tEnd Position\tReference Sequence\tVariant Sequence\tGenomic Strand\tSequencing Strategy\tMutation Type\tAssembly Version";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(content.as_bytes()).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_header_indices() {
        let idx = MutationColumnIndices::from_header(HEADER, Path::new("x.tsv")).unwrap();
        assert_eq!(idx.chromosome, 5);
        assert_eq!(idx.assembly, 13);
        assert_eq!(idx.patient, Some(0));

        let err = MutationColumnIndices::from_header("Sample\tChromosome", Path::new("x.tsv")).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { ref column, .. } if column == "Start Position"));
    }

    #[test]
    fn test_read_mutations() {
        let content = format!(
            "{}\n\
             P2\tS2\tBRCA\tICGC\tC1\tchr1\t100\t100\tC\tT\t+\tWGS\tSBS\tGRCh37\n\
             P1\tS1\tBRCA\tICGC\tC1\t2\t50\t51\tAC\tGT\t+\tWGS\tDBS\tGRCh37\n\
             P1\tS1\tBRCA\tICGC\tC1\tNaN\t50\t50\tA\tG\t+\tWGS\tSBS\tGRCh37\n\
             P1\tS1\tBRCA\tICGC\tC1\tGL000191.1\t50\t50\tA\tG\t+\tWGS\tSBS\tGRCh37\n",
            HEADER
        );
        let temp = write_temp(&content);
        let raw = read_raw_mutations(temp.path()).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[2].chromosome, None);

        let records = read_mutations(temp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sample, "S1");
        assert_eq!(records[0].mutation_type, MutationType::Dbs);
        assert_eq!(records[1].chromosome, Chromosome::from_name("1").unwrap());
    }

    #[test]
    fn test_too_few_fields() {
        let content = format!("{}\nP1\tS1\tBRCA\n", HEADER);
        let temp = write_temp(&content);
        assert!(matches!(
            read_raw_mutations(temp.path()),
            Err(ParseError::TooFewFields { expected: 14, found: 3, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_mutations("/nonexistent/mutations.tsv"),
            Err(ParseError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_write_extended_and_read_back() {
        let chrom = Chromosome::from_name("X").unwrap();
        let table = ExtendedTable {
            taxonomies: vec![Taxonomy::Sbs96, Taxonomy::Dbs78],
            records: vec![ExtendedMutationRecord {
                record: MutationRecord::new("S1", chrom, 7, "C", "A", MutationType::Sbs, Assembly::GRCh38),
                five_prime: "ACGTAG".to_string(),
                three_prime: "TTTTTT".to_string(),
                transcription_strand: Some(TranscriptionStrand::Both),
                categories: vec![
                    (Taxonomy::Sbs96, Some("G[C>A]T".to_string())),
                    (Taxonomy::Dbs78, None),
                ],
            }],
            stats: ExtensionStats::default(),
        };

        let mut out = Vec::new();
        write_extended(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("5' Flanking Bases\t3' Flanking Bases\tTranscription Strand\tSBS_96\tDBS_78"));
        assert!(lines[1].ends_with("ACGTAG\tTTTTTT\t+,-\tG[C>A]T\tNaN"));

        let temp = write_temp(&text);
        let read = read_table(temp.path()).unwrap();
        assert_eq!(read.len(), 1);
        let sbs = read.column("SBS_96").unwrap();
        assert_eq!(read.rows().next().unwrap()[sbs], "G[C>A]T");
        assert_eq!(read.column(columns::CANCER_TYPE), Some(2));
        assert_eq!(read.rows().next().unwrap()[2], "NaN");
    }
}
