//! Reference genome sequence access
//!
//! Two interchangeable backends implement [`ReferenceGenome`]:
//! [`InMemoryGenome`] parses a whole FASTA (optionally gzip/bzip2
//! compressed) into memory, [`IndexedFastaGenome`] memory-maps an
//! uncompressed FASTA and reads through its `.fai` index.
//! [`GenomeSet`] holds one backend per assembly and is what the
//! extension pipeline talks to through [`GenomeSequenceProvider`].
//!
//! All coordinates are 1-based, inclusive, on the plus strand.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::{debug, info};
use memmap2::Mmap;

use crate::core::error::{ParseError, ParseResult, PreconditionError};
use crate::core::io::{self, LineIterator};
use crate::core::record::{Assembly, Chromosome};

/// Sequence access for a single assembly
pub trait ReferenceGenome: Send + Sync {
    /// Length of a chromosome, `None` if it was not loaded
    fn length(&self, chromosome: Chromosome) -> Option<u64>;

    /// Upper-case bases `start..=end`; callers keep `1 <= start <= end <= length`
    fn fetch(&self, chromosome: Chromosome, start: u64, end: u64) -> Option<String>;
}

/// Sequence access across assemblies
pub trait GenomeSequenceProvider: Send + Sync {
    /// Bases `start..=end`, clipped to the chromosome
    ///
    /// A range that lies entirely outside the chromosome (or `start > end`)
    /// yields an empty string, so flanks near chromosome ends come back short
    /// rather than failing here.
    fn sequence(
        &self,
        assembly: Assembly,
        chromosome: Chromosome,
        start: u64,
        end: u64,
    ) -> Result<String, PreconditionError>;

    /// The single base at `position`
    fn base_at(
        &self,
        assembly: Assembly,
        chromosome: Chromosome,
        position: u64,
    ) -> Result<char, PreconditionError>;
}

/// Genomes keyed by assembly
#[derive(Default)]
pub struct GenomeSet {
    genomes: HashMap<Assembly, Box<dyn ReferenceGenome>>,
}

impl GenomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the genome for an assembly, replacing any previous one
    pub fn insert<G: ReferenceGenome + 'static>(&mut self, assembly: Assembly, genome: G) {
        self.genomes.insert(assembly, Box::new(genome));
    }

    pub fn with<G: ReferenceGenome + 'static>(mut self, assembly: Assembly, genome: G) -> Self {
        self.insert(assembly, genome);
        self
    }

    pub fn assemblies(&self) -> impl Iterator<Item = Assembly> + '_ {
        self.genomes.keys().copied()
    }

    fn genome(
        &self,
        assembly: Assembly,
        chromosome: Chromosome,
    ) -> Result<(&dyn ReferenceGenome, u64), PreconditionError> {
        let genome = self
            .genomes
            .get(&assembly)
            .ok_or(PreconditionError::UnknownAssembly {
                resource: "genome",
                assembly,
            })?;
        let length = genome
            .length(chromosome)
            .ok_or(PreconditionError::UnknownChromosome {
                assembly,
                chromosome,
            })?;
        Ok((genome.as_ref(), length))
    }
}

impl GenomeSequenceProvider for GenomeSet {
    fn sequence(
        &self,
        assembly: Assembly,
        chromosome: Chromosome,
        start: u64,
        end: u64,
    ) -> Result<String, PreconditionError> {
        let (genome, length) = self.genome(assembly, chromosome)?;
        let start = start.max(1);
        let end = end.min(length);
        if start > end {
            return Ok(String::new());
        }
        genome
            .fetch(chromosome, start, end)
            .ok_or(PreconditionError::OutOfBounds {
                chromosome,
                position: end,
                length,
            })
    }

    fn base_at(
        &self,
        assembly: Assembly,
        chromosome: Chromosome,
        position: u64,
    ) -> Result<char, PreconditionError> {
        let (genome, length) = self.genome(assembly, chromosome)?;
        let out_of_bounds = PreconditionError::OutOfBounds {
            chromosome,
            position,
            length,
        };
        if position == 0 || position > length {
            return Err(out_of_bounds);
        }
        genome
            .fetch(chromosome, position, position)
            .and_then(|s| s.chars().next())
            .ok_or(out_of_bounds)
    }
}

/// Whole-genome FASTA parsed into memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryGenome {
    sequences: HashMap<Chromosome, Vec<u8>>,
}

impl InMemoryGenome {
    /// Load a FASTA file; gzip and bzip2 are decompressed transparently
    ///
    /// Records whose names are not one of the 24 standard chromosomes
    /// (with or without a `chr` prefix) are skipped.
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParseError::FileNotFound(path.to_path_buf()));
        }
        debug!("Loading genome {:?}...", path);
        let genome = Self::from_reader(io::open_reader(path)?)?;
        info!(
            "Loaded {} chromosomes from {:?}",
            genome.sequences.len(),
            path
        );
        Ok(genome)
    }

    /// Parse FASTA from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> ParseResult<Self> {
        let mut sequences = HashMap::new();
        let mut current: Option<(Chromosome, Vec<u8>)> = None;
        let mut skipping = false;
        let mut lines = LineIterator::new(reader);
        let mut line_number = 0;

        while let Some(line) = lines.next_line() {
            let line = line?;
            line_number += 1;
            if let Some(header) = line.strip_prefix('>') {
                if let Some((chrom, seq)) = current.take() {
                    sequences.insert(chrom, seq);
                }
                let name = header.split_whitespace().next().unwrap_or("");
                match Chromosome::from_name(name) {
                    Some(chrom) => {
                        current = Some((chrom, Vec::new()));
                        skipping = false;
                    }
                    None => {
                        debug!("Skipping non-standard sequence '{}'", name);
                        skipping = true;
                    }
                }
            } else if let Some((_, seq)) = current.as_mut() {
                seq.extend(
                    line.bytes()
                        .filter(|b| !b.is_ascii_whitespace())
                        .map(|b| b.to_ascii_uppercase()),
                );
            } else if !skipping && !line.trim().is_empty() {
                return Err(ParseError::InvalidFasta(format!(
                    "sequence data before first header at line {}",
                    line_number
                )));
            }
        }
        if let Some((chrom, seq)) = current.take() {
            sequences.insert(chrom, seq);
        }
        Ok(Self { sequences })
    }

    /// Build directly from sequences (tests and small references)
    pub fn from_sequences<'a, I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (Chromosome, &'a str)>,
    {
        Self {
            sequences: sequences
                .into_iter()
                .map(|(c, s)| (c, s.bytes().map(|b| b.to_ascii_uppercase()).collect()))
                .collect(),
        }
    }
}

impl ReferenceGenome for InMemoryGenome {
    fn length(&self, chromosome: Chromosome) -> Option<u64> {
        self.sequences.get(&chromosome).map(|s| s.len() as u64)
    }

    fn fetch(&self, chromosome: Chromosome, start: u64, end: u64) -> Option<String> {
        let seq = self.sequences.get(&chromosome)?;
        if start == 0 || start > end || end as usize > seq.len() {
            return None;
        }
        String::from_utf8(seq[(start - 1) as usize..end as usize].to_vec()).ok()
    }
}

/// Index entry for a sequence in a FASTA file (one `.fai` line)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FaiEntry {
    length: u64,
    offset: u64,
    line_bases: u64,
    line_bytes: u64,
}

/// Random access into an uncompressed FASTA through its `.fai` index
pub struct IndexedFastaGenome {
    mmap: Mmap,
    index: HashMap<Chromosome, FaiEntry>,
}

impl IndexedFastaGenome {
    /// Open a FASTA, using `<path>.fai` when present or scanning otherwise
    pub fn open<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ParseError::FileNotFound(path.to_path_buf()));
        }
        if io::detect_compression(path)? != io::CompressionFormat::Plain {
            return Err(ParseError::InvalidFasta(format!(
                "{:?} is compressed; indexed access needs an uncompressed FASTA",
                path
            )));
        }
        let mmap = io::map_file(path)?;

        let fai_path = PathBuf::from(format!("{}.fai", path.display()));
        let index = if fai_path.exists() {
            debug!("Reading FASTA index {:?}", fai_path);
            load_fai(io::open_reader(&fai_path)?)?
        } else {
            debug!("No index for {:?}, scanning", path);
            scan_index(&mmap)?
        };
        info!("Indexed {} chromosomes in {:?}", index.len(), path);

        Ok(Self { mmap, index })
    }
}

impl ReferenceGenome for IndexedFastaGenome {
    fn length(&self, chromosome: Chromosome) -> Option<u64> {
        self.index.get(&chromosome).map(|e| e.length)
    }

    fn fetch(&self, chromosome: Chromosome, start: u64, end: u64) -> Option<String> {
        let entry = self.index.get(&chromosome)?;
        if start == 0 || start > end || end > entry.length {
            return None;
        }
        let data = &self.mmap[..];
        let mut out = String::with_capacity((end - start + 1) as usize);
        let mut pos = start - 1;
        while pos < end {
            let line = pos / entry.line_bases;
            let column = pos % entry.line_bases;
            let take = (entry.line_bases - column).min(end - pos);
            let from = (entry.offset + line * entry.line_bytes + column) as usize;
            let to = from + take as usize;
            if to > data.len() {
                return None;
            }
            out.extend(data[from..to].iter().map(|b| b.to_ascii_uppercase() as char));
            pos += take;
        }
        Some(out)
    }
}

fn load_fai<R: BufRead>(reader: R) -> ParseResult<HashMap<Chromosome, FaiEntry>> {
    let mut index = HashMap::new();
    let mut lines = LineIterator::new(reader);
    let mut line_number = 0;
    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return Err(ParseError::TooFewFields {
                line: line_number,
                expected: 5,
                found: fields.len(),
            });
        }
        let number = |i: usize, field: &'static str| -> ParseResult<u64> {
            fields[i].trim().parse().map_err(|_| ParseError::InvalidField {
                line: line_number,
                field,
                value: fields[i].to_string(),
            })
        };
        let entry = FaiEntry {
            length: number(1, "length")?,
            offset: number(2, "offset")?,
            line_bases: number(3, "line_bases")?,
            line_bytes: number(4, "line_bytes")?,
        };
        if entry.line_bases == 0 || entry.line_bytes < entry.line_bases {
            return Err(ParseError::InvalidFasta(format!(
                "bad index entry for '{}': line_bases={}, line_bytes={}",
                fields[0], entry.line_bases, entry.line_bytes
            )));
        }
        if let Some(chrom) = Chromosome::from_name(fields[0]) {
            index.insert(chrom, entry);
        }
    }
    Ok(index)
}

/// Build an index by scanning the mapped FASTA; assumes uniform line width
fn scan_index(data: &[u8]) -> ParseResult<HashMap<Chromosome, FaiEntry>> {
    let mut index = HashMap::new();
    let mut i = 0;

    while i < data.len() {
        if data[i] != b'>' {
            i += 1;
            continue;
        }
        let header_start = i + 1;
        while i < data.len() && data[i] != b'\n' {
            i += 1;
        }
        let header = std::str::from_utf8(&data[header_start..i])
            .map_err(|_| ParseError::InvalidFasta("invalid UTF-8 in header".to_string()))?;
        let name = header.split_whitespace().next().unwrap_or("").to_string();
        i += 1;
        let offset = i as u64;

        let first_line_start = i;
        while i < data.len() && data[i] != b'\n' && data[i] != b'\r' && data[i] != b'>' {
            i += 1;
        }
        let line_bases = (i - first_line_start) as u64;
        let mut line_bytes = line_bases;
        while i < data.len() && (data[i] == b'\r' || data[i] == b'\n') {
            line_bytes += 1;
            i += 1;
            if data[i - 1] == b'\n' {
                break;
            }
        }

        let mut length = line_bases;
        while i < data.len() && data[i] != b'>' {
            if data[i] != b'\n' && data[i] != b'\r' {
                length += 1;
            }
            i += 1;
        }

        if line_bases == 0 {
            continue;
        }
        if let Some(chrom) = Chromosome::from_name(&name) {
            index.insert(
                chrom,
                FaiEntry {
                    length,
                    offset,
                    line_bases,
                    line_bytes,
                },
            );
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FASTA: &str = ">chr1 test\nACGTA\nCGTAC\nGT\n>chrUn_random\nNNNN\n>2\nttttt\n";

    fn chrom(name: &str) -> Chromosome {
        Chromosome::from_name(name).unwrap()
    }

    fn write_fasta(content: &str) -> NamedTempFile {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(content.as_bytes()).unwrap();
        temp.flush().unwrap();
        temp
    }

    #[test]
    fn test_in_memory_parse() {
        let genome = InMemoryGenome::from_reader(FASTA.as_bytes()).unwrap();
        assert_eq!(genome.length(chrom("1")), Some(12));
        assert_eq!(genome.length(chrom("2")), Some(5));
        assert_eq!(genome.fetch(chrom("1"), 1, 5).as_deref(), Some("ACGTA"));
        assert_eq!(genome.fetch(chrom("1"), 5, 7).as_deref(), Some("ACG"));
        assert_eq!(genome.fetch(chrom("2"), 1, 2).as_deref(), Some("TT"));
        assert_eq!(genome.fetch(chrom("1"), 12, 13), None);
    }

    #[test]
    fn test_indexed_matches_in_memory() {
        let temp = write_fasta(FASTA);
        let indexed = IndexedFastaGenome::open(temp.path()).unwrap();
        let memory = InMemoryGenome::from_reader(FASTA.as_bytes()).unwrap();

        for (c, len) in [("1", 12u64), ("2", 5)] {
            assert_eq!(indexed.length(chrom(c)), Some(len));
            for start in 1..=len {
                for end in start..=len {
                    assert_eq!(
                        indexed.fetch(chrom(c), start, end),
                        memory.fetch(chrom(c), start, end),
                        "{}:{}-{}",
                        c,
                        start,
                        end
                    );
                }
            }
        }
    }

    #[test]
    fn test_indexed_with_fai() {
        let temp = write_fasta(">1\nACGTA\nCGTAC\nGT\n");
        let fai_path = format!("{}.fai", temp.path().display());
        std::fs::write(&fai_path, "1\t12\t3\t5\t6\n").unwrap();

        let genome = IndexedFastaGenome::open(temp.path()).unwrap();
        assert_eq!(genome.fetch(chrom("1"), 4, 9).as_deref(), Some("TACGTA"));
        std::fs::remove_file(&fai_path).unwrap();
    }

    #[test]
    fn test_genome_set_clipping() {
        let genomes = GenomeSet::new().with(
            Assembly::GRCh37,
            InMemoryGenome::from_sequences([(chrom("1"), "ACGTACGTAC")]),
        );
        let seq = genomes.sequence(Assembly::GRCh37, chrom("1"), 0, 3).unwrap();
        assert_eq!(seq, "ACG");
        let seq = genomes.sequence(Assembly::GRCh37, chrom("1"), 8, 20).unwrap();
        assert_eq!(seq, "TAC");
        let seq = genomes.sequence(Assembly::GRCh37, chrom("1"), 11, 20).unwrap();
        assert_eq!(seq, "");
        assert_eq!(genomes.base_at(Assembly::GRCh37, chrom("1"), 4).unwrap(), 'T');
    }

    #[test]
    fn test_genome_set_errors() {
        let genomes = GenomeSet::new().with(
            Assembly::GRCh37,
            InMemoryGenome::from_sequences([(chrom("1"), "ACGT")]),
        );
        assert!(matches!(
            genomes.base_at(Assembly::GRCh38, chrom("1"), 1),
            Err(PreconditionError::UnknownAssembly { .. })
        ));
        assert!(matches!(
            genomes.base_at(Assembly::GRCh37, chrom("2"), 1),
            Err(PreconditionError::UnknownChromosome { .. })
        ));
        assert!(matches!(
            genomes.base_at(Assembly::GRCh37, chrom("1"), 5),
            Err(PreconditionError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = InMemoryGenome::from_fasta("/nonexistent/genome.fa");
        assert!(matches!(result, Err(ParseError::FileNotFound(_))));
    }
}
