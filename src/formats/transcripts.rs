//! refFlat transcript annotation reader
//!
//! Tab-separated, no header. Columns used: 0 gene name, 2 chromosome
//! (UCSC `chr` style), 3 strand, 4 transcription start, 5 transcription
//! end. Positions are taken as written.

use std::path::Path;

use log::debug;

use super::split_tabs;
use crate::core::{
    open_reader, Chromosome, LineIterator, ParseError, ParseResult, Strand, TranscriptInterval,
    TranscriptStrandIndex,
};

const GENE: usize = 0;
const CHROM: usize = 2;
const STRAND: usize = 3;
const TX_START: usize = 4;
const TX_END: usize = 5;

fn parse_position(value: &str, line: usize, field: &'static str) -> ParseResult<u64> {
    value.trim().parse().map_err(|_| ParseError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}

/// Parse one refFlat line
///
/// Returns `Ok(None)` for transcripts on non-standard chromosomes
/// (alternate haplotypes, unplaced contigs, mitochondria).
pub fn parse_refflat_line(line: &str, line_number: usize) -> ParseResult<Option<TranscriptInterval>> {
    let fields = split_tabs(line);
    if fields.len() <= TX_END {
        return Err(ParseError::TooFewFields {
            line: line_number,
            expected: TX_END + 1,
            found: fields.len(),
        });
    }

    let Some(chromosome) = Chromosome::from_name(fields[CHROM]) else {
        return Ok(None);
    };
    let strand = fields[STRAND]
        .trim()
        .chars()
        .next()
        .and_then(Strand::from_char)
        .ok_or_else(|| ParseError::InvalidField {
            line: line_number,
            field: "strand",
            value: fields[STRAND].to_string(),
        })?;

    Ok(Some(TranscriptInterval {
        gene: fields[GENE].to_string(),
        chromosome,
        strand,
        start: parse_position(fields[TX_START], line_number, "txStart")?,
        end: parse_position(fields[TX_END], line_number, "txEnd")?,
    }))
}

/// Load a refFlat file into a strand index
pub fn read_transcripts<P: AsRef<Path>>(path: P) -> ParseResult<TranscriptStrandIndex> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ParseError::FileNotFound(path.to_path_buf()));
    }
    let mut lines = LineIterator::new(open_reader(path)?);
    let mut intervals = Vec::new();
    let mut dropped = 0;
    let mut line_number = 0;

    while let Some(line) = lines.next_line() {
        let line = line?;
        line_number += 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_refflat_line(line, line_number)? {
            Some(interval) => intervals.push(interval),
            None => dropped += 1,
        }
    }

    debug!(
        "Loaded {} transcripts from {}, dropped {} on non-standard chromosomes",
        intervals.len(),
        path.display(),
        dropped
    );
    Ok(TranscriptStrandIndex::from_intervals(intervals))
}
