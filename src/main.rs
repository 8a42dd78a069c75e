//! MutationContext CLI entry point
//!
//! Extends mutation tables with flanking context and category labels, and
//! builds per-sample count matrices from extended tables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use mutation_context::core::{io, Assembly, GenomeSet, InMemoryGenome, IndexedFastaGenome, TranscriptIndexSet};
use mutation_context::formats;
use mutation_context::{counts_from_table, extend, ExtensionConfig, Taxonomy};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "mutation-context")]
#[command(about = "Mutation context classification for mutational signature analysis")]
#[command(version)]
#[command(author = "MutationContext Contributors")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add flanks, transcription strand and category columns to a mutation table
    Extend {
        /// Input mutation table (TSV, optionally gzip/bzip2 compressed)
        input: PathBuf,
        /// Output file (optional, stdout if not specified)
        output: Option<PathBuf>,
        /// Reference FASTA per assembly, as ASSEMBLY=PATH (repeatable)
        #[arg(long = "genome", value_name = "ASSEMBLY=PATH", value_parser = parse_assembly_path, required = true)]
        genomes: Vec<(Assembly, PathBuf)>,
        /// refFlat transcript annotation per assembly, as ASSEMBLY=PATH (repeatable)
        #[arg(long = "transcripts", value_name = "ASSEMBLY=PATH", value_parser = parse_assembly_path)]
        transcripts: Vec<(Assembly, PathBuf)>,
        /// Category columns to add (default: INDEL_Alexandrov2018_83, DBS_78, SBS_96)
        #[arg(long = "taxonomy", value_name = "ID")]
        taxonomies: Vec<Taxonomy>,
        /// Number of threads
        #[arg(short = 't', long, default_value = "1")]
        threads: usize,
        /// Skip checking the reference allele against the genome
        #[arg(long = "no-verify-reference")]
        no_verify_reference: bool,
        /// Abort instead of recording a missing label when flanks are too short
        #[arg(long = "strict-flanks")]
        strict_flanks: bool,
        /// Memory-map uncompressed FASTA files through their .fai index
        #[arg(long = "indexed-genome")]
        indexed_genome: bool,
    },

    /// Build a count matrix from an extended mutation table
    Counts {
        /// Extended mutation table
        input: PathBuf,
        /// Output file (optional, stdout if not specified)
        output: Option<PathBuf>,
        /// Category column to count
        #[arg(long = "taxonomy", value_name = "ID")]
        taxonomy: Taxonomy,
        /// Emit (sample, category, count) triples instead of a dense matrix
        #[arg(long)]
        sparse: bool,
    },

    /// Print the canonical category labels of a taxonomy
    Categories {
        /// Taxonomy identifier, e.g. SBS_96 or INDEL_Alexandrov2018_83
        taxonomy: Taxonomy,
    },
}

fn parse_assembly_path(value: &str) -> Result<(Assembly, PathBuf), String> {
    let (assembly, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ASSEMBLY=PATH, got '{}'", value))?;
    let assembly =
        Assembly::from_name(assembly).ok_or_else(|| format!("unknown assembly '{}'", assembly))?;
    Ok((assembly, PathBuf::from(path)))
}

fn open_output(output: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(
            io::create_writer(path).with_context(|| format!("Failed to create {:?}", path))?,
        ),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    })
}

fn load_genomes(genomes: &[(Assembly, PathBuf)], indexed: bool) -> anyhow::Result<GenomeSet> {
    let mut set = GenomeSet::new();
    for (assembly, path) in genomes {
        let start = Instant::now();
        eprintln!("Loading {} genome: {:?}", assembly, path);
        if indexed {
            let genome = IndexedFastaGenome::open(path)
                .with_context(|| format!("Failed to open genome {:?}", path))?;
            set.insert(*assembly, genome);
        } else {
            let genome = InMemoryGenome::from_fasta(path)
                .with_context(|| format!("Failed to load genome {:?}", path))?;
            set.insert(*assembly, genome);
        }
        eprintln!("Genome loaded in {:.2}s", start.elapsed().as_secs_f64());
    }
    Ok(set)
}

fn load_transcripts(transcripts: &[(Assembly, PathBuf)]) -> anyhow::Result<TranscriptIndexSet> {
    let mut set = TranscriptIndexSet::new();
    for (assembly, path) in transcripts {
        eprintln!("Loading {} transcripts: {:?}", assembly, path);
        let index = formats::read_transcripts(path)
            .with_context(|| format!("Failed to load transcripts {:?}", path))?;
        set.insert(*assembly, index);
    }
    Ok(set)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    let start = Instant::now();

    match cli.command {
        Commands::Extend {
            input,
            output,
            genomes,
            transcripts,
            taxonomies,
            threads,
            no_verify_reference,
            strict_flanks,
            indexed_genome,
        } => {
            let genomes = load_genomes(&genomes, indexed_genome)?;
            let transcripts = load_transcripts(&transcripts)?;

            let mut config = ExtensionConfig::new()
                .threads(threads)
                .verify_reference(!no_verify_reference)
                .abort_on_insufficient_flank(strict_flanks);
            if !taxonomies.is_empty() {
                config = config.taxonomies(taxonomies);
            }

            eprintln!("Extending mutation table: {:?}", input);
            let records = formats::read_mutations(&input)
                .with_context(|| format!("Failed to read mutations {:?}", input))?;
            let table = extend(&records, &config, &genomes, &transcripts)?;

            let mut writer = open_output(output.as_ref())?;
            formats::write_extended(&mut writer, &table)?;

            let stats = &table.stats;
            eprintln!("\n=== Extension Statistics ===");
            eprintln!("Total records:   {}", stats.total);
            eprintln!("Labels assigned: {}", stats.classified);
            eprintln!("Not applicable:  {}", stats.not_applicable);
            eprintln!("Failed:          {}", stats.failed);
            eprintln!("  - Short flank: {}", stats.insufficient_flank);
            eprintln!("No strand:       {}", stats.strand_missing);
            eprintln!("Both strands:    {}", stats.strand_ambiguous);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Counts {
            input,
            output,
            taxonomy,
            sparse,
        } => {
            eprintln!("Counting {} categories: {:?}", taxonomy, input);
            let table = formats::read_table(&input)
                .with_context(|| format!("Failed to read table {:?}", input))?;
            let counts = counts_from_table(&table, taxonomy.id(), taxonomy.canonical_labels(), sparse)?;

            let mut writer = open_output(output.as_ref())?;
            formats::write_counts(&mut writer, &counts, taxonomy.id())?;

            eprintln!("\n=== Count Statistics ===");
            eprintln!("Rows read:       {}", table.len());
            eprintln!("Mutations:       {}", counts.total());
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Categories { taxonomy } => {
            let mut writer = open_output(None)?;
            for label in taxonomy.canonical_labels() {
                writeln!(writer, "{}", label)?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}
