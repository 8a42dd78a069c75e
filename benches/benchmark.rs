//! Performance benchmarks for MutationContext
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mutation_context::core::dna::revcomp;
use mutation_context::core::{
    Assembly, Chromosome, GenomeSet, InMemoryGenome, MutationContext, MutationRecord, MutationType,
    Strand, TranscriptIndexSet, TranscriptInterval, TranscriptStrandIndex,
};
use mutation_context::{extend, ExtensionConfig, Taxonomy};

fn chr1() -> Chromosome {
    Chromosome::from_name("1").unwrap()
}

/// Deterministic pseudo-random sequence
fn synthetic_sequence(len: usize, seed: u64) -> String {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize] as char
        })
        .collect()
}

/// Overlapping transcripts of varied length, alternating strands
fn synthetic_index(count: u64) -> TranscriptStrandIndex {
    TranscriptStrandIndex::from_intervals((0..count).map(|i| TranscriptInterval {
        gene: format!("G{}", i),
        chromosome: chr1(),
        strand: if i % 2 == 0 { Strand::Plus } else { Strand::Minus },
        start: i * 1_000 + 1,
        end: i * 1_000 + 1 + (i % 7) * 5_000 + 2_000,
    }))
}

/// Benchmark one label per taxonomy
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let sbs = MutationContext::new("TTTTTTGA", "G", "T", "CAAAAAAA");
    for taxonomy in [Taxonomy::Sbs6, Taxonomy::Sbs96, Taxonomy::Sbs1536] {
        group.bench_with_input(BenchmarkId::from_parameter(taxonomy), &sbs, |b, ctx| {
            b.iter(|| black_box(taxonomy.classify(black_box(ctx))))
        });
    }

    let dbs = MutationContext::new("", "GG", "TT", "");
    group.bench_with_input(BenchmarkId::from_parameter(Taxonomy::Dbs78), &dbs, |b, ctx| {
        b.iter(|| black_box(Taxonomy::Dbs78.classify(black_box(ctx))))
    });

    let five = synthetic_sequence(60, 1);
    let three = format!("ACGACGACG{}", synthetic_sequence(51, 2));
    let indel = MutationContext::new(&five, "ACG", "-", &three);
    group.bench_with_input(
        BenchmarkId::from_parameter(Taxonomy::IndelAlexandrov83),
        &indel,
        |b, ctx| b.iter(|| black_box(Taxonomy::IndelAlexandrov83.classify(black_box(ctx)))),
    );

    group.finish();
}

/// Benchmark transcription strand lookup
fn bench_strand_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("strand_lookup");

    for count in [1_000u64, 10_000, 100_000].iter() {
        let index = synthetic_index(*count);
        let span = count * 1_000;
        group.bench_with_input(BenchmarkId::from_parameter(count), &index, |b, index| {
            let mut position = 1;
            b.iter(|| {
                position = (position * 7_919 + 13) % span + 1;
                black_box(index.strand(chr1(), black_box(position), Strand::Plus))
            })
        });
    }

    group.finish();
}

/// Benchmark the full extension pass
fn bench_extend(c: &mut Criterion) {
    let sequence = synthetic_sequence(1_000_000, 42);
    let genomes = GenomeSet::new().with(
        Assembly::GRCh38,
        InMemoryGenome::from_sequences([(chr1(), sequence.as_str())]),
    );
    let transcripts = TranscriptIndexSet::new().with(Assembly::GRCh38, synthetic_index(900));

    let records: Vec<MutationRecord> = (0..10_000u64)
        .map(|i| {
            let position = 100 + i * 97;
            let reference = &sequence[(position - 1) as usize..position as usize];
            let variant = if reference == "A" { "C" } else { "A" };
            MutationRecord::new(
                "s1",
                chr1(),
                position,
                reference,
                variant,
                MutationType::Sbs,
                Assembly::GRCh38,
            )
        })
        .collect();

    let mut group = c.benchmark_group("extend");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.sample_size(20);

    for threads in [1usize, 4].iter() {
        let config = ExtensionConfig::default().threads(*threads);
        group.bench_with_input(BenchmarkId::from_parameter(threads), &config, |b, config| {
            b.iter(|| black_box(extend(&records, config, &genomes, &transcripts)))
        });
    }

    group.finish();
}

/// Benchmark reverse complement
fn bench_revcomp(c: &mut Criterion) {
    let mut group = c.benchmark_group("revcomp");

    for len in [6usize, 60, 600].iter() {
        let seq = synthetic_sequence(*len, 7);
        group.throughput(Throughput::Bytes(seq.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &seq, |b, seq| {
            b.iter(|| black_box(revcomp(black_box(seq))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_classify,
    bench_strand_lookup,
    bench_extend,
    bench_revcomp,
);

criterion_main!(benches);
