use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fragment_paste::{longest_common_substring, Assembler, AssemblyConfig, NullSink};
use std::time::Duration;

fn generate_tiled_reads(n: usize, read_len: usize, overlap_len: usize) -> Vec<String> {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    let bases = b"ACGT";
    let step = read_len - overlap_len;
    let genome: Vec<u8> = (0..read_len + step * (n - 1))
        .map(|_| bases[rng.gen_range(0..4)])
        .collect();

    let mut reads: Vec<String> = (0..n)
        .map(|i| String::from_utf8(genome[i * step..i * step + read_len].to_vec()).unwrap())
        .collect();
    reads.shuffle(&mut rng);
    reads
}

fn bench_longest_common_substring(c: &mut Criterion) {
    let mut group = c.benchmark_group("longest_common_substring");

    for len in [100, 500, 1000].iter() {
        let reads = generate_tiled_reads(2, *len, len * 3 / 4);
        group.bench_with_input(BenchmarkId::new("pair", len), &reads, |b, reads| {
            b.iter(|| {
                longest_common_substring(
                    black_box(reads[0].as_bytes()),
                    black_box(reads[1].as_bytes()),
                )
            });
        });
    }

    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for n in [10, 25, 50].iter() {
        let reads = generate_tiled_reads(*n, 300, 200);
        group.bench_with_input(BenchmarkId::new("shuffled_reads", n), &reads, |b, reads| {
            b.iter(|| {
                let mut assembler = Assembler::new(AssemblyConfig::default(), NullSink);
                for read in reads {
                    assembler.ingest(read.as_str());
                }
                assembler.finish()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_longest_common_substring, bench_assembly);
criterion_main!(benches);
