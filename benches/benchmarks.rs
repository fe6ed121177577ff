#[macro_use]
extern crate criterion;

use criterion::Criterion;
use fastq_signature::identity::{extract_identity, ExtractMode};
use fastq_signature::read_name::classify;
use fastq_signature::scan::scan_fastq;

const HEADERS: [&str; 5] = [
    "@A00123:8:HFWH3DSXX:4:1101:1000:1000 2:N:0:GCATAAGCTT+GGCGACGGAA",
    "@INSTR1:1:FC1:1:1101:1000:2000/2 2:N:0:ACGT",
    "@SRR1234567.1.2 INSTR1:1:FC1:1:1101:1000:2000/2",
    "@INSTR1:1:FC1:1:1101:1000:2000",
    "@HWUSI-EAS100R:6:73:941:1973#0/1",
];

fn synthetic_fastq(reads: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..reads {
        data.extend_from_slice(
            format!(
                "@A00123:8:HFWH3DSXX:{}:1101:{}:1000 1:N:0:GCATAAGCTT\nACGTACGTACGTACGTACGT\n+\nFFFFFFFFFFFFFFFFFFFF\n",
                i % 4 + 1,
                i
            )
            .as_bytes(),
        );
    }
    data
}

fn run_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench-read-name");
    group.bench_function("classify", |b| {
        b.iter(|| HEADERS.iter().map(|h| classify(h)).count())
    });
    group.bench_function("extract", |b| {
        b.iter(|| {
            HEADERS
                .iter()
                .map(|h| extract_identity(h, ExtractMode::Normal))
                .count()
        })
    });
    group.finish();

    let data = synthetic_fastq(10_000);
    c.bench_function("scan-10k-reads", |b| b.iter(|| scan_fastq(&data[..], None)));
}

criterion_group!(benches, run_benchmark);

criterion_main!(benches);
