use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use a2acl::{parse, ParseMode};

const IDENTIFIERS: &[&str] = &[
    "alice@example.com",
    "+pop3@example.com",
    "alice+vacation@example.com",
    "alice+vacation+strongsig+@example.com",
    "bob+project+team+sig+@deeply.nested.example.org",
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for input in IDENTIFIERS {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| parse(input.as_bytes(), ParseMode::Identifier).unwrap());
        });
    }
    group.finish();
}

fn bench_generalize(c: &mut Criterion) {
    c.bench_function("generalize_to_fixed_point", |b| {
        b.iter(|| {
            let mut id = parse(
                b"bob+project+team+sig+@deeply.nested.example.org",
                ParseMode::Identifier,
            )
            .unwrap();
            while id.generalize() {}
        });
    });
}

criterion_group!(benches, bench_parse, bench_generalize);
criterion_main!(benches);
