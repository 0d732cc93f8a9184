use balatro_seeker::config;
use balatro_seeker::filter::{compile, evaluate};
use balatro_seeker::pseudohash;
use balatro_seeker::rng::{next_random, Stream};
use balatro_seeker::seed::Seed;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_pseudohash(c: &mut Criterion) {
    c.bench_function("pseudohash", |b| {
        b.iter(|| pseudohash::pseudohash(black_box(b"Voucher1"), black_box(b"ALEEB")))
    });
}

fn bench_next_random(c: &mut Criterion) {
    let mut stream = Stream::from_key(b"Joker1", b"ALEEB");
    c.bench_function("next_random", |b| b.iter(|| next_random(black_box(&mut stream))));
}

fn bench_evaluate_seed(c: &mut Criterion) {
    let raw: config::RawFilterConfig = serde_json::from_str(
        r#"{"must":[{"type":"voucher","value":"Overstock","antes":[1]}],
            "should":[{"type":"joker","value":"anylegendary","antes":[1,2,3],"score":5}]}"#,
    )
    .unwrap();
    let filter = compile::compile(config::compile(raw).unwrap());
    let seed = Seed::from_str_exact("ALEEB").unwrap();
    c.bench_function("evaluate_seed", |b| {
        b.iter(|| evaluate::evaluate_seed(black_box(&filter), black_box(seed)))
    });
}

criterion_group!(benches, bench_pseudohash, bench_next_random, bench_evaluate_seed);
criterion_main!(benches);
