//! PLL divisor search benchmarks.

use bsp_clock::{MHZ, PllDivisors};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Common display pixel clocks plus the fixed bus PLL rates.
const RATES: [u32; 6] = [
    25_175_000,
    74_250_000,
    148_500_000,
    297 * MHZ,
    594 * MHZ,
    800 * MHZ,
];

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("pll/search");

    for rate in RATES {
        group.bench_with_input(BenchmarkId::new("hz", rate), &rate, |b, &rate| {
            b.iter(|| PllDivisors::search(black_box(rate)))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let div = PllDivisors::search(148_500_000).expect("reachable rate");
    c.bench_function("pll/validate", |b| b.iter(|| black_box(&div).validate()));
}

criterion_group!(benches, bench_search, bench_validate);
criterion_main!(benches);
