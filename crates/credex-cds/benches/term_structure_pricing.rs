//! Benchmarks for term-structure pricing and calibration.
//!
//! Run with: cargo bench -p credex-cds

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use credex_cds::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn create_yield_curve() -> IsdaYieldCurve {
    IsdaYieldCurve::new(
        vec![0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 30.0],
        vec![0.030, 0.032, 0.035, 0.038, 0.040, 0.045, 0.048, 0.050, 0.055],
    )
    .unwrap()
}

fn create_credit_curve(id: usize) -> IsdaCreditCurve {
    let level = 0.005 + 0.001 * (id % 20) as f64;
    IsdaCreditCurve::new(
        vec![0.5, 1.0, 3.0, 5.0, 7.0, 10.0],
        vec![level, level * 1.1, level * 1.3, level * 1.5, level * 1.6, level * 1.7],
    )
    .unwrap()
}

/// Quarterly term structure out to `years`.
fn create_terms(years: u32) -> MultiCdsTerms {
    MultiCdsTerms::new(-0.1, 0.0, (1..=4 * years).collect())
}

fn create_standard_cds() -> Vec<CdsAnalytic> {
    [0.5, 1.0, 3.0, 5.0, 7.0, 10.0]
        .iter()
        .map(|&m| CdsTerms::new(-0.1, m).to_analytic().unwrap())
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_single_vs_multi(c: &mut Criterion) {
    let yc = create_yield_curve();
    let cc = create_credit_curve(0);
    let mut group = c.benchmark_group("term_structure_par_spreads");

    for years in &[1_u32, 5, 10] {
        let terms = create_terms(*years);
        let multi = terms.to_analytic().unwrap();
        let singles: Vec<CdsAnalytic> = (0..multi.num_maturities())
            .map(|i| terms.terms(i).unwrap().to_analytic().unwrap())
            .collect();
        group.throughput(Throughput::Elements(u64::from(4 * *years)));

        let multi_pricer = MultiAnalyticCdsPricer::default();
        group.bench_with_input(BenchmarkId::new("multi", years), &multi, |b, multi| {
            b.iter(|| multi_pricer.par_spreads(black_box(multi), &yc, &cc))
        });

        let pricer = AnalyticCdsPricer::default();
        group.bench_with_input(BenchmarkId::new("single", years), &singles, |b, singles| {
            b.iter(|| {
                singles
                    .iter()
                    .map(|cds| pricer.par_spread(black_box(cds), &yc, &cc))
                    .collect::<Vec<_>>()
            })
        });
    }
    group.finish();
}

fn bench_calibration(c: &mut Criterion) {
    let yc = create_yield_curve();
    let cds = create_standard_cds();
    let cc = create_credit_curve(7);
    let pricer = AnalyticCdsPricer::default();
    let spreads: Vec<f64> = cds
        .iter()
        .map(|c| pricer.par_spread(c, &yc, &cc).unwrap())
        .collect();

    let mut group = c.benchmark_group("calibration");
    let simple = SimpleCreditCurveBuilder::default();
    group.bench_function("simple", |b| {
        b.iter(|| simple.calibrate_par_spreads(black_box(&cds), black_box(&spreads), &yc))
    });
    let fast = FastCreditCurveBuilder::default();
    group.bench_function("fast", |b| {
        b.iter(|| fast.calibrate_par_spreads(black_box(&cds), black_box(&spreads), &yc))
    });
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let yc = create_yield_curve();
    let batch = BatchCdsPricer::new(&yc, MultiAnalyticCdsPricer::default());
    let mut group = c.benchmark_group("batch_entities");

    for size in &[10_usize, 100, 500] {
        let multis: Vec<MultiCdsAnalytic> = (0..*size)
            .map(|_| create_terms(10).to_analytic().unwrap())
            .collect();
        let curves: Vec<IsdaCreditCurve> = (0..*size).map(create_credit_curve).collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(multis, curves),
            |b, (multis, curves)| b.iter(|| batch.par_spreads_batch(black_box(multis), curves)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_single_vs_multi, bench_calibration, bench_batch);
criterion_main!(benches);
