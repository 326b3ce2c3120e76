use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geogrid::aggregation::{point_to_density_grid_data, CpuGridAggregator, GridParams};
use geogrid::point_set::scan_points;

/// Uniform cloud over a metropolitan-sized box (≈ 40 km × 40 km around Paris).
fn make_points(n: usize) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    (0..n)
        .map(|_| {
            [
                rng.random_range(2.05..2.60),
                rng.random_range(48.65..49.00),
            ]
        })
        .collect()
}

fn bench_scan(c: &mut Criterion) {
    let points = make_points(200_000);

    c.bench_function("scan_points/200k", |b| {
        b.iter(|| black_box(scan_points(black_box(&points), |p| *p)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let points = make_points(200_000);
    let mut group = c.benchmark_group("density_grid/200k");

    for cell_size in [100.0, 500.0, 2000.0] {
        let params = GridParams::builder()
            .cell_size_meters(cell_size)
            .build()
            .unwrap();

        group.bench_function(format!("cpu/{cell_size}m"), |b| {
            b.iter_batched(
                CpuGridAggregator::new,
                |mut engine| {
                    black_box(
                        point_to_density_grid_data(&points, |p| *p, &params, &mut engine)
                            .unwrap(),
                    )
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_pipeline);
criterion_main!(benches);
