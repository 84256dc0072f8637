//! Criterion benchmarks for the heightfield kernels.
//!
//! Benchmarks:
//!   - midpoint displacement on a 129x129 grid
//!   - five smoothing passes on a 129x129 grid
//!   - normal estimation on a 129x129 grid
//!   - one damped wave step on a 129x129 grid
//!   - full terrain pipeline with default parameters
//!
//! Run with: cargo bench -p simulation --bench grid_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use simulation::config::{FLUID_SCALE, TERRAIN_SIZE, TERRAIN_SPACING};
use simulation::fractal::midpoint_displacement;
use simulation::height_grid::HeightGrid;
use simulation::normals::calculate_normals;
use simulation::smoothing::smooth;
use simulation::terrain::{GenerationMode, GenerationParams, Terrain};
use simulation::wave::{Fluid, WaveParams};

fn fractal_grid(seed: u64) -> HeightGrid {
    let mut grid = HeightGrid::new(TERRAIN_SIZE, TERRAIN_SPACING);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let _ = midpoint_displacement(&mut grid, &mut rng, 20.0, 0.4);
    grid
}

// ---------------------------------------------------------------------------
// Benchmark: terrain kernels
// ---------------------------------------------------------------------------

fn bench_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain_kernels");

    group.bench_function("midpoint_displacement_129", |b| {
        let mut grid = HeightGrid::new(TERRAIN_SIZE, TERRAIN_SPACING);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        b.iter(|| {
            let _ = midpoint_displacement(black_box(&mut grid), &mut rng, 20.0, 0.4);
        });
    });

    group.bench_function("smooth_5_129", |b| {
        let base = fractal_grid(2);
        b.iter(|| {
            let mut grid = base.clone();
            let _ = smooth(black_box(&mut grid), 5);
            grid
        });
    });

    group.bench_function("normals_129", |b| {
        let mut grid = fractal_grid(3);
        b.iter(|| {
            let _ = calculate_normals(black_box(&mut grid));
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: wave step
// ---------------------------------------------------------------------------

fn bench_wave_step(c: &mut Criterion) {
    let mut fluid = Fluid::new(TERRAIN_SIZE, FLUID_SCALE, &WaveParams::default());
    fluid.grid.seed_disturbances();

    c.bench_function("wave_step_129", |b| {
        b.iter(|| {
            let _ = black_box(&mut fluid).step();
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark: full pipeline
// ---------------------------------------------------------------------------

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain_pipeline");
    group.sample_size(10);

    let params = GenerationParams::default();
    group.bench_function("fractal_default_129", |b| {
        let mut terrain = Terrain::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        b.iter(|| {
            let _ = terrain.generate(&params, GenerationMode::Fractal, &mut rng);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_kernels, bench_wave_step, bench_full_pipeline);
criterion_main!(benches);
