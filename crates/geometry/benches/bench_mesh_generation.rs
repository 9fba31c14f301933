use std::hint::black_box;
use std::time::Instant;

use solids_geometry::{build_cone, build_cube, build_cylinder};

fn bench_cylinder(segments: u32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let mesh = build_cylinder(0.5, 0.5, 1.5, black_box(segments)).unwrap();
        black_box(mesh);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  cylinder ({segments} segments, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_cone(segments: u32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let mesh = build_cone(0.5, 1.5, black_box(segments)).unwrap();
        black_box(mesh);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  cone ({segments} segments, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_cube(iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        black_box(build_cube());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  cube ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Mesh Generation Benchmarks ===");
    println!();

    println!("[cube]");
    bench_cube(10_000);
    println!();

    println!("[cylinder]");
    for segments in [32, 256, 4096, 32_766] {
        bench_cylinder(segments, 100);
    }
    println!();

    println!("[cone]");
    for segments in [32, 256, 4096, 65_533] {
        bench_cone(segments, 100);
    }
}
