//! Benchmark the CPU mesher against the compute pipeline on the software
//! executor.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use contour_core::test_utils::{mixed_scene, unit_sphere_params};
use contour_core::{dual_contouring, GpuDualContouring, SdfNode};

/// CPU mesher on a unit sphere at increasing resolution.
fn bench_cpu_sphere(c: &mut Criterion) {
  let mut group = c.benchmark_group("dual_contouring::generate (sphere)");
  let sdf = SdfNode::sphere();

  for resolution in [8.0f32, 16.0, 32.0] {
    let params = unit_sphere_params(resolution);
    group.bench_with_input(BenchmarkId::from_parameter(resolution), &params, |b, params| {
      b.iter(|| {
        let mesh = dual_contouring::generate(black_box(&sdf), params).unwrap();
        black_box(mesh)
      })
    });
  }

  group.finish();
}

/// Closure-free tree vs the same tree through its compiled program.
fn bench_cpu_mixed_scene(c: &mut Criterion) {
  let sdf = mixed_scene();
  let program = contour_core::SdfProgram::compile(&sdf).unwrap();
  let params = unit_sphere_params(24.0);

  c.bench_function("dual_contouring::generate (mixed tree)", |b| {
    b.iter(|| black_box(dual_contouring::generate(black_box(&sdf), &params).unwrap()))
  });
  c.bench_function("dual_contouring::generate (mixed program)", |b| {
    b.iter(|| black_box(dual_contouring::generate(black_box(&program), &params).unwrap()))
  });
}

/// Three-kernel pipeline with warm buffers.
fn bench_software_gpu(c: &mut Criterion) {
  let sdf = SdfNode::sphere();
  let params = unit_sphere_params(24.0);
  let mut gpu = GpuDualContouring::software();
  gpu.generate(&sdf, &params).unwrap();

  c.bench_function("gpu::software (sphere 24)", |b| {
    b.iter(|| black_box(gpu.generate(black_box(&sdf), &params).unwrap()))
  });
}

criterion_group!(benches, bench_cpu_sphere, bench_cpu_mixed_scene, bench_software_gpu);
criterion_main!(benches);
