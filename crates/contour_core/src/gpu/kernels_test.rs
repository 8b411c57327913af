use super::*;
use crate::compute::group_count;
use crate::types::DualContouringParams;

fn buffers_for(params: &DualContouringParams) -> Vec<Vec<u32>> {
  let size = params.grid_size().unwrap();
  let header = GpuArgs::new(params, size, 0);
  let mut buffers: Vec<Vec<u32>> = buffer_sizes(size).iter().map(|&s| vec![0u32; s as usize / 4]).collect();
  buffers[BUFFER_ARGS][..HEADER_WORDS].copy_from_slice(bytemuck::cast_slice(&[header]));
  buffers
}

fn results(buffers: &[Vec<u32>]) -> GpuResults {
  read_results(&buffers[BUFFER_RESULTS]).unwrap()
}

#[test]
fn test_registry_exposes_all_entry_points() {
  let registry = registry();
  for name in KERNEL_NAMES {
    assert!(registry.get(name).is_some(), "missing kernel {name}");
  }
}

#[test]
fn test_compact_packs_in_voxel_order() {
  // 3 samples per axis -> 8 voxels
  let params = DualContouringParams::new()
    .with_bounds(glam::Vec3::ZERO, glam::Vec3::splat(3.0))
    .with_resolution(1.0);
  let mut buffers = buffers_for(&params);

  buffers[BUFFER_VERTEX_GRID].fill(NO_VERTEX);
  buffers[BUFFER_VERTEX_GRID][1] = 1;
  buffers[BUFFER_VERTEX_GRID][6] = 6;
  {
    let vertices: &mut [GpuVertex] = bytemuck::cast_slice_mut(&mut buffers[BUFFER_VERTICES]);
    vertices[1].cell = 1;
    vertices[6].cell = 6;
  }
  buffers[BUFFER_INDICES].fill(NO_VERTEX);
  buffers[BUFFER_INDICES][3] = 6;
  buffers[BUFFER_INDICES][40] = 1;
  buffers[BUFFER_INDICES][41] = 6;

  compact(&mut buffers, UVec3::ONE);

  let report = results(&buffers);
  assert_eq!(report.vertex_count, 2);
  assert_eq!(report.index_count, 3);
  let vertices: &[GpuVertex] = bytemuck::cast_slice(&buffers[BUFFER_VERTICES]);
  assert_eq!(vertices[0].cell, 1);
  assert_eq!(vertices[1].cell, 6);
  assert_eq!(&buffers[BUFFER_INDICES][..3], &[1, 0, 1]);
}

#[test]
fn test_compact_drops_indices_after_failure() {
  let params = DualContouringParams::new()
    .with_bounds(glam::Vec3::ZERO, glam::Vec3::splat(3.0))
    .with_resolution(1.0);
  let mut buffers = buffers_for(&params);
  buffers[BUFFER_VERTEX_GRID].fill(NO_VERTEX);
  buffers[BUFFER_VERTEX_GRID][0] = 0;
  buffers[BUFFER_INDICES].fill(NO_VERTEX);
  buffers[BUFFER_INDICES][0] = 0;
  write_results(
    &mut buffers[BUFFER_RESULTS],
    &GpuResults {
      error_flag: 1,
      ..Default::default()
    },
  );

  compact(&mut buffers, UVec3::ONE);

  let report = results(&buffers);
  assert_eq!(report.error_flag, 1);
  assert_eq!(report.vertex_count, 1);
  assert_eq!(report.index_count, 0);
}

#[test]
fn test_triangulate_reports_lowest_failing_voxel() {
  // Flat field with a sign change between y=1 and y=2 and no vertices at all
  let params = DualContouringParams::new()
    .with_bounds(glam::Vec3::ZERO, glam::Vec3::splat(5.0))
    .with_resolution(1.0);
  let size = params.grid_size().unwrap();
  let mut buffers = buffers_for(&params);
  buffers[BUFFER_VERTEX_GRID].fill(NO_VERTEX);
  {
    let field: &mut [f32] = bytemuck::cast_slice_mut(&mut buffers[BUFFER_FIELD]);
    for (i, value) in field.iter_mut().enumerate() {
      let c = index_to_coord(size.samples(), i);
      *value = if c.y <= 1 { -1.0 } else { 1.0 };
    }
  }

  triangulate(&mut buffers, group_count(size.voxels()));

  let report = results(&buffers);
  assert_eq!(report.error_flag, 1);
  let voxel = index_to_coord(size.voxels(), report.error_voxel as usize);
  assert_eq!(voxel, UVec3::new(1, 1, 1));
  assert_eq!(report.error_axis, 1);
}

#[test]
fn test_evaluate_relax_respects_dispatch_extent() {
  let params = DualContouringParams::new()
    .with_bounds(glam::Vec3::ZERO, glam::Vec3::splat(8.0))
    .with_resolution(1.0);
  let program = SdfProgram::compile(&crate::sdf::SdfNode::plane()).unwrap();
  let size = params.grid_size().unwrap();
  let mut buffers = buffers_for(&params);
  let header = GpuArgs::new(&params, size, program.len());
  let mut args: Vec<u32> = bytemuck::cast_slice(&[header]).to_vec();
  args.extend_from_slice(program.words());
  buffers[BUFFER_ARGS][..args.len()].copy_from_slice(&args);
  buffers[BUFFER_FIELD].fill(f32::to_bits(-7.0));

  // One group covers samples 0..4 per axis only
  evaluate_relax(&mut buffers, UVec3::ONE);

  let field: &[f32] = bytemuck::cast_slice(&buffers[BUFFER_FIELD]);
  let samples = size.samples();
  assert_eq!(field[coord_to_index(samples, UVec3::new(0, 3, 0))], 3.0);
  assert_eq!(field[coord_to_index(samples, UVec3::new(0, 5, 0))], -7.0);
}
