use super::*;

#[test]
fn test_aabb_encapsulate() {
  let mut aabb = MinMaxAABB::empty();
  aabb.encapsulate([1.0, 2.0, 3.0]);
  aabb.encapsulate([-1.0, -2.0, -3.0]);

  assert_eq!(aabb.min, [-1.0, -2.0, -3.0]);
  assert_eq!(aabb.max, [1.0, 2.0, 3.0]);
  assert!(aabb.is_valid());
}

#[test]
fn test_empty_aabb_is_invalid() {
  assert!(!MinMaxAABB::empty().is_valid());
}

#[test]
fn test_vertex_default_is_white_up() {
  let v = Vertex::default();
  assert_eq!(v.normal, [0.0, 1.0, 0.0]);
  assert_eq!(v.color, [1.0, 1.0, 1.0]);
  assert_eq!(std::mem::size_of::<Vertex>(), 36);
}

#[test]
fn test_mesh_output_clear() {
  let mut output = MeshOutput::new();
  output.push_vertex(Vertex::default(), UVec3::ONE);
  output.indices.push(0);
  output.clear();

  assert!(output.is_empty());
  assert!(output.cells.is_empty());
  assert_eq!(output.triangle_count(), 0);
  assert!(!output.bounds.is_valid());
}

#[test]
fn test_push_vertex_tracks_cells_and_bounds() {
  let mut output = MeshOutput::new();
  let a = output.push_vertex(Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Y), UVec3::new(1, 2, 3));
  let b = output.push_vertex(Vertex::new(Vec3::new(-1.0, 2.0, 0.0), Vec3::Y), UVec3::new(4, 5, 6));

  assert_eq!((a, b), (0, 1));
  assert_eq!(output.cells, vec![[1, 2, 3], [4, 5, 6]]);
  assert_eq!(output.bounds.min, [-1.0, 0.0, 0.0]);
  assert_eq!(output.bounds.max, [1.0, 2.0, 0.0]);
}

#[test]
fn test_connected_components() {
  let mut output = MeshOutput::new();
  for _ in 0..7 {
    output.push_vertex(Vertex::default(), UVec3::ZERO);
  }
  // Two triangles sharing an edge, one isolated triangle, one unused vertex
  output.indices.extend_from_slice(&[0, 1, 2, 2, 1, 3, 4, 5, 6]);
  assert_eq!(output.connected_components(), 2);

  output.indices.extend_from_slice(&[3, 4, 0]);
  assert_eq!(output.connected_components(), 1);
}

#[test]
fn test_default_params() {
  let params = DualContouringParams::default();
  assert_eq!(params.resolution, 10.0);
  assert_eq!(params.normal_delta, 0.001);
  assert_eq!(params.iteration_count, 10);
  assert_eq!(params.step_size, 0.1);
}

#[test]
fn test_grid_size_rounds_extent() {
  let params = DualContouringParams::new()
    .with_bounds(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 0.5, 1.04))
    .with_resolution(10.0);
  let grid = params.grid_size().unwrap();
  assert_eq!(grid.samples(), UVec3::new(20, 15, 20));
  assert_eq!(grid.voxels(), UVec3::new(19, 14, 19));
  assert_eq!(grid.sample_count(), 20 * 15 * 20);
  assert_eq!(grid.voxel_count(), 19 * 14 * 19);
}

#[test]
fn test_grid_size_rejects_degenerate_params() {
  let base = DualContouringParams::default();

  let empty_axis = base.with_bounds(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
  assert!(matches!(empty_axis.grid_size(), Err(Error::InvalidParams(_))));

  let inverted = base.with_bounds(Vec3::ONE, Vec3::ZERO);
  assert!(inverted.grid_size().is_err());

  assert!(base.with_resolution(0.0).grid_size().is_err());
  assert!(base.with_resolution(f32::NAN).grid_size().is_err());
  assert!(base.with_normal_delta(0.0).grid_size().is_err());
  assert!(base
    .with_bounds(Vec3::splat(f32::NEG_INFINITY), Vec3::ONE)
    .grid_size()
    .is_err());
}

#[test]
fn test_grid_size_rejects_oversized_grids() {
  // 3_000_000 samples per axis: every axis fits u32, the volume does not
  let huge = DualContouringParams::default().with_resolution(1.25e6);
  assert!(matches!(huge.grid_size(), Err(Error::InvalidParams(_))));
  assert!(huge.validate().is_err());

  // 700³ samples fit, but 699³ voxels need more than u32::MAX index slots
  let unit = DualContouringParams::default().with_bounds(Vec3::ZERO, Vec3::ONE);
  assert!(unit.with_resolution(700.0).grid_size().is_err());

  let size = unit.with_resolution(600.0).grid_size().unwrap();
  assert_eq!(size.samples(), UVec3::splat(600));
  assert!((size.voxel_count() * INDICES_PER_VOXEL) as u64 <= MAX_GRID_ELEMENTS);
}

#[test]
fn test_grid_to_world() {
  let params = DualContouringParams::new()
    .with_bounds(Vec3::splat(-1.0), Vec3::splat(1.0))
    .with_resolution(4.0);
  assert_eq!(params.grid_to_world(Vec3::ZERO), Vec3::splat(-1.0));
  assert_eq!(params.grid_to_world(Vec3::splat(4.0)), Vec3::ZERO);
  assert_eq!(params.grid_to_world(Vec3::new(2.0, 6.0, 8.0)), Vec3::new(-0.5, 0.5, 1.0));
}
