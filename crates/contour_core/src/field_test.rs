use glam::Vec3;

use super::*;
use crate::sdf::SdfNode;

#[test]
fn test_sample_matches_direct_evaluation() {
  let params = DualContouringParams::new()
    .with_bounds(Vec3::new(-1.0, -0.5, -2.0), Vec3::new(1.0, 0.5, 0.0))
    .with_resolution(5.0);
  let size = params.grid_size().unwrap();
  let sphere = SdfNode::sphere();
  let field = ScalarField::sample(&sphere, &params, size);

  assert_eq!(field.data().len(), size.sample_count());
  let dims = size.samples();
  for x in 0..dims.x {
    for y in 0..dims.y {
      for z in 0..dims.z {
        let c = UVec3::new(x, y, z);
        let expected = sphere.evaluate(params.grid_to_world(c.as_vec3()));
        assert_eq!(field.get(c), expected, "Sample {:?}", c);
      }
    }
  }
}

#[test]
fn test_corners_follow_canonical_order() {
  let params = DualContouringParams::new()
    .with_bounds(Vec3::ZERO, Vec3::splat(1.0))
    .with_resolution(2.0);
  let size = params.grid_size().unwrap();
  // Field value encodes the grid coordinate
  let field = ScalarField::sample(&SdfNode::custom(|p| p.x * 400.0 + p.y * 40.0 + p.z * 4.0), &params, size);

  let corners = field.corners(UVec3::ZERO);
  for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
    assert_eq!(corners[i], field.get(*offset), "Corner {}", i);
  }
  // c2 = (1,0,1)
  assert_eq!(corners[2], 0.5 * 400.0 + 0.5 * 4.0);
}

#[test]
fn test_from_samples_checks_length() {
  let size = GridSize(UVec3::new(2, 2, 2));
  assert!(ScalarField::from_samples(size, vec![0.0; 8]).is_some());
  assert!(ScalarField::from_samples(size, vec![0.0; 7]).is_none());
}
