use super::*;
use crate::sdf::SdfNode;

#[test]
fn test_crossing_predicate_is_inclusive() {
  assert!(is_crossing(-1.0, 1.0));
  assert!(is_crossing(1.0, -1.0));
  assert!(is_crossing(0.0, 1.0));
  assert!(is_crossing(-1.0, 0.0));
  assert!(is_crossing(0.0, 0.0));
  assert!(!is_crossing(0.5, 1.0));
  assert!(!is_crossing(-0.5, -1.0));
}

#[test]
fn test_interpolation_factor() {
  assert_eq!(interpolation_factor(-1.0, 1.0), 0.5);
  assert_eq!(interpolation_factor(-1.0, 3.0), 0.25);
  assert_eq!(interpolation_factor(3.0, -1.0), 0.75);
  assert_eq!(interpolation_factor(0.0, 2.0), 0.0);
  assert_eq!(interpolation_factor(0.0, 0.0), 0.5);
}

#[test]
fn test_plane_crosses_four_vertical_edges() {
  // Grid cell of size 1 at the origin, plane at y = 0.25
  let params = DualContouringParams::new()
    .with_bounds(glam::Vec3::ZERO, glam::Vec3::splat(2.0))
    .with_resolution(1.0);
  let plane = SdfNode::custom(|p| p.y - 0.25);
  let corners = crate::constants::CORNER_POSITIONS.map(|c| plane.evaluate(c));

  let crossings = find_crossings(&plane, &corners, UVec3::ZERO, &params);
  assert_eq!(crossings.len(), 4, "Only the vertical edges 8-11 cross");
  for crossing in &crossings {
    assert!((crossing.position.y - 0.25).abs() < 1e-6);
    assert!((crossing.normal - Vec3::Y).length() < 1e-3);
  }
  // Edge order: 8 = (c0,c4) first
  assert_eq!(crossings[0].position.x, 0.0);
  assert_eq!(crossings[0].position.z, 0.0);
}

#[test]
fn test_uniform_voxel_has_no_crossings() {
  let params = DualContouringParams::default();
  let corners = [1.0; 8];
  let crossings = find_crossings(&SdfNode::sphere(), &corners, UVec3::ONE, &params);
  assert!(crossings.is_empty());
}

#[test]
fn test_zero_corner_counts_all_touching_edges() {
  let params = DualContouringParams::default();
  let mut corners = [1.0; 8];
  corners[0] = 0.0;
  // Corner 0 touches edges 0, 3 and 8
  let crossings = find_crossings(&SdfNode::sphere(), &corners, UVec3::ONE, &params);
  assert_eq!(crossings.len(), 3);
  for crossing in &crossings {
    assert_eq!(crossing.position, Vec3::ZERO);
  }
}
