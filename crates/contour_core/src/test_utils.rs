//! Test utilities shared by unit tests, downstream crates and benches.
//!
//! Provides SDF fixtures and mesh comparison helpers.

use glam::{Affine3A, Vec3};

use crate::sdf::{SdfChild, SdfNode};
use crate::types::{DualContouringParams, MeshOutput};

// =============================================================================
// SDF Fixtures
// =============================================================================

/// Child placed at `offset` with no rotation or scale.
pub fn translated(offset: Vec3, node: SdfNode) -> SdfChild {
  SdfChild::new(Affine3A::from_translation(offset), node)
}

/// Child with uniform `scale` placed at `offset`.
pub fn scaled(offset: Vec3, scale: f32, node: SdfNode) -> SdfChild {
  SdfChild::new(
    Affine3A::from_scale_rotation_translation(Vec3::splat(scale), glam::Quat::IDENTITY, offset),
    node,
  )
}

/// Two unit spheres at `±separation / 2` on X, combined by `combine`
/// (`SdfNode::Union` or `SdfNode::Intersect`).
pub fn two_spheres(separation: f32, combine: fn(Vec<SdfChild>) -> SdfNode) -> SdfNode {
  let half = Vec3::new(separation * 0.5, 0.0, 0.0);
  combine(vec![
    translated(-half, SdfNode::sphere()),
    translated(half, SdfNode::sphere()),
  ])
}

/// Default params for a unit sphere: bounds `[-1.2, 1.2]³`.
pub fn unit_sphere_params(resolution: f32) -> DualContouringParams {
  DualContouringParams::new()
    .with_bounds(Vec3::splat(-1.2), Vec3::splat(1.2))
    .with_resolution(resolution)
}

/// Params enclosing [`two_spheres`] with the given separation.
pub fn two_spheres_params(separation: f32, resolution: f32) -> DualContouringParams {
  let reach = separation * 0.5 + 1.2;
  DualContouringParams::new()
    .with_bounds(Vec3::new(-reach, -1.2, -1.2), Vec3::new(reach, 1.2, 1.2))
    .with_resolution(resolution)
}

/// Rounded box with a plane cut and a sphere, covering every primitive and
/// both combinators with non-trivial transforms.
pub fn mixed_scene() -> SdfNode {
  let cut_box = SdfNode::intersect([
    SdfChild::new(
      Affine3A::from_scale_rotation_translation(
        Vec3::new(0.6, 0.4, 0.5),
        glam::Quat::from_rotation_y(0.5),
        Vec3::ZERO,
      ),
      SdfNode::cube(),
    ),
    translated(Vec3::new(0.0, 0.2, 0.0), SdfNode::plane()),
  ]);
  SdfNode::union([
    translated(Vec3::new(-0.4, 0.0, 0.0), cut_box),
    scaled(Vec3::new(0.5, 0.1, 0.2), 0.45, SdfNode::sphere()),
  ])
}

// =============================================================================
// Mesh Helpers
// =============================================================================

/// Largest `| |v| - radius |` over all vertices.
pub fn max_radius_error(mesh: &MeshOutput, center: Vec3, radius: f32) -> f32 {
  mesh
    .vertices
    .iter()
    .map(|v| ((v.position() - center).length() - radius).abs())
    .fold(0.0, f32::max)
}

/// Assert two meshes have the same topology and positions/normals within
/// `tolerance`.
pub fn assert_meshes_match(a: &MeshOutput, b: &MeshOutput, tolerance: f32) {
  assert_eq!(a.vertices.len(), b.vertices.len(), "Vertex count differs");
  assert_eq!(a.indices, b.indices, "Index buffers differ");
  assert_eq!(a.cells, b.cells, "Vertex cells differ");
  for (i, (va, vb)) in a.vertices.iter().zip(b.vertices.iter()).enumerate() {
    let dp = (va.position() - vb.position()).length();
    let dn = (va.normal() - vb.normal()).length();
    assert!(
      dp <= tolerance && dn <= tolerance * 10.0,
      "Vertex {} differs: {:?} vs {:?}",
      i,
      va,
      vb
    );
    assert_eq!(va.color, vb.color);
  }
}
