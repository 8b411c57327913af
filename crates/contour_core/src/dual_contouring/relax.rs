//! Schmitz particle relaxation.
//!
//! Instead of solving a QEF, each crossing's tangent plane pulls on the eight
//! voxel corners:
//!
//! ```text
//!   force[i] += -dot(n, corner_i - p) · n      for every crossing (p, n)
//! ```
//!
//! The vertex starts at the crossing centroid and repeatedly moves along the
//! trilinearly interpolated corner force. Gradients are used unnormalized,
//! so steep fields pull harder.

use glam::Vec3;

use super::crossings::EdgeCrossing;
use crate::constants::CORNER_POSITIONS;

/// Accumulated plane forces at the eight corners.
pub fn corner_forces(crossings: &[EdgeCrossing]) -> [Vec3; 8] {
  let mut forces = [Vec3::ZERO; 8];
  for crossing in crossings {
    let n = crossing.normal;
    for (force, corner) in forces.iter_mut().zip(CORNER_POSITIONS.iter()) {
      *force += -n.dot(*corner - crossing.position) * n;
    }
  }
  forces
}

/// Trilinear blend of per-corner values at voxel-local `at`.
///
/// Blends along X, then Y, then Z. `at` is not clamped to the unit cube.
#[inline]
pub fn trilinear(values: &[Vec3; 8], at: Vec3) -> Vec3 {
  let x00 = values[0].lerp(values[1], at.x);
  let x01 = values[3].lerp(values[2], at.x);
  let x10 = values[4].lerp(values[5], at.x);
  let x11 = values[7].lerp(values[6], at.x);

  let y0 = x00.lerp(x10, at.y);
  let y1 = x01.lerp(x11, at.y);

  y0.lerp(y1, at.z)
}

/// Centroid of the crossing positions. `None` when there are no crossings.
pub fn centroid(crossings: &[EdgeCrossing]) -> Option<Vec3> {
  if crossings.is_empty() {
    return None;
  }
  let sum: Vec3 = crossings.iter().map(|c| c.position).sum();
  Some(sum / crossings.len() as f32)
}

/// Relax from the centroid toward the point the crossing planes agree on.
/// Returns the voxel-local vertex position, or `None` with no crossings.
pub fn relax(crossings: &[EdgeCrossing], iteration_count: u32, step_size: f32) -> Option<Vec3> {
  let mut center = centroid(crossings)?;
  let forces = corner_forces(crossings);
  for _ in 0..iteration_count {
    center += trilinear(&forces, center) * step_size;
  }
  Some(center)
}

#[cfg(test)]
#[path = "relax_test.rs"]
mod relax_test;
