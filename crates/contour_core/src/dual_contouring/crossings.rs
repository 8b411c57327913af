//! Edge crossing detection.
//!
//! An edge crosses the surface when its endpoint values straddle zero. The
//! test is inclusive, so an edge with a zero endpoint counts as crossed; the
//! face test in triangulation uses the same predicate, which is what keeps
//! every emitted quad backed by four vertices.

use glam::{UVec3, Vec3};
use smallvec::SmallVec;

use crate::constants::{CORNER_POSITIONS, EDGE_CORNERS};
use crate::sdf::{gradient, Sdf};
use crate::types::DualContouringParams;

/// Surface intersection on a voxel edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCrossing {
  /// Voxel-local position in [0,1]³.
  pub position: Vec3,
  /// Unnormalized SDF gradient at the crossing.
  pub normal: Vec3,
}

/// At most one crossing per edge.
pub type Crossings = SmallVec<[EdgeCrossing; 12]>;

#[inline(always)]
pub fn is_crossing(v0: f32, v1: f32) -> bool {
  (v0 <= 0.0 && v1 >= 0.0) || (v0 >= 0.0 && v1 <= 0.0)
}

/// Fraction along the edge where the linear interpolant hits zero. Both
/// endpoints exactly zero gives the midpoint.
#[inline(always)]
pub fn interpolation_factor(v0: f32, v1: f32) -> f32 {
  let denom = v0.abs() + v1.abs();
  if denom > 0.0 {
    v0.abs() / denom
  } else {
    0.5
  }
}

/// Collect the crossings of one voxel, in edge order.
pub fn find_crossings<S: Sdf + ?Sized>(
  sdf: &S,
  corners: &[f32; 8],
  voxel: UVec3,
  params: &DualContouringParams,
) -> Crossings {
  let mut crossings = Crossings::new();
  let origin = voxel.as_vec3();

  for &[c0, c1] in EDGE_CORNERS.iter() {
    let (v0, v1) = (corners[c0], corners[c1]);
    if !is_crossing(v0, v1) {
      continue;
    }
    let t = interpolation_factor(v0, v1);
    let position = CORNER_POSITIONS[c0].lerp(CORNER_POSITIONS[c1], t);
    let world = params.grid_to_world(origin + position);
    crossings.push(EdgeCrossing {
      position,
      normal: gradient(sdf, world, params.normal_delta),
    });
  }

  crossings
}

#[cfg(test)]
#[path = "crossings_test.rs"]
mod crossings_test;
