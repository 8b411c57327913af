//! Voxel topology tables and grid indexing for Dual Contouring.
//!
//! # Cell Corners
//!
//! ```text
//!          4 ──────── 5
//!         /│         /│            +Y
//!        7 ──────── 6 │             │
//!        │ │        │ │             │
//!        │ 0 ───────│─ 1            └───── +X
//!        │/         │/             /
//!        3 ──────── 2             +Z
//!
//!   0 = (0,0,0)    4 = (0,1,0)
//!   1 = (1,0,0)    5 = (1,1,0)
//!   2 = (1,0,1)    6 = (1,1,1)
//!   3 = (0,0,1)    7 = (0,1,1)
//! ```
//!
//! Corners 0-3 walk the bottom face, 4-7 the top face in the same order.
//! Edges 0-3 are the bottom ring, 4-7 the top ring, 8-11 the verticals.
//!
//! # Memory Layout
//!
//! Sample and voxel grids are stored with Z innermost:
//!
//! ```text
//! index = (x * size_y + y) * size_z + z
//! ```

use glam::{IVec3, UVec3, Vec3};

/// Sentinel stored in the vertex-index grid for voxels without a vertex.
pub const NO_VERTEX: u32 = u32::MAX;

/// Index slots reserved per voxel: 3 faces x 2 triangles x 3 indices.
pub const INDICES_PER_VOXEL: usize = 18;

/// Integer corner offsets in canonical order.
pub const CORNER_OFFSETS: [UVec3; 8] = [
  UVec3::new(0, 0, 0),
  UVec3::new(1, 0, 0),
  UVec3::new(1, 0, 1),
  UVec3::new(0, 0, 1),
  UVec3::new(0, 1, 0),
  UVec3::new(1, 1, 0),
  UVec3::new(1, 1, 1),
  UVec3::new(0, 1, 1),
];

/// Voxel-local corner positions in the unit cube.
pub const CORNER_POSITIONS: [Vec3; 8] = [
  Vec3::new(0.0, 0.0, 0.0),
  Vec3::new(1.0, 0.0, 0.0),
  Vec3::new(1.0, 0.0, 1.0),
  Vec3::new(0.0, 0.0, 1.0),
  Vec3::new(0.0, 1.0, 0.0),
  Vec3::new(1.0, 1.0, 0.0),
  Vec3::new(1.0, 1.0, 1.0),
  Vec3::new(0.0, 1.0, 1.0),
];

/// Corner pairs for the 12 voxel edges.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
  [0, 1],
  [1, 2],
  [2, 3],
  [3, 0],
  [4, 5],
  [5, 6],
  [6, 7],
  [7, 4],
  [0, 4],
  [1, 5],
  [2, 6],
  [3, 7],
];

/// Unit steps along +X, +Y, +Z.
pub const AXIS_STEPS: [UVec3; 3] = [UVec3::X, UVec3::Y, UVec3::Z];

/// Axis names used in diagnostics.
pub const AXIS_NAMES: [char; 3] = ['x', 'y', 'z'];

/// Voxels sharing the grid edge that leaves a voxel's minimum corner along
/// each axis, as offsets from that voxel. Listed counter-clockwise when
/// viewed from the positive end of the axis.
pub const FACE_QUADS: [[IVec3; 4]; 3] = [
  // +X
  [
    IVec3::new(0, -1, -1),
    IVec3::new(0, 0, -1),
    IVec3::new(0, 0, 0),
    IVec3::new(0, -1, 0),
  ],
  // +Y
  [
    IVec3::new(-1, 0, -1),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 0, 0),
    IVec3::new(0, 0, -1),
  ],
  // +Z
  [
    IVec3::new(-1, -1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 0),
    IVec3::new(-1, 0, 0),
  ],
];

/// Quad corner order for a field going from inside to outside along the axis
/// (front face points toward +axis).
pub const WINDING_NEG_TO_POS: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Quad corner order for a field going from outside to inside along the axis.
pub const WINDING_POS_TO_NEG: [usize; 6] = [0, 2, 1, 0, 3, 2];

/// Convert 3D coordinates to a linear index (Z innermost).
#[inline(always)]
pub fn coord_to_index(dims: UVec3, coord: UVec3) -> usize {
  (coord.x as usize * dims.y as usize + coord.y as usize) * dims.z as usize + coord.z as usize
}

/// Convert a linear index back to 3D coordinates.
#[inline(always)]
pub fn index_to_coord(dims: UVec3, index: usize) -> UVec3 {
  let dz = dims.z as usize;
  let dy = dims.y as usize;
  UVec3::new(
    (index / (dy * dz)) as u32,
    ((index / dz) % dy) as u32,
    (index % dz) as u32,
  )
}

/// Whether a voxel lies strictly inside the voxel grid (one voxel away from
/// every boundary), i.e. all of its face neighbors exist.
#[inline(always)]
pub fn is_interior_voxel(voxel: UVec3, voxel_dims: UVec3) -> bool {
  voxel.cmpge(UVec3::ONE).all() && (voxel + UVec3::splat(2)).cmple(voxel_dims).all()
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
