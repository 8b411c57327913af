//! Quad emission across crossed grid edges.
//!
//! For every interior voxel, the grid edge leaving its minimum corner along
//! +X, +Y and +Z is tested. When the field crosses zero along that edge, the
//! four voxels sharing the edge are joined with two triangles:
//!
//! ```text
//!        q3 ────── q2          winding (inside → outside): 0,1,2  0,2,3
//!        │ ╲       │           winding (outside → inside): 0,2,1  0,3,2
//!        │   ╲     │
//!        │     ╲   │           q2 is always the voxel itself; the others
//!        q0 ────── q1          trail it by one step on the other two axes.
//! ```

use glam::UVec3;

use crate::constants::{
  coord_to_index, is_interior_voxel, AXIS_NAMES, AXIS_STEPS, FACE_QUADS, INDICES_PER_VOXEL,
  NO_VERTEX, WINDING_NEG_TO_POS, WINDING_POS_TO_NEG,
};
use crate::error::{Error, Result};
use crate::field::ScalarField;

/// Orientation of a crossed grid edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceCrossing {
  /// Inside at the base sample, outside at the +axis sample.
  NegativeToPositive,
  /// Outside at the base sample, inside at the +axis sample.
  PositiveToNegative,
}

impl FaceCrossing {
  /// Same inclusive predicate as edge crossings; ties go to
  /// `NegativeToPositive`.
  #[inline(always)]
  pub fn classify(v0: f32, v1: f32) -> Option<Self> {
    if v0 <= 0.0 && v1 >= 0.0 {
      Some(FaceCrossing::NegativeToPositive)
    } else if v0 >= 0.0 && v1 <= 0.0 {
      Some(FaceCrossing::PositiveToNegative)
    } else {
      None
    }
  }

  #[inline(always)]
  pub fn winding(self) -> &'static [usize; 6] {
    match self {
      FaceCrossing::NegativeToPositive => &WINDING_NEG_TO_POS,
      FaceCrossing::PositiveToNegative => &WINDING_POS_TO_NEG,
    }
  }
}

/// Vertex index per voxel, [`NO_VERTEX`] where the voxel has none.
#[derive(Clone, Debug)]
pub struct VertexIndexGrid {
  dims: UVec3,
  indices: Vec<u32>,
}

impl VertexIndexGrid {
  pub fn new(voxel_dims: UVec3) -> Self {
    let count = voxel_dims.x as usize * voxel_dims.y as usize * voxel_dims.z as usize;
    Self {
      dims: voxel_dims,
      indices: vec![NO_VERTEX; count],
    }
  }

  #[inline]
  pub fn dims(&self) -> UVec3 {
    self.dims
  }

  #[inline(always)]
  pub fn get(&self, voxel: UVec3) -> u32 {
    self.indices[coord_to_index(self.dims, voxel)]
  }

  #[inline(always)]
  pub fn set_linear(&mut self, index: usize, vertex: u32) {
    self.indices[index] = vertex;
  }
}

/// Emit the (up to three) quads owned by one voxel.
///
/// `sample` reads the field at a grid point and `vertex_at` the vertex index
/// of a voxel; `emit` receives each quad as six triangle indices, in axis
/// order X, Y, Z. Non-interior voxels emit nothing.
pub fn emit_voxel_faces(
  voxel: UVec3,
  voxel_dims: UVec3,
  sample: impl Fn(UVec3) -> f32,
  vertex_at: impl Fn(UVec3) -> u32,
  mut emit: impl FnMut(usize, [u32; 6]),
) -> Result<()> {
  if !is_interior_voxel(voxel, voxel_dims) {
    return Ok(());
  }

  let v0 = sample(voxel);
  for axis in 0..3 {
    let v1 = sample(voxel + AXIS_STEPS[axis]);
    let Some(crossing) = FaceCrossing::classify(v0, v1) else {
      continue;
    };

    let mut quad = [0u32; 4];
    for (slot, offset) in quad.iter_mut().zip(FACE_QUADS[axis].iter()) {
      // Interior voxels keep every offset in range
      let neighbor = (voxel.as_ivec3() + *offset).as_uvec3();
      let index = vertex_at(neighbor);
      if index == NO_VERTEX {
        return Err(Error::InvalidVertexIndex {
          voxel: voxel.to_array(),
          neighbor: neighbor.to_array(),
          axis: AXIS_NAMES[axis],
        });
      }
      *slot = index;
    }

    emit(axis, crossing.winding().map(|corner| quad[corner]));
  }

  Ok(())
}

/// Triangulate the whole grid into `indices`, voxel by voxel (Z innermost).
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "dual_contouring::triangulate"))]
pub fn triangulate(field: &ScalarField, vertices: &VertexIndexGrid, indices: &mut Vec<u32>) -> Result<()> {
  let dims = vertices.dims();
  if dims.cmplt(UVec3::splat(3)).any() {
    return Ok(());
  }

  for x in 1..dims.x - 1 {
    for y in 1..dims.y - 1 {
      for z in 1..dims.z - 1 {
        emit_voxel_faces(
          UVec3::new(x, y, z),
          dims,
          |c| field.get(c),
          |v| vertices.get(v),
          |_, tris| indices.extend_from_slice(&tris),
        )?;
      }
    }
  }

  Ok(())
}

/// Slot of a voxel's face in a fixed-stride index buffer.
#[inline(always)]
pub fn face_slot(voxel_index: usize, axis: usize) -> usize {
  voxel_index * INDICES_PER_VOXEL + axis * 6
}

#[cfg(test)]
#[path = "triangulate_test.rs"]
mod triangulate_test;
