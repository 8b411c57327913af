//! Scalar field sampling over the extraction grid.

use glam::UVec3;
use rayon::prelude::*;

use crate::constants::{coord_to_index, index_to_coord, CORNER_OFFSETS};
use crate::sdf::Sdf;
use crate::types::{DualContouringParams, GridSize};

/// SDF values at every grid sample, Z innermost.
#[derive(Clone, Debug)]
pub struct ScalarField {
  size: GridSize,
  data: Vec<f32>,
}

impl ScalarField {
  /// Evaluate `sdf` at every grid point in parallel.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "field::sample"))]
  pub fn sample<S: Sdf + ?Sized>(sdf: &S, params: &DualContouringParams, size: GridSize) -> Self {
    let dims = size.samples();
    let mut data = vec![0.0f32; size.sample_count()];
    data.par_iter_mut().enumerate().for_each(|(i, value)| {
      let coord = index_to_coord(dims, i);
      *value = sdf.evaluate(params.grid_to_world(coord.as_vec3()));
    });
    Self { size, data }
  }

  /// Wrap existing samples. `data` must hold `size.sample_count()` values.
  pub fn from_samples(size: GridSize, data: Vec<f32>) -> Option<Self> {
    (data.len() == size.sample_count()).then_some(Self { size, data })
  }

  #[inline]
  pub fn size(&self) -> GridSize {
    self.size
  }

  #[inline]
  pub fn data(&self) -> &[f32] {
    &self.data
  }

  #[inline(always)]
  pub fn get(&self, coord: UVec3) -> f32 {
    self.data[coord_to_index(self.size.samples(), coord)]
  }

  /// The 8 corner samples of a voxel in canonical corner order.
  #[inline]
  pub fn corners(&self, voxel: UVec3) -> [f32; 8] {
    CORNER_OFFSETS.map(|offset| self.get(voxel + offset))
  }
}

#[cfg(test)]
#[path = "field_test.rs"]
mod field_test;
