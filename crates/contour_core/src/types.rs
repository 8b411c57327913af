//! Core data types for Dual Contouring extraction.

use glam::{UVec3, Vec3};

use crate::constants::{INDICES_PER_VOXEL, NO_VERTEX};
use crate::error::{Error, Result};

/// Output vertex with all mesh attributes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
  /// Vertex position in the extracting entity's local space.
  pub position: [f32; 3],

  /// Surface normal (unit vector).
  pub normal: [f32; 3],

  /// Vertex color. Extraction always emits white.
  pub color: [f32; 3],
}

impl Default for Vertex {
  fn default() -> Self {
    Self {
      position: [0.0; 3],
      normal: [0.0, 1.0, 0.0],
      color: [1.0; 3],
    }
  }
}

impl Vertex {
  pub fn new(position: Vec3, normal: Vec3) -> Self {
    Self {
      position: position.to_array(),
      normal: normal.to_array(),
      ..Default::default()
    }
  }

  #[inline]
  pub fn position(&self) -> Vec3 {
    Vec3::from_array(self.position)
  }

  #[inline]
  pub fn normal(&self) -> Vec3 {
    Vec3::from_array(self.normal)
  }
}

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Mesh extraction result.
#[derive(Clone, Debug, Default)]
pub struct MeshOutput {
  /// One vertex per surface voxel, in voxel-grid order.
  pub vertices: Vec<Vertex>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Voxel that produced each vertex (parallel to `vertices`).
  pub cells: Vec<[u32; 3]>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
    self.cells.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  /// Number of triangles in the mesh.
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Append a vertex and return its index.
  pub fn push_vertex(&mut self, vertex: Vertex, cell: UVec3) -> u32 {
    let index = self.vertices.len() as u32;
    self.bounds.encapsulate(vertex.position);
    self.vertices.push(vertex);
    self.cells.push(cell.to_array());
    index
  }

  /// Number of connected triangle groups (vertices linked through shared
  /// triangles). Vertices not referenced by any triangle are ignored.
  pub fn connected_components(&self) -> usize {
    let mut parent: Vec<u32> = (0..self.vertices.len() as u32).collect();

    fn find(parent: &mut [u32], mut i: u32) -> u32 {
      while parent[i as usize] != i {
        let grandparent = parent[parent[i as usize] as usize];
        parent[i as usize] = grandparent;
        i = grandparent;
      }
      i
    }

    for tri in self.indices.chunks_exact(3) {
      let root = find(&mut parent, tri[0]);
      for &other in &tri[1..] {
        let other_root = find(&mut parent, other);
        if other_root != root {
          parent[other_root as usize] = root;
        }
      }
    }

    let mut referenced = vec![false; self.vertices.len()];
    for &i in &self.indices {
      referenced[i as usize] = true;
    }

    let mut roots = 0;
    for i in 0..self.vertices.len() as u32 {
      if referenced[i as usize] && find(&mut parent, i) == i {
        roots += 1;
      }
    }
    roots
  }
}

/// Upper bound on samples and on index slots (`INDICES_PER_VOXEL` per
/// voxel) in one grid. Both are addressed with `u32`, and `NO_VERTEX` is
/// reserved.
pub const MAX_GRID_ELEMENTS: u64 = NO_VERTEX as u64 - 1;

fn checked_volume(dims: UVec3) -> Option<u64> {
  (dims.x as u64)
    .checked_mul(dims.y as u64)?
    .checked_mul(dims.z as u64)
}

/// Number of field samples along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize(pub UVec3);

impl GridSize {
  #[inline]
  pub fn samples(&self) -> UVec3 {
    self.0
  }

  /// Voxels per axis (one fewer than samples).
  #[inline]
  pub fn voxels(&self) -> UVec3 {
    self.0.saturating_sub(UVec3::ONE)
  }

  pub fn sample_count(&self) -> usize {
    self.0.x as usize * self.0.y as usize * self.0.z as usize
  }

  pub fn voxel_count(&self) -> usize {
    let v = self.voxels();
    v.x as usize * v.y as usize * v.z as usize
  }
}

/// Parameters for one extraction.
///
/// Bounds are expressed in the local space of the SDF being meshed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DualContouringParams {
  /// Minimum corner of the sampled region.
  pub min_bound: Vec3,

  /// Maximum corner of the sampled region.
  pub max_bound: Vec3,

  /// Samples per unit length.
  pub resolution: f32,

  /// Central-difference offset for gradients (world units).
  pub normal_delta: f32,

  /// Schmitz relaxation iterations.
  pub iteration_count: u32,

  /// Relaxation step scale.
  pub step_size: f32,
}

impl Default for DualContouringParams {
  fn default() -> Self {
    Self {
      min_bound: Vec3::splat(-1.2),
      max_bound: Vec3::splat(1.2),
      resolution: 10.0,
      normal_delta: 0.001,
      iteration_count: 10,
      step_size: 0.1,
    }
  }
}

impl DualContouringParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_bounds(mut self, min_bound: Vec3, max_bound: Vec3) -> Self {
    self.min_bound = min_bound;
    self.max_bound = max_bound;
    self
  }

  pub fn with_resolution(mut self, resolution: f32) -> Self {
    self.resolution = resolution;
    self
  }

  pub fn with_normal_delta(mut self, delta: f32) -> Self {
    self.normal_delta = delta;
    self
  }

  pub fn with_iteration_count(mut self, count: u32) -> Self {
    self.iteration_count = count;
    self
  }

  pub fn with_step_size(mut self, step: f32) -> Self {
    self.step_size = step;
    self
  }

  /// Sample counts per axis: `round((max - min) * resolution)`.
  ///
  /// Fails if any value is non-finite, the resolution or gradient delta is
  /// not positive, any axis would get fewer than one sample, or the grid
  /// needs more than [`MAX_GRID_ELEMENTS`] samples or index slots.
  pub fn grid_size(&self) -> Result<GridSize> {
    if !(self.min_bound.is_finite() && self.max_bound.is_finite()) {
      return Err(Error::InvalidParams("bounds must be finite".into()));
    }
    if !(self.resolution.is_finite() && self.resolution > 0.0) {
      return Err(Error::InvalidParams(format!(
        "resolution must be positive, got {}",
        self.resolution
      )));
    }
    if !(self.normal_delta.is_finite() && self.normal_delta > 0.0) {
      return Err(Error::InvalidParams(format!(
        "normal_delta must be positive, got {}",
        self.normal_delta
      )));
    }
    if !self.step_size.is_finite() {
      return Err(Error::InvalidParams("step_size must be finite".into()));
    }

    let extent = ((self.max_bound - self.min_bound) * self.resolution).round();
    if extent.min_element() < 1.0 {
      return Err(Error::InvalidParams(format!(
        "grid must have at least one sample per axis, got {:?}",
        extent
      )));
    }
    if extent.max_element() > u32::MAX as f32 {
      return Err(Error::InvalidParams(format!("grid too large: {:?}", extent)));
    }

    let size = GridSize(extent.as_uvec3());
    let samples = checked_volume(size.samples());
    let index_slots =
      checked_volume(size.voxels()).and_then(|v| v.checked_mul(INDICES_PER_VOXEL as u64));
    match (samples, index_slots) {
      (Some(s), Some(i)) if s <= MAX_GRID_ELEMENTS && i <= MAX_GRID_ELEMENTS => Ok(size),
      _ => Err(Error::InvalidParams(format!(
        "grid {:?} exceeds {} samples or index slots",
        size.samples(),
        MAX_GRID_ELEMENTS
      ))),
    }
  }

  /// Check the params without computing anything else.
  pub fn validate(&self) -> Result<()> {
    self.grid_size().map(|_| ())
  }

  /// Map a (possibly fractional) grid coordinate to a position.
  #[inline(always)]
  pub fn grid_to_world(&self, index: Vec3) -> Vec3 {
    self.min_bound + index / self.resolution
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
