//! Buffer layout shared by the WGSL shader and the software kernels.
//!
//! ```text
//! Buffer  Contents                               Size
//! ──────  ─────────────────────────────────────  ───────────────────────────
//!   0     GpuArgs header + SDF program words     48 + 4·MAX_PROGRAM_WORDS
//!   1     GpuResults (counts, error report)      32
//!   2     field: f32 per sample                  4·samples
//!   3     vertex slot per voxel (u32, NONE)      4·voxels
//!   4     GpuVertex per voxel                    48·voxels
//!   5     18 index slots per voxel (u32, NONE)   72·voxels
//! ```
//!
//! Kernels run in order `evaluate_relax` → `triangulate` → `compact`. The
//! first two write fixed per-voxel slots, the last packs them in voxel
//! order, which is the same order the CPU mesher emits.

use bytemuck::{Pod, Zeroable};
use glam::{UVec3, Vec3};

use crate::constants::INDICES_PER_VOXEL;
use crate::sdf::MAX_PROGRAM_WORDS;
use crate::types::{DualContouringParams, GridSize, Vertex};

/// WGSL source of the three kernels.
pub const SHADER_SOURCE: &str = include_str!("../shaders/dual_contouring.wgsl");

/// Entry points, in dispatch order.
pub const KERNEL_NAMES: [&str; 3] = ["evaluate_relax", "triangulate", "compact"];

pub const KERNEL_EVALUATE_RELAX: usize = 0;
pub const KERNEL_TRIANGULATE: usize = 1;
pub const KERNEL_COMPACT: usize = 2;

pub const BUFFER_ARGS: usize = 0;
pub const BUFFER_RESULTS: usize = 1;
pub const BUFFER_FIELD: usize = 2;
pub const BUFFER_VERTEX_GRID: usize = 3;
pub const BUFFER_VERTICES: usize = 4;
pub const BUFFER_INDICES: usize = 5;
pub const BUFFER_COUNT: usize = 6;

/// Smallest buffer ever requested. A storage binding must hold at least one
/// element of its array type, and `GpuVertex` is the largest.
pub const MIN_BUFFER_SIZE: u64 = 48;

/// Kernel arguments. Matches `struct Args` in `dual_contouring.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuArgs {
  pub grid_size: [u32; 3],
  pub iteration_count: u32,
  pub min_bound: [f32; 3],
  pub resolution: f32,
  pub normal_delta: f32,
  pub step_size: f32,
  pub program_len: u32,
  pub _pad: u32,
}

impl GpuArgs {
  pub fn new(params: &DualContouringParams, size: GridSize, program_len: usize) -> Self {
    Self {
      grid_size: size.samples().to_array(),
      iteration_count: params.iteration_count,
      min_bound: params.min_bound.to_array(),
      resolution: params.resolution,
      normal_delta: params.normal_delta,
      step_size: params.step_size,
      program_len: program_len as u32,
      _pad: 0,
    }
  }

  pub fn grid(&self) -> GridSize {
    GridSize(UVec3::from_array(self.grid_size))
  }

  /// Rebuild extraction params. `max_bound` is derived from the grid.
  pub fn params(&self) -> DualContouringParams {
    let min_bound = Vec3::from_array(self.min_bound);
    DualContouringParams {
      min_bound,
      max_bound: min_bound + self.grid().samples().as_vec3() / self.resolution,
      resolution: self.resolution,
      normal_delta: self.normal_delta,
      iteration_count: self.iteration_count,
      step_size: self.step_size,
    }
  }
}

/// Counters and error report. Matches `struct Results`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct GpuResults {
  pub vertex_count: u32,
  pub index_count: u32,
  /// Non-zero when triangulation hit a voxel without a vertex.
  pub error_flag: u32,
  /// Linear index of the voxel whose face failed.
  pub error_voxel: u32,
  /// Linear index of the neighbor that had no vertex.
  pub error_neighbor: u32,
  /// Axis (0..3) of the failing face.
  pub error_axis: u32,
  pub _pad: [u32; 2],
}

/// Vertex as laid out in storage (vec3 + scalar packs to 16 bytes).
/// Matches `struct GpuVertex`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
  pub position: [f32; 3],
  /// Linear index of the voxel that produced the vertex.
  pub cell: u32,
  pub normal: [f32; 3],
  pub _pad0: u32,
  pub color: [f32; 3],
  pub _pad1: u32,
}

impl GpuVertex {
  pub fn from_vertex(vertex: &Vertex, cell: u32) -> Self {
    Self {
      position: vertex.position,
      cell,
      normal: vertex.normal,
      _pad0: 0,
      color: vertex.color,
      _pad1: 0,
    }
  }

  pub fn to_vertex(&self) -> Vertex {
    Vertex {
      position: self.position,
      normal: self.normal,
      color: self.color,
    }
  }
}

/// Byte size of every buffer for a grid.
pub fn buffer_sizes(size: GridSize) -> [u64; BUFFER_COUNT] {
  let samples = size.sample_count() as u64;
  let voxels = size.voxel_count() as u64;
  let sizes = [
    std::mem::size_of::<GpuArgs>() as u64 + 4 * MAX_PROGRAM_WORDS as u64,
    std::mem::size_of::<GpuResults>() as u64,
    4 * samples,
    4 * voxels,
    std::mem::size_of::<GpuVertex>() as u64 * voxels,
    4 * INDICES_PER_VOXEL as u64 * voxels,
  ];
  sizes.map(|s| s.max(MIN_BUFFER_SIZE))
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
