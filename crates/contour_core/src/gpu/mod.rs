//! Dual Contouring on a compute device.
//!
//! [`GpuDualContouring`] compiles an [`SdfNode`] into a flat program, uploads
//! it with the extraction arguments and runs three kernels:
//!
//! ```text
//!   write args + program ─┐
//!   write zeroed results ─┤
//!                         ▼
//!   evaluate_relax   groups = ceil(samples / 4)   field + per-voxel vertex
//!   triangulate      groups = ceil(voxels / 4)    18 index slots per voxel
//!   compact          groups = 1                   pack in voxel order
//!                         │
//!   read results ◄────────┘  (counts, error report)
//!   read vertices[..vertex_count], indices[..index_count]
//! ```
//!
//! Buffers are sized per grid and reused while the bounds and resolution
//! stay the same. Output matches [`crate::dual_contouring::generate`] for
//! the same tree and params.

pub mod kernels;
pub mod layout;

use glam::Vec3;
use web_time::Instant;

pub use layout::{GpuArgs, GpuResults, GpuVertex};

use crate::compute::{group_count, ComputeJob, SoftwareComputeJob};
use crate::constants::{index_to_coord, AXIS_NAMES, INDICES_PER_VOXEL};
use crate::error::{Error, Result};
use crate::sdf::{SdfNode, SdfProgram};
use crate::stats::{Backend, ExtractionStats};
use crate::types::{DualContouringParams, GridSize, MeshOutput};
use layout::*;

/// Grid identity that decides whether buffers can be reused.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CacheKey {
  min_bound: Vec3,
  max_bound: Vec3,
  resolution: f32,
}

impl CacheKey {
  fn of(params: &DualContouringParams) -> Self {
    Self {
      min_bound: params.min_bound,
      max_bound: params.max_bound,
      resolution: params.resolution,
    }
  }
}

pub struct GpuDualContouring<J: ComputeJob> {
  job: J,
  cache: Option<CacheKey>,
}

impl GpuDualContouring<SoftwareComputeJob> {
  /// Adapter running the kernels on the CPU.
  pub fn software() -> Self {
    Self::new(SoftwareComputeJob::new(kernels::registry()))
  }
}

#[cfg(feature = "gpu")]
impl GpuDualContouring<crate::compute::WgpuComputeJob> {
  /// Adapter running the WGSL kernels on the default adapter.
  pub fn wgpu() -> Result<Self> {
    Ok(Self::new(crate::compute::WgpuComputeJob::new()?))
  }
}

impl<J: ComputeJob> GpuDualContouring<J> {
  pub fn new(job: J) -> Self {
    Self { job, cache: None }
  }

  pub fn job(&self) -> &J {
    &self.job
  }

  pub fn job_mut(&mut self) -> &mut J {
    &mut self.job
  }

  pub fn into_job(self) -> J {
    self.job
  }

  /// Drop the cached grid so the next call re-creates all buffers.
  pub fn invalidate(&mut self) {
    self.cache = None;
  }

  /// Extract a mesh from `sdf` on the compute job.
  ///
  /// # Errors
  ///
  /// * [`Error::UnsupportedOnGpu`] if the tree contains custom nodes.
  /// * [`Error::InvalidParams`] for degenerate grids.
  /// * [`Error::InvalidVertexIndex`] when the kernels report a face without
  ///   a vertex.
  /// * Any error of the underlying job.
  pub fn generate(&mut self, sdf: &SdfNode, params: &DualContouringParams) -> Result<MeshOutput> {
    self.generate_timed(sdf, params).map(|(mesh, _)| mesh)
  }

  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "gpu_dual_contouring::generate"))]
  pub fn generate_timed(
    &mut self,
    sdf: &SdfNode,
    params: &DualContouringParams,
  ) -> Result<(MeshOutput, ExtractionStats)> {
    let size = params.grid_size()?;
    let program = SdfProgram::compile(sdf)?;
    let start = Instant::now();
    let mut stats = ExtractionStats {
      backend: Backend::Gpu,
      grid_size: size.samples().to_array(),
      ..Default::default()
    };

    self.prepare(params, size)?;

    let args = GpuArgs::new(params, size, program.len());
    let mut arg_bytes = bytemuck::bytes_of(&args).to_vec();
    arg_bytes.extend_from_slice(bytemuck::cast_slice(program.words()));
    self.job.write_buffer(BUFFER_ARGS, &arg_bytes)?;
    self.job.write_buffer(BUFFER_RESULTS, bytemuck::bytes_of(&GpuResults::default()))?;
    stats.sample_us = start.elapsed().as_micros() as u64;

    // Sampling and vertex placement share one kernel
    let phase_start = Instant::now();
    self.job.dispatch_immediate(KERNEL_EVALUATE_RELAX, group_count(size.samples()))?;
    stats.vertex_us = phase_start.elapsed().as_micros() as u64;

    let phase_start = Instant::now();
    let voxel_groups = group_count(size.voxels()).max(glam::UVec3::ONE);
    self.job.dispatch_immediate(KERNEL_TRIANGULATE, voxel_groups)?;
    stats.triangulate_us = phase_start.elapsed().as_micros() as u64;

    let phase_start = Instant::now();
    self.job.dispatch_immediate(KERNEL_COMPACT, glam::UVec3::ONE)?;
    stats.compact_us = phase_start.elapsed().as_micros() as u64;

    let phase_start = Instant::now();
    let results: GpuResults =
      bytemuck::pod_read_unaligned(&self.job.read_buffer(BUFFER_RESULTS, std::mem::size_of::<GpuResults>())?);
    check_results(&results, size)?;

    let vertex_bytes = results.vertex_count as usize * std::mem::size_of::<GpuVertex>();
    let vertices: Vec<GpuVertex> = if vertex_bytes > 0 {
      bytemuck::pod_collect_to_vec(&self.job.read_buffer(BUFFER_VERTICES, vertex_bytes)?)
    } else {
      Vec::new()
    };
    let index_bytes = results.index_count as usize * 4;
    let indices: Vec<u32> = if index_bytes > 0 {
      bytemuck::pod_collect_to_vec(&self.job.read_buffer(BUFFER_INDICES, index_bytes)?)
    } else {
      Vec::new()
    };
    stats.readback_us = phase_start.elapsed().as_micros() as u64;

    let voxel_dims = size.voxels();
    let mut mesh = MeshOutput::new();
    for vertex in &vertices {
      mesh.push_vertex(vertex.to_vertex(), index_to_coord(voxel_dims, vertex.cell as usize));
    }
    mesh.indices = indices;

    stats.total_us = start.elapsed().as_micros() as u64;
    stats.vertex_count = mesh.vertices.len() as u32;
    stats.triangle_count = mesh.triangle_count() as u32;

    Ok((mesh, stats))
  }

  fn prepare(&mut self, params: &DualContouringParams, size: GridSize) -> Result<()> {
    let key = CacheKey::of(params);
    if self.cache == Some(key) {
      return Ok(());
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("gpu_dual_contouring::init", backend = self.job.name()).entered();

    self.cache = None;
    self.job.init(&KERNEL_NAMES, &buffer_sizes(size))?;
    self.cache = Some(key);
    Ok(())
  }
}

/// Turn the kernels' report into an error, or validate its counts.
fn check_results(results: &GpuResults, size: GridSize) -> Result<()> {
  let voxel_dims = size.voxels();
  if results.error_flag != 0 {
    return Err(Error::InvalidVertexIndex {
      voxel: index_to_coord(voxel_dims, results.error_voxel as usize).to_array(),
      neighbor: index_to_coord(voxel_dims, results.error_neighbor as usize).to_array(),
      axis: AXIS_NAMES[(results.error_axis as usize).min(2)],
    });
  }

  let voxel_count = size.voxel_count();
  if results.vertex_count as usize > voxel_count || results.index_count as usize > voxel_count * INDICES_PER_VOXEL {
    return Err(Error::Compute(format!(
      "kernel reported {} vertices and {} indices for {} voxels",
      results.vertex_count, results.index_count, voxel_count
    )));
  }
  Ok(())
}
