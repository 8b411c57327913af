//! Components attached to scene nodes.

use contour_core::compute::ComputeJob;
use contour_core::sdf::CustomSdf;
use contour_core::{
  dual_contouring, DualContouringParams, ExtractionStats, GpuDualContouring, MeshOutput,
  MeshingMetrics, SdfNode, Vertex,
};

// =============================================================================
// SDF
// =============================================================================

/// Distance field contributed by an entity.
///
/// Combinators take their operands from the entity's direct children that
/// carry an `SdfComponent`, each placed by the child's local transform.
#[derive(Clone, Debug)]
pub enum SdfComponent {
  Sphere,
  Box,
  Plane,
  Custom(CustomSdf),
  Union,
  Intersect,
}

impl SdfComponent {
  pub fn custom(f: impl Fn(glam::Vec3) -> f32 + Send + Sync + 'static) -> Self {
    SdfComponent::Custom(CustomSdf::new(f))
  }

  /// Whether this component reads its children.
  pub fn is_combinator(&self) -> bool {
    matches!(self, SdfComponent::Union | SdfComponent::Intersect)
  }
}

// =============================================================================
// Mesh sink
// =============================================================================

/// Receiver of extracted meshes.
pub trait MeshSink {
  /// Replace the stored mesh.
  fn set_mesh(&mut self, indices: Vec<u32>, vertices: Vec<Vertex>);
}

/// Renderable mesh owned by an entity. `dirty` is raised on every update
/// and cleared by whoever uploads the mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshComponent {
  indices: Vec<u32>,
  vertices: Vec<Vertex>,
  dirty: bool,
  revision: u64,
}

impl MeshComponent {
  pub fn indices(&self) -> &[u32] {
    &self.indices
  }

  pub fn vertices(&self) -> &[Vertex] {
    &self.vertices
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Number of meshes received so far.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  /// Clear the dirty flag, returning its previous value.
  pub fn take_dirty(&mut self) -> bool {
    std::mem::take(&mut self.dirty)
  }
}

impl MeshSink for MeshComponent {
  fn set_mesh(&mut self, indices: Vec<u32>, vertices: Vec<Vertex>) {
    self.indices = indices;
    self.vertices = vertices;
    self.dirty = true;
    self.revision += 1;
  }
}

// =============================================================================
// Extraction
// =============================================================================

/// Where an extraction runs.
pub enum ExtractionBackend {
  Cpu,
  Gpu(Box<GpuDualContouring<Box<dyn ComputeJob>>>),
}

impl ExtractionBackend {
  /// Compute pipeline on the software executor.
  pub fn software_gpu() -> Self {
    Self::gpu_with(Box::new(contour_core::SoftwareComputeJob::new(
      contour_core::gpu::kernels::registry(),
    )))
  }

  /// Compute pipeline on the default wgpu adapter.
  #[cfg(feature = "gpu")]
  pub fn wgpu() -> contour_core::Result<Self> {
    Ok(Self::gpu_with(Box::new(contour_core::compute::WgpuComputeJob::new()?)))
  }

  pub fn gpu_with(job: Box<dyn ComputeJob>) -> Self {
    ExtractionBackend::Gpu(Box::new(GpuDualContouring::new(job)))
  }

  pub fn name(&self) -> &str {
    match self {
      ExtractionBackend::Cpu => "cpu",
      ExtractionBackend::Gpu(gpu) => gpu.job().name(),
    }
  }
}

/// Requests a mesh for the entity's SDF.
///
/// Runs once, or every frame when `enable_update` is set.
pub struct DualContouringComponent {
  pub params: DualContouringParams,
  pub enable_update: bool,
  pub backend: ExtractionBackend,
  pub metrics: MeshingMetrics,
  has_run: bool,
}

impl Default for DualContouringComponent {
  fn default() -> Self {
    Self::new(DualContouringParams::default())
  }
}

impl DualContouringComponent {
  pub fn new(params: DualContouringParams) -> Self {
    Self {
      params,
      enable_update: false,
      backend: ExtractionBackend::Cpu,
      metrics: MeshingMetrics::new(),
      has_run: false,
    }
  }

  pub fn with_enable_update(mut self, enable: bool) -> Self {
    self.enable_update = enable;
    self
  }

  pub fn with_backend(mut self, backend: ExtractionBackend) -> Self {
    self.backend = backend;
    self
  }

  /// Whether the next frame should extract.
  pub fn wants_update(&self) -> bool {
    self.enable_update || !self.has_run
  }

  /// Force one more extraction even without `enable_update`.
  pub fn request_update(&mut self) {
    self.has_run = false;
  }

  pub fn last_stats(&self) -> Option<&ExtractionStats> {
    self.metrics.last.as_ref()
  }

  /// Run one extraction on the configured backend and record metrics.
  pub fn extract(&mut self, sdf: &SdfNode) -> contour_core::Result<(MeshOutput, ExtractionStats)> {
    self.has_run = true;
    let result = match &mut self.backend {
      ExtractionBackend::Cpu => dual_contouring::generate_timed(sdf, &self.params),
      ExtractionBackend::Gpu(gpu) => gpu.generate_timed(sdf, &self.params),
    };
    match &result {
      Ok((_, stats)) => self.metrics.record(stats),
      Err(_) => self.metrics.record_failure(),
    }
    result
  }
}

#[cfg(test)]
#[path = "components_test.rs"]
mod components_test;
