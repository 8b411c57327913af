//! Dual Contouring with Schmitz particle relaxation.
//!
//! Converts any [`Sdf`] into an indexed triangle mesh with one vertex per
//! voxel that the surface passes through.
//!
//! # Processing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        INPUT                                    │
//! │  sdf: &impl Sdf             - distance function                 │
//! │  params: DualContouringParams - bounds, resolution, relaxation  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 1: Sampling                            │
//! │  gridSize = round((max - min) * resolution)                     │
//! │  field[x,y,z] = sdf(min + (x,y,z) / resolution)   (parallel)    │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 2: Vertex Placement (parallel)         │
//! │  For each voxel:                                                │
//! │    Find crossed edges, interpolate crossing, sample gradient    │
//! │    Relax from the crossing centroid along corner forces         │
//! │    Normal = normalized gradient at the relaxed position         │
//! │  Vertices are then numbered in voxel order (Z innermost)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PHASE 3: Triangulation                       │
//! │  For each interior voxel and axis X, Y, Z:                      │
//! │    Crossed grid edge -> quad of the 4 voxels around it          │
//! │    Winding chosen by crossing direction                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Determinism
//!
//! Vertex numbering and index order depend only on the grid, never on
//! thread scheduling, so repeated runs (and the GPU backend) produce the
//! same buffers.

pub mod crossings;
pub mod relax;
pub mod triangulate;

use glam::{UVec3, Vec3};
use rayon::prelude::*;
use web_time::Instant;

pub use crossings::{find_crossings, EdgeCrossing};
pub use triangulate::{triangulate, VertexIndexGrid};

use crate::constants::index_to_coord;
use crate::error::Result;
use crate::field::ScalarField;
use crate::sdf::{gradient, Sdf};
use crate::stats::{Backend, ExtractionStats};
use crate::types::{DualContouringParams, MeshOutput, Vertex};

/// Vertex produced by one voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedVertex {
  pub vertex: Vertex,
  /// Number of crossed edges the vertex was relaxed against.
  pub crossing_count: u32,
}

/// Place the vertex of one voxel from its 8 corner values.
///
/// Returns `None` when no edge of the voxel crosses the surface.
#[inline]
pub fn place_vertex<S: Sdf + ?Sized>(
  sdf: &S,
  corners: &[f32; 8],
  voxel: UVec3,
  params: &DualContouringParams,
) -> Option<PlacedVertex> {
  let crossings = find_crossings(sdf, corners, voxel, params);
  let local = relax::relax(&crossings, params.iteration_count, params.step_size)?;
  let position = params.grid_to_world(voxel.as_vec3() + local);
  let normal = gradient(sdf, position, params.normal_delta).normalize_or(Vec3::Y);

  Some(PlacedVertex {
    vertex: Vertex::new(position, normal),
    crossing_count: crossings.len() as u32,
  })
}

/// Extract a mesh from `sdf` over `params`' bounds.
///
/// # Errors
///
/// * [`Error::InvalidParams`](crate::Error::InvalidParams) for degenerate
///   grids or non-finite settings.
/// * [`Error::InvalidVertexIndex`](crate::Error::InvalidVertexIndex) if a
///   face crossing references a voxel without a vertex.
pub fn generate<S: Sdf + ?Sized>(sdf: &S, params: &DualContouringParams) -> Result<MeshOutput> {
  generate_timed(sdf, params).map(|(mesh, _)| mesh)
}

/// [`generate`] plus phase timings and counters.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "dual_contouring::generate"))]
pub fn generate_timed<S: Sdf + ?Sized>(
  sdf: &S,
  params: &DualContouringParams,
) -> Result<(MeshOutput, ExtractionStats)> {
  let size = params.grid_size()?;
  let start = Instant::now();
  let mut stats = ExtractionStats {
    backend: Backend::Cpu,
    grid_size: size.samples().to_array(),
    ..Default::default()
  };

  // =========================================================================
  // Phase 1: Sampling
  // =========================================================================
  let field = ScalarField::sample(sdf, params, size);
  stats.sample_us = start.elapsed().as_micros() as u64;

  // =========================================================================
  // Phase 2: Vertex placement
  // =========================================================================
  let phase_start = Instant::now();
  let voxel_dims = size.voxels();
  let placed: Vec<Option<PlacedVertex>> = {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("dual_contouring::vertices").entered();

    (0..size.voxel_count())
      .into_par_iter()
      .map(|i| {
        let voxel = index_to_coord(voxel_dims, i);
        place_vertex(sdf, &field.corners(voxel), voxel, params)
      })
      .collect()
  };

  let mut mesh = MeshOutput::new();
  let mut vertex_grid = VertexIndexGrid::new(voxel_dims);
  for (i, placed) in placed.into_iter().enumerate() {
    let Some(placed) = placed else {
      continue;
    };
    let index = mesh.push_vertex(placed.vertex, index_to_coord(voxel_dims, i));
    vertex_grid.set_linear(i, index);
    stats.crossing_count += placed.crossing_count as u64;
  }
  stats.vertex_us = phase_start.elapsed().as_micros() as u64;

  // =========================================================================
  // Phase 3: Triangulation
  // =========================================================================
  let phase_start = Instant::now();
  triangulate(&field, &vertex_grid, &mut mesh.indices)?;
  stats.triangulate_us = phase_start.elapsed().as_micros() as u64;

  stats.total_us = start.elapsed().as_micros() as u64;
  stats.vertex_count = mesh.vertices.len() as u32;
  stats.triangle_count = mesh.triangle_count() as u32;

  Ok((mesh, stats))
}
