//! contour_core - Engine independent SDF meshing with Dual Contouring
//!
//! This crate turns signed distance fields into indexed triangle meshes. A
//! field is either any type implementing [`Sdf`] or a self-contained
//! [`SdfNode`] tree of primitives, closures and union/intersection nodes.
//!
//! # Features
//!
//! - **Dual Contouring**: one vertex per surface voxel, placed by Schmitz
//!   particle relaxation and shaded with the field gradient
//! - **Deterministic output**: vertex and index order depend only on the
//!   grid, so repeated runs and both backends agree
//! - **Compute backend**: the same pipeline as three kernels on a
//!   [`ComputeJob`], either the software executor or wgpu (feature `gpu`)
//! - **Metrics**: per-extraction timings and rolling windows
//!
//! # Example
//!
//! ```
//! use contour_core::{dual_contouring, DualContouringParams, SdfNode};
//!
//! let params = DualContouringParams::new().with_resolution(8.0);
//! let mesh = dual_contouring::generate(&SdfNode::sphere(), &params).unwrap();
//!
//! println!("Generated {} vertices, {} triangles",
//!     mesh.vertices.len(), mesh.triangle_count());
//! ```

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use constants::{coord_to_index, index_to_coord, CORNER_OFFSETS, EDGE_CORNERS, NO_VERTEX};
pub use error::{Error, Result};
pub use types::{DualContouringParams, GridSize, MeshOutput, MinMaxAABB, Vertex};

// Distance fields and their flat program form
pub mod sdf;
pub use sdf::{gradient, PrimitiveKind, Sdf, SdfChild, SdfNode, SdfProgram};

pub mod field;
pub use field::ScalarField;

// CPU mesher
pub mod dual_contouring;

// Compute executors and the GPU adapter
pub mod compute;
pub use compute::{ComputeJob, SoftwareComputeJob};
pub mod gpu;
pub use gpu::GpuDualContouring;

pub mod stats;
pub use stats::{Backend, ExtractionStats, MeshingMetrics};

// Fixtures shared with downstream tests and benches
pub mod test_utils;
