//! Scene layer for contour_core.
//!
//! This crate holds entities in an arena hierarchy, lets them carry SDF,
//! mesh and extraction components, and runs Dual Contouring for them once
//! per frame.

pub mod components;
pub mod error;
pub mod scene;
pub mod snapshot;
pub mod systems;

pub use components::{
  DualContouringComponent, ExtractionBackend, MeshComponent, MeshSink, SdfComponent,
};
pub use error::{Result, SceneError};
pub use scene::{EntityId, Node, Scene, Transform};
pub use snapshot::snapshot_sdf;
pub use systems::{update_meshes, UpdateReport};
