//! Error type shared by the CPU mesher, the SDF program compiler and the
//! compute backends.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid dual contouring parameters: {0}")]
  InvalidParams(String),

  /// A face crossing was found but one of the four voxels around it produced
  /// no vertex. The crossing/face predicates disagreeing means the field is
  /// corrupt (NaN samples, mismatched buffers).
  #[error("Invalid Vertex Index: voxel {voxel:?} crosses along {axis} but neighbor {neighbor:?} has no vertex")]
  InvalidVertexIndex {
    voxel: [u32; 3],
    neighbor: [u32; 3],
    axis: char,
  },

  #[error("custom SDF nodes cannot be compiled to a GPU program")]
  UnsupportedOnGpu,

  #[error("SDF program needs {words} words, limit is {limit}")]
  ProgramTooLarge { words: usize, limit: usize },

  #[error("SDF tree nests {depth} transforms deep, limit is {limit}")]
  ProgramTooDeep { depth: usize, limit: usize },

  #[error("unknown compute kernel `{0}`")]
  UnknownKernel(String),

  #[error("compute buffer {index} out of range ({len} bytes requested, {capacity} available)")]
  BufferOutOfRange {
    index: usize,
    len: usize,
    capacity: usize,
  },

  #[error("compute job used before init")]
  NotInitialized,

  #[error("no compatible GPU adapter found")]
  NoAdapter,

  #[error("compute backend: {0}")]
  Compute(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
