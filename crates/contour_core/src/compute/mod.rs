//! Compute job abstraction used by the GPU extraction adapter.
//!
//! A job owns a fixed set of kernels and byte buffers. The adapter drives it
//! with a strict write → dispatch → dispatch → dispatch → read sequence;
//! every call blocks until the device has finished, so each dispatch sees
//! the previous one's writes.
//!
//! Two executors exist:
//!
//! - [`SoftwareComputeJob`]: runs registered Rust kernels on the rayon pool.
//!   Always available; used for tests and as a fallback.
//! - `WgpuComputeJob` (feature `gpu`): runs WGSL entry points through wgpu.

pub mod software;
#[cfg(feature = "gpu")]
pub mod wgpu_job;

use glam::UVec3;

pub use software::{KernelFn, KernelRegistry, SoftwareComputeJob};
#[cfg(feature = "gpu")]
pub use wgpu_job::WgpuComputeJob;

use crate::error::Result;

/// Threads per workgroup along each axis.
pub const WORKGROUP_SIZE: u32 = 4;

/// Workgroups needed to cover `cells` threads per axis: `ceil(cells / 4)`.
#[inline]
pub fn group_count(cells: UVec3) -> UVec3 {
  (cells + UVec3::splat(WORKGROUP_SIZE - 1)) / WORKGROUP_SIZE
}

/// Blocking compute backend.
pub trait ComputeJob: Send {
  /// (Re)create kernels by name and buffers by byte size. Previous buffers
  /// and their contents are dropped.
  fn init(&mut self, kernel_names: &[&str], buffer_sizes: &[u64]) -> Result<()>;

  /// Copy `bytes` to the start of buffer `index`.
  fn write_buffer(&mut self, index: usize, bytes: &[u8]) -> Result<()>;

  /// Run kernel `kernel` over `groups` workgroups and wait for completion.
  fn dispatch_immediate(&mut self, kernel: usize, groups: UVec3) -> Result<()>;

  /// Read the first `len` bytes of buffer `index`.
  fn read_buffer(&mut self, index: usize, len: usize) -> Result<Vec<u8>>;

  /// Human-readable backend name (logs, CLI output).
  fn name(&self) -> &str;
}

impl<J: ComputeJob + ?Sized> ComputeJob for Box<J> {
  fn init(&mut self, kernel_names: &[&str], buffer_sizes: &[u64]) -> Result<()> {
    (**self).init(kernel_names, buffer_sizes)
  }

  fn write_buffer(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
    (**self).write_buffer(index, bytes)
  }

  fn dispatch_immediate(&mut self, kernel: usize, groups: UVec3) -> Result<()> {
    (**self).dispatch_immediate(kernel, groups)
  }

  fn read_buffer(&mut self, index: usize, len: usize) -> Result<Vec<u8>> {
    (**self).read_buffer(index, len)
  }

  fn name(&self) -> &str {
    (**self).name()
  }
}
