//! CPU executor for compute kernels.
//!
//! Kernels are plain Rust functions looked up by name, mirroring how a
//! shader module exposes entry points. Buffers are stored as `u32` words so
//! kernels can reinterpret them as any 4-byte-aligned `Pod` type.

use std::collections::HashMap;

use glam::UVec3;

use super::ComputeJob;
use crate::error::{Error, Result};

/// A software kernel: all buffers plus the dispatched workgroup count.
pub type KernelFn = fn(&mut [Vec<u32>], UVec3);

/// Named kernels available to a [`SoftwareComputeJob`].
#[derive(Clone, Default)]
pub struct KernelRegistry {
  kernels: HashMap<&'static str, KernelFn>,
}

impl KernelRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_kernel(mut self, name: &'static str, kernel: KernelFn) -> Self {
    self.kernels.insert(name, kernel);
    self
  }

  pub fn get(&self, name: &str) -> Option<KernelFn> {
    self.kernels.get(name).copied()
  }
}

pub struct SoftwareComputeJob {
  registry: KernelRegistry,
  kernels: Vec<KernelFn>,
  buffers: Vec<Vec<u32>>,
  sizes: Vec<usize>,
  init_count: u64,
  dispatch_count: u64,
}

impl SoftwareComputeJob {
  pub fn new(registry: KernelRegistry) -> Self {
    Self {
      registry,
      kernels: Vec::new(),
      buffers: Vec::new(),
      sizes: Vec::new(),
      init_count: 0,
      dispatch_count: 0,
    }
  }

  /// Number of successful [`ComputeJob::init`] calls.
  pub fn init_count(&self) -> u64 {
    self.init_count
  }

  /// Number of kernel dispatches since creation.
  pub fn dispatch_count(&self) -> u64 {
    self.dispatch_count
  }

  fn buffer_capacity(&self, index: usize, len: usize) -> Result<usize> {
    let capacity = *self.sizes.get(index).ok_or(Error::BufferOutOfRange {
      index,
      len,
      capacity: 0,
    })?;
    if len > capacity {
      return Err(Error::BufferOutOfRange {
        index,
        len,
        capacity,
      });
    }
    Ok(capacity)
  }
}

impl ComputeJob for SoftwareComputeJob {
  fn init(&mut self, kernel_names: &[&str], buffer_sizes: &[u64]) -> Result<()> {
    let kernels = kernel_names
      .iter()
      .map(|name| {
        self
          .registry
          .get(name)
          .ok_or_else(|| Error::UnknownKernel(name.to_string()))
      })
      .collect::<Result<Vec<_>>>()?;

    self.kernels = kernels;
    self.sizes = buffer_sizes.iter().map(|&s| s as usize).collect();
    self.buffers = self.sizes.iter().map(|&s| vec![0u32; s.div_ceil(4)]).collect();
    self.init_count += 1;
    Ok(())
  }

  fn write_buffer(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
    self.buffer_capacity(index, bytes.len())?;
    let dst: &mut [u8] = bytemuck::cast_slice_mut(&mut self.buffers[index]);
    dst[..bytes.len()].copy_from_slice(bytes);
    Ok(())
  }

  fn dispatch_immediate(&mut self, kernel: usize, groups: UVec3) -> Result<()> {
    if self.kernels.is_empty() {
      return Err(Error::NotInitialized);
    }
    let kernel = *self
      .kernels
      .get(kernel)
      .ok_or_else(|| Error::UnknownKernel(format!("#{}", kernel)))?;

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("software_dispatch", ?groups).entered();

    kernel(&mut self.buffers, groups);
    self.dispatch_count += 1;
    Ok(())
  }

  fn read_buffer(&mut self, index: usize, len: usize) -> Result<Vec<u8>> {
    self.buffer_capacity(index, len)?;
    let src: &[u8] = bytemuck::cast_slice(&self.buffers[index]);
    Ok(src[..len].to_vec())
  }

  fn name(&self) -> &str {
    "software"
  }
}

#[cfg(test)]
#[path = "software_test.rs"]
mod software_test;
