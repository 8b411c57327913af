//! wgpu executor for the WGSL extraction kernels.
//!
//! One device, one shader module, one pipeline per entry point. All kernels
//! share a single bind group over the job's storage buffers, so buffer
//! indices equal binding numbers (binding 0 is read-only).

use glam::UVec3;

use super::ComputeJob;
use crate::error::{Error, Result};
use crate::gpu::layout::SHADER_SOURCE;

pub struct WgpuComputeJob {
  device: wgpu::Device,
  queue: wgpu::Queue,
  module: wgpu::ShaderModule,
  adapter_name: String,
  state: Option<JobState>,
}

struct JobState {
  pipelines: Vec<wgpu::ComputePipeline>,
  buffers: Vec<wgpu::Buffer>,
  bind_group: wgpu::BindGroup,
}

impl WgpuComputeJob {
  /// Open the default high-performance adapter and compile the kernels.
  pub fn new() -> Result<Self> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
      backends: wgpu::Backends::all(),
      ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
      power_preference: wgpu::PowerPreference::HighPerformance,
      compatible_surface: None,
      force_fallback_adapter: false,
    }))
    .ok_or(Error::NoAdapter)?;

    let (device, queue) = pollster::block_on(adapter.request_device(
      &wgpu::DeviceDescriptor {
        label: Some("contour compute device"),
        required_features: wgpu::Features::empty(),
        required_limits: adapter.limits(),
        memory_hints: wgpu::MemoryHints::Performance,
      },
      None,
    ))
    .map_err(|e| Error::Compute(format!("device request failed: {e}")))?;

    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("dual_contouring.wgsl"),
      source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
    });

    Ok(Self {
      device,
      queue,
      module,
      adapter_name: adapter.get_info().name,
      state: None,
    })
  }

  fn state(&self) -> Result<&JobState> {
    self.state.as_ref().ok_or(Error::NotInitialized)
  }

  fn buffer(&self, index: usize, len: usize) -> Result<&wgpu::Buffer> {
    let buffer = self.state()?.buffers.get(index).ok_or(Error::BufferOutOfRange {
      index,
      len,
      capacity: 0,
    })?;
    if len as u64 > buffer.size() {
      return Err(Error::BufferOutOfRange {
        index,
        len,
        capacity: buffer.size() as usize,
      });
    }
    Ok(buffer)
  }
}

fn bgl_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
  wgpu::BindGroupLayoutEntry {
    binding,
    visibility: wgpu::ShaderStages::COMPUTE,
    ty: wgpu::BindingType::Buffer {
      ty: wgpu::BufferBindingType::Storage { read_only },
      has_dynamic_offset: false,
      min_binding_size: None,
    },
    count: None,
  }
}

impl ComputeJob for WgpuComputeJob {
  fn init(&mut self, kernel_names: &[&str], buffer_sizes: &[u64]) -> Result<()> {
    self.state = None;

    let limit = self.device.limits().max_storage_buffer_binding_size as u64;
    if let Some((index, &size)) = buffer_sizes.iter().enumerate().find(|&(_, &s)| s > limit) {
      return Err(Error::Compute(format!(
        "buffer {index} needs {size} bytes, device binding limit is {limit}"
      )));
    }

    let buffers: Vec<wgpu::Buffer> = buffer_sizes
      .iter()
      .enumerate()
      .map(|(i, &size)| {
        self.device.create_buffer(&wgpu::BufferDescriptor {
          label: Some(&format!("contour buffer {i}")),
          size,
          usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
          mapped_at_creation: false,
        })
      })
      .collect();

    let entries: Vec<_> = (0..buffers.len() as u32).map(|b| bgl_entry(b, b == 0)).collect();
    let layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("contour bind group layout"),
      entries: &entries,
    });

    let bind_entries: Vec<_> = buffers
      .iter()
      .enumerate()
      .map(|(i, buffer)| wgpu::BindGroupEntry {
        binding: i as u32,
        resource: buffer.as_entire_binding(),
      })
      .collect();
    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some("contour bind group"),
      layout: &layout,
      entries: &bind_entries,
    });

    let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("contour pipeline layout"),
      bind_group_layouts: &[&layout],
      push_constant_ranges: &[],
    });

    let pipelines = kernel_names
      .iter()
      .map(|&name| {
        self.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
          label: Some(name),
          layout: Some(&pipeline_layout),
          module: &self.module,
          entry_point: Some(name),
          compilation_options: wgpu::PipelineCompilationOptions::default(),
          cache: None,
        })
      })
      .collect();

    self.state = Some(JobState {
      pipelines,
      buffers,
      bind_group,
    });
    Ok(())
  }

  fn write_buffer(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
    let buffer = self.buffer(index, bytes.len())?;
    self.queue.write_buffer(buffer, 0, bytes);
    Ok(())
  }

  fn dispatch_immediate(&mut self, kernel: usize, groups: UVec3) -> Result<()> {
    let state = self.state()?;
    let pipeline = state
      .pipelines
      .get(kernel)
      .ok_or_else(|| Error::UnknownKernel(format!("#{}", kernel)))?;

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("wgpu_dispatch", kernel, ?groups).entered();

    let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
      label: Some("contour dispatch"),
    });
    {
      let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some("contour pass"),
        timestamp_writes: None,
      });
      pass.set_pipeline(pipeline);
      pass.set_bind_group(0, &state.bind_group, &[]);
      pass.dispatch_workgroups(groups.x, groups.y, groups.z);
    }
    self.queue.submit(std::iter::once(encoder.finish()));
    self.device.poll(wgpu::Maintain::Wait);
    Ok(())
  }

  fn read_buffer(&mut self, index: usize, len: usize) -> Result<Vec<u8>> {
    let source = self.buffer(index, len)?;
    // Copies must be 4-byte aligned
    let copy_len = (len as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT).min(source.size());
    if copy_len == 0 {
      return Ok(Vec::new());
    }

    let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("contour staging"),
      size: copy_len,
      usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });
    let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
      label: Some("contour readback"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, copy_len);
    self.queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = crossbeam_channel::bounded(1);
    slice.map_async(wgpu::MapMode::Read, move |result| {
      let _ = sender.send(result);
    });
    self.device.poll(wgpu::Maintain::Wait);
    receiver
      .recv()
      .map_err(|e| Error::Compute(format!("readback channel closed: {e}")))?
      .map_err(|e| Error::Compute(format!("buffer map failed: {e:?}")))?;

    let mapped = slice.get_mapped_range();
    let bytes = mapped[..len].to_vec();
    drop(mapped);
    staging.unmap();
    Ok(bytes)
  }

  fn name(&self) -> &str {
    &self.adapter_name
  }
}
