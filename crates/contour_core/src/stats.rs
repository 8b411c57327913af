//! Extraction statistics and timing history.
//!
//! Timings are wall-clock microseconds from `web_time::Instant` so the same
//! code runs natively and on WASM.

use std::collections::VecDeque;

/// Which backend produced a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
  #[default]
  Cpu,
  Gpu,
}

/// Per-extraction counters and phase timings.
///
/// CPU extractions fill `sample_us`, `vertex_us` and `triangulate_us`.
/// GPU extractions fold sampling into the vertex kernel and additionally
/// report `compact_us` and `readback_us`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtractionStats {
  pub backend: Backend,
  pub grid_size: [u32; 3],
  pub sample_us: u64,
  pub vertex_us: u64,
  pub triangulate_us: u64,
  pub compact_us: u64,
  pub readback_us: u64,
  pub total_us: u64,
  /// Edge crossings found (CPU only).
  pub crossing_count: u64,
  pub vertex_count: u32,
  pub triangle_count: u32,
}

/// Frames of timing kept by [`MeshingMetrics`].
pub const TIMING_HISTORY_LEN: usize = 120;

/// The last `capacity` extraction times in microseconds, oldest first.
#[derive(Debug, Clone)]
pub struct TimingHistory {
  samples: VecDeque<u64>,
  capacity: usize,
}

impl Default for TimingHistory {
  fn default() -> Self {
    Self::with_capacity(TIMING_HISTORY_LEN)
  }
}

impl TimingHistory {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Record `us`, dropping the oldest sample once full.
  pub fn record(&mut self, us: u64) {
    if self.capacity == 0 {
      return;
    }
    if self.samples.len() == self.capacity {
      self.samples.pop_front();
    }
    self.samples.push_back(us);
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn latest(&self) -> Option<u64> {
    self.samples.back().copied()
  }

  pub fn samples(&self) -> impl Iterator<Item = u64> + '_ {
    self.samples.iter().copied()
  }

  pub fn total_us(&self) -> u64 {
    self.samples.iter().sum()
  }

  /// Mean of the kept samples, 0 when empty.
  pub fn mean_us(&self) -> f64 {
    match self.samples.len() {
      0 => 0.0,
      n => self.total_us() as f64 / n as f64,
    }
  }

  /// Fastest and slowest kept samples.
  pub fn range_us(&self) -> Option<(u64, u64)> {
    let fastest = self.samples.iter().min()?;
    let slowest = self.samples.iter().max()?;
    Some((*fastest, *slowest))
  }
}

/// Aggregate of many extractions (e.g. across frames).
#[derive(Debug, Clone, Default)]
pub struct MeshingMetrics {
  /// Total extraction time per mesh, microseconds.
  pub mesh_timings: TimingHistory,
  pub meshes_generated: u64,
  pub vertices_generated: u64,
  pub triangles_generated: u64,
  pub failures: u64,
  pub last: Option<ExtractionStats>,
}

impl MeshingMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, stats: &ExtractionStats) {
    self.mesh_timings.record(stats.total_us);
    self.meshes_generated += 1;
    self.vertices_generated += stats.vertex_count as u64;
    self.triangles_generated += stats.triangle_count as u64;
    self.last = Some(*stats);
  }

  pub fn record_failure(&mut self) {
    self.failures += 1;
  }

  pub fn avg_mesh_timing_us(&self) -> f64 {
    self.mesh_timings.mean_us()
  }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;
