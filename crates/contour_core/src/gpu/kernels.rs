//! Software versions of the three extraction kernels.
//!
//! Each function follows its WGSL entry point: one logical invocation per
//! sample or voxel, skipping coordinates outside the dispatched workgroups
//! and writing only to its own slots. Invocations run on the rayon pool.

use glam::UVec3;
use rayon::prelude::*;

use super::layout::*;
use crate::compute::{KernelRegistry, WORKGROUP_SIZE};
use crate::constants::{coord_to_index, index_to_coord, CORNER_OFFSETS, INDICES_PER_VOXEL, NO_VERTEX};
use crate::dual_contouring::place_vertex;
use crate::dual_contouring::triangulate::emit_voxel_faces;
use crate::error::Error;
use crate::sdf::SdfProgram;

/// Registry with all extraction kernels under their entry point names.
pub fn registry() -> KernelRegistry {
  KernelRegistry::new()
    .with_kernel(KERNEL_NAMES[KERNEL_EVALUATE_RELAX], evaluate_relax)
    .with_kernel(KERNEL_NAMES[KERNEL_TRIANGULATE], triangulate)
    .with_kernel(KERNEL_NAMES[KERNEL_COMPACT], compact)
}

const HEADER_WORDS: usize = std::mem::size_of::<GpuArgs>() / 4;
const RESULTS_WORDS: usize = std::mem::size_of::<GpuResults>() / 4;

fn read_args(words: &[u32]) -> Option<(GpuArgs, &[u32])> {
  let header: GpuArgs = bytemuck::pod_read_unaligned(bytemuck::cast_slice(words.get(..HEADER_WORDS)?));
  let program = words.get(HEADER_WORDS..HEADER_WORDS + header.program_len as usize)?;
  Some((header, program))
}

fn read_results(words: &[u32]) -> Option<GpuResults> {
  Some(bytemuck::pod_read_unaligned(bytemuck::cast_slice(words.get(..RESULTS_WORDS)?)))
}

fn write_results(words: &mut [u32], results: &GpuResults) {
  if let Some(dst) = words.get_mut(..RESULTS_WORDS) {
    dst.copy_from_slice(bytemuck::cast_slice(std::slice::from_ref(results)));
  }
}

#[inline(always)]
fn dispatched(coord: UVec3, groups: UVec3) -> bool {
  coord.cmplt(groups * WORKGROUP_SIZE).all()
}

/// Kernel 1: sample the field and place one vertex per voxel.
///
/// Vertex slot `i` belongs to voxel `i`; voxels without crossings store
/// `NO_VERTEX` in the vertex grid. Corners are evaluated directly from the
/// program so no invocation reads another's field writes.
pub fn evaluate_relax(buffers: &mut [Vec<u32>], groups: UVec3) {
  let [args, _, field, vertex_grid, vertices, _] = buffers else {
    return;
  };
  let Some((header, words)) = read_args(args) else {
    return;
  };
  let program = SdfProgram::from_words(words.to_vec());
  let params = header.params();
  let size = header.grid();
  let samples = size.samples();

  let Ok(field) = bytemuck::try_cast_slice_mut::<u32, f32>(field) else {
    return;
  };
  field
    .par_iter_mut()
    .take(size.sample_count())
    .enumerate()
    .for_each(|(i, value)| {
      let coord = index_to_coord(samples, i);
      if dispatched(coord, groups) {
        *value = program.evaluate(params.grid_to_world(coord.as_vec3()));
      }
    });

  let voxel_count = size.voxel_count();
  if voxel_count == 0 {
    return;
  }
  let voxel_dims = size.voxels();
  let Ok(vertices) = bytemuck::try_cast_slice_mut::<u32, GpuVertex>(vertices) else {
    return;
  };

  vertex_grid
    .par_iter_mut()
    .zip(vertices.par_iter_mut())
    .take(voxel_count)
    .enumerate()
    .for_each(|(i, (slot, vertex))| {
      let voxel = index_to_coord(voxel_dims, i);
      if !dispatched(voxel, groups) {
        return;
      }
      let corners = CORNER_OFFSETS.map(|offset| program.evaluate(params.grid_to_world((voxel + offset).as_vec3())));
      match place_vertex(&program, &corners, voxel, &params) {
        Some(placed) => {
          *vertex = GpuVertex::from_vertex(&placed.vertex, i as u32);
          *slot = i as u32;
        }
        None => *slot = NO_VERTEX,
      }
    });
}

/// Kernel 2: fill each voxel's 18 index slots with vertex slots.
///
/// Unused slots hold `NO_VERTEX`. A face that references a voxel without a
/// vertex raises the error flag; the lowest failing voxel is reported.
pub fn triangulate(buffers: &mut [Vec<u32>], groups: UVec3) {
  let [args, results, field, vertex_grid, _, indices] = buffers else {
    return;
  };
  let Some((header, _)) = read_args(args) else {
    return;
  };
  let size = header.grid();
  let samples = size.samples();
  let voxel_dims = size.voxels();
  let Ok(field) = bytemuck::try_cast_slice::<u32, f32>(field) else {
    return;
  };
  let vertex_grid: &[u32] = vertex_grid;

  let failure = indices
    .par_chunks_mut(INDICES_PER_VOXEL)
    .take(size.voxel_count())
    .enumerate()
    .filter_map(|(i, slots)| {
      let voxel = index_to_coord(voxel_dims, i);
      if !dispatched(voxel, groups) {
        return None;
      }
      slots.fill(NO_VERTEX);
      emit_voxel_faces(
        voxel,
        voxel_dims,
        |c| field[coord_to_index(samples, c)],
        |v| vertex_grid[coord_to_index(voxel_dims, v)],
        |axis, tris| slots[axis * 6..axis * 6 + 6].copy_from_slice(&tris),
      )
      .err()
      .map(|err| (i, err))
    })
    .min_by_key(|(i, _)| *i);

  if let Some((voxel_index, Error::InvalidVertexIndex { neighbor, axis, .. })) = failure {
    let Some(mut report) = read_results(results) else {
      return;
    };
    report.error_flag = 1;
    report.error_voxel = voxel_index as u32;
    report.error_neighbor = coord_to_index(voxel_dims, UVec3::from_array(neighbor)) as u32;
    report.error_axis = match axis {
      'x' => 0,
      'y' => 1,
      _ => 2,
    };
    write_results(results, &report);
  }
}

/// Kernel 3: pack vertices and indices in voxel order and publish counts.
///
/// Single invocation. Index slots are remapped from voxel slots to packed
/// vertex indices; when triangulation failed no indices are kept.
pub fn compact(buffers: &mut [Vec<u32>], groups: UVec3) {
  if groups.cmpeq(UVec3::ZERO).any() {
    return;
  }
  let [args, results, _, vertex_grid, vertices, indices] = buffers else {
    return;
  };
  let Some((header, _)) = read_args(args) else {
    return;
  };
  let Some(mut report) = read_results(results) else {
    return;
  };
  let voxel_count = header.grid().voxel_count();

  let mut vertex_count = 0usize;
  if voxel_count > 0 {
    let Ok(vertices) = bytemuck::try_cast_slice_mut::<u32, GpuVertex>(vertices) else {
      return;
    };
    for v in 0..voxel_count {
      if vertex_grid[v] != NO_VERTEX {
        vertices[vertex_count] = vertices[v];
        vertex_grid[v] = vertex_count as u32;
        vertex_count += 1;
      }
    }
  }

  let mut index_count = 0usize;
  if report.error_flag == 0 {
    for s in 0..voxel_count * INDICES_PER_VOXEL {
      let slot = indices[s];
      if slot != NO_VERTEX {
        indices[index_count] = vertex_grid[slot as usize];
        index_count += 1;
      }
    }
  }

  report.vertex_count = vertex_count as u32;
  report.index_count = index_count as u32;
  write_results(results, &report);
}

#[cfg(test)]
#[path = "kernels_test.rs"]
mod kernels_test;
