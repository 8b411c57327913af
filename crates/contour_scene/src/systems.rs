//! Per-frame mesh extraction.

use web_time::Instant;

use crate::components::{MeshComponent, MeshSink};
use crate::error::SceneError;
use crate::scene::{EntityId, Scene};
use crate::snapshot::snapshot_sdf;

/// Outcome of one [`update_meshes`] call.
#[derive(Debug, Default)]
pub struct UpdateReport {
  /// Entities whose mesh component received a new mesh.
  pub updated: Vec<EntityId>,
  /// Entities that extracted no triangles; their mesh is untouched.
  pub empty: Vec<EntityId>,
  /// Entities with an extractor that did not need to run this frame.
  pub skipped: usize,
  pub failures: Vec<SceneError>,
  pub frame_us: u64,
}

impl UpdateReport {
  pub fn extracted(&self) -> usize {
    self.updated.len() + self.empty.len() + self.failures.len()
  }

  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }
}

/// Extract meshes for every entity with a `DualContouringComponent` that
/// wants an update, and hand non-empty results to its `MeshComponent`
/// (created on first use). Failures are collected, not propagated, so one
/// broken entity does not stall the others.
#[tracing::instrument(skip_all, name = "systems::update_meshes")]
pub fn update_meshes(scene: &mut Scene) -> UpdateReport {
  let start = Instant::now();
  let mut report = UpdateReport::default();

  let pending: Vec<EntityId> = scene
    .ids()
    .filter(|&id| {
      scene
        .get(id)
        .and_then(|node| node.extractor.as_ref())
        .is_some()
    })
    .collect();

  for id in pending {
    match update_entity(scene, id) {
      Ok(Some(true)) => report.updated.push(id),
      Ok(Some(false)) => report.empty.push(id),
      Ok(None) => report.skipped += 1,
      Err(err) => {
        tracing::warn!(entity = %id, error = %err, "mesh extraction failed");
        report.failures.push(err);
      }
    }
  }

  report.frame_us = start.elapsed().as_micros() as u64;
  tracing::debug!(
    updated = report.updated.len(),
    empty = report.empty.len(),
    skipped = report.skipped,
    failed = report.failures.len(),
    frame_us = report.frame_us,
    "meshes updated"
  );
  report
}

/// `None` if skipped, otherwise whether a mesh was deposited.
fn update_entity(scene: &mut Scene, id: EntityId) -> Result<Option<bool>, SceneError> {
  let wants_update = scene
    .node(id)?
    .extractor
    .as_ref()
    .is_some_and(|extractor| extractor.wants_update());
  if !wants_update {
    return Ok(None);
  }

  let sdf = snapshot_sdf(scene, id)?;
  let node = scene.node_mut(id)?;
  let Some(extractor) = node.extractor.as_mut() else {
    return Ok(None);
  };

  let (mesh, _stats) = extractor
    .extract(&sdf)
    .map_err(|source| SceneError::Extraction { entity: id, source })?;
  if mesh.indices.is_empty() {
    return Ok(Some(false));
  }

  node
    .mesh
    .get_or_insert_with(MeshComponent::default)
    .set_mesh(mesh.indices, mesh.vertices);
  Ok(Some(true))
}

#[cfg(test)]
#[path = "systems_test.rs"]
mod systems_test;
