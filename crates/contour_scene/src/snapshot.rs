//! Freeze the live hierarchy into an immutable [`SdfNode`] tree.
//!
//! Extraction evaluates the field millions of times; walking the arena on
//! every evaluation would tie the mesher to mutable scene state. Instead the
//! hierarchy under an entity is copied once per extraction:
//!
//! ```text
//!   entity (Union) ─┬─ a (Sphere, T_a)        Union
//!                   ├─ b (no SDF)       ──►    ├─ SdfChild(T_a, Sphere)
//!                   └─ c (Box, T_c)            └─ SdfChild(T_c, Box)
//! ```
//!
//! Only direct children with an [`SdfComponent`] become operands. The
//! root's own transform is not applied; the mesh lives in its local frame.

use contour_core::{SdfChild, SdfNode};

use crate::components::SdfComponent;
use crate::error::Result;
use crate::scene::{EntityId, Node, Scene};

/// Snapshot the field of `id`. Entities without an SDF give
/// [`SdfNode::none`].
pub fn snapshot_sdf(scene: &Scene, id: EntityId) -> Result<SdfNode> {
  let node = scene.node(id)?;
  match &node.sdf {
    Some(component) => snapshot_component(scene, node, component),
    None => Ok(SdfNode::none()),
  }
}

fn snapshot_component(scene: &Scene, node: &Node, component: &SdfComponent) -> Result<SdfNode> {
  Ok(match component {
    SdfComponent::Sphere => SdfNode::sphere(),
    SdfComponent::Box => SdfNode::cube(),
    SdfComponent::Plane => SdfNode::plane(),
    SdfComponent::Custom(f) => SdfNode::Custom(f.clone()),
    SdfComponent::Union => SdfNode::Union(sdf_children(scene, node)?),
    SdfComponent::Intersect => SdfNode::Intersect(sdf_children(scene, node)?),
  })
}

fn sdf_children(scene: &Scene, node: &Node) -> Result<Vec<SdfChild>> {
  let mut children = Vec::with_capacity(node.children().len());
  for &id in node.children() {
    let child = scene.node(id)?;
    let Some(component) = &child.sdf else {
      continue;
    };
    let sdf = snapshot_component(scene, child, component)?;
    children.push(SdfChild::new(child.transform.to_affine(), sdf));
  }
  Ok(children)
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
