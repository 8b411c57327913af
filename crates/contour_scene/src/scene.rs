//! Arena scene graph.
//!
//! Nodes live in a slot vector and refer to each other by [`EntityId`]
//! (slot index + generation), so parent links never own anything and
//! reparenting only edits two child lists.
//!
//! ```text
//!   slots: [ root₀ | child₁ | (free) | child₃ ]
//!             │  ▲      ▲               │
//!             │  └──────┼───── parent ──┘
//!             └ children: [1, 3]
//! ```
//!
//! Despawned slots are recycled with a bumped generation; stale ids resolve
//! to [`SceneError::NoSuchEntity`].

use std::fmt;

use glam::{Affine3A, Quat, Vec3};
use smallvec::SmallVec;

use crate::components::{DualContouringComponent, MeshComponent, SdfComponent};
use crate::error::{Result, SceneError};

// =============================================================================
// EntityId
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityId {
  index: u32,
  generation: u32,
}

impl EntityId {
  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn generation(&self) -> u32 {
    self.generation
  }
}

impl fmt::Display for EntityId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}v{}", self.index, self.generation)
  }
}

// =============================================================================
// Transform
// =============================================================================

/// Local placement relative to the parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
  pub translation: Vec3,
  pub rotation: Quat,
  pub scale: Vec3,
}

impl Default for Transform {
  fn default() -> Self {
    Self::IDENTITY
  }
}

impl Transform {
  pub const IDENTITY: Self = Self {
    translation: Vec3::ZERO,
    rotation: Quat::IDENTITY,
    scale: Vec3::ONE,
  };

  pub fn from_translation(translation: Vec3) -> Self {
    Self {
      translation,
      ..Self::IDENTITY
    }
  }

  pub fn with_rotation(mut self, rotation: Quat) -> Self {
    self.rotation = rotation;
    self
  }

  pub fn with_scale(mut self, scale: Vec3) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_uniform_scale(self, scale: f32) -> Self {
    self.with_scale(Vec3::splat(scale))
  }

  /// Local to parent.
  pub fn to_affine(&self) -> Affine3A {
    Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
  }
}

// =============================================================================
// Node
// =============================================================================

/// One entity: hierarchy links, transform and optional components.
#[derive(Default)]
pub struct Node {
  pub name: String,
  pub transform: Transform,
  pub sdf: Option<SdfComponent>,
  pub mesh: Option<MeshComponent>,
  pub extractor: Option<DualContouringComponent>,
  parent: Option<EntityId>,
  children: SmallVec<[EntityId; 4]>,
}

impl Node {
  pub fn parent(&self) -> Option<EntityId> {
    self.parent
  }

  /// Direct children in insertion order.
  pub fn children(&self) -> &[EntityId] {
    &self.children
  }
}

struct Slot {
  generation: u32,
  node: Option<Node>,
}

// =============================================================================
// Scene
// =============================================================================

#[derive(Default)]
pub struct Scene {
  slots: Vec<Slot>,
  free: Vec<u32>,
  roots: Vec<EntityId>,
  len: usize,
}

impl Scene {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Root entities in spawn order.
  pub fn roots(&self) -> &[EntityId] {
    &self.roots
  }

  pub fn contains(&self, id: EntityId) -> bool {
    self.get(id).is_some()
  }

  pub fn get(&self, id: EntityId) -> Option<&Node> {
    self
      .slots
      .get(id.index as usize)
      .filter(|slot| slot.generation == id.generation)
      .and_then(|slot| slot.node.as_ref())
  }

  pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Node> {
    self
      .slots
      .get_mut(id.index as usize)
      .filter(|slot| slot.generation == id.generation)
      .and_then(|slot| slot.node.as_mut())
  }

  pub fn node(&self, id: EntityId) -> Result<&Node> {
    self.get(id).ok_or(SceneError::NoSuchEntity(id))
  }

  pub fn node_mut(&mut self, id: EntityId) -> Result<&mut Node> {
    self.get_mut(id).ok_or(SceneError::NoSuchEntity(id))
  }

  pub fn parent(&self, id: EntityId) -> Result<Option<EntityId>> {
    Ok(self.node(id)?.parent)
  }

  pub fn children(&self, id: EntityId) -> Result<&[EntityId]> {
    Ok(self.node(id)?.children())
  }

  /// Live entity ids in slot order.
  pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
    self.slots.iter().enumerate().filter_map(|(i, slot)| {
      slot.node.as_ref().map(|_| EntityId {
        index: i as u32,
        generation: slot.generation,
      })
    })
  }

  /// Spawn a root entity.
  pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
    let id = self.allocate(Node {
      name: name.into(),
      ..Default::default()
    });
    self.roots.push(id);
    id
  }

  /// Spawn an entity under `parent`.
  pub fn spawn_child(&mut self, parent: EntityId, name: impl Into<String>) -> Result<EntityId> {
    self.node(parent)?;
    let id = self.allocate(Node {
      name: name.into(),
      parent: Some(parent),
      ..Default::default()
    });
    self.node_mut(parent)?.children.push(id);
    Ok(id)
  }

  /// Move `child` under `parent`, or to the roots with `None`.
  ///
  /// Fails if `parent` is `child` itself or one of its descendants.
  pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<()> {
    let old_parent = self.node(child)?.parent;
    if let Some(parent) = parent {
      if self.is_ancestor_or_self(child, parent)? {
        return Err(SceneError::Cycle { child, parent });
      }
    }
    if old_parent == parent {
      return Ok(());
    }

    self.detach(child, old_parent);
    match parent {
      Some(parent) => self.node_mut(parent)?.children.push(child),
      None => self.roots.push(child),
    }
    self.node_mut(child)?.parent = parent;
    Ok(())
  }

  /// Remove `id` and all of its descendants.
  pub fn despawn(&mut self, id: EntityId) -> Result<()> {
    let parent = self.node(id)?.parent;
    self.detach(id, parent);

    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
      let slot = &mut self.slots[current.index as usize];
      if let Some(node) = slot.node.take() {
        stack.extend(node.children.iter().copied());
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(current.index);
        self.len -= 1;
      }
    }
    Ok(())
  }

  /// Local-to-scene transform: the product of all ancestor transforms.
  pub fn world_transform(&self, id: EntityId) -> Result<Affine3A> {
    let mut transform = Affine3A::IDENTITY;
    let mut current = Some(id);
    while let Some(entity) = current {
      let node = self.node(entity)?;
      transform = node.transform.to_affine() * transform;
      current = node.parent;
    }
    Ok(transform)
  }

  fn allocate(&mut self, node: Node) -> EntityId {
    self.len += 1;
    if let Some(index) = self.free.pop() {
      let slot = &mut self.slots[index as usize];
      slot.node = Some(node);
      return EntityId {
        index,
        generation: slot.generation,
      };
    }
    self.slots.push(Slot {
      generation: 0,
      node: Some(node),
    });
    EntityId {
      index: (self.slots.len() - 1) as u32,
      generation: 0,
    }
  }

  fn detach(&mut self, id: EntityId, parent: Option<EntityId>) {
    match parent.and_then(|p| self.get_mut(p)) {
      Some(parent) => parent.children.retain(|c| *c != id),
      None => self.roots.retain(|r| *r != id),
    }
  }

  /// Whether `ancestor` is `id` or on the parent chain of `id`.
  fn is_ancestor_or_self(&self, ancestor: EntityId, id: EntityId) -> Result<bool> {
    let mut current = Some(id);
    while let Some(entity) = current {
      if entity == ancestor {
        return Ok(true);
      }
      current = self.node(entity)?.parent;
    }
    Ok(false)
  }
}

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;
