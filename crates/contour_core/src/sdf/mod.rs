//! Signed distance fields.
//!
//! An [`SdfNode`] is a self-contained tree: leaf primitives, user closures,
//! and union/intersection combinators whose children carry their own
//! transform. Evaluation maps the query point into each child's local frame
//! and rescales the child's distance back by the child's smallest axis scale
//! (a conservative bound under non-uniform scaling).
//!
//! ```text
//!   Union ──┬── child(T₀) ── Sphere
//!           └── child(T₁) ── Intersect ──┬── child(T₂) ── Box
//!                                        └── child(T₃) ── Plane
//!
//!   d(p) = min( s₀·sphere(T₀⁻¹p), s₁·max(s₂·box(T₂⁻¹T₁⁻¹p), s₃·plane(..)) )
//! ```
//!
//! Trees without [`SdfNode::Custom`] leaves can be compiled to a flat
//! [`SdfProgram`] for GPU evaluation.

mod program;

use std::fmt;
use std::sync::Arc;

use glam::{Affine3A, Vec3};
pub use program::{SdfOp, SdfProgram, MAX_PROGRAM_DEPTH, MAX_PROGRAM_WORDS, VALUE_STACK_SIZE};

/// Anything that can be sampled as a signed distance field.
///
/// Negative = inside, positive = outside.
pub trait Sdf: Sync {
  fn evaluate(&self, p: Vec3) -> f32;
}

/// Built-in unit primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
  /// Sphere of radius 1 at the origin.
  Sphere,
  /// Axis-aligned box spanning [-1, 1] on every axis.
  Box,
  /// Half-space below the XZ plane (`y <= 0` is inside).
  Plane,
}

impl PrimitiveKind {
  #[inline]
  pub fn evaluate(self, p: Vec3) -> f32 {
    match self {
      PrimitiveKind::Sphere => p.length() - 1.0,
      PrimitiveKind::Box => {
        let q = p.abs() - Vec3::ONE;
        q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
      }
      PrimitiveKind::Plane => p.y,
    }
  }
}

/// User-supplied distance function. CPU only.
#[derive(Clone)]
pub struct CustomSdf(Arc<dyn Fn(Vec3) -> f32 + Send + Sync>);

impl CustomSdf {
  pub fn new(f: impl Fn(Vec3) -> f32 + Send + Sync + 'static) -> Self {
    Self(Arc::new(f))
  }

  #[inline]
  pub fn evaluate(&self, p: Vec3) -> f32 {
    (self.0)(p)
  }
}

impl fmt::Debug for CustomSdf {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("CustomSdf(..)")
  }
}

/// Child of a combinator: a node plus its placement in the parent's frame.
#[derive(Clone, Debug)]
pub struct SdfChild {
  /// Child-local to parent-local.
  pub transform: Affine3A,
  /// Parent-local to child-local (cached inverse of `transform`).
  pub inverse: Affine3A,
  /// Smallest axis scale of `transform`; multiplies the child's distance.
  pub scale: f32,
  pub node: SdfNode,
}

impl SdfChild {
  pub fn new(transform: Affine3A, node: SdfNode) -> Self {
    let m = transform.matrix3;
    let scale = m
      .x_axis
      .length()
      .min(m.y_axis.length())
      .min(m.z_axis.length());
    Self {
      transform,
      inverse: transform.inverse(),
      scale,
      node,
    }
  }

  /// Child placed without any transform.
  pub fn identity(node: SdfNode) -> Self {
    Self::new(Affine3A::IDENTITY, node)
  }

  #[inline]
  pub fn evaluate(&self, p: Vec3) -> f32 {
    self.node.evaluate(self.inverse.transform_point3(p)) * self.scale
  }
}

/// SDF expression tree.
#[derive(Clone, Debug)]
pub enum SdfNode {
  Primitive(PrimitiveKind),
  Custom(CustomSdf),
  /// Minimum over children; `+inf` when empty.
  Union(Vec<SdfChild>),
  /// Maximum over children; `-inf` when empty.
  Intersect(Vec<SdfChild>),
}

impl SdfNode {
  /// A field that is outside everywhere (empty union).
  pub fn none() -> Self {
    SdfNode::Union(Vec::new())
  }

  pub fn sphere() -> Self {
    SdfNode::Primitive(PrimitiveKind::Sphere)
  }

  pub fn cube() -> Self {
    SdfNode::Primitive(PrimitiveKind::Box)
  }

  pub fn plane() -> Self {
    SdfNode::Primitive(PrimitiveKind::Plane)
  }

  pub fn custom(f: impl Fn(Vec3) -> f32 + Send + Sync + 'static) -> Self {
    SdfNode::Custom(CustomSdf::new(f))
  }

  pub fn union(children: impl IntoIterator<Item = SdfChild>) -> Self {
    SdfNode::Union(children.into_iter().collect())
  }

  pub fn intersect(children: impl IntoIterator<Item = SdfChild>) -> Self {
    SdfNode::Intersect(children.into_iter().collect())
  }

  pub fn evaluate(&self, p: Vec3) -> f32 {
    match self {
      SdfNode::Primitive(kind) => kind.evaluate(p),
      SdfNode::Custom(f) => f.evaluate(p),
      SdfNode::Union(children) => children
        .iter()
        .fold(f32::INFINITY, |acc, child| acc.min(child.evaluate(p))),
      SdfNode::Intersect(children) => children
        .iter()
        .fold(f32::NEG_INFINITY, |acc, child| acc.max(child.evaluate(p))),
    }
  }

  /// Deepest chain of nested child transforms.
  pub fn depth(&self) -> usize {
    match self {
      SdfNode::Primitive(_) | SdfNode::Custom(_) => 0,
      SdfNode::Union(children) | SdfNode::Intersect(children) => children
        .iter()
        .map(|c| c.node.depth() + 1)
        .max()
        .unwrap_or(0),
    }
  }

  /// Whether the tree can be compiled with [`SdfProgram::compile`]
  /// (ignoring size limits).
  pub fn is_gpu_compatible(&self) -> bool {
    match self {
      SdfNode::Primitive(_) => true,
      SdfNode::Custom(_) => false,
      SdfNode::Union(children) | SdfNode::Intersect(children) => {
        children.iter().all(|c| c.node.is_gpu_compatible())
      }
    }
  }
}

impl Sdf for SdfNode {
  #[inline]
  fn evaluate(&self, p: Vec3) -> f32 {
    SdfNode::evaluate(self, p)
  }
}

impl Sdf for CustomSdf {
  #[inline]
  fn evaluate(&self, p: Vec3) -> f32 {
    CustomSdf::evaluate(self, p)
  }
}

/// Central-difference gradient of `sdf` at `p`. Not normalized.
#[inline]
pub fn gradient<S: Sdf + ?Sized>(sdf: &S, p: Vec3, delta: f32) -> Vec3 {
  let inv = 1.0 / (2.0 * delta);
  let dx = Vec3::new(delta, 0.0, 0.0);
  let dy = Vec3::new(0.0, delta, 0.0);
  let dz = Vec3::new(0.0, 0.0, delta);
  Vec3::new(
    (sdf.evaluate(p + dx) - sdf.evaluate(p - dx)) * inv,
    (sdf.evaluate(p + dy) - sdf.evaluate(p - dy)) * inv,
    (sdf.evaluate(p + dz) - sdf.evaluate(p - dz)) * inv,
  )
}
