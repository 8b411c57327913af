//! Flat postfix encoding of an [`SdfNode`] tree.
//!
//! The GPU cannot walk pointers, so trees are lowered to a stream of `u32`
//! words interpreted with two small stacks: a value stack and a stack of
//! saved query points.
//!
//! ```text
//! Op             operands          effect
//! ─────────────  ────────────────  ──────────────────────────────────────
//! Sphere/Box/    -                 push primitive(p)
//! Plane
//! PushConst      f32               push constant
//! Min / Max      -                 pop b, pop a, push min(a,b) / max(a,b)
//! PushTransform  12 × f32          save p; p = inverse · p
//!                (x,y,z axes, t)
//! PopTransform   f32 scale         restore p; top *= scale
//! ```
//!
//! Emission mirrors [`SdfNode::evaluate`] operation for operation (same fold
//! seeds, same child order, same scale multiply), so interpreting a program
//! reproduces the tree's values exactly.

use glam::{Affine3A, Vec3, Vec3A};

use super::{PrimitiveKind, SdfChild, SdfNode};
use crate::error::{Error, Result};

/// Maximum nesting of child transforms.
pub const MAX_PROGRAM_DEPTH: usize = 16;

/// Value stack capacity: each nesting level holds an accumulator and one
/// child result.
pub const VALUE_STACK_SIZE: usize = 2 * MAX_PROGRAM_DEPTH + 2;

/// Program capacity reserved in the GPU argument buffer.
pub const MAX_PROGRAM_WORDS: usize = 4096;

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdfOp {
  Sphere = 1,
  Box = 2,
  Plane = 3,
  PushConst = 4,
  Min = 5,
  Max = 6,
  PushTransform = 7,
  PopTransform = 8,
}

impl SdfOp {
  pub fn from_word(word: u32) -> Option<Self> {
    Some(match word {
      1 => SdfOp::Sphere,
      2 => SdfOp::Box,
      3 => SdfOp::Plane,
      4 => SdfOp::PushConst,
      5 => SdfOp::Min,
      6 => SdfOp::Max,
      7 => SdfOp::PushTransform,
      8 => SdfOp::PopTransform,
      _ => return None,
    })
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SdfProgram {
  words: Vec<u32>,
}

impl SdfProgram {
  /// Lower a tree. Fails on custom leaves, nesting deeper than
  /// [`MAX_PROGRAM_DEPTH`] or more than [`MAX_PROGRAM_WORDS`] words.
  pub fn compile(node: &SdfNode) -> Result<Self> {
    let mut words = Vec::new();
    emit_node(node, 0, &mut words)?;
    if words.len() > MAX_PROGRAM_WORDS {
      return Err(Error::ProgramTooLarge {
        words: words.len(),
        limit: MAX_PROGRAM_WORDS,
      });
    }
    Ok(Self { words })
  }

  /// Wrap words produced by [`SdfProgram::compile`] (e.g. read back from an
  /// argument buffer).
  pub fn from_words(words: Vec<u32>) -> Self {
    Self { words }
  }

  pub fn words(&self) -> &[u32] {
    &self.words
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Interpret the program at `p`.
  ///
  /// Malformed streams evaluate to `+inf` (outside) rather than panicking.
  pub fn evaluate(&self, p: Vec3) -> f32 {
    evaluate_words(&self.words, p)
  }
}

impl super::Sdf for SdfProgram {
  #[inline]
  fn evaluate(&self, p: Vec3) -> f32 {
    SdfProgram::evaluate(self, p)
  }
}

/// Interpreter shared by [`SdfProgram`] and the software compute kernels.
pub(crate) fn evaluate_words(words: &[u32], p: Vec3) -> f32 {
  let mut values = [0.0f32; VALUE_STACK_SIZE];
  let mut points = [Vec3::ZERO; MAX_PROGRAM_DEPTH];
  let mut sp = 0usize;
  let mut pp = 0usize;
  let mut p = p;
  let mut pc = 0usize;

  let read = |pc: usize| words.get(pc).map(|w| f32::from_bits(*w));

  while pc < words.len() {
    let Some(op) = SdfOp::from_word(words[pc]) else {
      return f32::INFINITY;
    };
    pc += 1;

    match op {
      SdfOp::Sphere | SdfOp::Box | SdfOp::Plane => {
        if sp >= VALUE_STACK_SIZE {
          return f32::INFINITY;
        }
        let kind = match op {
          SdfOp::Sphere => PrimitiveKind::Sphere,
          SdfOp::Box => PrimitiveKind::Box,
          _ => PrimitiveKind::Plane,
        };
        values[sp] = kind.evaluate(p);
        sp += 1;
      }
      SdfOp::PushConst => {
        let Some(c) = read(pc) else {
          return f32::INFINITY;
        };
        if sp >= VALUE_STACK_SIZE {
          return f32::INFINITY;
        }
        values[sp] = c;
        sp += 1;
        pc += 1;
      }
      SdfOp::Min | SdfOp::Max => {
        if sp < 2 {
          return f32::INFINITY;
        }
        let b = values[sp - 1];
        let a = values[sp - 2];
        values[sp - 2] = if op == SdfOp::Min { a.min(b) } else { a.max(b) };
        sp -= 1;
      }
      SdfOp::PushTransform => {
        if pp >= MAX_PROGRAM_DEPTH || pc + 12 > words.len() {
          return f32::INFINITY;
        }
        let f = |i: usize| f32::from_bits(words[pc + i]);
        let inverse = Affine3A::from_cols(
          Vec3A::new(f(0), f(1), f(2)),
          Vec3A::new(f(3), f(4), f(5)),
          Vec3A::new(f(6), f(7), f(8)),
          Vec3A::new(f(9), f(10), f(11)),
        );
        points[pp] = p;
        pp += 1;
        p = inverse.transform_point3(p);
        pc += 12;
      }
      SdfOp::PopTransform => {
        let Some(scale) = read(pc) else {
          return f32::INFINITY;
        };
        if pp == 0 || sp == 0 {
          return f32::INFINITY;
        }
        pp -= 1;
        p = points[pp];
        values[sp - 1] *= scale;
        pc += 1;
      }
    }
  }

  if sp == 0 {
    f32::INFINITY
  } else {
    values[0]
  }
}

fn emit_node(node: &SdfNode, depth: usize, words: &mut Vec<u32>) -> Result<()> {
  match node {
    SdfNode::Primitive(kind) => {
      let op = match kind {
        PrimitiveKind::Sphere => SdfOp::Sphere,
        PrimitiveKind::Box => SdfOp::Box,
        PrimitiveKind::Plane => SdfOp::Plane,
      };
      words.push(op as u32);
    }
    SdfNode::Custom(_) => return Err(Error::UnsupportedOnGpu),
    SdfNode::Union(children) => emit_fold(children, f32::INFINITY, SdfOp::Min, depth, words)?,
    SdfNode::Intersect(children) => {
      emit_fold(children, f32::NEG_INFINITY, SdfOp::Max, depth, words)?
    }
  }
  // Bail early on runaway trees instead of building a huge vector.
  if words.len() > MAX_PROGRAM_WORDS {
    return Err(Error::ProgramTooLarge {
      words: words.len(),
      limit: MAX_PROGRAM_WORDS,
    });
  }
  Ok(())
}

fn emit_fold(
  children: &[SdfChild],
  seed: f32,
  combine: SdfOp,
  depth: usize,
  words: &mut Vec<u32>,
) -> Result<()> {
  words.push(SdfOp::PushConst as u32);
  words.push(seed.to_bits());
  for child in children {
    emit_child(child, depth, words)?;
    words.push(combine as u32);
  }
  Ok(())
}

fn emit_child(child: &SdfChild, depth: usize, words: &mut Vec<u32>) -> Result<()> {
  let depth = depth + 1;
  if depth > MAX_PROGRAM_DEPTH {
    return Err(Error::ProgramTooDeep {
      depth: child.node.depth() + depth,
      limit: MAX_PROGRAM_DEPTH,
    });
  }

  let m = child.inverse.matrix3;
  let t = child.inverse.translation;
  words.push(SdfOp::PushTransform as u32);
  for column in [m.x_axis, m.y_axis, m.z_axis, t] {
    words.extend(column.to_array().map(f32::to_bits));
  }
  emit_node(&child.node, depth, words)?;
  words.push(SdfOp::PopTransform as u32);
  words.push(child.scale.to_bits());
  Ok(())
}

#[cfg(test)]
#[path = "program_test.rs"]
mod program_test;
