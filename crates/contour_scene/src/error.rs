//! Scene errors.

use thiserror::Error;

use crate::scene::EntityId;

#[derive(Debug, Error)]
pub enum SceneError {
  #[error("entity {0} does not exist")]
  NoSuchEntity(EntityId),

  #[error("cannot parent {child} under {parent}: {parent} is {child} or one of its descendants")]
  Cycle { child: EntityId, parent: EntityId },

  #[error("mesh extraction failed for entity {entity}")]
  Extraction {
    entity: EntityId,
    #[source]
    source: contour_core::Error,
  },

  #[error(transparent)]
  Core(#[from] contour_core::Error),
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;
