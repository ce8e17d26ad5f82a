//! Error types for sensor readout and reward evaluation.

use simscene_core::SceneError;
use thiserror::Error;

/// Errors raised by the RL layer.
///
/// Construction-time variants surface configuration mistakes eagerly;
/// [`RlError::EntityGone`] is the one evaluation-time failure, since the
/// scene graph may mutate between steps.
#[derive(Error, Debug)]
pub enum RlError {
    #[error("unknown reward type: {0}. Must be one of: dense, sparse, or, and, not, see, timeout")]
    UnknownRewardKind(String),
    #[error("unknown distance metric: {0}. Must be one of: euclidean")]
    UnknownDistanceMetric(String),
    #[error("reward type '{kind}' requires {role}")]
    MissingEntity {
        /// Reward type being built.
        kind: String,
        /// Which entity reference is missing (`entity_a` / `entity_b`).
        role: &'static str,
    },
    #[error("combinator '{kind}' requires {expected} child reward function(s), got {got}")]
    MissingChild {
        /// Combinator type being built.
        kind: String,
        /// Required child count.
        expected: usize,
        /// Supplied child count.
        got: usize,
    },
    #[error("reward type '{kind}' takes no child reward functions")]
    UnexpectedChild {
        /// Leaf type that was given children.
        kind: String,
    },
    #[error("entity '{name}' is no longer present in the scene")]
    EntityGone {
        /// Name the entity had when the reward/sensor was built.
        name: String,
    },
    #[error("node '{name}' is not a sensor")]
    NotASensor {
        /// Name of the offending node.
        name: String,
    },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Convenience alias for RL-layer results.
pub type RlResult<T> = Result<T, RlError>;
