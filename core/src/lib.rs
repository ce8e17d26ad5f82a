//! # SimScene Core
//!
//! Declarative scene-graph model for reinforcement-learning simulation
//! environments: a tree of spatial assets (meshes, cameras, lights,
//! sensors) with TRS transforms composed through the tree.
//!
//! The companion `simscene-rl` crate layers sensor readout and the
//! reward combinator engine on top of this graph.

pub mod error;
pub mod math;
pub mod scene;
pub mod transform;

pub use error::SceneError;
pub use transform::{Dimensionality, Transform, WorldTransform};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
