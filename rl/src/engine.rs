//! Provider traits for the external simulation engine.
//!
//! The engine (Unity, a physics backend, or a scripted stub in tests)
//! steps the world and owns ground-truth dynamics. This crate reaches it
//! through these narrow synchronous traits once per step; nothing here
//! suspends or retries.

use glam::{Quat, Vec3};
use simscene_core::scene::NodeId;

/// A world-space pose reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
}

impl Pose {
    /// Pose at the world origin with identity orientation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a pose from position and rotation.
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

/// Instantaneous rates reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    /// Linear velocity in world space.
    pub linear: Vec3,
    /// Angular velocity in world space (radians per second).
    pub angular: Vec3,
}

/// Reports world poses of engine-driven bodies.
pub trait PoseProvider {
    /// World pose of `node`, or `None` if the engine does not drive it
    /// (its authored transform is kept).
    fn world_pose(&self, node: NodeId) -> Option<Pose>;
}

/// Reports instantaneous velocities of engine-driven bodies.
pub trait VelocityProvider {
    /// Velocity of `node`, or `None` if the engine does not simulate it
    /// (read as zero rates).
    fn velocity(&self, node: NodeId) -> Option<Velocity>;
}

/// Casts rays against engine geometry.
pub trait RaycastProvider {
    /// Distance to the first hit along `direction` (unit vector) from
    /// `origin`, within `max_distance`. `None` means no hit in range.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32>;
}

/// The full engine surface consumed per step.
///
/// Blanket-implemented for anything providing all three capabilities.
pub trait SimulationEngine: PoseProvider + VelocityProvider + RaycastProvider {}

impl<T: PoseProvider + VelocityProvider + RaycastProvider> SimulationEngine for T {}
