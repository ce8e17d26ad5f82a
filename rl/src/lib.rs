//! # SimScene RL
//!
//! Reinforcement-learning layer over the `simscene-core` scene graph:
//! sensor observation readout, a composable reward-function engine, and
//! a step-driven environment facade.
//!
//! The simulation engine itself (physics, rendering, ray casting) is an
//! external collaborator reached through the narrow provider traits in
//! [`engine`]; everything here is synchronous and single-threaded, one
//! instance per environment.

pub mod actions;
pub mod engine;
pub mod env;
pub mod error;
pub mod observations;
pub mod rewards;
pub mod spaces;

pub use engine::{Pose, PoseProvider, RaycastProvider, SimulationEngine, Velocity, VelocityProvider};
pub use env::{RlEnv, StepOutcome};
pub use error::RlError;
pub use actions::ActionSpace;
pub use rewards::{DistanceMetric, EpisodeState, RewardBuilder, RewardFunction};
pub use spaces::BoxSpace;
