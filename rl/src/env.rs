//! Step-driven environment facade.
//!
//! [`RlEnv`] wires one scene, its sensors, and its reward trees into
//! the per-step pipeline the external RL loop drives: engine poses are
//! written into the graph, sensors read observations, the reward trees
//! evaluate, and the outcome goes back to the caller. One instance per
//! environment; parallel environments are independent instances with
//! nothing shared.

use simscene_core::scene::{NodeId, Scene};

use crate::engine::{PoseProvider, SimulationEngine};
use crate::error::RlResult;
use crate::observations::{observation_space, read_sensor};
use crate::rewards::{EpisodeState, RewardFunction};
use crate::spaces::BoxSpace;

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// One feature vector per registered sensor, in registration order.
    pub observations: Vec<Vec<f32>>,
    /// Summed scalar reward across all root reward trees this step.
    pub reward: f32,
    /// Whether a terminal reward fired; the driver ends the episode on
    /// the next boundary.
    pub terminal: bool,
    /// Episode time after this step, in seconds.
    pub elapsed: f32,
}

/// A single RL environment instance.
pub struct RlEnv {
    scene: Scene,
    sensors: Vec<NodeId>,
    tracked: Vec<NodeId>,
    rewards: Vec<RewardFunction>,
    episode: EpisodeState,
    elapsed: f32,
}

impl RlEnv {
    /// Wraps a scene into an environment with no sensors or rewards yet.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            sensors: Vec::new(),
            tracked: Vec::new(),
            rewards: Vec::new(),
            episode: EpisodeState::new(),
            elapsed: 0.0,
        }
    }

    /// The underlying scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene, for construction and per-episode
    /// randomization between steps.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Registers a sensor node. Fails if the node is not a sensor.
    pub fn add_sensor(&mut self, sensor: NodeId) -> RlResult<()> {
        // Validates both liveness and sensor-ness.
        observation_space(&self.scene, sensor)?;
        self.sensors.push(sensor);
        Ok(())
    }

    /// Marks a node as engine-driven: its pose is pulled from the
    /// engine every step. Tracked nodes should sit under ancestors with
    /// identity transforms, since engine poses are written as local
    /// transforms.
    pub fn track(&mut self, node: NodeId) -> RlResult<()> {
        self.scene.node(node)?;
        self.tracked.push(node);
        Ok(())
    }

    /// Adds a root reward function.
    ///
    /// Root rewards are independent trees; their per-step values are
    /// summed, and any of them can terminate the episode. Use
    /// combinators *within* a tree for predicate logic, and separate
    /// roots for independent concerns (shaping + success + time limit).
    pub fn add_reward(&mut self, reward: RewardFunction) {
        self.rewards.push(reward);
    }

    /// Declared observation spaces, one per sensor in registration order.
    pub fn observation_spaces(&self) -> RlResult<Vec<BoxSpace>> {
        self.sensors
            .iter()
            .map(|&s| observation_space(&self.scene, s))
            .collect()
    }

    /// Episode time in seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advances one step: syncs engine poses, reads sensors, evaluates
    /// the reward trees.
    ///
    /// `dt` is the simulated duration of the step the engine just
    /// performed. Evaluation is strictly sequential; nothing here
    /// overlaps with the engine's next step.
    pub fn step(&mut self, engine: &impl SimulationEngine, dt: f32) -> RlResult<StepOutcome> {
        self.elapsed += dt;
        self.sync_poses(engine)?;

        let observations = self
            .sensors
            .iter()
            .map(|&s| read_sensor(&self.scene, s, engine))
            .collect::<RlResult<Vec<_>>>()?;

        let mut reward = 0.0;
        let mut terminal = false;
        for tree in &mut self.rewards {
            let (value, ends) =
                tree.evaluate_step(&self.scene, engine, self.elapsed, &mut self.episode)?;
            reward += value;
            terminal |= ends;
        }

        Ok(StepOutcome {
            observations,
            reward,
            terminal,
            elapsed: self.elapsed,
        })
    }

    /// Starts a new episode: zeroes elapsed time, re-arms the reward
    /// trees, and clears collected entities.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.episode.reset();
        for tree in &mut self.rewards {
            tree.reset();
        }
        log::debug!("environment reset");
    }

    fn sync_poses(&mut self, engine: &impl PoseProvider) -> RlResult<()> {
        for &node in &self.tracked {
            if let Some(pose) = engine.world_pose(node) {
                let asset = self.scene.node_mut(node)?;
                asset.transform.translation = pose.position;
                asset.transform.rotation = pose.rotation;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Pose, RaycastProvider, Velocity, VelocityProvider};
    use crate::rewards::RewardBuilder;
    use glam::{Quat, Vec3};
    use simscene_core::scene::{AssetKind, AssetNode, StateSensorSpec};
    use std::cell::Cell;

    /// Kinematic stub: drives the agent along +X at 1 unit per pose
    /// query generation.
    struct ScriptedEngine {
        agent: NodeId,
        agent_x: Cell<f32>,
    }

    impl PoseProvider for ScriptedEngine {
        fn world_pose(&self, node: NodeId) -> Option<Pose> {
            (node == self.agent).then(|| Pose::new(Vec3::new(self.agent_x.get(), 0.0, 0.0), Quat::IDENTITY))
        }
    }

    impl VelocityProvider for ScriptedEngine {
        fn velocity(&self, _node: NodeId) -> Option<Velocity> {
            Some(Velocity {
                linear: Vec3::X,
                angular: Vec3::ZERO,
            })
        }
    }

    impl RaycastProvider for ScriptedEngine {
        fn cast_ray(&self, _origin: Vec3, _direction: Vec3, _max: f32) -> Option<f32> {
            None
        }
    }

    fn goal_env() -> (RlEnv, NodeId, NodeId) {
        let mut scene = Scene::new();
        let agent = scene.spawn(AssetNode::empty().with_name("agent")).unwrap();
        let goal = scene
            .spawn(
                AssetNode::empty()
                    .with_name("goal")
                    .with_translation(Vec3::new(5.0, 0.0, 0.0)),
            )
            .unwrap();
        let sensor = scene
            .add_child(
                agent,
                AssetNode::new(AssetKind::StateSensor(
                    StateSensorSpec::parse(goal, Some(agent), &["position", "distance"]).unwrap(),
                )),
            )
            .unwrap();

        let reward = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .threshold(1.0)
            .terminal(true)
            .build(&scene)
            .unwrap();

        let mut env = RlEnv::new(scene);
        env.add_sensor(sensor).unwrap();
        env.track(agent).unwrap();
        env.add_reward(reward);
        (env, agent, goal)
    }

    #[test]
    fn observation_spaces_match_reads() {
        let (mut env, agent, _) = goal_env();
        let engine = ScriptedEngine {
            agent,
            agent_x: Cell::new(0.0),
        };
        let spaces = env.observation_spaces().unwrap();
        let outcome = env.step(&engine, 0.1).unwrap();
        assert_eq!(spaces.len(), 1);
        assert_eq!(outcome.observations[0].len(), spaces[0].len());
        assert_eq!(spaces[0].shape, vec![4]);
    }

    #[test]
    fn agent_walks_to_goal_and_terminates() {
        let (mut env, agent, _) = goal_env();
        let engine = ScriptedEngine {
            agent,
            agent_x: Cell::new(0.0),
        };

        let mut terminated_at = None;
        for step in 0..8 {
            engine.agent_x.set(step as f32);
            let outcome = env.step(&engine, 0.1).unwrap();
            if outcome.terminal {
                assert_eq!(outcome.reward, 1.0);
                terminated_at = Some(step);
                break;
            }
            assert_eq!(outcome.reward, 0.0);
        }
        // Distance 1.0 is reached at x = 4.
        assert_eq!(terminated_at, Some(4));
    }

    #[test]
    fn tracked_pose_lands_in_the_scene() {
        let (mut env, agent, _) = goal_env();
        let engine = ScriptedEngine {
            agent,
            agent_x: Cell::new(3.0),
        };
        env.step(&engine, 0.1).unwrap();
        let world = env.scene().world_transform(agent).unwrap();
        assert!((world.translation() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn reset_rearms_reward_and_clock() {
        let (mut env, agent, _) = goal_env();
        let engine = ScriptedEngine {
            agent,
            agent_x: Cell::new(5.0),
        };
        let first = env.step(&engine, 0.1).unwrap();
        assert!(first.terminal);

        env.reset();
        assert_eq!(env.elapsed(), 0.0);
        let again = env.step(&engine, 0.1).unwrap();
        assert!(again.terminal);
        assert_eq!(again.reward, 1.0);
    }
}
