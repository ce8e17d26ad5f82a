//! Goal-chase demo: a kinematic agent walks toward a goal while a
//! state sensor and a raycast fan observe the scene, and a composite
//! reward (reach the goal, or time out) scores every step.
//!
//! The "engine" here is a scripted stand-in that integrates the agent's
//! position itself; a real deployment would answer the same provider
//! calls from a physics backend.

use clap::Parser;
use glam::{Quat, Vec3};
use simscene_core::scene::{
    AssetKind, AssetNode, LightAsset, MeshAsset, NodeId, RaycastSensorSpec, Scene, StateSensorSpec,
};
use simscene_core::transform::Transform;
use simscene_rl::{
    Pose, PoseProvider, RaycastProvider, RewardBuilder, RlEnv, Velocity, VelocityProvider,
};

use std::cell::Cell;

#[derive(Parser, Debug)]
#[command(about = "Drive a scripted agent toward a goal and log rewards")]
struct Args {
    /// Agent speed in units per second.
    #[arg(long, default_value_t = 1.5)]
    speed: f32,

    /// Simulated seconds per step.
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Episode time limit in seconds.
    #[arg(long, default_value_t = 30.0)]
    timeout: f32,

    /// Distance from the agent spawn to the goal.
    #[arg(long, default_value_t = 12.0)]
    goal_distance: f32,
}

/// Scripted engine: integrates the agent along +X, reports its pose and
/// velocity, and answers ray casts against a wall plane behind the goal.
struct KinematicEngine {
    agent: NodeId,
    agent_x: Cell<f32>,
    speed: f32,
    wall_x: f32,
}

impl KinematicEngine {
    fn advance(&self, dt: f32) {
        self.agent_x.set(self.agent_x.get() + self.speed * dt);
    }
}

impl PoseProvider for KinematicEngine {
    fn world_pose(&self, node: NodeId) -> Option<Pose> {
        (node == self.agent).then(|| {
            Pose::new(
                Vec3::new(self.agent_x.get(), 0.0, 0.0),
                Quat::IDENTITY,
            )
        })
    }
}

impl VelocityProvider for KinematicEngine {
    fn velocity(&self, node: NodeId) -> Option<Velocity> {
        (node == self.agent).then(|| Velocity {
            linear: Vec3::new(self.speed, 0.0, 0.0),
            angular: Vec3::ZERO,
        })
    }
}

impl RaycastProvider for KinematicEngine {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        // Single axis-aligned wall plane at x = wall_x.
        if direction.x.abs() < 1e-6 {
            return None;
        }
        let t = (self.wall_x - origin.x) / direction.x;
        (t >= 0.0 && t <= max_distance).then_some(t)
    }
}

fn build_env(args: &Args) -> Result<(RlEnv, NodeId), Box<dyn std::error::Error>> {
    let mut scene = Scene::new().with_name("goal_chase");

    let sun = AssetNode::new(AssetKind::Light(LightAsset::Directional {
        color: Vec3::ONE,
        intensity: 1.0,
    }))
    .with_name("sun")
    .with_transform(Transform::from_euler_degrees(-50.0, 30.0, 0.0));
    scene.spawn(sun)?;

    let agent = scene.spawn(
        AssetNode::new(AssetKind::Mesh(MeshAsset::new("capsule").with_bounding_radius(0.5)))
            .with_name("agent"),
    )?;
    let goal = scene.spawn(
        AssetNode::new(AssetKind::Mesh(MeshAsset::new("sphere").with_bounding_radius(0.5)))
            .with_name("goal")
            .with_translation(Vec3::new(args.goal_distance, 0.0, 0.0)),
    )?;

    let state_sensor = scene.add_child(
        agent,
        AssetNode::new(AssetKind::StateSensor(StateSensorSpec::parse(
            goal,
            Some(agent),
            &["position", "velocity", "distance"],
        )?)),
    )?;
    let ray_sensor = scene.add_child(
        agent,
        AssetNode::new(AssetKind::RaycastSensor(RaycastSensorSpec::new(
            9, 1, 90.0, 0.0, 25.0,
        )?)),
    )?;

    let reach = RewardBuilder::new("sparse")
        .entity_a(agent)
        .entity_b(goal)
        .threshold(1.0)
        .scalar(10.0)
        .terminal(true)
        .build(&scene)?;
    let shaping = RewardBuilder::new("dense")
        .entity_a(agent)
        .entity_b(goal)
        .scalar(0.01)
        .build(&scene)?;
    let out_of_time = RewardBuilder::new("timeout")
        .threshold(args.timeout)
        .scalar(-1.0)
        .terminal(true)
        .build(&scene)?;

    let mut env = RlEnv::new(scene);
    env.add_sensor(state_sensor)?;
    env.add_sensor(ray_sensor)?;
    env.track(agent)?;
    // Shape continuously; end on reaching the goal or on the clock.
    env.add_reward(shaping);
    env.add_reward(reach);
    env.add_reward(out_of_time);
    Ok((env, agent))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let (mut env, agent) = build_env(&args)?;
    for (i, space) in env.observation_spaces()?.iter().enumerate() {
        log::info!("sensor {i}: {} features", space.len());
    }

    let engine = KinematicEngine {
        agent,
        agent_x: Cell::new(0.0),
        speed: args.speed,
        wall_x: args.goal_distance + 5.0,
    };

    let mut total = 0.0;
    for step in 1.. {
        engine.advance(args.dt);
        let outcome = env.step(&engine, args.dt)?;
        total += outcome.reward;
        log::debug!(
            "step {step}: t={:.1}s reward={:+.3} obs0={:?}",
            outcome.elapsed,
            outcome.reward,
            outcome.observations[0],
        );
        if outcome.terminal {
            log::info!(
                "episode over after {step} steps ({:.1}s): return {total:+.2}",
                outcome.elapsed
            );
            break;
        }
    }
    Ok(())
}
