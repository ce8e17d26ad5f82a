//! Composable reward functions.
//!
//! A reward tree scores agent behavior against scene entities once per
//! simulation step. Leaves measure entity pairs (distance, visibility,
//! elapsed time); combinators compose children's trigger predicates.
//! Evaluation is one bottom-up recursion over the kind tag, so a
//! combinator always sees its children's current-step trigger state.
//!
//! Scalar aggregation conventions (the parts left open by the authoring
//! surface) are fixed here:
//!
//! - `and` emits the **sum** of both children's values when both fire,
//!   else 0;
//! - `or` emits the sum of the fired children's values;
//! - `not` emits its **own** scalar when its child does not fire;
//! - `dense` emits `scalar * (-distance)` every step (monotonic: closer
//!   is never worse) and is exempt from trigger-once latching; its
//!   trigger predicate for combinator parents is `distance <= threshold`.

use std::collections::HashSet;

use glam::Vec3;
use simscene_core::scene::{NodeId, Scene};

use crate::engine::SimulationEngine;
use crate::error::{RlError, RlResult};

/// Hit distances this close to the target count as reaching it.
const OCCLUSION_EPSILON: f32 = 1e-4;

/// How distances between entities are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Straight-line distance.
    #[default]
    Euclidean,
}

impl DistanceMetric {
    /// Canonical metric name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
        }
    }

    fn measure(&self, a: Vec3, b: Vec3) -> f32 {
        match self {
            Self::Euclidean => a.distance(b),
        }
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" => Ok(Self::Euclidean),
            other => Err(RlError::UnknownDistanceMetric(other.to_owned())),
        }
    }
}

/// A scene entity captured at build time: id for resolution, name for
/// error messages after the entity is gone.
#[derive(Debug, Clone)]
struct EntityRef {
    id: NodeId,
    name: String,
}

impl EntityRef {
    fn position(&self, scene: &Scene) -> RlResult<Vec3> {
        scene
            .world_transform(self.id)
            .map(|w| w.translation())
            .map_err(|_| RlError::EntityGone {
                name: self.name.clone(),
            })
    }
}

/// The reward kind tag; each variant carries only what its kind needs.
#[derive(Debug)]
enum RewardKind {
    Dense {
        a: EntityRef,
        b: EntityRef,
        metric: DistanceMetric,
    },
    Sparse {
        a: EntityRef,
        b: EntityRef,
        metric: DistanceMetric,
    },
    See {
        a: EntityRef,
        b: EntityRef,
        metric: DistanceMetric,
    },
    Timeout,
    And {
        a: Box<RewardFunction>,
        b: Box<RewardFunction>,
    },
    Or {
        a: Box<RewardFunction>,
        b: Box<RewardFunction>,
    },
    Not {
        child: Box<RewardFunction>,
    },
}

impl RewardKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Dense { .. } => "dense",
            Self::Sparse { .. } => "sparse",
            Self::See { .. } => "see",
            Self::Timeout => "timeout",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
            Self::Not { .. } => "not",
        }
    }
}

/// Per-episode evaluation state shared across one reward tree.
#[derive(Debug, Default)]
pub struct EpisodeState {
    consumed: HashSet<NodeId>,
}

impl EpisodeState {
    /// Fresh episode state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `entity` has been collected this episode.
    pub fn is_consumed(&self, entity: NodeId) -> bool {
        self.consumed.contains(&entity)
    }

    /// Clears collected entities for a new episode.
    pub fn reset(&mut self) {
        self.consumed.clear();
    }
}

/// One step's evaluation result for a subtree.
#[derive(Debug, Clone, Copy)]
struct Signal {
    value: f32,
    triggered: bool,
    terminal: bool,
}

impl Signal {
    const INERT: Self = Self {
        value: 0.0,
        triggered: false,
        terminal: false,
    };
}

/// A validated reward-function node.
///
/// Built through [`RewardBuilder`]; evaluated once per step with
/// [`evaluate_step`](Self::evaluate_step), bottom-up through children.
#[derive(Debug)]
pub struct RewardFunction {
    kind: RewardKind,
    scalar: f32,
    threshold: f32,
    is_terminal: bool,
    is_collectable: bool,
    trigger_once: bool,
    fired: bool,
}

impl RewardFunction {
    /// Starts a builder for the given reward type.
    pub fn builder(kind: impl Into<String>) -> RewardBuilder {
        RewardBuilder::new(kind)
    }

    /// The reward type name (`dense`, `sparse`, `and`, ...).
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether this node ends the episode when it fires.
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Evaluates the tree for one step.
    ///
    /// Returns the scalar reward and whether any fired node requests
    /// episode termination. `elapsed` is the episode time in seconds,
    /// consumed by `timeout` leaves.
    pub fn evaluate_step(
        &mut self,
        scene: &Scene,
        engine: &impl SimulationEngine,
        elapsed: f32,
        episode: &mut EpisodeState,
    ) -> RlResult<(f32, bool)> {
        let signal = self.evaluate(scene, engine, elapsed, episode)?;
        Ok((signal.value, signal.terminal))
    }

    /// Re-arms trigger-once latches for a new episode.
    ///
    /// Collected entities live in [`EpisodeState`]; reset that alongside.
    pub fn reset(&mut self) {
        self.fired = false;
        match &mut self.kind {
            RewardKind::And { a, b } | RewardKind::Or { a, b } => {
                a.reset();
                b.reset();
            }
            RewardKind::Not { child } => child.reset(),
            _ => {}
        }
    }

    /// Dense rewards shape every step; latching them would silence the
    /// shaping signal after one threshold crossing.
    fn latchable(&self) -> bool {
        !matches!(self.kind, RewardKind::Dense { .. })
    }

    fn evaluate(
        &mut self,
        scene: &Scene,
        engine: &impl SimulationEngine,
        elapsed: f32,
        episode: &mut EpisodeState,
    ) -> RlResult<Signal> {
        if self.fired && self.trigger_once && self.latchable() {
            return Ok(Signal::INERT);
        }

        let signal = match &mut self.kind {
            RewardKind::Dense { a, b, metric } => {
                match leaf_distance(scene, a, b, *metric, episode)? {
                    None => Signal::INERT,
                    Some(distance) => Signal {
                        value: self.scalar * -distance,
                        triggered: distance <= self.threshold,
                        terminal: false,
                    },
                }
            }
            RewardKind::Sparse { a, b, metric } => {
                match leaf_distance(scene, a, b, *metric, episode)? {
                    None => Signal::INERT,
                    Some(distance) => {
                        let triggered = distance <= self.threshold;
                        Signal {
                            value: if triggered { self.scalar } else { 0.0 },
                            triggered,
                            terminal: false,
                        }
                    }
                }
            }
            RewardKind::See { a, b, metric } => {
                match leaf_distance(scene, a, b, *metric, episode)? {
                    None => Signal::INERT,
                    Some(distance) => {
                        let triggered = distance <= self.threshold
                            && has_line_of_sight(scene, a, b, distance, engine)?;
                        Signal {
                            value: if triggered { self.scalar } else { 0.0 },
                            triggered,
                            terminal: false,
                        }
                    }
                }
            }
            RewardKind::Timeout => {
                let triggered = elapsed >= self.threshold;
                Signal {
                    value: if triggered { self.scalar } else { 0.0 },
                    triggered,
                    terminal: false,
                }
            }
            RewardKind::And { a, b } => {
                let sa = a.evaluate(scene, engine, elapsed, episode)?;
                let sb = b.evaluate(scene, engine, elapsed, episode)?;
                let triggered = sa.triggered && sb.triggered;
                Signal {
                    value: if triggered { sa.value + sb.value } else { 0.0 },
                    triggered,
                    terminal: sa.terminal || sb.terminal,
                }
            }
            RewardKind::Or { a, b } => {
                let sa = a.evaluate(scene, engine, elapsed, episode)?;
                let sb = b.evaluate(scene, engine, elapsed, episode)?;
                let triggered = sa.triggered || sb.triggered;
                let mut value = 0.0;
                if sa.triggered {
                    value += sa.value;
                }
                if sb.triggered {
                    value += sb.value;
                }
                Signal {
                    value,
                    triggered,
                    terminal: sa.terminal || sb.terminal,
                }
            }
            RewardKind::Not { child } => {
                let sc = child.evaluate(scene, engine, elapsed, episode)?;
                let triggered = !sc.triggered;
                Signal {
                    value: if triggered { self.scalar } else { 0.0 },
                    triggered,
                    terminal: sc.terminal,
                }
            }
        };

        Ok(self.finish(signal, episode))
    }

    /// Applies the trigger side effects: terminal flag, collection,
    /// trigger-once latching.
    fn finish(&mut self, mut signal: Signal, episode: &mut EpisodeState) -> Signal {
        if !signal.triggered {
            return signal;
        }
        if self.is_terminal {
            signal.terminal = true;
        }
        if self.is_collectable {
            if let Some(b) = self.entity_b() {
                log::debug!("reward '{}' collected entity {b}", self.kind.name());
                episode.consumed.insert(b);
            }
        }
        if self.trigger_once && self.latchable() {
            if !self.fired {
                log::debug!("reward '{}' fired (latched)", self.kind.name());
            }
            self.fired = true;
        }
        signal
    }

    fn entity_b(&self) -> Option<NodeId> {
        match &self.kind {
            RewardKind::Dense { b, .. }
            | RewardKind::Sparse { b, .. }
            | RewardKind::See { b, .. } => Some(b.id),
            _ => None,
        }
    }
}

/// Distance between a leaf's entities, or `None` when entity_b has been
/// collected this episode (the leaf reads as inert).
fn leaf_distance(
    scene: &Scene,
    a: &EntityRef,
    b: &EntityRef,
    metric: DistanceMetric,
    episode: &EpisodeState,
) -> RlResult<Option<f32>> {
    if episode.is_consumed(b.id) {
        return Ok(None);
    }
    let pa = a.position(scene)?;
    let pb = b.position(scene)?;
    Ok(Some(metric.measure(pa, pb)))
}

/// Whether `a` sees `b` at the given separation: one ray toward the
/// target, where a reported hit short of the target means occluded.
/// The engine is expected to exclude the casting entity's own geometry.
fn has_line_of_sight(
    scene: &Scene,
    a: &EntityRef,
    b: &EntityRef,
    distance: f32,
    engine: &impl SimulationEngine,
) -> RlResult<bool> {
    if distance <= OCCLUSION_EPSILON {
        return Ok(true);
    }
    let pa = a.position(scene)?;
    let pb = b.position(scene)?;
    let direction = (pb - pa) / distance;
    let occluded = engine
        .cast_ray(pa, direction, distance)
        .is_some_and(|hit| hit < distance - OCCLUSION_EPSILON);
    Ok(!occluded)
}

/// Configuration for one reward node, with the documented defaults:
/// type `dense`, metric `euclidean`, scalar 1.0, threshold 1.0,
/// non-terminal, non-collectable, trigger-once.
///
/// Validation happens in [`build`](Self::build), eagerly: unknown type
/// or metric names, missing entities on leaves, and wrong child counts
/// on combinators all fail construction, never evaluation.
#[derive(Debug)]
pub struct RewardBuilder {
    kind: String,
    entity_a: Option<NodeId>,
    entity_b: Option<NodeId>,
    distance_metric: String,
    scalar: f32,
    threshold: f32,
    is_terminal: bool,
    is_collectable: bool,
    trigger_once: bool,
    children: Vec<RewardFunction>,
}

impl RewardBuilder {
    /// Starts a builder for the given reward type name.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            entity_a: None,
            entity_b: None,
            distance_metric: "euclidean".to_owned(),
            scalar: 1.0,
            threshold: 1.0,
            is_terminal: false,
            is_collectable: false,
            trigger_once: true,
            children: Vec::new(),
        }
    }

    /// First measured entity (the agent side).
    #[must_use]
    pub fn entity_a(mut self, id: NodeId) -> Self {
        self.entity_a = Some(id);
        self
    }

    /// Second measured entity (the target side).
    #[must_use]
    pub fn entity_b(mut self, id: NodeId) -> Self {
        self.entity_b = Some(id);
        self
    }

    /// Distance metric name; `euclidean` is the only recognized value.
    #[must_use]
    pub fn distance_metric(mut self, metric: impl Into<String>) -> Self {
        self.distance_metric = metric.into();
        self
    }

    /// Reward magnitude multiplier.
    #[must_use]
    pub fn scalar(mut self, scalar: f32) -> Self {
        self.scalar = scalar;
        self
    }

    /// Distance (or time, for `timeout`) threshold.
    #[must_use]
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// End the episode when this node fires.
    #[must_use]
    pub fn terminal(mut self, terminal: bool) -> Self {
        self.is_terminal = terminal;
        self
    }

    /// Consume entity_b after the first firing.
    #[must_use]
    pub fn collectable(mut self, collectable: bool) -> Self {
        self.is_collectable = collectable;
        self
    }

    /// Fire at most once per episode (default true).
    #[must_use]
    pub fn trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }

    /// Adds a child reward function (combinator types only).
    #[must_use]
    pub fn child(mut self, child: RewardFunction) -> Self {
        self.children.push(child);
        self
    }

    /// Validates the configuration and builds the node.
    ///
    /// The scene is consulted to capture entity names for later error
    /// reporting; entity *presence* stays a per-step check since the
    /// graph is mutable.
    pub fn build(self, scene: &Scene) -> RlResult<RewardFunction> {
        let metric: DistanceMetric = self.distance_metric.parse()?;
        let children = self.children;

        let kind = match self.kind.as_str() {
            kind @ ("dense" | "sparse" | "see") => {
                if !children.is_empty() {
                    return Err(RlError::UnexpectedChild { kind: kind.into() });
                }
                let a = entity_ref(scene, self.entity_a, kind, "entity_a")?;
                let b = entity_ref(scene, self.entity_b, kind, "entity_b")?;
                match kind {
                    "dense" => RewardKind::Dense { a, b, metric },
                    "sparse" => RewardKind::Sparse { a, b, metric },
                    _ => RewardKind::See { a, b, metric },
                }
            }
            "timeout" => {
                if !children.is_empty() {
                    return Err(RlError::UnexpectedChild {
                        kind: "timeout".into(),
                    });
                }
                RewardKind::Timeout
            }
            kind @ ("and" | "or") => match <[RewardFunction; 2]>::try_from(children) {
                Ok([a, b]) => {
                    let (a, b) = (Box::new(a), Box::new(b));
                    if kind == "and" {
                        RewardKind::And { a, b }
                    } else {
                        RewardKind::Or { a, b }
                    }
                }
                Err(children) => {
                    return Err(RlError::MissingChild {
                        kind: kind.into(),
                        expected: 2,
                        got: children.len(),
                    });
                }
            },
            "not" => match <[RewardFunction; 1]>::try_from(children) {
                Ok([child]) => RewardKind::Not {
                    child: Box::new(child),
                },
                Err(children) => {
                    return Err(RlError::MissingChild {
                        kind: "not".into(),
                        expected: 1,
                        got: children.len(),
                    });
                }
            },
            other => return Err(RlError::UnknownRewardKind(other.to_owned())),
        };

        Ok(RewardFunction {
            kind,
            scalar: self.scalar,
            threshold: self.threshold,
            is_terminal: self.is_terminal,
            is_collectable: self.is_collectable,
            trigger_once: self.trigger_once,
            fired: false,
        })
    }
}

fn entity_ref(
    scene: &Scene,
    id: Option<NodeId>,
    kind: &str,
    role: &'static str,
) -> RlResult<EntityRef> {
    let id = id.ok_or_else(|| RlError::MissingEntity {
        kind: kind.to_owned(),
        role,
    })?;
    let name = scene.node(id)?.name.clone();
    Ok(EntityRef { id, name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Pose, PoseProvider, RaycastProvider, Velocity, VelocityProvider};
    use simscene_core::scene::AssetNode;
    use simscene_core::transform::Transform;

    /// Engine stub with an optional omnipresent occluder.
    struct StubEngine {
        occluder_at: Option<f32>,
    }

    impl PoseProvider for StubEngine {
        fn world_pose(&self, _node: NodeId) -> Option<Pose> {
            None
        }
    }

    impl VelocityProvider for StubEngine {
        fn velocity(&self, _node: NodeId) -> Option<Velocity> {
            None
        }
    }

    impl RaycastProvider for StubEngine {
        fn cast_ray(&self, _origin: glam::Vec3, _direction: glam::Vec3, max: f32) -> Option<f32> {
            self.occluder_at.filter(|d| *d <= max)
        }
    }

    fn open_world() -> StubEngine {
        StubEngine { occluder_at: None }
    }

    /// Two entities at (0,0,0) and (3,4,0): distance exactly 5.
    fn pythagorean_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let agent = scene.spawn(AssetNode::empty().with_name("agent")).unwrap();
        let goal = scene
            .spawn(
                AssetNode::empty()
                    .with_name("goal")
                    .with_transform(Transform::from_xyz(3.0, 4.0, 0.0)),
            )
            .unwrap();
        (scene, agent, goal)
    }

    fn sparse(scene: &Scene, a: NodeId, b: NodeId, threshold: f32) -> RewardFunction {
        RewardBuilder::new("sparse")
            .entity_a(a)
            .entity_b(b)
            .threshold(threshold)
            .build(scene)
            .unwrap()
    }

    fn eval(reward: &mut RewardFunction, scene: &Scene, elapsed: f32) -> (f32, bool) {
        let mut episode = EpisodeState::new();
        reward
            .evaluate_step(scene, &open_world(), elapsed, &mut episode)
            .unwrap()
    }

    #[test]
    fn sparse_fires_at_threshold_boundary() {
        let (scene, agent, goal) = pythagorean_scene();
        let mut within = sparse(&scene, agent, goal, 5.0);
        assert_eq!(eval(&mut within, &scene, 0.0), (1.0, false));

        let mut outside = sparse(&scene, agent, goal, 4.0);
        assert_eq!(eval(&mut outside, &scene, 0.0), (0.0, false));
    }

    #[test]
    fn dense_shapes_every_step_and_closer_is_better() {
        let (scene, agent, goal) = pythagorean_scene();
        let mut reward = RewardBuilder::new("dense")
            .entity_a(agent)
            .entity_b(goal)
            .scalar(2.0)
            .build(&scene)
            .unwrap();
        let mut episode = EpisodeState::new();
        let engine = open_world();
        for _ in 0..3 {
            let (value, terminal) = reward
                .evaluate_step(&scene, &engine, 0.0, &mut episode)
                .unwrap();
            assert!((value - -10.0).abs() < 1e-5);
            assert!(!terminal);
        }
    }

    #[test]
    fn dense_is_monotonic_in_distance() {
        let mut scene = Scene::new();
        let agent = scene.spawn(AssetNode::empty().with_name("agent")).unwrap();
        let goal = scene
            .spawn(
                AssetNode::empty()
                    .with_name("goal")
                    .with_transform(Transform::from_xyz(10.0, 0.0, 0.0)),
            )
            .unwrap();
        let mut reward = RewardBuilder::new("dense")
            .entity_a(agent)
            .entity_b(goal)
            .build(&scene)
            .unwrap();
        let far = eval(&mut reward, &scene, 0.0).0;

        scene.node_mut(goal).unwrap().transform.translation = glam::Vec3::new(2.0, 0.0, 0.0);
        let near = eval(&mut reward, &scene, 0.0).0;
        assert!(near > far);
    }

    #[test]
    fn trigger_once_latches_until_reset() {
        let (scene, agent, goal) = pythagorean_scene();
        let mut reward = sparse(&scene, agent, goal, 5.0);
        let mut episode = EpisodeState::new();
        let engine = open_world();

        let first = reward
            .evaluate_step(&scene, &engine, 0.0, &mut episode)
            .unwrap();
        assert_eq!(first.0, 1.0);
        for _ in 0..5 {
            let later = reward
                .evaluate_step(&scene, &engine, 0.0, &mut episode)
                .unwrap();
            assert_eq!(later.0, 0.0);
        }

        reward.reset();
        episode.reset();
        let rearmed = reward
            .evaluate_step(&scene, &engine, 0.0, &mut episode)
            .unwrap();
        assert_eq!(rearmed.0, 1.0);
    }

    #[test]
    fn repeating_reward_fires_every_step() {
        let (scene, agent, goal) = pythagorean_scene();
        let mut reward = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .threshold(5.0)
            .trigger_once(false)
            .build(&scene)
            .unwrap();
        let mut episode = EpisodeState::new();
        let engine = open_world();
        for _ in 0..3 {
            let (value, _) = reward
                .evaluate_step(&scene, &engine, 0.0, &mut episode)
                .unwrap();
            assert_eq!(value, 1.0);
        }
    }

    #[test]
    fn and_fires_only_when_both_children_fire() {
        let (scene, agent, goal) = pythagorean_scene();
        let hit = || sparse(&scene, agent, goal, 5.0);
        let miss = || sparse(&scene, agent, goal, 4.0);

        let mut both = RewardBuilder::new("and")
            .child(hit())
            .child(hit())
            .build(&scene)
            .unwrap();
        // Sum of both children's scalars.
        assert_eq!(eval(&mut both, &scene, 0.0), (2.0, false));

        let mut one = RewardBuilder::new("and")
            .child(hit())
            .child(miss())
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut one, &scene, 0.0), (0.0, false));
    }

    #[test]
    fn or_fires_when_either_child_fires() {
        let (scene, agent, goal) = pythagorean_scene();
        let hit = || sparse(&scene, agent, goal, 5.0);
        let miss = || sparse(&scene, agent, goal, 4.0);

        let mut either = RewardBuilder::new("or")
            .child(hit())
            .child(miss())
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut either, &scene, 0.0), (1.0, false));

        let mut neither = RewardBuilder::new("or")
            .child(miss())
            .child(miss())
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut neither, &scene, 0.0), (0.0, false));
    }

    #[test]
    fn not_inverts_its_child() {
        let (scene, agent, goal) = pythagorean_scene();

        let mut inverted_miss = RewardBuilder::new("not")
            .child(sparse(&scene, agent, goal, 4.0))
            .scalar(3.0)
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut inverted_miss, &scene, 0.0), (3.0, false));

        let mut inverted_hit = RewardBuilder::new("not")
            .child(sparse(&scene, agent, goal, 5.0))
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut inverted_hit, &scene, 0.0), (0.0, false));
    }

    #[test]
    fn timeout_fires_after_threshold_elapsed() {
        let scene = Scene::new();
        let mut reward = RewardBuilder::new("timeout")
            .threshold(10.0)
            .scalar(-1.0)
            .terminal(true)
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut reward, &scene, 5.0), (0.0, false));
        assert_eq!(eval(&mut reward, &scene, 10.0), (-1.0, true));
    }

    #[test]
    fn terminal_leaf_sets_termination_flag() {
        let (scene, agent, goal) = pythagorean_scene();
        let mut reward = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .threshold(5.0)
            .terminal(true)
            .build(&scene)
            .unwrap();
        assert_eq!(eval(&mut reward, &scene, 0.0), (1.0, true));
    }

    #[test]
    fn terminal_propagates_through_combinators() {
        let (scene, agent, goal) = pythagorean_scene();
        let terminal_child = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .threshold(5.0)
            .terminal(true)
            .build(&scene)
            .unwrap();
        let mut tree = RewardBuilder::new("or")
            .child(terminal_child)
            .child(sparse(&scene, agent, goal, 4.0))
            .build(&scene)
            .unwrap();
        let (_, terminal) = eval(&mut tree, &scene, 0.0);
        assert!(terminal);
    }

    #[test]
    fn collectable_consumes_entity_b() {
        let (scene, agent, goal) = pythagorean_scene();
        let mut reward = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .threshold(5.0)
            .trigger_once(false)
            .collectable(true)
            .build(&scene)
            .unwrap();
        let mut episode = EpisodeState::new();
        let engine = open_world();

        let first = reward
            .evaluate_step(&scene, &engine, 0.0, &mut episode)
            .unwrap();
        assert_eq!(first.0, 1.0);
        assert!(episode.is_consumed(goal));

        // Not trigger-once, but the entity is gone from consideration.
        let later = reward
            .evaluate_step(&scene, &engine, 0.0, &mut episode)
            .unwrap();
        assert_eq!(later.0, 0.0);
    }

    #[test]
    fn see_requires_clear_line_of_sight() {
        let (scene, agent, goal) = pythagorean_scene();
        let build = || {
            RewardBuilder::new("see")
                .entity_a(agent)
                .entity_b(goal)
                .threshold(10.0)
                .build(&scene)
                .unwrap()
        };

        let mut clear = build();
        let mut episode = EpisodeState::new();
        let visible = clear
            .evaluate_step(&scene, &open_world(), 0.0, &mut episode)
            .unwrap();
        assert_eq!(visible.0, 1.0);

        let wall = StubEngine {
            occluder_at: Some(2.0),
        };
        let mut blocked = build();
        let mut episode = EpisodeState::new();
        let hidden = blocked
            .evaluate_step(&scene, &wall, 0.0, &mut episode)
            .unwrap();
        assert_eq!(hidden.0, 0.0);
    }

    #[test]
    fn unknown_kind_and_metric_fail_construction() {
        let (scene, agent, goal) = pythagorean_scene();
        let err = RewardBuilder::new("shaped")
            .entity_a(agent)
            .entity_b(goal)
            .build(&scene)
            .unwrap_err();
        assert!(matches!(err, RlError::UnknownRewardKind(k) if k == "shaped"));

        let err = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .distance_metric("manhattan")
            .build(&scene)
            .unwrap_err();
        assert!(matches!(err, RlError::UnknownDistanceMetric(m) if m == "manhattan"));
    }

    #[test]
    fn leaves_require_both_entities() {
        let (scene, agent, _) = pythagorean_scene();
        let err = RewardBuilder::new("sparse")
            .entity_a(agent)
            .build(&scene)
            .unwrap_err();
        assert!(matches!(
            err,
            RlError::MissingEntity { role: "entity_b", .. }
        ));
    }

    #[test]
    fn combinators_require_their_children() {
        let (scene, agent, goal) = pythagorean_scene();
        let err = RewardBuilder::new("and")
            .child(sparse(&scene, agent, goal, 5.0))
            .build(&scene)
            .unwrap_err();
        assert!(matches!(
            err,
            RlError::MissingChild { expected: 2, got: 1, .. }
        ));

        let err = RewardBuilder::new("not").build(&scene).unwrap_err();
        assert!(matches!(
            err,
            RlError::MissingChild { expected: 1, got: 0, .. }
        ));
    }

    #[test]
    fn leaves_reject_children() {
        let (scene, agent, goal) = pythagorean_scene();
        let err = RewardBuilder::new("sparse")
            .entity_a(agent)
            .entity_b(goal)
            .child(sparse(&scene, agent, goal, 5.0))
            .build(&scene)
            .unwrap_err();
        assert!(matches!(err, RlError::UnexpectedChild { .. }));
    }

    #[test]
    fn removed_entity_fails_the_step_by_name() {
        let (mut scene, agent, goal) = pythagorean_scene();
        let mut reward = sparse(&scene, agent, goal, 5.0);
        scene.remove(goal).unwrap();

        let mut episode = EpisodeState::new();
        let err = reward
            .evaluate_step(&scene, &open_world(), 0.0, &mut episode)
            .unwrap_err();
        assert!(matches!(err, RlError::EntityGone { name } if name == "goal"));
    }
}
