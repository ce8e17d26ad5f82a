//! Sensor asset definitions.
//!
//! Sensors are scene nodes like any other asset; these types only
//! declare *what* a sensor observes and how many features it produces.
//! Actual readout against live poses lives in the `simscene-rl` crate,
//! which talks to the external engine.

use crate::error::SceneError;
use crate::scene::node::NodeId;

/// One observable property of a state sensor.
///
/// Vector properties contribute 3 features, single-axis components and
/// `distance` contribute 1. Declaration order is observation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorProperty {
    /// Relative position, 3 features.
    Position,
    /// X component of relative position.
    PositionX,
    /// Y component of relative position.
    PositionY,
    /// Z component of relative position.
    PositionZ,
    /// Relative linear velocity, 3 features.
    Velocity,
    /// X component of relative linear velocity.
    VelocityX,
    /// Y component of relative linear velocity.
    VelocityY,
    /// Z component of relative linear velocity.
    VelocityZ,
    /// Relative rotation as XYZ Euler degrees, 3 features.
    Rotation,
    /// X Euler angle of relative rotation.
    RotationX,
    /// Y Euler angle of relative rotation.
    RotationY,
    /// Z Euler angle of relative rotation.
    RotationZ,
    /// Relative angular velocity, 3 features.
    AngularVelocity,
    /// X component of relative angular velocity.
    AngularVelocityX,
    /// Y component of relative angular velocity.
    AngularVelocityY,
    /// Z component of relative angular velocity.
    AngularVelocityZ,
    /// Euclidean distance between the entities, 1 feature.
    Distance,
}

impl SensorProperty {
    /// Every recognized property, in canonical order.
    pub const ALL: [SensorProperty; 17] = [
        Self::Position,
        Self::PositionX,
        Self::PositionY,
        Self::PositionZ,
        Self::Velocity,
        Self::VelocityX,
        Self::VelocityY,
        Self::VelocityZ,
        Self::Rotation,
        Self::RotationX,
        Self::RotationY,
        Self::RotationZ,
        Self::AngularVelocity,
        Self::AngularVelocityX,
        Self::AngularVelocityY,
        Self::AngularVelocityZ,
        Self::Distance,
    ];

    /// Number of scalar features this property contributes.
    pub fn feature_count(&self) -> usize {
        match self {
            Self::Position | Self::Velocity | Self::Rotation | Self::AngularVelocity => 3,
            _ => 1,
        }
    }

    /// Canonical property name as used by the authoring surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::PositionX => "position.x",
            Self::PositionY => "position.y",
            Self::PositionZ => "position.z",
            Self::Velocity => "velocity",
            Self::VelocityX => "velocity.x",
            Self::VelocityY => "velocity.y",
            Self::VelocityZ => "velocity.z",
            Self::Rotation => "rotation",
            Self::RotationX => "rotation.x",
            Self::RotationY => "rotation.y",
            Self::RotationZ => "rotation.z",
            Self::AngularVelocity => "angular_velocity",
            Self::AngularVelocityX => "angular_velocity.x",
            Self::AngularVelocityY => "angular_velocity.y",
            Self::AngularVelocityZ => "angular_velocity.z",
            Self::Distance => "distance",
        }
    }
}

impl std::str::FromStr for SensorProperty {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| SceneError::UnknownSensorProperty(s.to_owned()))
    }
}

/// A state sensor: observes one entity's pose relative to another.
///
/// With no reference entity the world origin is the reference frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSensorSpec {
    /// The observed entity.
    pub target: NodeId,
    /// The reference entity; `None` means the world origin.
    pub reference: Option<NodeId>,
    /// Observed properties, in observation order.
    pub properties: Vec<SensorProperty>,
}

impl StateSensorSpec {
    /// Creates a state sensor observing `properties` of `target`
    /// relative to `reference`.
    ///
    /// An empty property list selects the default `[distance]`.
    pub fn new(
        target: NodeId,
        reference: Option<NodeId>,
        properties: &[SensorProperty],
    ) -> Self {
        let properties = if properties.is_empty() {
            vec![SensorProperty::Distance]
        } else {
            properties.to_vec()
        };
        Self {
            target,
            reference,
            properties,
        }
    }

    /// Like [`new`](Self::new), but parsing property names from strings.
    ///
    /// Unknown names fail with a validation error.
    pub fn parse(
        target: NodeId,
        reference: Option<NodeId>,
        properties: &[&str],
    ) -> Result<Self, SceneError> {
        let properties = properties
            .iter()
            .map(|p| p.parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(target, reference, &properties))
    }

    /// Total observation length: sum of per-property feature counts.
    pub fn observation_size(&self) -> usize {
        self.properties.iter().map(|p| p.feature_count()).sum()
    }
}

/// A raycast sensor: casts a fan of rays and observes hit distances.
#[derive(Debug, Clone, PartialEq)]
pub struct RaycastSensorSpec {
    /// Number of rays across the horizontal FOV.
    pub n_horizontal_rays: usize,
    /// Number of rays across the vertical FOV.
    pub n_vertical_rays: usize,
    /// Horizontal field of view in degrees.
    pub horizontal_fov: f32,
    /// Vertical field of view in degrees.
    pub vertical_fov: f32,
    /// Maximum ray distance; misses read as this value.
    pub ray_length: f32,
}

impl Default for RaycastSensorSpec {
    fn default() -> Self {
        Self {
            n_horizontal_rays: 1,
            n_vertical_rays: 1,
            horizontal_fov: 0.0,
            vertical_fov: 0.0,
            ray_length: 100.0,
        }
    }
}

impl RaycastSensorSpec {
    /// Creates a raycast sensor, validating that FOVs and ray length are
    /// finite and non-negative.
    pub fn new(
        n_horizontal_rays: usize,
        n_vertical_rays: usize,
        horizontal_fov: f32,
        vertical_fov: f32,
        ray_length: f32,
    ) -> Result<Self, SceneError> {
        for (name, value) in [
            ("horizontal_fov", horizontal_fov),
            ("vertical_fov", vertical_fov),
            ("ray_length", ray_length),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SceneError::InvalidSensor(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(Self {
            n_horizontal_rays,
            n_vertical_rays,
            horizontal_fov,
            vertical_fov,
            ray_length,
        })
    }

    /// Total observation length: one hit distance per ray.
    pub fn observation_size(&self) -> usize {
        self.n_horizontal_rays * self.n_vertical_rays
    }
}
