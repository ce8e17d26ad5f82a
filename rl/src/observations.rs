//! Sensor readout against live scene poses.
//!
//! Sensors are declared as scene nodes (`simscene-core`); this module
//! turns a declaration plus the current world state into the fixed-length
//! feature vector the declaration promises. The produced length always
//! equals the declared observation size.

use glam::{Quat, Vec3};
use simscene_core::math::euler_degrees_from_quat;
use simscene_core::scene::{AssetKind, NodeId, RaycastSensorSpec, Scene, SensorProperty, StateSensorSpec};

use crate::engine::{RaycastProvider, SimulationEngine, VelocityProvider};
use crate::error::{RlError, RlResult};
use crate::spaces::BoxSpace;

/// The observation space a sensor node declares.
///
/// State sensors are unbounded; raycast sensors are bounded by the ray
/// length. Fails on non-sensor nodes.
pub fn observation_space(scene: &Scene, sensor: NodeId) -> RlResult<BoxSpace> {
    let node = scene.node(sensor)?;
    match &node.kind {
        AssetKind::StateSensor(spec) => Ok(BoxSpace::vector(spec.observation_size())),
        AssetKind::RaycastSensor(spec) => Ok(BoxSpace::bounded_vector(
            spec.observation_size(),
            0.0,
            spec.ray_length,
        )),
        _ => Err(RlError::NotASensor {
            name: node.name.clone(),
        }),
    }
}

/// Reads a sensor node into its feature vector.
///
/// Dispatches on the node's asset kind; fails on non-sensor nodes and on
/// sensors whose observed entities have been removed from the scene.
pub fn read_sensor(
    scene: &Scene,
    sensor: NodeId,
    engine: &impl SimulationEngine,
) -> RlResult<Vec<f32>> {
    let node = scene.node(sensor)?;
    match &node.kind {
        AssetKind::StateSensor(spec) => read_state_sensor(scene, &node.name, spec, engine),
        AssetKind::RaycastSensor(spec) => read_raycast_sensor(scene, sensor, spec, engine),
        _ => Err(RlError::NotASensor {
            name: node.name.clone(),
        }),
    }
}

/// Pose and rates of one entity, resolved for relative measurement.
struct Frame {
    position: Vec3,
    rotation: Quat,
    linear: Vec3,
    angular: Vec3,
}

fn resolve_frame(
    scene: &Scene,
    entity: NodeId,
    engine: &impl VelocityProvider,
    sensor_name: &str,
    role: &str,
) -> RlResult<Frame> {
    let world = scene.world_transform(entity).map_err(|_| RlError::EntityGone {
        name: format!("{sensor_name}.{role}"),
    })?;
    let (_, rotation, position) = world.to_scale_rotation_translation();
    let rates = engine.velocity(entity).unwrap_or_default();
    Ok(Frame {
        position,
        rotation,
        linear: rates.linear,
        angular: rates.angular,
    })
}

fn read_state_sensor(
    scene: &Scene,
    sensor_name: &str,
    spec: &StateSensorSpec,
    engine: &impl SimulationEngine,
) -> RlResult<Vec<f32>> {
    let target = resolve_frame(scene, spec.target, engine, sensor_name, "target")?;
    let reference = match spec.reference {
        Some(id) => resolve_frame(scene, id, engine, sensor_name, "reference")?,
        None => Frame {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear: Vec3::ZERO,
            angular: Vec3::ZERO,
        },
    };

    // All relative quantities are expressed in the reference frame.
    let inv_ref = reference.rotation.inverse();
    let rel_position = inv_ref * (target.position - reference.position);
    let rel_rotation = euler_degrees_from_quat(inv_ref * target.rotation);
    let rel_linear = inv_ref * (target.linear - reference.linear);
    let rel_angular = inv_ref * (target.angular - reference.angular);
    let distance = target.position.distance(reference.position);

    let mut out = Vec::with_capacity(spec.observation_size());
    for property in &spec.properties {
        match property {
            SensorProperty::Position => out.extend(rel_position.to_array()),
            SensorProperty::PositionX => out.push(rel_position.x),
            SensorProperty::PositionY => out.push(rel_position.y),
            SensorProperty::PositionZ => out.push(rel_position.z),
            SensorProperty::Velocity => out.extend(rel_linear.to_array()),
            SensorProperty::VelocityX => out.push(rel_linear.x),
            SensorProperty::VelocityY => out.push(rel_linear.y),
            SensorProperty::VelocityZ => out.push(rel_linear.z),
            SensorProperty::Rotation => out.extend(rel_rotation),
            SensorProperty::RotationX => out.push(rel_rotation[0]),
            SensorProperty::RotationY => out.push(rel_rotation[1]),
            SensorProperty::RotationZ => out.push(rel_rotation[2]),
            SensorProperty::AngularVelocity => out.extend(rel_angular.to_array()),
            SensorProperty::AngularVelocityX => out.push(rel_angular.x),
            SensorProperty::AngularVelocityY => out.push(rel_angular.y),
            SensorProperty::AngularVelocityZ => out.push(rel_angular.z),
            SensorProperty::Distance => out.push(distance),
        }
    }
    debug_assert_eq!(out.len(), spec.observation_size());
    Ok(out)
}

/// Evenly spreads ray index `i` of `n` across `[-fov/2, +fov/2]`,
/// returning radians. A single ray sits on the axis.
fn ray_angle(i: usize, n: usize, fov_degrees: f32) -> f32 {
    if n <= 1 {
        return 0.0;
    }
    let fov = fov_degrees.to_radians();
    -fov / 2.0 + fov * (i as f32) / ((n - 1) as f32)
}

fn read_raycast_sensor(
    scene: &Scene,
    sensor: NodeId,
    spec: &RaycastSensorSpec,
    engine: &impl RaycastProvider,
) -> RlResult<Vec<f32>> {
    let world = scene.world_transform(sensor)?;
    let (_, rotation, origin) = world.to_scale_rotation_translation();

    let mut out = Vec::with_capacity(spec.observation_size());
    for v in 0..spec.n_vertical_rays {
        let pitch = ray_angle(v, spec.n_vertical_rays, spec.vertical_fov);
        for h in 0..spec.n_horizontal_rays {
            let yaw = ray_angle(h, spec.n_horizontal_rays, spec.horizontal_fov);
            // Fan out around the sensor's forward (-Z) axis.
            let local = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch) * Vec3::NEG_Z;
            let direction = (rotation * local).normalize();
            let hit = engine
                .cast_ray(origin, direction, spec.ray_length)
                .unwrap_or(spec.ray_length);
            out.push(hit.clamp(0.0, spec.ray_length));
        }
    }
    debug_assert_eq!(out.len(), spec.observation_size());
    Ok(out)
}
