//! Scene graph: asset tree, sensors, mutation and lookup.
//!
//! - [`Scene`] — arena-backed forest of asset nodes
//! - [`AssetNode`] / [`AssetKind`] — one spatial asset and its payload
//! - [`NodeId`] — generational node identifier
//! - [`StateSensorSpec`] / [`RaycastSensorSpec`] — sensor declarations

mod graph;
mod node;
mod sensor;

pub use graph::Scene;
pub use node::{AssetKind, AssetNode, CameraAsset, CameraProjection, LightAsset, MeshAsset, NodeId};
pub use sensor::{RaycastSensorSpec, SensorProperty, StateSensorSpec};
