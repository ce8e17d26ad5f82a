//! Asset node types for the scene tree.

use glam::Vec3;

use crate::scene::sensor::{RaycastSensorSpec, StateSensorSpec};
use crate::transform::{Dimensionality, Transform};

/// Identifier of a node in a [`Scene`](crate::scene::Scene).
///
/// Layout: slot index + generation. The generation is bumped whenever a
/// slot is freed, so an id captured before a removal no longer resolves
/// afterwards (same ABA scheme as entity spawn ticks in ECS worlds).
///
/// Ids are local to one scene instance; two scenes never share ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the slot index of this id.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Payload describing what kind of asset a node is.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssetKind {
    /// A plain spatial grouping node with no payload.
    #[default]
    Empty,
    /// A mesh asset. Geometry lives in the external engine; the node
    /// carries only the resource label and a coarse bound.
    Mesh(MeshAsset),
    /// A camera.
    Camera(CameraAsset),
    /// A light.
    Light(LightAsset),
    /// A state sensor observing one entity relative to another.
    StateSensor(StateSensorSpec),
    /// A raycast sensor sweeping a fan of rays.
    RaycastSensor(RaycastSensorSpec),
}

impl AssetKind {
    /// Human-readable kind name, used as the default node name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "Asset",
            Self::Mesh(_) => "Mesh",
            Self::Camera(_) => "Camera",
            Self::Light(_) => "Light",
            Self::StateSensor(_) => "StateSensor",
            Self::RaycastSensor(_) => "RaycastSensor",
        }
    }
}

/// A mesh asset reference.
///
/// Rendering and collision are delegated to the external engine; the
/// scene only declares the resource and a bounding radius for coarse
/// spatial queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshAsset {
    /// Engine-side resource label.
    pub resource: String,
    /// Coarse bounding-sphere radius.
    pub bounding_radius: f32,
}

impl MeshAsset {
    /// Creates a mesh asset referencing an engine resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            bounding_radius: 0.0,
        }
    }

    /// Set the bounding-sphere radius.
    #[must_use]
    pub fn with_bounding_radius(mut self, radius: f32) -> Self {
        self.bounding_radius = radius;
        self
    }
}

/// Camera projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        yfov: f32,
        /// Aspect ratio (width/height).
        aspect: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance.
        zfar: f32,
    },
    /// Orthographic projection.
    Orthographic {
        /// Horizontal magnification.
        xmag: f32,
        /// Vertical magnification.
        ymag: f32,
        /// Near clipping plane distance.
        znear: f32,
        /// Far clipping plane distance.
        zfar: f32,
    },
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self::Perspective {
            yfov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// A camera asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraAsset {
    /// Projection type and parameters.
    pub projection: CameraProjection,
    /// Render-target width in pixels, if the engine should render
    /// camera frames (e.g. for pixel observations).
    pub width: Option<u32>,
    /// Render-target height in pixels.
    pub height: Option<u32>,
}

impl CameraAsset {
    /// Perspective camera from a vertical FOV in degrees.
    pub fn perspective(yfov_degrees: f32, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            projection: CameraProjection::Perspective {
                yfov: yfov_degrees.to_radians(),
                aspect,
                znear,
                zfar,
            },
            width: None,
            height: None,
        }
    }

    /// Set the render-target size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// A light asset. Position and direction come from the node transform.
#[derive(Debug, Clone, PartialEq)]
pub enum LightAsset {
    /// Sun-like light, direction is the node's forward axis.
    Directional {
        /// Light color.
        color: Vec3,
        /// Light intensity.
        intensity: f32,
    },
    /// Omni-directional point light.
    Point {
        /// Light color.
        color: Vec3,
        /// Light intensity.
        intensity: f32,
        /// Influence radius.
        radius: f32,
    },
    /// Cone light along the node's forward axis.
    Spot {
        /// Light color.
        color: Vec3,
        /// Light intensity.
        intensity: f32,
        /// Influence radius.
        radius: f32,
        /// Inner cone angle in radians.
        inner_angle: f32,
        /// Outer cone angle in radians.
        outer_angle: f32,
    },
}

impl Default for LightAsset {
    fn default() -> Self {
        Self::Point {
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 10.0,
        }
    }
}

/// A node in the scene tree: one spatial asset with a local transform.
///
/// Nodes are constructed detached, then inserted with
/// [`Scene::spawn`](crate::scene::Scene::spawn) or
/// [`Scene::add_child`](crate::scene::Scene::add_child). Parent and
/// children links are managed by the scene; ownership flows strictly
/// parent to children.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetNode {
    /// Human-readable name. Defaults to the kind name; the scene makes
    /// default names unique among siblings by suffixing, while
    /// explicitly chosen names must already be unique.
    pub name: String,
    /// Local transform relative to the parent node.
    pub transform: Transform,
    /// Asset payload.
    pub kind: AssetKind,
    pub(crate) user_named: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Default for AssetNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl AssetNode {
    /// Creates a detached node with the given payload and a default name.
    pub fn new(kind: AssetKind) -> Self {
        Self {
            name: kind.name().to_owned(),
            transform: Transform::IDENTITY,
            kind,
            user_named: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Creates a detached node with fixed dimensionality.
    ///
    /// Only 3D is implemented; 2D fails explicitly rather than silently
    /// defaulting.
    pub fn with_dimensionality(
        kind: AssetKind,
        dimensionality: Dimensionality,
    ) -> Result<Self, crate::SceneError> {
        dimensionality.ensure_supported()?;
        Ok(Self::new(kind))
    }

    /// Creates an empty grouping node.
    pub fn empty() -> Self {
        Self::new(AssetKind::Empty)
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.user_named = true;
        self
    }

    /// Set the local transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the local translation.
    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    /// Parent of this node, if attached as a child.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered child ids of this node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_name_is_kind_name() {
        assert_eq!(AssetNode::empty().name, "Asset");
        assert_eq!(AssetNode::new(AssetKind::Camera(CameraAsset::default())).name, "Camera");
    }

    #[test]
    fn with_name_marks_user_named() {
        let node = AssetNode::empty().with_name("agent");
        assert!(node.user_named);
        assert_eq!(node.name, "agent");
    }

    #[test]
    fn two_dimensional_construction_fails() {
        let err = AssetNode::with_dimensionality(AssetKind::Empty, Dimensionality::Two);
        assert!(err.is_err());
    }
}
