//! TRS transforms for positioning assets in 3D space.
//!
//! [`Transform`] is a local transform relative to the parent node;
//! [`WorldTransform`] is the composition of a node's transform with every
//! ancestor up to the tree root. World transforms are recomputed on every
//! query from the tree path, so they can never go stale against a mutated
//! graph.

use glam::{Affine3A, Quat, Vec3};

use crate::error::SceneError;
use crate::math::quat_from_euler_degrees;

/// Spatial dimensionality of an asset, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dimensionality {
    /// Three-dimensional assets. The only supported mode.
    #[default]
    Three,
    /// Two-dimensional assets. Declared but not implemented.
    Two,
}

impl Dimensionality {
    /// Fails for any dimensionality other than 3D.
    pub fn ensure_supported(self) -> Result<(), SceneError> {
        match self {
            Self::Three => Ok(()),
            Self::Two => Err(SceneError::UnsupportedDimensionality(2)),
        }
    }
}

/// Local transform describing translation, rotation, and scale relative
/// to a parent node (or world origin for roots).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation relative to parent.
    pub translation: Vec3,
    /// Rotation relative to parent.
    pub rotation: Quat,
    /// Scale relative to parent.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a transform at the given position with default rotation and scale.
    #[inline]
    pub const fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self::from_translation(Vec3::new(x, y, z))
    }

    /// Creates a transform with the given translation.
    #[inline]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Creates a transform with the given rotation.
    #[inline]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Creates a transform rotated by XYZ-intrinsic Euler angles in degrees.
    #[inline]
    pub fn from_euler_degrees(x: f32, y: f32, z: f32) -> Self {
        Self::from_rotation(quat_from_euler_degrees(x, y, z))
    }

    /// Creates a transform with the given scale.
    #[inline]
    pub const fn from_scale(scale: Vec3) -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale,
        }
    }

    /// Builds a transform from dynamic-length component slices.
    ///
    /// This is the authoring-surface constructor with the documented
    /// flexible conventions:
    ///
    /// - `translation`: exactly 3 components
    /// - `rotation`: 3 components are Euler angles in degrees
    ///   (XYZ-intrinsic), 4 components are a quaternion `[x, y, z, w]`
    ///   accepted as-is without renormalization
    /// - `scale`: 1 component broadcasts uniformly, 3 are taken as-is
    ///
    /// Any other length fails with a validation error naming the
    /// expected sizes. Empty slices select the identity defaults.
    pub fn from_parts(
        translation: &[f32],
        rotation: &[f32],
        scale: &[f32],
    ) -> Result<Self, SceneError> {
        let mut transform = Self::IDENTITY;
        transform.set_translation(translation)?;
        transform.set_rotation(rotation)?;
        transform.set_scale(scale)?;
        Ok(transform)
    }

    /// Sets the translation from a slice. Empty keeps the origin default.
    pub fn set_translation(&mut self, value: &[f32]) -> Result<(), SceneError> {
        match value {
            [] => Ok(()),
            [x, y, z] => {
                self.translation = Vec3::new(*x, *y, *z);
                Ok(())
            }
            other => Err(SceneError::InvalidTranslation { len: other.len() }),
        }
    }

    /// Sets the rotation from a slice. Empty keeps the identity default.
    ///
    /// 3 components are Euler degrees, 4 are a raw quaternion.
    pub fn set_rotation(&mut self, value: &[f32]) -> Result<(), SceneError> {
        match value {
            [] => Ok(()),
            [x, y, z] => {
                self.rotation = quat_from_euler_degrees(*x, *y, *z);
                Ok(())
            }
            [x, y, z, w] => {
                self.rotation = Quat::from_xyzw(*x, *y, *z, *w);
                Ok(())
            }
            other => Err(SceneError::InvalidRotation { len: other.len() }),
        }
    }

    /// Sets the scale from a slice. Empty keeps the unit default.
    ///
    /// A single component broadcasts to all three axes.
    pub fn set_scale(&mut self, value: &[f32]) -> Result<(), SceneError> {
        match value {
            [] => Ok(()),
            [s] => {
                self.scale = Vec3::splat(*s);
                Ok(())
            }
            [x, y, z] => {
                self.scale = Vec3::new(*x, *y, *z);
                Ok(())
            }
            other => Err(SceneError::InvalidScale { len: other.len() }),
        }
    }

    /// Returns this transform with a different translation.
    #[inline]
    #[must_use]
    pub const fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[inline]
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[inline]
    #[must_use]
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Computes the affine transformation for this transform.
    #[inline]
    pub fn compute_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Multiplies this transform by another, combining them.
    /// The result represents applying `self` first, then `other`.
    #[inline]
    pub fn mul_transform(&self, other: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(other.translation),
            rotation: self.rotation * other.rotation,
            scale: self.scale * other.scale,
        }
    }

    /// Transforms a point from local space to the space of this transform.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    /// Returns the local forward direction (-Z axis).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Returns the local right direction (+X axis).
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Returns the local up direction (+Y axis).
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

/// World-space transform of a node, composed through all ancestors.
///
/// Produced by [`Scene::world_transform`](crate::scene::Scene::world_transform);
/// derived purely from the tree path on every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform(pub(crate) Affine3A);

impl Default for WorldTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl WorldTransform {
    /// Identity world transform (the world origin frame).
    pub const IDENTITY: Self = Self(Affine3A::IDENTITY);

    /// Returns the underlying affine transformation.
    #[inline]
    pub fn affine(&self) -> Affine3A {
        self.0
    }

    /// Returns the world-space translation.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.0.translation.into()
    }

    /// Extracts scale, rotation, and translation.
    /// Lossy for sheared transforms.
    #[inline]
    pub fn to_scale_rotation_translation(&self) -> (Vec3, Quat, Vec3) {
        self.0.to_scale_rotation_translation()
    }

    /// Returns the world-space rotation.
    #[inline]
    pub fn rotation(&self) -> Quat {
        self.to_scale_rotation_translation().1
    }

    /// Returns the world-space forward direction (-Z axis).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        (self.0.matrix3 * Vec3::NEG_Z).normalize()
    }

    /// Returns the world-space right direction (+X axis).
    #[inline]
    pub fn right(&self) -> Vec3 {
        (self.0.matrix3 * Vec3::X).normalize()
    }

    /// Returns the world-space up direction (+Y axis).
    #[inline]
    pub fn up(&self) -> Vec3 {
        (self.0.matrix3 * Vec3::Y).normalize()
    }

    /// Transforms a point from local space to world space.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.0.transform_point3(point)
    }

    /// Multiplies this world transform by a local transform.
    #[inline]
    pub fn mul_transform(&self, transform: &Transform) -> WorldTransform {
        WorldTransform(self.0 * transform.compute_affine())
    }
}

impl From<Transform> for WorldTransform {
    fn from(transform: Transform) -> Self {
        WorldTransform(transform.compute_affine())
    }
}
