//! Math helpers shared across the scene graph.
//!
//! All types come from `glam` (f32). The helpers here pin down the
//! angle conventions used everywhere in this workspace: Euler angles
//! are XYZ-intrinsic and expressed in **degrees** at the authoring
//! surface, quaternions are `[x, y, z, w]`.

pub use glam;

use glam::{EulerRot, Quat, Vec3};

/// Builds a rotation quaternion from XYZ-intrinsic Euler angles in degrees.
pub fn quat_from_euler_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        x.to_radians(),
        y.to_radians(),
        z.to_radians(),
    )
}

/// Decomposes a rotation into XYZ-intrinsic Euler angles in degrees.
///
/// Inverse of [`quat_from_euler_degrees`] up to angle wrapping.
pub fn euler_degrees_from_quat(q: Quat) -> [f32; 3] {
    let (x, y, z) = q.to_euler(EulerRot::XYZ);
    [x.to_degrees(), y.to_degrees(), z.to_degrees()]
}

/// Euclidean distance between two points.
pub fn euclidean_distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_euler_is_identity_quat() {
        let q = quat_from_euler_degrees(0.0, 0.0, 0.0);
        assert!((q.x, q.y, q.z, q.w) == (0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn euler_quat_is_unit_norm() {
        let q = quat_from_euler_degrees(30.0, -45.0, 120.0);
        assert!((q.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn euler_round_trip() {
        let angles = [20.0, 40.0, -60.0];
        let q = quat_from_euler_degrees(angles[0], angles[1], angles[2]);
        let back = euler_degrees_from_quat(q);
        for (a, b) in angles.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-3, "expected {a}, got {b}");
        }
    }

    #[test]
    fn pythagorean_distance() {
        let d = euclidean_distance(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert!((d - 5.0).abs() < 1e-6);
    }
}
