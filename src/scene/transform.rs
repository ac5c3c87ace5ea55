//! Transform component

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::TAU;

/// Position, Euler rotation (radians, XYZ order) and scale
///
/// Rotation is stored as angles rather than a quaternion so that spinning an
/// object is a plain addition per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Get the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    /// Advance the rotation about Y by `angle` radians, kept within [0, 2π)
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation.y = wrap_angle(self.rotation.y + angle);
    }

    /// Build uniform data for shaders
    pub fn uniform_data(&self) -> TransformUniformData {
        let model = self.matrix();
        TransformUniformData {
            model,
            normal_matrix: model.inverse().transpose(),
        }
    }
}

/// Normalize an angle into [0, 2π) without changing its direction
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Transform uniform data for GPU
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformUniformData {
    pub model: Mat4,
    pub normal_matrix: Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_y_is_additive_below_full_turn() {
        let mut t = Transform::default();
        t.rotate_y(0.5);
        t.rotate_y(0.25);
        assert_eq!(t.rotation.y, 0.75);
        assert_eq!(t.rotation.x, 0.0);
        assert_eq!(t.rotation.z, 0.0);
    }

    #[test]
    fn rotate_y_wraps_without_changing_direction() {
        let mut t = Transform::default();
        t.rotate_y(TAU - 0.1);
        let before = t.quat();
        t.rotate_y(0.3);
        assert!((t.rotation.y - 0.2).abs() < 1e-5);

        let expected = Quat::from_rotation_y(0.3) * before;
        assert!(t.quat().dot(expected).abs() > 1.0 - 1e-6);
    }

    #[test]
    fn wrap_angle_handles_negatives() {
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-6);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(-1e-9) < TAU);
    }

    #[test]
    fn long_runs_stay_bounded() {
        let mut t = Transform::default();
        for _ in 0..1_000_000 {
            t.rotate_y(1.0 / 60.0);
        }
        assert!(t.rotation.y >= 0.0 && t.rotation.y < TAU);
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::splat(2.0),
        };
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }
}
