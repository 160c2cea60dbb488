use glam::{EulerRot, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

pub const TRANSLATION_MIN: f32 = -1000.0;
pub const TRANSLATION_MAX: f32 = 1000.0;
pub const ROTATION_MIN: f32 = -TAU;
pub const ROTATION_MAX: f32 = TAU;
pub const SCALING_MIN: f32 = 0.001;
pub const SCALING_MAX: f32 = 100.0;

pub const BS_CENTER_OFFSET_MIN: f32 = -10.0;
pub const BS_CENTER_OFFSET_MAX: f32 = 10.0;
pub const BS_RADIUS_BIAS_MIN: f32 = 0.001;
pub const BS_RADIUS_BIAS_MAX: f32 = 1000.0;

/// Translation, per-axis scaling and independent pitch/yaw/roll angles.
///
/// The world matrix is derived and only changes through
/// [`Transform::update_world_matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub scaling: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    #[serde(skip)]
    world_matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scaling: Vec3::ONE,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
            world_matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Rotation with roll applied first, then pitch, then yaw.
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// Clamps scaling and wraps the three angles back into range.
    pub fn normalize(&mut self) {
        self.scaling = self.scaling.max(Vec3::splat(SCALING_MIN));
        self.pitch = wrap_rotation(self.pitch);
        self.yaw = wrap_rotation(self.yaw);
        self.roll = wrap_rotation(self.roll);
    }

    /// `Scale · T(-offset) · Rotate · Translate · T(+offset)` applied to row
    /// vectors, so rotation and scaling pivot around the bounding-sphere
    /// center rather than the model origin.
    pub fn compose(&self, pivot_offset: Vec3) -> Mat4 {
        Mat4::from_translation(pivot_offset)
            * Mat4::from_translation(self.translation)
            * self.rotation_matrix()
            * Mat4::from_translation(-pivot_offset)
            * Mat4::from_scale(self.scaling)
    }

    /// Rebuilds the world matrix and the bounding-sphere radius together.
    pub fn update_world_matrix(&mut self, bounding_sphere: &mut BoundingSphere) {
        self.normalize();
        self.world_matrix = self.compose(bounding_sphere.center_offset);
        bounding_sphere.update_radius(self.scaling);
    }

    /// World matrix for geometry with no pivot offset, such as gizmo handles.
    pub fn update_world_matrix_unpivoted(&mut self) {
        self.normalize();
        self.world_matrix = self.compose(Vec3::ZERO);
    }
}

/// Wraps past either limit to the opposite limit.
pub fn wrap_rotation(value: f32) -> f32 {
    if value > ROTATION_MAX {
        ROTATION_MIN
    } else if value < ROTATION_MIN {
        ROTATION_MAX
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center_offset: Vec3,
    pub radius_bias: f32,
    /// Derived from `radius_bias` and the largest scaling component.
    pub radius: f32,
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self {
            center_offset: Vec3::ZERO,
            radius_bias: 1.0,
            radius: 1.0,
        }
    }
}

impl BoundingSphere {
    pub fn new(center_offset: Vec3, radius_bias: f32) -> Self {
        Self {
            center_offset,
            radius_bias,
            radius: radius_bias,
        }
    }

    pub fn update_radius(&mut self, scaling: Vec3) {
        self.radius = self.radius_bias * scaling.x.max(scaling.y).max(scaling.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_follows_largest_scale_component() {
        let cases = [
            (Vec3::new(1.0, 2.0, 3.0), 0.5),
            (Vec3::new(4.0, 0.25, 1.0), 2.0),
            (Vec3::new(0.5, 7.5, 7.25), 1.3),
        ];
        for (scaling, bias) in cases {
            let mut transform = Transform {
                scaling,
                ..Transform::default()
            };
            let mut sphere = BoundingSphere::new(Vec3::ZERO, bias);
            transform.update_world_matrix(&mut sphere);
            assert_eq!(sphere.radius, bias * scaling.x.max(scaling.y).max(scaling.z));
        }
    }

    #[test]
    fn scaling_is_clamped_before_composition() {
        let mut transform = Transform {
            scaling: Vec3::new(0.0, -2.0, 3.0),
            ..Transform::default()
        };
        let mut sphere = BoundingSphere::default();
        transform.update_world_matrix(&mut sphere);
        assert_eq!(transform.scaling, Vec3::new(SCALING_MIN, SCALING_MIN, 3.0));
        assert!(transform.world_matrix().determinant().abs() > 0.0);
        assert_eq!(sphere.radius, 3.0);
    }

    #[test]
    fn angles_wrap_to_the_opposite_limit() {
        assert_eq!(wrap_rotation(TAU + 0.01), ROTATION_MIN);
        assert_eq!(wrap_rotation(-TAU - 0.01), ROTATION_MAX);
        assert_eq!(wrap_rotation(1.0), 1.0);
    }

    #[test]
    fn rotation_pivots_around_center_offset() {
        let mut transform = Transform {
            yaw: std::f32::consts::PI,
            ..Transform::default()
        };
        let mut sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        transform.update_world_matrix(&mut sphere);
        let pivot = transform.world_matrix().transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((pivot - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        let origin = transform.world_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn translation_moves_world_origin() {
        let mut transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..Transform::default()
        };
        transform.update_world_matrix_unpivoted();
        let origin = transform.world_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }
}
