//! Editor cameras
//!
//! Yaw/pitch cameras in a left-handed frame. W/A/S/D move along the view
//! basis and a middle-button drag turns the camera, with pitch kept short
//! of straight up or down.

use crate::scene::pool::Named;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const EDITOR_CAMERA_NAME: &str = "Editor Camera";

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraKind {
    /// Moves along the full view direction.
    FreeLook,
    /// Moves on the horizontal plane only.
    FirstPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMove {
    Forward,
    Backward,
    Left,
    Right,
}

/// Left-handed yaw/pitch camera: yaw 0 looks down +Z, +Y is up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    pub kind: CameraKind,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_factor: f32,
    pub rotation_factor: f32,
}

impl Camera {
    pub fn new(name: impl Into<String>, kind: CameraKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            movement_factor: 10.0,
            rotation_factor: 1.0,
        }
    }

    pub fn editor() -> Self {
        let mut camera = Self::new(EDITOR_CAMERA_NAME, CameraKind::FreeLook);
        camera.position = Vec3::new(0.0, 2.0, 0.0);
        camera
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn look_towards(&mut self, direction: Vec3) {
        let (yaw, pitch) = forward_to_yaw_pitch(direction);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.look_towards(target - self.position);
    }

    /// Returns `(forward, right, up)`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().0
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (forward, _, up) = self.basis();
        Mat4::look_to_lh(self.position, forward, up)
    }

    pub fn inverse_view_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }

    pub fn move_by(&mut self, direction: CameraMove, amount: f32) {
        let (forward, right, _) = self.basis();
        let forward = match self.kind {
            CameraKind::FreeLook => forward,
            CameraKind::FirstPerson => Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero(),
        };
        let offset = match direction {
            CameraMove::Forward => forward,
            CameraMove::Backward => -forward,
            CameraMove::Left => -right,
            CameraMove::Right => right,
        };
        self.position += offset * amount;
    }

    /// Mouse-look: moving right turns right, moving down looks down.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32, frame_dt: f32) {
        let speed = self.rotation_factor * frame_dt;
        self.yaw += delta_x * speed;
        self.pitch -= delta_y * speed;
        wrap_angles(&mut self.yaw, &mut self.pitch);
    }
}

impl Named for Camera {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward.normalize_or_zero();
    if n == Vec3::ZERO {
        return (0.0, 0.0);
    }
    let yaw = n.x.atan2(n.z);
    let pitch = n.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.sin() * cos_pitch, pitch.sin(), yaw.cos() * cos_pitch);
    let right = Vec3::new(yaw.cos(), 0.0, -yaw.sin());
    let up = forward.cross(right).normalize_or_zero();
    (forward, right, up)
}

fn wrap_angles(yaw: &mut f32, pitch: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
    if pitch.is_finite() {
        *pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_camera_looks_down_positive_z() {
        let camera = Camera::editor();
        assert_eq!(camera.name, EDITOR_CAMERA_NAME);
        assert_eq!(camera.position, Vec3::new(0.0, 2.0, 0.0));
        assert!((camera.forward() - Vec3::Z).length() < 1e-6);
        let (_, right, up) = camera.basis();
        assert!((right - Vec3::X).length() < 1e-6);
        assert!((up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn inverse_view_maps_origin_to_eye() {
        let mut camera = Camera::editor().with_position(Vec3::new(3.0, 1.0, -2.0));
        camera.look_at(Vec3::ZERO);
        let eye = camera.inverse_view_matrix().transform_point3(Vec3::ZERO);
        assert!((eye - camera.position).length() < 1e-4);
        let ahead = camera.view_matrix().transform_point3(camera.position + camera.forward());
        assert!((ahead - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn first_person_moves_horizontally() {
        let mut camera = Camera::new("fp", CameraKind::FirstPerson);
        camera.pitch = 0.8;
        camera.move_by(CameraMove::Forward, 2.0);
        assert!(camera.position.y.abs() < 1e-6);
        assert!((camera.position.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_keeps_finite_values() {
        let mut camera = Camera::editor();
        camera.rotate(500.0, -9000.0, 1.0 / 60.0);
        assert!(camera.yaw.is_finite());
        assert!(camera.pitch.abs() <= PITCH_LIMIT);
        assert!(camera.view_matrix().is_finite());
    }
}
