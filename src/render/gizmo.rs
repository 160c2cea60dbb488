//! Transform gizmo
//!
//! Translation arrows, rotation rings and scaling handles around the
//! selected object's pivot. Handles are rescaled every frame from the
//! camera distance so they stay usable at any zoom.
//!
//! ## States
//!
//! `Idle` until the cursor ray hits a handle, `Hovered` while it does, and
//! `Dragging` from a left press on a hovered handle until the release.
//! Drag deltas are scaled by the pivot distance captured at drag start.

use crate::math::{ray_cylinder, ray_plane, ray_sphere, Ray};
use crate::render::MeshBufferHandle;
use crate::scene::object::{Mesh, Object3D, Vertex};
use crate::scene::transform::Transform;
use glam::{Mat3, Vec2, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, TAU};

pub const TRANSLATION_DELTA: f32 = 0.0078125;
pub const ROTATION_DELTA_DEGREES: f32 = 0.25;
pub const DEGREES_TO_RADIANS: f32 = TAU / 360.0;
pub const SCALING_DELTA: f32 = 0.0078125;

const SIZE_DISTANCE_FACTOR: f32 = 0.1;
const SIZE_EXPONENT: f32 = 0.7;
pub const CAMERA_DISTANCE_THRESHOLD: f32 = 0.03125;
pub const DISTANCE_FACTOR_EXPONENT: f32 = 0.75;

const RING_SELECTION_RADIUS: f32 = 1.1;
const RING_SELECTION_LOW: f32 = 0.8;
const RING_SELECTION_HIGH: f32 = 1.2;
const HANDLE_LENGTH: f32 = 1.1875;
const HANDLE_RADIUS: f32 = 0.05859375;

const SHAFT_RADIUS: f32 = 0.05;
const RING_SEGMENTS: usize = 36;
const HEAD_SEGMENTS: usize = 12;

pub const HIGHLIGHT_COLOR_FACTOR: Vec4 = Vec4::new(2.0, 2.0, 2.0, 0.95);
pub const NORMAL_COLOR_FACTOR: Vec4 = Vec4::splat(0.75);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoMode {
    Translation,
    Rotation,
    Scaling,
}

impl GizmoMode {
    pub const ALL: [GizmoMode; 3] = [Self::Translation, Self::Rotation, Self::Scaling];

    pub fn label(self) -> &'static str {
        match self {
            Self::Translation => "Translation",
            Self::Rotation => "Rotation",
            Self::Scaling => "Scaling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    /// Hit-test priority order.
    pub const ALL: [GizmoAxis; 3] = [Self::X, Self::Y, Self::Z];

    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    pub fn color(self) -> Vec4 {
        match self {
            Self::X => Vec4::new(1.0, 0.0, 0.0, 1.0),
            Self::Y => Vec4::new(0.0, 1.0, 0.0, 1.0),
            Self::Z => Vec4::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    /// `(pitch, yaw, roll)` that turns a +Y-aligned handle onto this axis.
    pub fn base_orientation(self) -> (f32, f32, f32) {
        match self {
            Self::X => (0.0, 0.0, -FRAC_PI_2),
            Self::Y => (0.0, 0.0, 0.0),
            Self::Z => (FRAC_PI_2, 0.0, 0.0),
        }
    }

    /// Maps this axis onto +Y, the canonical cylinder axis.
    pub fn cylinder_space_rotation(self) -> Mat3 {
        match self {
            Self::X => Mat3::from_rotation_z(FRAC_PI_2),
            Self::Y => Mat3::IDENTITY,
            Self::Z => Mat3::from_rotation_x(-FRAC_PI_2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragCapture {
    pub cursor: Vec2,
    /// Pivot at drag start. The drag distance factor is measured from here
    /// for the whole drag.
    pub pivot: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GizmoState {
    #[default]
    Idle,
    Hovered {
        axis: GizmoAxis,
    },
    Dragging {
        axis: GizmoAxis,
        capture: DragCapture,
    },
}

/// What the gizmo needs from one frame of input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoInput {
    pub ray: Option<Ray>,
    pub eye: Vec3,
    pub cursor: Vec2,
    pub previous_cursor: Vec2,
    pub left_held: bool,
}

pub struct GizmoHandle {
    pub mode: GizmoMode,
    pub axis: GizmoAxis,
    pub transform: Transform,
    pub mesh: Mesh,
    pub(crate) buffer: Option<MeshBufferHandle>,
}

pub struct Gizmo {
    mode: GizmoMode,
    state: GizmoState,
    scalar: f32,
    handles: Vec<GizmoHandle>,
}

impl Default for Gizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl Gizmo {
    pub fn new() -> Self {
        let mut handles = Vec::with_capacity(9);
        for mode in GizmoMode::ALL {
            for axis in GizmoAxis::ALL {
                handles.push(GizmoHandle {
                    mode,
                    axis,
                    transform: Transform::default(),
                    mesh: handle_mesh(mode, axis.color()),
                    buffer: None,
                });
            }
        }
        Self {
            mode: GizmoMode::Translation,
            state: GizmoState::Idle,
            scalar: 1.0,
            handles,
        }
    }

    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GizmoMode) {
        if self.mode != mode {
            log::debug!("gizmo mode: {}", mode.label());
        }
        self.mode = mode;
    }

    pub fn state(&self) -> GizmoState {
        self.state
    }

    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    /// Axis under the cursor or being dragged.
    pub fn active_axis(&self) -> Option<GizmoAxis> {
        match self.state {
            GizmoState::Idle => None,
            GizmoState::Hovered { axis } | GizmoState::Dragging { axis, .. } => Some(axis),
        }
    }

    pub fn is_hovered(&self) -> bool {
        matches!(self.state, GizmoState::Hovered { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GizmoState::Dragging { .. })
    }

    /// True while a handle owns the mouse; picking must not change the
    /// selection then.
    pub fn is_engaged(&self) -> bool {
        self.is_dragging()
    }

    pub fn reset(&mut self) {
        self.state = GizmoState::Idle;
    }

    pub fn begin_drag(&mut self, axis: GizmoAxis, cursor: Vec2, pivot: Vec3) {
        log::debug!("gizmo drag start: {} {:?}", self.mode.label(), axis);
        self.state = GizmoState::Dragging {
            axis,
            capture: DragCapture { cursor, pivot },
        };
    }

    pub fn end_drag(&mut self) {
        if let GizmoState::Dragging { axis, .. } = self.state {
            log::debug!("gizmo drag end: {} {:?}", self.mode.label(), axis);
            self.state = GizmoState::Idle;
        }
    }

    pub fn handles(&self) -> impl Iterator<Item = &GizmoHandle> + '_ {
        let mode = self.mode;
        self.handles.iter().filter(move |handle| handle.mode == mode)
    }

    pub(crate) fn all_handles_mut(&mut self) -> &mut [GizmoHandle] {
        &mut self.handles
    }

    pub fn all_handles(&self) -> &[GizmoHandle] {
        &self.handles
    }

    pub fn color_factor(&self, axis: GizmoAxis) -> Vec4 {
        if self.active_axis() == Some(axis) {
            HIGHLIGHT_COLOR_FACTOR
        } else {
            NORMAL_COLOR_FACTOR
        }
    }

    /// One frame of gizmo interaction against the selected object. Returns
    /// true when the object's transform changed.
    pub fn update(&mut self, input: &GizmoInput, target: &mut Object3D) -> bool {
        let pivot = target.pivot();
        self.scalar = size_scalar(input.eye, pivot);
        self.place_handles(pivot);

        if self.is_dragging() && !input.left_held {
            self.end_drag();
        }

        if let GizmoState::Dragging { axis, capture } = self.state {
            let delta_sum = (input.cursor.y - input.previous_cursor.y)
                - (input.cursor.x - input.previous_cursor.x);
            if delta_sum == 0.0 {
                return false;
            }
            let factor = drag_distance_factor(capture.pivot, input.eye);
            apply_drag(&mut target.transform, self.mode, axis, delta_sum, factor);
            target.update_world_matrix();
            self.place_handles(target.pivot());
            return true;
        }

        let hovered = input
            .ray
            .as_ref()
            .and_then(|ray| hit_test(self.mode, ray, pivot, self.scalar));
        match hovered {
            Some(axis) if input.left_held => self.begin_drag(axis, input.cursor, pivot),
            Some(axis) => self.state = GizmoState::Hovered { axis },
            None => self.state = GizmoState::Idle,
        }
        false
    }

    fn place_handles(&mut self, pivot: Vec3) {
        let scalar = self.scalar;
        for handle in &mut self.handles {
            let (pitch, yaw, roll) = handle.axis.base_orientation();
            handle.transform.translation = pivot;
            handle.transform.scaling = Vec3::splat(scalar);
            handle.transform.pitch = pitch;
            handle.transform.yaw = yaw;
            handle.transform.roll = roll;
            handle.transform.update_world_matrix_unpivoted();
        }
    }
}

/// Uniform gizmo scale that keeps its apparent size roughly constant.
pub fn size_scalar(eye: Vec3, pivot: Vec3) -> f32 {
    (eye.distance(pivot) * SIZE_DISTANCE_FACTOR).powf(SIZE_EXPONENT)
}

/// Drag sensitivity. The distance is floored before exponentiation.
pub fn drag_distance_factor(pivot: Vec3, eye: Vec3) -> f32 {
    pivot
        .distance(eye)
        .max(CAMERA_DISTANCE_THRESHOLD)
        .powf(DISTANCE_FACTOR_EXPONENT)
}

pub fn drag_delta(mode: GizmoMode, delta_sum: f32, distance_factor: f32) -> f32 {
    match mode {
        GizmoMode::Translation => delta_sum * TRANSLATION_DELTA * distance_factor,
        GizmoMode::Rotation => {
            delta_sum * DEGREES_TO_RADIANS * ROTATION_DELTA_DEGREES * distance_factor
        }
        GizmoMode::Scaling => delta_sum * SCALING_DELTA * distance_factor,
    }
}

/// Subtracts the drag delta from one component. Rotation maps X, Y, Z to
/// pitch, yaw, roll. The caller rebuilds the world matrix.
pub fn apply_drag(
    transform: &mut Transform,
    mode: GizmoMode,
    axis: GizmoAxis,
    delta_sum: f32,
    distance_factor: f32,
) {
    let delta = drag_delta(mode, delta_sum, distance_factor);
    let component = match (mode, axis) {
        (GizmoMode::Translation, GizmoAxis::X) => &mut transform.translation.x,
        (GizmoMode::Translation, GizmoAxis::Y) => &mut transform.translation.y,
        (GizmoMode::Translation, GizmoAxis::Z) => &mut transform.translation.z,
        (GizmoMode::Rotation, GizmoAxis::X) => &mut transform.pitch,
        (GizmoMode::Rotation, GizmoAxis::Y) => &mut transform.yaw,
        (GizmoMode::Rotation, GizmoAxis::Z) => &mut transform.roll,
        (GizmoMode::Scaling, GizmoAxis::X) => &mut transform.scaling.x,
        (GizmoMode::Scaling, GizmoAxis::Y) => &mut transform.scaling.y,
        (GizmoMode::Scaling, GizmoAxis::Z) => &mut transform.scaling.z,
    };
    *component -= delta;
}

/// First axis, in X, Y, Z order, whose handle the ray touches.
pub fn hit_test(mode: GizmoMode, ray: &Ray, pivot: Vec3, scalar: f32) -> Option<GizmoAxis> {
    GizmoAxis::ALL.into_iter().find(|&axis| match mode {
        GizmoMode::Rotation => hits_ring(ray, pivot, scalar, axis),
        GizmoMode::Translation | GizmoMode::Scaling => hits_shaft(ray, pivot, scalar, axis),
    })
}

/// Sphere gate, then the axis-normal plane, then a thin annulus check on
/// the plane hit. Stands in for a ray/torus test.
fn hits_ring(ray: &Ray, pivot: Vec3, scalar: f32, axis: GizmoAxis) -> bool {
    if ray_sphere(ray, pivot, RING_SELECTION_RADIUS * scalar).is_none() {
        return false;
    }
    let Some(t) = ray_plane(ray, pivot, axis.unit()) else {
        return false;
    };
    let distance = ray.at(t).distance(pivot);
    distance >= RING_SELECTION_LOW * scalar && distance <= RING_SELECTION_HIGH * scalar
}

fn hits_shaft(ray: &Ray, pivot: Vec3, scalar: f32, axis: GizmoAxis) -> bool {
    let rotation = axis.cylinder_space_rotation();
    let local = Ray::new(rotation * (ray.origin - pivot), rotation * ray.direction);
    ray_cylinder(&local, HANDLE_LENGTH * scalar, HANDLE_RADIUS * scalar).is_some()
}

// ========================================================================
// Handle geometry. Every handle is built along +Y at unit size; the base
// orientation and the distance scalar place it.
// ========================================================================

fn handle_mesh(mode: GizmoMode, color: Vec4) -> Mesh {
    let shaft = box_mesh(
        Vec3::new(0.0, 0.5, 0.0),
        Vec3::new(SHAFT_RADIUS, 1.0, SHAFT_RADIUS),
        color,
    );
    match mode {
        GizmoMode::Translation => merge(
            shaft,
            cone_mesh(1.0, HANDLE_LENGTH - 1.0, HANDLE_RADIUS * 1.5, HEAD_SEGMENTS, color),
        ),
        GizmoMode::Rotation => ring_mesh(1.0, SHAFT_RADIUS * 0.5, color, RING_SEGMENTS),
        GizmoMode::Scaling => {
            let head = HANDLE_LENGTH - 1.0;
            merge(
                shaft,
                box_mesh(
                    Vec3::new(0.0, 1.0 + head * 0.5, 0.0),
                    Vec3::splat(head),
                    color,
                ),
            )
        }
    }
}

fn vertex(position: Vec3, color: Vec4) -> Vertex {
    Vertex::new(position, color, Vec2::ZERO)
}

fn merge(mut a: Mesh, b: Mesh) -> Mesh {
    let base = a.vertices.len() as u32;
    a.vertices.extend(b.vertices);
    a.triangles.extend(
        b.triangles
            .into_iter()
            .map(|[i0, i1, i2]| [i0 + base, i1 + base, i2 + base]),
    );
    a
}

fn box_mesh(center: Vec3, size: Vec3, color: Vec4) -> Mesh {
    let h = size * 0.5;
    let c = center;
    let p = [
        Vec3::new(c.x - h.x, c.y - h.y, c.z - h.z),
        Vec3::new(c.x + h.x, c.y - h.y, c.z - h.z),
        Vec3::new(c.x + h.x, c.y + h.y, c.z - h.z),
        Vec3::new(c.x - h.x, c.y + h.y, c.z - h.z),
        Vec3::new(c.x - h.x, c.y - h.y, c.z + h.z),
        Vec3::new(c.x + h.x, c.y - h.y, c.z + h.z),
        Vec3::new(c.x + h.x, c.y + h.y, c.z + h.z),
        Vec3::new(c.x - h.x, c.y + h.y, c.z + h.z),
    ];
    Mesh {
        vertices: p.iter().map(|&position| vertex(position, color)).collect(),
        triangles: vec![
            [0, 2, 1], [0, 3, 2],
            [4, 5, 6], [4, 6, 7],
            [0, 5, 4], [0, 1, 5],
            [1, 6, 5], [1, 2, 6],
            [2, 7, 6], [2, 3, 7],
            [3, 4, 7], [3, 0, 4],
        ],
        material_index: 0,
    }
}

fn cone_mesh(base_y: f32, height: f32, radius: f32, segments: usize, color: Vec4) -> Mesh {
    let n = segments.max(3);
    let mut vertices = Vec::with_capacity(n + 2);
    vertices.push(vertex(Vec3::new(0.0, base_y + height, 0.0), color));
    vertices.push(vertex(Vec3::new(0.0, base_y, 0.0), color));
    for i in 0..n {
        let t = (i as f32 / n as f32) * TAU;
        vertices.push(vertex(
            Vec3::new(radius * t.cos(), base_y, radius * t.sin()),
            color,
        ));
    }
    let mut triangles = Vec::with_capacity(n * 2);
    for i in 0..n {
        let a = (2 + i) as u32;
        let b = (2 + (i + 1) % n) as u32;
        triangles.push([0, b, a]);
        triangles.push([1, a, b]);
    }
    Mesh {
        vertices,
        triangles,
        material_index: 0,
    }
}

/// Flat band in the XZ plane.
fn ring_mesh(radius: f32, thickness: f32, color: Vec4, segments: usize) -> Mesh {
    let n = segments.max(16);
    let mut vertices = Vec::with_capacity(n * 2);
    for i in 0..n {
        let t = (i as f32 / n as f32) * TAU;
        let dir = Vec3::new(t.cos(), 0.0, t.sin());
        vertices.push(vertex(dir * (radius + thickness), color));
        vertices.push(vertex(dir * (radius - thickness), color));
    }
    let mut triangles = Vec::with_capacity(n * 2);
    for i in 0..n {
        let i0 = (i * 2) as u32;
        let i1 = (i * 2 + 1) as u32;
        let j0 = (((i + 1) % n) * 2) as u32;
        let j1 = j0 + 1;
        triangles.push([i0, j0, j1]);
        triangles.push([i0, j1, i1]);
    }
    Mesh {
        vertices,
        triangles,
        material_index: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_at_origin() -> Object3D {
        let mut object = Object3D::new("target");
        object.update_world_matrix();
        object
    }

    fn input(ray: Option<Ray>, eye: Vec3, cursor: Vec2, previous: Vec2, held: bool) -> GizmoInput {
        GizmoInput {
            ray,
            eye,
            cursor,
            previous_cursor: previous,
            left_held: held,
        }
    }

    #[test]
    fn translation_delta_is_subtracted_on_axis() {
        let mut transform = Transform::default();
        apply_drag(&mut transform, GizmoMode::Translation, GizmoAxis::X, 5.0, 1.0);
        assert_eq!(transform.translation.x, -0.0390625);
        assert_eq!(transform.translation.y, 0.0);
        assert_eq!(transform.translation.z, 0.0);
    }

    #[test]
    fn rotation_delta_uses_quarter_degree_steps() {
        let mut transform = Transform::default();
        apply_drag(&mut transform, GizmoMode::Rotation, GizmoAxis::Y, 4.0, 1.0);
        assert!((transform.yaw + 1.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn distance_factor_is_floored() {
        let eye = Vec3::new(0.0, 0.0, 0.001);
        let floored = drag_distance_factor(Vec3::ZERO, eye);
        assert_eq!(floored, CAMERA_DISTANCE_THRESHOLD.powf(DISTANCE_FACTOR_EXPONENT));
        assert_eq!(drag_distance_factor(Vec3::ZERO, Vec3::ZERO), floored);
        assert_eq!(drag_distance_factor(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)), 1.0);
    }

    #[test]
    fn size_scalar_grows_with_distance() {
        let near = size_scalar(Vec3::new(0.0, 0.0, -2.0), Vec3::ZERO);
        let far = size_scalar(Vec3::new(0.0, 0.0, -20.0), Vec3::ZERO);
        assert!(far > near);
        assert!((size_scalar(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ring_hover_uses_plane_annulus() {
        let eye = Vec3::new(0.0, 10.0, 0.0);
        let ray = Ray::new(eye, Vec3::new(1.0, -10.0, 0.0));
        assert_eq!(hit_test(GizmoMode::Rotation, &ray, Vec3::ZERO, 1.0), Some(GizmoAxis::Y));

        // Straight down through the center misses every ring.
        let center = Ray::new(eye, Vec3::NEG_Y);
        assert_eq!(hit_test(GizmoMode::Rotation, &center, Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn shaft_hit_test_prefers_x_then_y_then_z() {
        let eye = Vec3::new(0.0, 0.0, -1.0);
        let toward_x = Ray::new(eye, Vec3::new(0.1, 0.0, 1.0));
        assert_eq!(
            hit_test(GizmoMode::Translation, &toward_x, Vec3::ZERO, 0.2),
            Some(GizmoAxis::X)
        );
        let toward_y = Ray::new(eye, Vec3::new(0.0, 0.1, 1.0));
        assert_eq!(
            hit_test(GizmoMode::Scaling, &toward_y, Vec3::ZERO, 0.2),
            Some(GizmoAxis::Y)
        );
        // Straight down the Z shaft also grazes the base of the X shaft.
        assert_eq!(
            hit_test(GizmoMode::Translation, &Ray::new(eye, Vec3::Z), Vec3::ZERO, 0.2),
            Some(GizmoAxis::X)
        );
    }

    #[test]
    fn hover_then_drag_moves_target_by_exact_delta() {
        let mut gizmo = Gizmo::new();
        let mut target = target_at_origin();
        let eye = Vec3::new(0.0, 0.0, -1.0);
        let ray = Some(Ray::new(eye, Vec3::new(0.1, 0.0, 1.0)));
        let start = Vec2::new(100.0, 100.0);

        assert!(!gizmo.update(&input(ray, eye, start, start, false), &mut target));
        assert_eq!(gizmo.state(), GizmoState::Hovered { axis: GizmoAxis::X });

        gizmo.update(&input(ray, eye, start, start, true), &mut target);
        assert!(gizmo.is_dragging());
        assert!(gizmo.is_engaged());

        let moved = Vec2::new(100.0, 105.0);
        assert!(gizmo.update(&input(ray, eye, moved, start, true), &mut target));
        assert_eq!(target.transform.translation.x, -0.0390625);

        gizmo.update(&input(None, eye, moved, moved, false), &mut target);
        assert_eq!(gizmo.state(), GizmoState::Idle);
    }

    #[test]
    fn drag_factor_uses_pivot_captured_at_start() {
        let mut gizmo = Gizmo::new();
        let mut target = target_at_origin();
        let eye = Vec3::new(0.0, 0.0, -1.0);
        gizmo.begin_drag(GizmoAxis::X, Vec2::ZERO, Vec3::ZERO);
        target.transform.translation = Vec3::new(0.0, 0.0, 50.0);
        target.update_world_matrix();

        let frame = input(None, eye, Vec2::new(0.0, 5.0), Vec2::ZERO, true);
        gizmo.update(&frame, &mut target);
        assert_eq!(target.transform.translation.x, -0.0390625);
    }

    #[test]
    fn scaling_drag_respects_minimum() {
        let mut gizmo = Gizmo::new();
        gizmo.set_mode(GizmoMode::Scaling);
        let mut target = target_at_origin();
        gizmo.begin_drag(GizmoAxis::Z, Vec2::ZERO, Vec3::ZERO);
        let frame = input(None, Vec3::new(0.0, 0.0, -1.0), Vec2::new(0.0, 100_000.0), Vec2::ZERO, true);
        gizmo.update(&frame, &mut target);
        assert_eq!(target.transform.scaling.z, crate::scene::transform::SCALING_MIN);
    }

    #[test]
    fn handles_follow_pivot_and_scalar() {
        let mut gizmo = Gizmo::new();
        let mut target = target_at_origin();
        target.transform.translation = Vec3::new(1.0, 2.0, 3.0);
        target.bounding_sphere.center_offset = Vec3::new(0.0, 1.0, 0.0);
        target.update_world_matrix();
        let eye = Vec3::new(1.0, 13.0, 3.0);
        gizmo.update(&input(None, eye, Vec2::ZERO, Vec2::ZERO, false), &mut target);
        assert!((gizmo.scalar() - 1.0).abs() < 1e-5);
        assert_eq!(gizmo.all_handles().len(), 9);
        for handle in gizmo.all_handles() {
            let origin = handle.transform.world_matrix().transform_point3(Vec3::ZERO);
            assert!((origin - Vec3::new(1.0, 3.0, 3.0)).length() < 1e-5);
            let tip = handle.transform.world_matrix().transform_point3(Vec3::Y);
            assert!((tip - origin - handle.axis.unit()).length() < 1e-4);
        }
    }

    #[test]
    fn highlight_follows_active_axis() {
        let mut gizmo = Gizmo::new();
        assert_eq!(gizmo.color_factor(GizmoAxis::X), NORMAL_COLOR_FACTOR);
        gizmo.begin_drag(GizmoAxis::X, Vec2::ZERO, Vec3::ZERO);
        assert_eq!(gizmo.color_factor(GizmoAxis::X), HIGHLIGHT_COLOR_FACTOR);
        assert_eq!(gizmo.color_factor(GizmoAxis::Y), NORMAL_COLOR_FACTOR);
        gizmo.reset();
        assert_eq!(gizmo.active_axis(), None);
    }

    #[test]
    fn handle_meshes_have_valid_indices() {
        let gizmo = Gizmo::new();
        for handle in gizmo.all_handles() {
            let count = handle.mesh.vertices.len() as u32;
            assert!(!handle.mesh.triangles.is_empty());
            assert!(handle.mesh.triangles.iter().flatten().all(|&i| i < count));
        }
    }
}
