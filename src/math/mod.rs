//! Ray intersection routines shared by picking and gizmo hit-testing.
//!
//! Every function accepts a ray whose direction need not be normalized but
//! must be non-zero. A miss, or any degenerate input, yields `None`; the
//! returned parameter is always finite and is measured in units of the ray
//! direction's length.

use glam::Vec3;

const DIRECTION_EPSILON: f32 = 1e-12;
const PARALLEL_EPSILON: f32 = 1e-6;
const TRIANGLE_EPSILON: f32 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_degenerate(&self) -> bool {
        !self.origin.is_finite()
            || !self.direction.is_finite()
            || self.direction.length_squared() <= DIRECTION_EPSILON
    }
}

fn finite(t: f32) -> Option<f32> {
    t.is_finite().then_some(t)
}

/// Near intersection with a sphere.
///
/// The near root is returned even when it is negative (origin inside the
/// sphere). A sphere lying entirely behind the origin is a miss. A tangent
/// ray counts as a hit.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    if ray.is_degenerate() || !(radius > 0.0) || !center.is_finite() {
        return None;
    }
    let a = ray.direction.length_squared();
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let far = (-b + root) / a;
    if far < 0.0 {
        return None;
    }
    finite((-b - root) / a)
}

/// Intersection with an infinite plane through `point` with `normal`.
/// Only hits in front of the origin (`t >= 0`) are reported.
pub fn ray_plane(ray: &Ray, point: Vec3, normal: Vec3) -> Option<f32> {
    if ray.is_degenerate() || normal.length_squared() <= DIRECTION_EPSILON {
        return None;
    }
    let denom = normal.dot(ray.direction);
    if denom.abs() <= PARALLEL_EPSILON * normal.length() * ray.direction.length() {
        return None;
    }
    let t = (point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    finite(t)
}

/// Möller–Trumbore, two-sided. Hits at or behind the origin are rejected.
pub fn ray_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    if ray.is_degenerate() {
        return None;
    }
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if !det.is_finite() || det.abs() < TRIANGLE_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    if t <= TRIANGLE_EPSILON {
        return None;
    }
    finite(t)
}

/// Capped cylinder in its own local space: axis along +Y from `y = 0` to
/// `y = length`, centered on the Y axis. The ray must already be expressed
/// in that space. Returns the nearest non-negative hit on the side or caps.
pub fn ray_cylinder(ray: &Ray, length: f32, radius: f32) -> Option<f32> {
    if ray.is_degenerate() || !(length > 0.0) || !(radius > 0.0) {
        return None;
    }
    let o = ray.origin;
    let d = ray.direction;
    let radius_sq = radius * radius;
    let mut nearest: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && t.is_finite() && nearest.map_or(true, |best| t < best) {
            nearest = Some(t);
        }
    };

    let a = d.x * d.x + d.z * d.z;
    if a > DIRECTION_EPSILON {
        let b = o.x * d.x + o.z * d.z;
        let c = o.x * o.x + o.z * o.z - radius_sq;
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let root = discriminant.sqrt();
            for t in [(-b - root) / a, (-b + root) / a] {
                let y = o.y + d.y * t;
                if (0.0..=length).contains(&y) {
                    consider(t);
                }
            }
        }
    }

    if d.y.abs() > PARALLEL_EPSILON {
        for cap_y in [0.0, length] {
            let t = (cap_y - o.y) / d.y;
            let x = o.x + d.x * t;
            let z = o.z + d.z * t;
            if x * x + z * z <= radius_sq {
                consider(t);
            }
        }
    }

    nearest
}

/// Unit normal of `v0, v1, v2`, or zero for a degenerate triangle.
pub fn triangle_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}
