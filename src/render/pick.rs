//! CPU ray picking
//!
//! A cursor position is turned into a world-space ray through the inverse
//! view matrix and the projection's field-of-view terms. Objects are then
//! culled by their bounding spheres (broad phase), and the survivors are
//! tested triangle by triangle in world space (narrow phase). The object
//! owning the globally smallest triangle hit wins.
//!
//! ## Ties
//!
//! The running minimum only moves on a strictly smaller `t`, so on an exact
//! tie the candidate that was enumerated first keeps the pick. Enumeration
//! follows pool order.

use crate::math::{ray_sphere, ray_triangle, triangle_normal, Ray};
use crate::scene::object::Object3D;
use crate::scene::pool::NamedPool;
use glam::{Mat4, Vec2, Vec3};

/// Distance the displayed triangle is lifted off the surface it was
/// picked from, so it does not z-fight with the object.
pub const PICKED_TRIANGLE_LIFT: f32 = 0.01;

// ========================================================================
// Ray construction
// ========================================================================

/// Cursor in window pixels to a world-space ray.
///
/// `projection` must be a perspective matrix; only its `[0][0]` and
/// `[1][1]` terms are used. Returns `None` for an empty viewport.
pub fn picking_ray(
    cursor: Vec2,
    viewport: Vec2,
    projection: &Mat4,
    inverse_view: &Mat4,
) -> Option<Ray> {
    if !(viewport.x > 0.0) || !(viewport.y > 0.0) {
        return None;
    }
    let p00 = projection.x_axis.x;
    let p11 = projection.y_axis.y;
    if p00.abs() <= f32::EPSILON || p11.abs() <= f32::EPSILON {
        return None;
    }
    let view_x = (cursor.x / (viewport.x * 0.5) - 1.0) / p00;
    let view_y = -(cursor.y / (viewport.y * 0.5) - 1.0) / p11;
    let view_direction = Vec3::new(view_x, view_y, 1.0);

    let origin = inverse_view.transform_point3(Vec3::ZERO);
    let direction = inverse_view
        .transform_vector3(view_direction)
        .normalize_or_zero();
    let ray = Ray::new(origin, direction);
    (!ray.is_degenerate()).then_some(ray)
}

// ========================================================================
// Broad and narrow phase
// ========================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickCandidate {
    /// Position of the candidate in the object pool this frame.
    pub index: usize,
    /// Near bounding-sphere hit.
    pub t: f32,
    /// Set by the narrow phase when no triangle was hit.
    pub failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub index: usize,
    pub t: f32,
    /// World-space triangle that produced the hit.
    pub triangle: [Vec3; 3],
}

impl PickHit {
    pub fn point(&self, ray: &Ray) -> Vec3 {
        ray.at(self.t)
    }

    /// The hit triangle pushed slightly along its normal, for display.
    pub fn lifted_triangle(&self) -> [Vec3; 3] {
        let [v0, v1, v2] = self.triangle;
        let offset = triangle_normal(v0, v1, v2) * PICKED_TRIANGLE_LIFT;
        [v0 + offset, v1 + offset, v2 + offset]
    }
}

/// Bounding-sphere test over every pickable object, in pool order.
pub fn broad_phase(ray: &Ray, objects: &NamedPool<Object3D>) -> Vec<PickCandidate> {
    objects
        .iter()
        .enumerate()
        .filter(|(_, object)| object.pickable)
        .filter_map(|(index, object)| {
            ray_sphere(ray, object.pivot(), object.bounding_sphere.radius).map(|t| PickCandidate {
                index,
                t,
                failed: false,
            })
        })
        .collect()
}

/// Exact triangle test over the broad-phase survivors.
pub fn narrow_phase(
    ray: &Ray,
    objects: &NamedPool<Object3D>,
    candidates: &mut [PickCandidate],
) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for candidate in candidates.iter_mut() {
        let Some(object) = objects.get_index(candidate.index) else {
            candidate.failed = true;
            continue;
        };
        let world = object.world_matrix();
        let mut any_hit = false;
        for mesh in &object.meshes {
            for triangle in &mesh.triangles {
                let Some(local) = mesh.triangle_positions(triangle) else {
                    continue;
                };
                let [v0, v1, v2] = local.map(|v| world.transform_point3(v));
                let Some(t) = ray_triangle(ray, v0, v1, v2) else {
                    continue;
                };
                any_hit = true;
                if best.map_or(true, |hit| t < hit.t) {
                    best = Some(PickHit {
                        index: candidate.index,
                        t,
                        triangle: [v0, v1, v2],
                    });
                }
            }
        }
        candidate.failed = !any_hit;
    }
    best
}

/// Both phases in sequence.
pub fn pick(ray: &Ray, objects: &NamedPool<Object3D>) -> Option<PickHit> {
    let mut candidates = broad_phase(ray, objects);
    if candidates.is_empty() {
        return None;
    }
    let hit = narrow_phase(ray, objects, &mut candidates);
    log::debug!(
        "pick: {} candidates, {} failed, hit {:?}",
        candidates.len(),
        candidates.iter().filter(|c| c.failed).count(),
        hit.map(|h| h.index)
    );
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Camera, Projection};
    use crate::scene::object::{Mesh, Vertex};
    use glam::Vec4;

    /// Large triangle facing -Z, placed at depth `z`.
    fn wall(name: &str, z: f32) -> Object3D {
        let color = Vec4::ONE;
        let mesh = Mesh {
            vertices: vec![
                Vertex::new(Vec3::new(-1.0, -1.0, 0.0), color, Vec2::ZERO),
                Vertex::new(Vec3::new(0.0, 1.0, 0.0), color, Vec2::ZERO),
                Vertex::new(Vec3::new(1.0, -1.0, 0.0), color, Vec2::ZERO),
            ],
            triangles: vec![[0, 1, 2]],
            material_index: 0,
        };
        let mut object = Object3D::new(name);
        object.create(vec![mesh], Vec::new());
        object.bounding_sphere.radius_bias = 1.5;
        object.transform.translation = Vec3::new(0.0, 0.0, z);
        object.update_world_matrix();
        object
    }

    fn pool_of(objects: Vec<Object3D>) -> NamedPool<Object3D> {
        let mut pool = NamedPool::new("Object3D");
        for object in objects {
            pool.insert(object).unwrap();
        }
        pool
    }

    fn forward_ray() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z)
    }

    #[test]
    fn nearer_triangle_wins_in_either_order() {
        let near_first = pool_of(vec![wall("near", 2.0), wall("far", 5.0)]);
        let far_first = pool_of(vec![wall("far", 5.0), wall("near", 2.0)]);
        for pool in [near_first, far_first] {
            let hit = pick(&forward_ray(), &pool).unwrap();
            assert_eq!(pool.get_index(hit.index).unwrap().name, "near");
            assert!((hit.t - 12.0).abs() < 1e-4);
        }
    }

    #[test]
    fn exact_tie_keeps_first_enumerated() {
        let pool = pool_of(vec![wall("first", 3.0), wall("second", 3.0)]);
        let hit = pick(&forward_ray(), &pool).unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn unpickable_objects_are_skipped() {
        let mut near = wall("near", 2.0);
        near.pickable = false;
        let pool = pool_of(vec![near, wall("far", 5.0)]);
        let hit = pick(&forward_ray(), &pool).unwrap();
        assert_eq!(pool.get_index(hit.index).unwrap().name, "far");
    }

    #[test]
    fn sphere_hit_without_triangle_hit_fails_candidate() {
        let pool = pool_of(vec![wall("wall", 0.0)]);
        // Passes inside the bounding sphere but outside the triangle.
        let ray = Ray::new(Vec3::new(0.9, 0.9, -10.0), Vec3::Z);
        let mut candidates = broad_phase(&ray, &pool);
        assert_eq!(candidates.len(), 1);
        assert!(narrow_phase(&ray, &pool, &mut candidates).is_none());
        assert!(candidates[0].failed);
    }

    #[test]
    fn scaled_object_is_hit_through_world_matrix() {
        let mut object = wall("wide", 0.0);
        object.transform.scaling = Vec3::splat(4.0);
        object.update_world_matrix();
        let pool = pool_of(vec![object]);
        let ray = Ray::new(Vec3::new(3.0, -3.0, -10.0), Vec3::Z);
        assert!(pick(&ray, &pool).is_some());
    }

    #[test]
    fn center_of_screen_ray_follows_camera_forward() {
        let camera = Camera::editor();
        let projection = Projection::default();
        let ray = picking_ray(
            Vec2::new(projection.width * 0.5, projection.height * 0.5),
            Vec2::new(projection.width, projection.height),
            &projection.perspective(),
            &camera.inverse_view_matrix(),
        )
        .unwrap();
        assert!((ray.origin - camera.position).length() < 1e-4);
        assert!((ray.direction - camera.forward()).length() < 1e-4);
    }

    #[test]
    fn top_left_cursor_points_up_and_left() {
        let camera = Camera::editor();
        let projection = Projection::default();
        let ray = picking_ray(
            Vec2::ZERO,
            Vec2::new(projection.width, projection.height),
            &projection.perspective(),
            &camera.inverse_view_matrix(),
        )
        .unwrap();
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z > 0.0);
    }

    #[test]
    fn empty_viewport_has_no_ray() {
        let camera = Camera::editor();
        let projection = Projection::default();
        assert!(picking_ray(
            Vec2::ZERO,
            Vec2::ZERO,
            &projection.perspective(),
            &camera.inverse_view_matrix()
        )
        .is_none());
    }

    #[test]
    fn lifted_triangle_moves_along_normal() {
        let hit = PickHit {
            index: 0,
            t: 1.0,
            triangle: [Vec3::ZERO, Vec3::X, Vec3::Y],
        };
        let lifted = hit.lifted_triangle();
        assert!((lifted[0] - Vec3::new(0.0, 0.0, PICKED_TRIANGLE_LIFT)).length() < 1e-6);
    }
}
