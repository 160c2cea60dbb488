//! Small CPU-side meshes used for the startup scene and debug overlays.

use crate::scene::object::{Mesh, Vertex};
use glam::{Vec2, Vec3, Vec4};

/// Axis-aligned box centered on the origin with flat per-face normals.
pub fn cube(size: f32, color: Vec4) -> Mesh {
    let h = size * 0.5;
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::NEG_Z, Vec3::X, Vec3::Y),
        (Vec3::Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
    ];
    let mut mesh = Mesh::default();
    for (normal, right, up) in faces {
        let base = mesh.vertices.len() as u32;
        let center = normal * h;
        let corners = [
            (center - right * h - up * h, Vec2::new(0.0, 1.0)),
            (center - right * h + up * h, Vec2::new(0.0, 0.0)),
            (center + right * h + up * h, Vec2::new(1.0, 0.0)),
            (center + right * h - up * h, Vec2::new(1.0, 1.0)),
        ];
        for (position, uv) in corners {
            let mut vertex = Vertex::new(position, color, uv);
            vertex.normal = normal;
            mesh.vertices.push(vertex);
        }
        mesh.triangles.push([base, base + 1, base + 2]);
        mesh.triangles.push([base, base + 2, base + 3]);
    }
    mesh
}

/// Quad in the XZ plane facing +Y.
pub fn ground_quad(width: f32, depth: f32, color: Vec4) -> Mesh {
    let hx = width * 0.5;
    let hz = depth * 0.5;
    let p = [
        (Vec3::new(-hx, 0.0, -hz), Vec2::new(0.0, 1.0)),
        (Vec3::new(-hx, 0.0, hz), Vec2::new(0.0, 0.0)),
        (Vec3::new(hx, 0.0, hz), Vec2::new(1.0, 0.0)),
        (Vec3::new(hx, 0.0, -hz), Vec2::new(1.0, 1.0)),
    ];
    let vertices = p
        .iter()
        .map(|&(position, uv)| {
            let mut vertex = Vertex::new(position, color, uv);
            vertex.normal = Vec3::Y;
            vertex
        })
        .collect();
    Mesh {
        vertices,
        triangles: vec![[0, 1, 2], [0, 2, 3]],
        material_index: 0,
    }
}

/// Quad in the XY plane, for 2D objects.
pub fn screen_quad(width: f32, height: f32, color: Vec4) -> Mesh {
    let hx = width * 0.5;
    let hy = height * 0.5;
    let p = [
        (Vec3::new(-hx, -hy, 0.0), Vec2::new(0.0, 1.0)),
        (Vec3::new(-hx, hy, 0.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(hx, hy, 0.0), Vec2::new(1.0, 0.0)),
        (Vec3::new(hx, -hy, 0.0), Vec2::new(1.0, 1.0)),
    ];
    Mesh {
        vertices: p
            .iter()
            .map(|&(position, uv)| Vertex::new(position, color, uv))
            .collect(),
        triangles: vec![[0, 1, 2], [0, 2, 3]],
        material_index: 0,
    }
}

/// Latitude/longitude sphere of radius 1.
pub fn sphere(segments: u32, color: Vec4) -> Mesh {
    let segments = segments.max(4);
    let rings = segments / 2;
    let mut mesh = Mesh::default();
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * std::f32::consts::PI;
        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let phi = u * std::f32::consts::TAU;
            let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            let mut vertex = Vertex::new(normal, color, Vec2::new(u, v));
            vertex.normal = normal;
            mesh.vertices.push(vertex);
        }
    }
    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + stride;
            mesh.triangles.push([a, a + 1, b]);
            mesh.triangles.push([a + 1, b + 1, b]);
        }
    }
    mesh
}
