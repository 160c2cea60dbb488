//! Scene entities
//!
//! `Object3D` owns meshes, materials and the per-object render switches.
//! The serializable part is plain data; GPU buffer handles are runtime-only
//! and are rebuilt on the next draw after a load.

use crate::render::{
    HullShader, MeshBufferHandle, PixelShader, RenderBackend, TessellationConstants, VertexShader,
};
use crate::scene::material::MaterialData;
use crate::scene::pool::Named;
use crate::scene::transform::{BoundingSphere, Transform};
use glam::{Mat4, Vec2, Vec3, Vec4};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-object render switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ObjectFlags: u32 {
        const NO_CULLING = 1 << 0;
        const NO_LIGHTING = 1 << 1;
        const NO_TEXTURE = 1 << 2;
        const USE_RAW_VERTEX_COLOR = 1 << 3;
    }
}

impl Default for ObjectFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub color: Vec4,
    pub uv: Vec2,
    pub normal: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec4, uv: Vec2) -> Self {
        Self {
            position,
            color,
            uv,
            normal: Vec3::ZERO,
        }
    }
}

/// Three indices into a mesh's vertex list.
pub type Triangle = [u32; 3];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    /// Index into the owning object's material list.
    #[serde(default)]
    pub material_index: usize,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        (self.triangles.len() * 3) as u32
    }

    /// Positions of one triangle, or `None` if an index is out of range.
    pub fn triangle_positions(&self, triangle: &Triangle) -> Option<[Vec3; 3]> {
        let fetch = |i: u32| self.vertices.get(i as usize).map(|v| v.position);
        Some([fetch(triangle[0])?, fetch(triangle[1])?, fetch(triangle[2])?])
    }

    /// Replaces every vertex normal with the area-weighted average of its
    /// adjacent face normals.
    pub fn calculate_normals(&mut self) {
        for vertex in &mut self.vertices {
            vertex.normal = Vec3::ZERO;
        }
        for triangle in &self.triangles {
            let Some([v0, v1, v2]) = self.triangle_positions(triangle) else {
                continue;
            };
            let face = (v1 - v0).cross(v2 - v0);
            for &i in triangle {
                self.vertices[i as usize].normal += face;
            }
        }
        for vertex in &mut self.vertices {
            vertex.normal = vertex.normal.normalize_or_zero();
        }
    }
}

/// Vertex and pixel stage chosen for an object. Both are always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderSet {
    pub vertex: VertexShader,
    pub pixel: PixelShader,
}

impl Default for ShaderSet {
    fn default() -> Self {
        Self {
            vertex: VertexShader::Base,
            pixel: PixelShader::Base,
        }
    }
}

pub const TESS_FACTOR_MIN: f32 = 0.0;
pub const TESS_FACTOR_MAX: f32 = 64.0;
pub const DISPLACEMENT_FACTOR_MIN: f32 = 0.0;
pub const DISPLACEMENT_FACTOR_MAX: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TessellationType {
    #[default]
    FractionalOdd,
    FractionalEven,
    Integer,
}

impl TessellationType {
    pub fn hull_shader(self) -> HullShader {
        match self {
            Self::FractionalOdd => HullShader::TriFractionalOdd,
            Self::FractionalEven => HullShader::TriFractionalEven,
            Self::Integer => HullShader::TriInteger,
        }
    }
}

/// Hardware tessellation settings. Off by default; when on, the object's
/// triangles are drawn as three-point patches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tessellation {
    pub enabled: bool,
    pub kind: TessellationType,
    edge_factor: f32,
    inside_factor: f32,
    pub use_displacement: bool,
    displacement_factor: f32,
}

impl Default for Tessellation {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: TessellationType::default(),
            edge_factor: 2.0,
            inside_factor: 2.0,
            use_displacement: true,
            displacement_factor: 1.0,
        }
    }
}

impl Tessellation {
    pub fn edge_factor(&self) -> f32 {
        self.edge_factor
    }

    pub fn inside_factor(&self) -> f32 {
        self.inside_factor
    }

    pub fn set_factors(&mut self, edge: f32, inside: f32) {
        self.edge_factor = edge.clamp(TESS_FACTOR_MIN, TESS_FACTOR_MAX);
        self.inside_factor = inside.clamp(TESS_FACTOR_MIN, TESS_FACTOR_MAX);
    }

    pub fn displacement_factor(&self) -> f32 {
        self.displacement_factor
    }

    pub fn set_displacement_factor(&mut self, factor: f32) {
        self.displacement_factor = factor.clamp(DISPLACEMENT_FACTOR_MIN, DISPLACEMENT_FACTOR_MAX);
    }

    pub fn constants(&self) -> TessellationConstants {
        TessellationConstants {
            edge_factor: self.edge_factor,
            inside_factor: self.inside_factor,
            use_displacement: self.use_displacement,
            displacement_factor: self.displacement_factor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub bounding_sphere: BoundingSphere,
    pub pickable: bool,
    pub visible: bool,
    pub transparent: bool,
    #[serde(default)]
    pub flags: ObjectFlags,
    #[serde(default)]
    pub shaders: ShaderSet,
    #[serde(default)]
    pub tessellation: Tessellation,
    pub meshes: Vec<Mesh>,
    #[serde(default)]
    pub materials: Vec<MaterialData>,
    #[serde(skip)]
    buffers: Vec<MeshBufferHandle>,
    #[serde(skip)]
    buffers_dirty: bool,
}

impl Object3D {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            bounding_sphere: BoundingSphere::default(),
            pickable: true,
            visible: true,
            transparent: false,
            flags: ObjectFlags::empty(),
            shaders: ShaderSet::default(),
            tessellation: Tessellation::default(),
            meshes: Vec::new(),
            materials: Vec::new(),
            buffers: Vec::new(),
            buffers_dirty: true,
        }
    }

    /// Installs geometry and its materials. Missing materials are filled with
    /// defaults so every mesh resolves to one.
    pub fn create(&mut self, meshes: Vec<Mesh>, materials: Vec<MaterialData>) {
        self.meshes = meshes;
        self.materials = materials;
        self.pad_materials();
        self.buffers_dirty = true;
    }

    /// Translation plus bounding-sphere center offset.
    pub fn pivot(&self) -> Vec3 {
        self.transform.translation + self.bounding_sphere.center_offset
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform.world_matrix()
    }

    pub fn update_world_matrix(&mut self) {
        self.transform.update_world_matrix(&mut self.bounding_sphere);
    }

    /// Appends default materials until every mesh's index resolves.
    pub fn pad_materials(&mut self) {
        let needed = self
            .meshes
            .iter()
            .map(|mesh| mesh.material_index + 1)
            .max()
            .unwrap_or(1);
        while self.materials.len() < needed {
            self.materials.push(MaterialData::default());
        }
    }

    pub fn material_for(&self, mesh: &Mesh) -> Option<&MaterialData> {
        self.materials.get(mesh.material_index)
    }

    pub fn effective_pixel_shader(&self) -> PixelShader {
        if self.flags.contains(ObjectFlags::USE_RAW_VERTEX_COLOR) {
            PixelShader::VertexColor
        } else {
            self.shaders.pixel
        }
    }

    /// Issues one material upload and one indexed draw per mesh. Pipeline
    /// state is the caller's job.
    pub fn draw_meshes(&self, backend: &mut dyn RenderBackend) {
        for (mesh, &buffer) in self.meshes.iter().zip(&self.buffers) {
            let Some(material) = self.material_for(mesh) else {
                log::warn!("{}: mesh refers to missing material {}", self.name, mesh.material_index);
                continue;
            };
            backend.upload_material(material);
            backend.draw_indexed(buffer, mesh.index_count());
        }
    }

    pub fn uses_texture(&self) -> bool {
        !self.flags.contains(ObjectFlags::NO_TEXTURE) && self.materials.iter().any(|m| m.has_texture())
    }

    pub fn buffers(&self) -> &[MeshBufferHandle] {
        &self.buffers
    }

    pub(crate) fn needs_upload(&self) -> bool {
        self.buffers_dirty || self.buffers.len() != self.meshes.len()
    }

    pub(crate) fn set_buffers(&mut self, buffers: Vec<MeshBufferHandle>) {
        self.buffers = buffers;
        self.buffers_dirty = false;
    }

    pub fn mark_geometry_dirty(&mut self) {
        self.buffers_dirty = true;
    }
}

impl Named for Object3D {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: Vec4,
}

impl LineVertex {
    pub fn new(position: Vec3, color: Vec4) -> Self {
        Self { position, color }
    }
}

/// Line list: each consecutive pair of vertices is one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object3DLine {
    pub name: String,
    pub transform: Transform,
    pub vertices: Vec<LineVertex>,
    pub visible: bool,
    #[serde(skip)]
    pub(crate) buffer: Option<MeshBufferHandle>,
    #[serde(skip)]
    pub(crate) buffer_dirty: bool,
}

impl Object3DLine {
    pub fn new(name: impl Into<String>, vertices: Vec<LineVertex>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            vertices,
            visible: true,
            buffer: None,
            buffer_dirty: true,
        }
    }

    pub fn set_vertices(&mut self, vertices: Vec<LineVertex>) {
        self.vertices = vertices;
        self.buffer_dirty = true;
    }

    pub fn update_world_matrix(&mut self) {
        self.transform.update_world_matrix_unpivoted();
    }
}

impl Named for Object3DLine {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Screen-space object drawn with an orthographic projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object2D {
    pub name: String,
    pub translation: Vec2,
    pub rotation: f32,
    pub scaling: Vec2,
    pub visible: bool,
    pub mesh: Mesh,
    #[serde(skip)]
    world_matrix: Mat4,
    #[serde(skip)]
    pub(crate) buffer: Option<MeshBufferHandle>,
    #[serde(skip)]
    pub(crate) buffer_dirty: bool,
}

impl Object2D {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            translation: Vec2::ZERO,
            rotation: 0.0,
            scaling: Vec2::ONE,
            visible: true,
            mesh,
            world_matrix: Mat4::IDENTITY,
            buffer: None,
            buffer_dirty: true,
        }
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    pub fn update_world_matrix(&mut self) {
        self.scaling = self.scaling.max(Vec2::splat(crate::scene::transform::SCALING_MIN));
        self.world_matrix = Mat4::from_translation(self.translation.extend(0.0))
            * Mat4::from_rotation_z(self.rotation)
            * Mat4::from_scale(self.scaling.extend(1.0));
    }
}

impl Named for Object2D {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CommandRecorder;

    fn unit_triangle() -> Mesh {
        let color = Vec4::ONE;
        Mesh {
            vertices: vec![
                Vertex::new(Vec3::ZERO, color, Vec2::ZERO),
                Vertex::new(Vec3::X, color, Vec2::X),
                Vertex::new(Vec3::Y, color, Vec2::Y),
            ],
            triangles: vec![[0, 1, 2]],
            material_index: 0,
        }
    }

    #[test]
    fn create_fills_missing_materials() {
        let mut mesh = unit_triangle();
        mesh.material_index = 2;
        let mut object = Object3D::new("tri");
        object.create(vec![mesh], Vec::new());
        assert_eq!(object.materials.len(), 3);
        assert!(object.needs_upload());
    }

    #[test]
    fn meshes_without_a_material_are_skipped() {
        let mut object = Object3D::new("tri");
        object.meshes = vec![unit_triangle()];
        object.set_buffers(vec![MeshBufferHandle(7)]);
        let mut recorder = CommandRecorder::new();
        object.draw_meshes(&mut recorder);
        assert_eq!(recorder.draw_count(), 0);

        object.pad_materials();
        object.draw_meshes(&mut recorder);
        assert_eq!(recorder.draw_count(), 1);
    }

    #[test]
    fn tessellation_factors_are_clamped() {
        let mut tessellation = Tessellation::default();
        assert!(!tessellation.enabled);
        tessellation.set_factors(100.0, -1.0);
        tessellation.set_displacement_factor(2.0);
        let constants = tessellation.constants();
        assert_eq!(constants.edge_factor, TESS_FACTOR_MAX);
        assert_eq!(constants.inside_factor, TESS_FACTOR_MIN);
        assert_eq!(constants.displacement_factor, DISPLACEMENT_FACTOR_MAX);
        assert_eq!(
            TessellationType::Integer.hull_shader(),
            HullShader::TriInteger
        );
    }

    #[test]
    fn raw_vertex_color_overrides_pixel_shader() {
        let mut object = Object3D::new("tri");
        assert_eq!(object.effective_pixel_shader(), PixelShader::Base);
        object.flags.insert(ObjectFlags::USE_RAW_VERTEX_COLOR);
        assert_eq!(object.effective_pixel_shader(), PixelShader::VertexColor);
    }

    #[test]
    fn normals_point_out_of_the_triangle_plane() {
        let mut mesh = unit_triangle();
        mesh.calculate_normals();
        for vertex in &mesh.vertices {
            assert!((vertex.normal - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn out_of_range_triangle_is_skipped() {
        let mut mesh = unit_triangle();
        mesh.triangles.push([0, 1, 9]);
        assert!(mesh.triangle_positions(&mesh.triangles[1]).is_none());
        mesh.calculate_normals();
        assert!(mesh.vertices.iter().all(|v| v.normal.is_finite()));
    }
}
