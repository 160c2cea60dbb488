pub mod camera;
pub mod gizmo;
pub mod pick;

pub use camera::{Camera, CameraKind, CameraMove, EDITOR_CAMERA_NAME};
pub use gizmo::{Gizmo, GizmoAxis, GizmoInput, GizmoMode, GizmoState};
pub use pick::{PickCandidate, PickHit};

use crate::scene::material::MaterialData;
use crate::scene::object::{LineVertex, Mesh};
use bitflags::bitflags;
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FOV_DEGREES: f32 = 50.0;
pub const DEFAULT_NEAR_Z: f32 = 0.1;
pub const DEFAULT_FAR_Z: f32 = 1000.0;

bitflags! {
    /// Editor-wide display switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RenderFlags: u32 {
        const DRAW_WIRE_FRAME = 1 << 0;
        const DRAW_NORMALS = 1 << 1;
        const USE_3D_GIZMOS = 1 << 2;
        const DRAW_PICKING_DATA = 1 << 3;
        const DRAW_BOUNDING_SPHERE = 1 << 4;
        const USE_LIGHTING = 1 << 5;
        const USE_PHYSICALLY_BASED_RENDERING = 1 << 6;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexShader {
    Base,
    Line,
    Gizmo,
    Base2D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelShader {
    Base,
    VertexColor,
    Line,
    Gizmo,
    Base2D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryShader {
    Normal,
}

/// Triangle hull shaders, one per partitioning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HullShader {
    TriFractionalOdd,
    TriFractionalEven,
    TriInteger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainShader {
    Tri,
}

/// Every shader the editor can ask the backend to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseShader {
    Vertex(VertexShader),
    Hull(HullShader),
    Domain(DomainShader),
    Geometry(GeometryShader),
    Pixel(PixelShader),
}

/// Opaque handle to GPU geometry owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshBufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Solid,
    WireFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    Back,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    pub fill: FillMode,
    pub cull: CullMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformConstants {
    pub world: Mat4,
    pub view_projection: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingConstants {
    pub use_lighting: bool,
    pub use_texture: bool,
    pub use_physically_based_rendering: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    /// Three control points per patch, fed to the hull shader.
    TrianglePatchList,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationConstants {
    pub edge_factor: f32,
    pub inside_factor: f32,
    pub use_displacement: bool,
    pub displacement_factor: f32,
}

pub const AMBIENT_INTENSITY_MIN: f32 = 0.0;
pub const AMBIENT_INTENSITY_MAX: f32 = 1.0;
pub const EXPOSURE_MIN: f32 = 0.1;
pub const EXPOSURE_MAX: f32 = 10.0;

/// Scene lighting: one directional light plus a flat ambient term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    /// Unit vector pointing towards the light.
    directional_direction: Vec3,
    /// HDR color; components may exceed one.
    directional_color: Vec3,
    ambient_color: Vec3,
    ambient_intensity: f32,
    exposure: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            directional_direction: Vec3::Y,
            directional_color: Vec3::ONE,
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.5,
            exposure: 1.0,
        }
    }
}

impl Lighting {
    pub fn directional_direction(&self) -> Vec3 {
        self.directional_direction
    }

    /// Normalizes `direction`. A zero vector leaves the light unchanged and
    /// returns false.
    pub fn set_directional_direction(&mut self, direction: Vec3) -> bool {
        match direction.try_normalize() {
            Some(unit) => {
                self.directional_direction = unit;
                true
            }
            None => false,
        }
    }

    pub fn directional_color(&self) -> Vec3 {
        self.directional_color
    }

    pub fn set_directional_color(&mut self, color: Vec3) {
        self.directional_color = color.max(Vec3::ZERO);
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.ambient_color
    }

    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_intensity
    }

    pub fn set_ambient(&mut self, color: Vec3, intensity: f32) {
        self.ambient_color = color.clamp(Vec3::ZERO, Vec3::ONE);
        self.ambient_intensity = intensity.clamp(AMBIENT_INTENSITY_MIN, AMBIENT_INTENSITY_MAX);
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.exposure = exposure.clamp(EXPOSURE_MIN, EXPOSURE_MAX);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightConstants {
    pub lighting: Lighting,
    pub eye_position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub fov_y: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub width: f32,
    pub height: f32,
}

impl Projection {
    pub fn new(fov_degrees: f32, near_z: f32, far_z: f32, width: f32, height: f32) -> Self {
        Self {
            fov_y: fov_degrees.to_radians(),
            near_z,
            far_z,
            width,
            height,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn perspective(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect(), self.near_z, self.far_z)
    }

    /// Pixel-space orthographic projection with the origin at the center.
    pub fn orthographic(&self) -> Mat4 {
        let hw = self.width.max(1.0) * 0.5;
        let hh = self.height.max(1.0) * 0.5;
        Mat4::orthographic_lh(-hw, hw, -hh, hh, 0.0, 1.0)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(DEFAULT_FOV_DEGREES, DEFAULT_NEAR_Z, DEFAULT_FAR_Z, 1280.0, 720.0)
    }
}

/// Graphics device collaborator. The editor issues commands in draw order
/// and never touches GPU resources directly.
pub trait RenderBackend {
    /// Starts a frame by clearing the render target.
    fn clear(&mut self, color: Vec4);
    /// Creates geometry when `existing` is `None`, otherwise replaces it.
    fn upload_mesh(&mut self, existing: Option<MeshBufferHandle>, mesh: &Mesh) -> MeshBufferHandle;
    fn upload_lines(
        &mut self,
        existing: Option<MeshBufferHandle>,
        vertices: &[LineVertex],
    ) -> MeshBufferHandle;
    fn upload_transform(&mut self, constants: &TransformConstants);
    fn upload_shading(&mut self, constants: &ShadingConstants);
    fn upload_material(&mut self, material: &MaterialData);
    fn upload_gizmo_color(&mut self, color_factor: Vec4);
    fn upload_lighting(&mut self, constants: &LightConstants);
    fn upload_tessellation(&mut self, constants: &TessellationConstants);
    fn bind_shader(&mut self, shader: BaseShader);
    fn unbind_geometry_shader(&mut self);
    /// Unbinds both the hull and the domain stage.
    fn unbind_tessellation_shaders(&mut self);
    fn set_topology(&mut self, topology: PrimitiveTopology);
    fn set_raster_state(&mut self, state: RasterState);
    fn draw_indexed(&mut self, buffer: MeshBufferHandle, index_count: u32);
    fn draw_lines(&mut self, buffer: MeshBufferHandle, vertex_count: u32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Clear(Vec4),
    UploadMesh { handle: MeshBufferHandle, index_count: u32 },
    UploadLines { handle: MeshBufferHandle, vertex_count: u32 },
    UploadTransform(TransformConstants),
    UploadShading(ShadingConstants),
    UploadMaterial(String),
    UploadGizmoColor(Vec4),
    UploadLighting(LightConstants),
    UploadTessellation(TessellationConstants),
    BindShader(BaseShader),
    UnbindGeometryShader,
    UnbindTessellationShaders,
    SetTopology(PrimitiveTopology),
    SetRasterState(RasterState),
    DrawIndexed { buffer: MeshBufferHandle, index_count: u32 },
    DrawLines { buffer: MeshBufferHandle, vertex_count: u32 },
}

/// Backend that records every command instead of talking to a device.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
    next_handle: u32,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    RenderCommand::DrawIndexed { .. } | RenderCommand::DrawLines { .. }
                )
            })
            .count()
    }

    /// Drops this frame's commands; issued handles stay valid.
    pub fn finish_frame(&mut self) -> usize {
        let count = self.commands.len();
        log::trace!("frame recorded {} commands ({} draws)", count, self.draw_count());
        self.commands.clear();
        count
    }

    fn issue_handle(&mut self, existing: Option<MeshBufferHandle>) -> MeshBufferHandle {
        existing.unwrap_or_else(|| {
            let handle = MeshBufferHandle(self.next_handle);
            self.next_handle += 1;
            handle
        })
    }
}

impl RenderBackend for CommandRecorder {
    fn clear(&mut self, color: Vec4) {
        self.commands.push(RenderCommand::Clear(color));
    }

    fn upload_mesh(&mut self, existing: Option<MeshBufferHandle>, mesh: &Mesh) -> MeshBufferHandle {
        let handle = self.issue_handle(existing);
        self.commands.push(RenderCommand::UploadMesh {
            handle,
            index_count: mesh.index_count(),
        });
        handle
    }

    fn upload_lines(
        &mut self,
        existing: Option<MeshBufferHandle>,
        vertices: &[LineVertex],
    ) -> MeshBufferHandle {
        let handle = self.issue_handle(existing);
        self.commands.push(RenderCommand::UploadLines {
            handle,
            vertex_count: vertices.len() as u32,
        });
        handle
    }

    fn upload_transform(&mut self, constants: &TransformConstants) {
        self.commands.push(RenderCommand::UploadTransform(*constants));
    }

    fn upload_shading(&mut self, constants: &ShadingConstants) {
        self.commands.push(RenderCommand::UploadShading(*constants));
    }

    fn upload_material(&mut self, material: &MaterialData) {
        self.commands
            .push(RenderCommand::UploadMaterial(material.name.clone()));
    }

    fn upload_gizmo_color(&mut self, color_factor: Vec4) {
        self.commands.push(RenderCommand::UploadGizmoColor(color_factor));
    }

    fn upload_lighting(&mut self, constants: &LightConstants) {
        self.commands.push(RenderCommand::UploadLighting(*constants));
    }

    fn upload_tessellation(&mut self, constants: &TessellationConstants) {
        self.commands.push(RenderCommand::UploadTessellation(*constants));
    }

    fn bind_shader(&mut self, shader: BaseShader) {
        self.commands.push(RenderCommand::BindShader(shader));
    }

    fn unbind_geometry_shader(&mut self) {
        self.commands.push(RenderCommand::UnbindGeometryShader);
    }

    fn unbind_tessellation_shaders(&mut self) {
        self.commands.push(RenderCommand::UnbindTessellationShaders);
    }

    fn set_topology(&mut self, topology: PrimitiveTopology) {
        self.commands.push(RenderCommand::SetTopology(topology));
    }

    fn set_raster_state(&mut self, state: RasterState) {
        self.commands.push(RenderCommand::SetRasterState(state));
    }

    fn draw_indexed(&mut self, buffer: MeshBufferHandle, index_count: u32) {
        self.commands
            .push(RenderCommand::DrawIndexed { buffer, index_count });
    }

    fn draw_lines(&mut self, buffer: MeshBufferHandle, vertex_count: u32) {
        self.commands
            .push(RenderCommand::DrawLines { buffer, vertex_count });
    }
}
