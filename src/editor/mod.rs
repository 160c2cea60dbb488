pub mod draw;
pub mod input;

pub use input::{GuiCapture, InputSnapshot, KeyboardState, MouseState};

use crate::config::EditorConfig;
use crate::math::Ray;
use crate::render::pick::{self, PickHit};
use crate::render::{
    Camera, CameraMove, Gizmo, GizmoInput, GizmoMode, Lighting, Projection, RenderFlags,
    EDITOR_CAMERA_NAME,
};
use crate::scene::material::MaterialData;
use crate::scene::object::{Object2D, Object3D, Object3DLine};
use crate::scene::pool::{self, NamedPool, PoolError};
use crate::scene::serialization::{self, SceneDocument};
use draw::OverlayBuffers;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// What the caller should react to after one `update`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub exit_requested: bool,
    pub selection_changed: bool,
    pub transform_changed: bool,
}

/// Last pick, kept for the picking-data overlay.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PickingData {
    pub ray: Option<Ray>,
    /// World-space triangle, already lifted off the surface.
    pub triangle: Option<[Vec3; 3]>,
}

/// Everything the editor mutates during a frame. Owned by the caller and
/// passed by reference; nothing here is global.
pub struct EditorContext {
    objects: NamedPool<Object3D>,
    cameras: NamedPool<Camera>,
    materials: NamedPool<MaterialData>,
    lines: NamedPool<Object3DLine>,
    objects_2d: NamedPool<Object2D>,
    selected: Option<String>,
    selected_camera: Option<String>,
    selected_object_2d: Option<String>,
    current_camera: String,
    camera_factors: (f32, f32),
    gizmo: Gizmo,
    projection: Projection,
    rendering_flags: RenderFlags,
    lighting: Lighting,
    clear_color: Vec4,
    picking: PickingData,
    picking_ray_length: f32,
    previous_input: InputSnapshot,
    overlay: OverlayBuffers,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl EditorContext {
    pub fn new(config: &EditorConfig) -> Self {
        let mut context = Self {
            objects: NamedPool::new("Object3D"),
            cameras: NamedPool::new("Camera").with_protected(EDITOR_CAMERA_NAME),
            materials: NamedPool::new("Material"),
            lines: NamedPool::new("Object3DLine"),
            objects_2d: NamedPool::new("Object2D"),
            selected: None,
            selected_camera: None,
            selected_object_2d: None,
            current_camera: EDITOR_CAMERA_NAME.to_string(),
            camera_factors: (config.camera_movement_factor, config.camera_rotation_factor),
            gizmo: Gizmo::new(),
            projection: Projection::new(
                config.fov_degrees,
                config.near_z,
                config.far_z,
                config.window_width as f32,
                config.window_height as f32,
            ),
            rendering_flags: config.rendering_flags,
            lighting: Lighting::default(),
            clear_color: Vec4::from_array(config.clear_color),
            picking: PickingData::default(),
            picking_ray_length: config.picking_ray_length,
            previous_input: InputSnapshot::default(),
            overlay: OverlayBuffers::default(),
        };
        context.reset_cameras();
        context
    }

    // --- Objects ---------------------------------------------------------

    pub fn objects(&self) -> &NamedPool<Object3D> {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&Object3D> {
        self.objects.get(name)
    }

    /// Callers that edit the transform must call `update_world_matrix`.
    pub fn object_mut(&mut self, name: &str) -> Option<&mut Object3D> {
        self.objects.get_mut(name)
    }

    pub fn add_object(&mut self, mut object: Object3D) -> pool::Result<&mut Object3D> {
        object.update_world_matrix();
        self.objects.insert(object)
    }

    pub fn remove_object(&mut self, name: &str) -> pool::Result<Object3D> {
        let removed = self.objects.remove(name)?;
        if self.selected.as_deref() == Some(name) {
            self.deselect_object();
        }
        Ok(removed)
    }

    pub fn clear_objects(&mut self) {
        self.deselect_object();
        self.objects.clear();
    }

    // --- Cameras ---------------------------------------------------------

    pub fn cameras(&self) -> &NamedPool<Camera> {
        &self.cameras
    }

    pub fn add_camera(&mut self, camera: Camera) -> pool::Result<&mut Camera> {
        self.cameras.insert(camera)
    }

    /// The editor camera is protected. Removing the current camera falls
    /// back to it.
    pub fn remove_camera(&mut self, name: &str) -> pool::Result<Camera> {
        let removed = self.cameras.remove(name)?;
        if self.current_camera == name {
            self.current_camera = EDITOR_CAMERA_NAME.to_string();
        }
        if self.selected_camera.as_deref() == Some(name) {
            self.selected_camera = None;
        }
        Ok(removed)
    }

    /// Drops every camera and recreates the editor camera.
    pub fn clear_cameras(&mut self) {
        self.reset_cameras();
    }

    pub fn current_camera_name(&self) -> &str {
        &self.current_camera
    }

    pub fn set_current_camera(&mut self, name: &str) -> pool::Result<()> {
        if !self.cameras.contains(name) {
            return Err(PoolError::NotFound(name.to_string()));
        }
        self.current_camera = name.to_string();
        Ok(())
    }

    pub fn current_camera(&self) -> Option<&Camera> {
        self.cameras.get(&self.current_camera)
    }

    pub fn current_camera_mut(&mut self) -> Option<&mut Camera> {
        self.cameras.get_mut(&self.current_camera)
    }

    fn reset_cameras(&mut self) {
        self.selected_camera = None;
        self.cameras.clear();
        let mut camera = Camera::editor();
        (camera.movement_factor, camera.rotation_factor) = self.camera_factors;
        if let Err(err) = self.cameras.insert(camera) {
            log::error!("failed to create the editor camera: {}", err);
        }
        self.current_camera = EDITOR_CAMERA_NAME.to_string();
    }

    // --- Materials -------------------------------------------------------

    pub fn materials(&self) -> &NamedPool<MaterialData> {
        &self.materials
    }

    pub fn material_mut(&mut self, name: &str) -> Option<&mut MaterialData> {
        self.materials.get_mut(name)
    }

    pub fn add_material(&mut self, material: MaterialData) -> pool::Result<&mut MaterialData> {
        self.materials.insert(material)
    }

    pub fn remove_material(&mut self, name: &str) -> pool::Result<MaterialData> {
        self.materials.remove(name)
    }

    pub fn rename_material(&mut self, old: &str, new: &str) -> pool::Result<()> {
        self.materials.rename(old, new)
    }

    pub fn clear_materials(&mut self) {
        self.materials.clear();
    }

    // --- Lines and 2D objects --------------------------------------------

    pub fn lines(&self) -> &NamedPool<Object3DLine> {
        &self.lines
    }

    pub fn line_mut(&mut self, name: &str) -> Option<&mut Object3DLine> {
        self.lines.get_mut(name)
    }

    pub fn add_line(&mut self, mut line: Object3DLine) -> pool::Result<&mut Object3DLine> {
        line.update_world_matrix();
        self.lines.insert(line)
    }

    pub fn remove_line(&mut self, name: &str) -> pool::Result<Object3DLine> {
        self.lines.remove(name)
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
    }

    pub fn objects_2d(&self) -> &NamedPool<Object2D> {
        &self.objects_2d
    }

    pub fn object_2d_mut(&mut self, name: &str) -> Option<&mut Object2D> {
        self.objects_2d.get_mut(name)
    }

    pub fn add_object_2d(&mut self, mut object: Object2D) -> pool::Result<&mut Object2D> {
        object.update_world_matrix();
        self.objects_2d.insert(object)
    }

    pub fn remove_object_2d(&mut self, name: &str) -> pool::Result<Object2D> {
        let removed = self.objects_2d.remove(name)?;
        if self.selected_object_2d.as_deref() == Some(name) {
            self.selected_object_2d = None;
        }
        Ok(removed)
    }

    pub fn clear_objects_2d(&mut self) {
        self.selected_object_2d = None;
        self.objects_2d.clear();
    }

    // --- Selection -------------------------------------------------------

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_object(&self) -> Option<&Object3D> {
        self.selected.as_deref().and_then(|name| self.objects.get(name))
    }

    pub fn selected_object_mut(&mut self) -> Option<&mut Object3D> {
        let name = self.selected.as_deref()?;
        self.objects.get_mut(name)
    }

    pub fn select_object(&mut self, name: &str) -> pool::Result<()> {
        if !self.objects.contains(name) {
            return Err(PoolError::NotFound(name.to_string()));
        }
        if self.selected.as_deref() != Some(name) {
            log::debug!("selected '{}'", name);
            self.gizmo.reset();
        }
        self.selected = Some(name.to_string());
        Ok(())
    }

    /// Clears every selection and any gizmo hover or drag. The picked
    /// triangle stays until Escape or the next pick.
    pub fn deselect_all(&mut self) {
        self.deselect_object();
        self.selected_camera = None;
        self.selected_object_2d = None;
    }

    fn deselect_object(&mut self) {
        if let Some(name) = self.selected.take() {
            log::debug!("deselected '{}'", name);
        }
        self.gizmo.reset();
    }

    /// Camera selection is independent of the 3D object selection.
    pub fn select_camera(&mut self, name: &str) -> pool::Result<()> {
        if !self.cameras.contains(name) {
            return Err(PoolError::NotFound(name.to_string()));
        }
        self.selected_camera = Some(name.to_string());
        Ok(())
    }

    pub fn deselect_camera(&mut self) {
        self.selected_camera = None;
    }

    pub fn selected_camera_name(&self) -> Option<&str> {
        self.selected_camera.as_deref()
    }

    pub fn selected_camera(&self) -> Option<&Camera> {
        self.selected_camera.as_deref().and_then(|name| self.cameras.get(name))
    }

    pub fn selected_camera_mut(&mut self) -> Option<&mut Camera> {
        let name = self.selected_camera.as_deref()?;
        self.cameras.get_mut(name)
    }

    pub fn select_object_2d(&mut self, name: &str) -> pool::Result<()> {
        if !self.objects_2d.contains(name) {
            return Err(PoolError::NotFound(name.to_string()));
        }
        self.selected_object_2d = Some(name.to_string());
        Ok(())
    }

    pub fn deselect_object_2d(&mut self) {
        self.selected_object_2d = None;
    }

    pub fn selected_object_2d_name(&self) -> Option<&str> {
        self.selected_object_2d.as_deref()
    }

    pub fn selected_object_2d(&self) -> Option<&Object2D> {
        self.selected_object_2d
            .as_deref()
            .and_then(|name| self.objects_2d.get(name))
    }

    pub fn selected_object_2d_mut(&mut self) -> Option<&mut Object2D> {
        let name = self.selected_object_2d.as_deref()?;
        self.objects_2d.get_mut(name)
    }

    // --- Gizmo, flags, projection ----------------------------------------

    pub fn gizmo(&self) -> &Gizmo {
        &self.gizmo
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        self.gizmo.set_mode(mode);
    }

    pub fn rendering_flags(&self) -> RenderFlags {
        self.rendering_flags
    }

    pub fn rendering_flags_mut(&mut self) -> &mut RenderFlags {
        &mut self.rendering_flags
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn lighting_mut(&mut self) -> &mut Lighting {
        &mut self.lighting
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color.clamp(Vec4::ZERO, Vec4::ONE);
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.projection.set_viewport(width, height);
    }

    pub fn picking_data(&self) -> &PickingData {
        &self.picking
    }

    pub fn picking_ray_length(&self) -> f32 {
        self.picking_ray_length
    }

    /// Eye, view and inverse view of the current camera. An empty camera
    /// pool falls back to the editor camera's defaults.
    fn camera_view(&self) -> (Vec3, Mat4, Mat4) {
        match self.current_camera() {
            Some(camera) => (
                camera.position,
                camera.view_matrix(),
                camera.inverse_view_matrix(),
            ),
            None => {
                let camera = Camera::editor();
                (
                    camera.position,
                    camera.view_matrix(),
                    camera.inverse_view_matrix(),
                )
            }
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let (_, view, _) = self.camera_view();
        self.projection.perspective() * view
    }

    /// World-space ray under a cursor given in window pixels.
    pub fn picking_ray(&self, cursor: Vec2) -> Option<Ray> {
        let (_, _, inverse_view) = self.camera_view();
        let viewport = Vec2::new(self.projection.width, self.projection.height);
        pick::picking_ray(cursor, viewport, &self.projection.perspective(), &inverse_view)
    }

    /// Casts a ray under `cursor` and returns the closest pickable hit. The
    /// ray is kept for display; selection is left alone.
    pub fn pick(&mut self, cursor: Vec2) -> Option<PickHit> {
        let ray = self.picking_ray(cursor)?;
        self.picking.ray = Some(ray);
        self.overlay.mark_picking_dirty();
        pick::pick(&ray, &self.objects)
    }

    fn apply_pick(&mut self, hit: &PickHit) -> bool {
        let Some(name) = self.objects.get_index(hit.index).map(|o| o.name.clone()) else {
            return false;
        };
        self.deselect_all();
        self.picking.triangle = Some(hit.lifted_triangle());
        self.overlay.mark_picking_dirty();
        self.select_object(&name).is_ok()
    }

    // --- Frame -----------------------------------------------------------

    /// One frame of input handling: hot-keys, camera, gizmo, then picking.
    pub fn update(&mut self, input: &InputSnapshot, frame_dt: f32) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        let keys = input.keyboard;
        let before = self.previous_input.keyboard;
        let was_selected = self.selected.clone();

        if keys.escape {
            self.deselect_all();
            if self.picking.triangle.take().is_some() {
                self.overlay.mark_picking_dirty();
            }
        }

        if !input.gui.wants_keyboard {
            self.move_camera(&keys, frame_dt);

            if keys.digit1 {
                self.gizmo.set_mode(GizmoMode::Translation);
            } else if keys.digit2 {
                self.gizmo.set_mode(GizmoMode::Rotation);
            } else if keys.digit3 {
                self.gizmo.set_mode(GizmoMode::Scaling);
            }

            if pressed(keys.delete, before.delete) {
                if let Some(name) = self.selected.clone() {
                    if self.remove_object(&name).is_ok() {
                        log::info!("deleted '{}'", name);
                    }
                }
            }

            if keys.alt && keys.q {
                outcome.exit_requested = true;
            }

            let toggles = [
                (keys.f1, before.f1, RenderFlags::DRAW_WIRE_FRAME),
                (keys.f2, before.f2, RenderFlags::DRAW_NORMALS),
                (keys.f3, before.f3, RenderFlags::DRAW_BOUNDING_SPHERE),
                (keys.f4, before.f4, RenderFlags::DRAW_PICKING_DATA),
            ];
            for (now, was, flag) in toggles {
                if pressed(now, was) {
                    self.rendering_flags.toggle(flag);
                }
            }
        }

        if !input.gui.hovered {
            let mouse = input.mouse;
            let previous = self.previous_input.mouse;
            let ray = self.picking_ray(mouse.position());

            outcome.transform_changed = self.step_gizmo(ray, &mouse, &previous);

            if pressed(mouse.left, previous.left) {
                if let Some(hit) = self.pick(mouse.position()) {
                    if !self.gizmo.is_engaged() {
                        self.apply_pick(&hit);
                    }
                }
            }

            if !mouse.left {
                self.gizmo.end_drag();
            }

            if mouse.right {
                self.deselect_all();
            }

            if mouse.middle && previous.middle {
                let delta = mouse.position() - previous.position();
                if let Some(camera) = self.current_camera_mut() {
                    camera.rotate(delta.x, delta.y, frame_dt);
                }
            }
        }

        outcome.selection_changed = was_selected != self.selected;
        self.previous_input = *input;
        outcome
    }

    fn move_camera(&mut self, keys: &KeyboardState, frame_dt: f32) {
        let Some(camera) = self.current_camera_mut() else {
            return;
        };
        let amount = frame_dt * camera.movement_factor;
        let moves = [
            (keys.w, CameraMove::Forward),
            (keys.s, CameraMove::Backward),
            (keys.a, CameraMove::Left),
            (keys.d, CameraMove::Right),
        ];
        for (held, direction) in moves {
            if held {
                camera.move_by(direction, amount);
            }
        }
    }

    fn step_gizmo(&mut self, ray: Option<Ray>, mouse: &MouseState, previous: &MouseState) -> bool {
        if !self.rendering_flags.contains(RenderFlags::USE_3D_GIZMOS) {
            return false;
        }
        let (eye, _, _) = self.camera_view();
        let Some(target) = self.selected.as_deref().and_then(|name| self.objects.get_mut(name))
        else {
            return false;
        };
        let input = GizmoInput {
            ray,
            eye,
            cursor: mouse.position(),
            previous_cursor: previous.position(),
            left_held: mouse.left,
        };
        self.gizmo.update(&input, target)
    }

    // --- Documents -------------------------------------------------------

    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            objects: self.objects.iter().cloned().collect(),
            cameras: self.cameras.iter().cloned().collect(),
            materials: self.materials.iter().cloned().collect(),
            lines: self.lines.iter().cloned().collect(),
            objects_2d: self.objects_2d.iter().cloned().collect(),
        }
    }

    /// Replaces every pool with the document's contents. On error the
    /// context is left untouched.
    pub fn apply_document(&mut self, document: SceneDocument) -> serialization::Result<()> {
        let mut objects = NamedPool::new("Object3D");
        for mut object in document.objects {
            object.pad_materials();
            object.update_world_matrix();
            object.mark_geometry_dirty();
            objects.insert(object)?;
        }

        let mut cameras = NamedPool::new("Camera").with_protected(EDITOR_CAMERA_NAME);
        let mut editor = Camera::editor();
        (editor.movement_factor, editor.rotation_factor) = self.camera_factors;
        cameras.insert(editor)?;
        for camera in document.cameras {
            if camera.name != EDITOR_CAMERA_NAME {
                cameras.insert(camera)?;
            } else if let Some(existing) = cameras.get_mut(EDITOR_CAMERA_NAME) {
                *existing = camera;
            }
        }

        let mut materials = NamedPool::new("Material");
        for material in document.materials {
            materials.insert(material)?;
        }

        let mut lines = NamedPool::new("Object3DLine");
        for mut line in document.lines {
            line.update_world_matrix();
            line.buffer_dirty = true;
            lines.insert(line)?;
        }

        let mut objects_2d = NamedPool::new("Object2D");
        for mut object in document.objects_2d {
            object.update_world_matrix();
            object.buffer_dirty = true;
            objects_2d.insert(object)?;
        }

        self.deselect_all();
        self.picking = PickingData::default();
        self.overlay.mark_picking_dirty();
        self.objects = objects;
        self.cameras = cameras;
        self.materials = materials;
        self.lines = lines;
        self.objects_2d = objects_2d;
        if !self.cameras.contains(&self.current_camera) {
            self.current_camera = EDITOR_CAMERA_NAME.to_string();
        }
        log::info!(
            "applied scene: {} objects, {} cameras, {} materials",
            self.objects.len(),
            self.cameras.len(),
            self.materials.len()
        );
        Ok(())
    }
}

fn pressed(now: bool, before: bool) -> bool {
    now && !before
}
