use crate::editor::EditorContext;
use crate::render::{GizmoMode, RenderFlags};
use crate::scene::material::MaterialData;
use crate::scene::object::{Object2D, Object3D, ObjectFlags, TessellationType};
use crate::scene::transform::{
    BS_CENTER_OFFSET_MAX, BS_CENTER_OFFSET_MIN, BS_RADIUS_BIAS_MAX, BS_RADIUS_BIAS_MIN,
    SCALING_MAX, SCALING_MIN, TRANSLATION_MAX, TRANSLATION_MIN,
};
use glam::{Vec2, Vec3};

pub const SPECULAR_EXPONENT_MIN: f32 = 1.0;
pub const SPECULAR_EXPONENT_MAX: f32 = 128.0;
pub const CAMERA_MOVEMENT_FACTOR_MIN: f32 = 1.0;
pub const CAMERA_MOVEMENT_FACTOR_MAX: f32 = 100.0;

/// Editable material scalars and colors, detached from the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub specular_exponent: f32,
    pub specular_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialParams {
    pub fn from_material(material: &MaterialData) -> Self {
        Self {
            ambient_color: material.ambient_color,
            diffuse_color: material.diffuse_color,
            specular_color: material.specular_color,
            specular_exponent: material.specular_exponent,
            specular_intensity: material.specular_intensity,
            roughness: material.roughness,
            metalness: material.metalness,
        }
    }

    fn apply_to(&self, material: &mut MaterialData) {
        material.ambient_color = self.ambient_color.clamp(Vec3::ZERO, Vec3::ONE);
        material.diffuse_color = self.diffuse_color.clamp(Vec3::ZERO, Vec3::ONE);
        material.specular_color = self.specular_color.clamp(Vec3::ZERO, Vec3::ONE);
        material.specular_exponent = self
            .specular_exponent
            .clamp(SPECULAR_EXPONENT_MIN, SPECULAR_EXPONENT_MAX);
        material.specular_intensity = self.specular_intensity.clamp(0.0, 1.0);
        material.roughness = self.roughness.clamp(0.0, 1.0);
        material.metalness = self.metalness.clamp(0.0, 1.0);
    }
}

/// Property-panel accessors over the selected object and the editor-wide
/// switches. Widget layout lives with the GUI; this only reads and writes.
///
/// Object setters return `false` when nothing is selected. Every transform
/// setter clamps to the editor limits and rebuilds the world matrix.
pub struct PropertyEditor<'a> {
    context: &'a mut EditorContext,
}

impl<'a> PropertyEditor<'a> {
    pub fn new(context: &'a mut EditorContext) -> Self {
        Self { context }
    }

    pub fn object_names(&self) -> Vec<&str> {
        self.context.objects().names().collect()
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.context.selected_name()
    }

    pub fn select(&mut self, name: &str) -> bool {
        self.context.select_object(name).is_ok()
    }

    fn selected(&self) -> Option<&Object3D> {
        self.context.selected_object()
    }

    fn edit(&mut self, apply: impl FnOnce(&mut Object3D)) -> bool {
        let Some(object) = self.context.selected_object_mut() else {
            return false;
        };
        apply(object);
        object.update_world_matrix();
        true
    }

    // Transform

    pub fn translation(&self) -> Option<Vec3> {
        self.selected().map(|o| o.transform.translation)
    }

    pub fn set_translation(&mut self, translation: Vec3) -> bool {
        self.edit(|o| {
            o.transform.translation = translation.clamp(
                Vec3::splat(TRANSLATION_MIN),
                Vec3::splat(TRANSLATION_MAX),
            );
        })
    }

    /// Pitch, yaw and roll in degrees.
    pub fn rotation_degrees(&self) -> Option<Vec3> {
        self.selected().map(|o| {
            Vec3::new(o.transform.pitch, o.transform.yaw, o.transform.roll)
                * (180.0 / std::f32::consts::PI)
        })
    }

    /// Angles past a full turn wrap to the opposite limit.
    pub fn set_rotation_degrees(&mut self, degrees: Vec3) -> bool {
        let radians = degrees * (std::f32::consts::PI / 180.0);
        self.edit(|o| {
            o.transform.pitch = radians.x;
            o.transform.yaw = radians.y;
            o.transform.roll = radians.z;
        })
    }

    pub fn scaling(&self) -> Option<Vec3> {
        self.selected().map(|o| o.transform.scaling)
    }

    pub fn set_scaling(&mut self, scaling: Vec3) -> bool {
        self.edit(|o| {
            o.transform.scaling = scaling.clamp(Vec3::splat(SCALING_MIN), Vec3::splat(SCALING_MAX));
        })
    }

    // Bounding sphere

    pub fn bounding_sphere_offset(&self) -> Option<Vec3> {
        self.selected().map(|o| o.bounding_sphere.center_offset)
    }

    pub fn set_bounding_sphere_offset(&mut self, offset: Vec3) -> bool {
        self.edit(|o| {
            o.bounding_sphere.center_offset = offset.clamp(
                Vec3::splat(BS_CENTER_OFFSET_MIN),
                Vec3::splat(BS_CENTER_OFFSET_MAX),
            );
        })
    }

    pub fn radius_bias(&self) -> Option<f32> {
        self.selected().map(|o| o.bounding_sphere.radius_bias)
    }

    pub fn set_radius_bias(&mut self, bias: f32) -> bool {
        self.edit(|o| {
            o.bounding_sphere.radius_bias = bias.clamp(BS_RADIUS_BIAS_MIN, BS_RADIUS_BIAS_MAX);
        })
    }

    /// Derived from the bias and scaling; there is no setter.
    pub fn bounding_sphere_radius(&self) -> Option<f32> {
        self.selected().map(|o| o.bounding_sphere.radius)
    }

    // Object switches

    pub fn pickable(&self) -> Option<bool> {
        self.selected().map(|o| o.pickable)
    }

    pub fn set_pickable(&mut self, pickable: bool) -> bool {
        self.edit(|o| o.pickable = pickable)
    }

    pub fn visible(&self) -> Option<bool> {
        self.selected().map(|o| o.visible)
    }

    pub fn set_visible(&mut self, visible: bool) -> bool {
        self.edit(|o| o.visible = visible)
    }

    pub fn object_flags(&self) -> Option<ObjectFlags> {
        self.selected().map(|o| o.flags)
    }

    pub fn set_object_flag(&mut self, flag: ObjectFlags, enabled: bool) -> bool {
        self.edit(|o| o.flags.set(flag, enabled))
    }

    // Tessellation

    pub fn tessellation_enabled(&self) -> Option<bool> {
        self.selected().map(|o| o.tessellation.enabled)
    }

    pub fn set_tessellation_enabled(&mut self, enabled: bool) -> bool {
        self.edit(|o| o.tessellation.enabled = enabled)
    }

    pub fn tessellation_type(&self) -> Option<TessellationType> {
        self.selected().map(|o| o.tessellation.kind)
    }

    pub fn set_tessellation_type(&mut self, kind: TessellationType) -> bool {
        self.edit(|o| o.tessellation.kind = kind)
    }

    /// Edge and inside factors.
    pub fn tessellation_factors(&self) -> Option<(f32, f32)> {
        self.selected()
            .map(|o| (o.tessellation.edge_factor(), o.tessellation.inside_factor()))
    }

    pub fn set_tessellation_factors(&mut self, edge: f32, inside: f32) -> bool {
        self.edit(|o| o.tessellation.set_factors(edge, inside))
    }

    pub fn displacement_factor(&self) -> Option<f32> {
        self.selected().map(|o| o.tessellation.displacement_factor())
    }

    pub fn set_displacement_factor(&mut self, factor: f32) -> bool {
        self.edit(|o| o.tessellation.set_displacement_factor(factor))
    }

    // Materials of the selected object

    pub fn material_count(&self) -> usize {
        self.selected().map_or(0, |o| o.materials.len())
    }

    pub fn material_params(&self, index: usize) -> Option<MaterialParams> {
        self.selected()
            .and_then(|o| o.materials.get(index))
            .map(MaterialParams::from_material)
    }

    pub fn set_material_params(&mut self, index: usize, params: MaterialParams) -> bool {
        let Some(material) = self
            .context
            .selected_object_mut()
            .and_then(|o| o.materials.get_mut(index))
        else {
            return false;
        };
        params.apply_to(material);
        true
    }

    // Camera selection

    pub fn selected_camera_name(&self) -> Option<&str> {
        self.context.selected_camera_name()
    }

    pub fn select_camera(&mut self, name: &str) -> bool {
        self.context.select_camera(name).is_ok()
    }

    pub fn camera_position(&self) -> Option<Vec3> {
        self.context.selected_camera().map(|c| c.position)
    }

    pub fn set_camera_position(&mut self, position: Vec3) -> bool {
        let Some(camera) = self.context.selected_camera_mut() else {
            return false;
        };
        camera.position = position.clamp(Vec3::splat(TRANSLATION_MIN), Vec3::splat(TRANSLATION_MAX));
        true
    }

    pub fn camera_movement_factor(&self) -> Option<f32> {
        self.context.selected_camera().map(|c| c.movement_factor)
    }

    pub fn set_camera_movement_factor(&mut self, factor: f32) -> bool {
        let Some(camera) = self.context.selected_camera_mut() else {
            return false;
        };
        camera.movement_factor = factor.clamp(CAMERA_MOVEMENT_FACTOR_MIN, CAMERA_MOVEMENT_FACTOR_MAX);
        true
    }

    // 2D object selection

    pub fn selected_object_2d_name(&self) -> Option<&str> {
        self.context.selected_object_2d_name()
    }

    pub fn select_object_2d(&mut self, name: &str) -> bool {
        self.context.select_object_2d(name).is_ok()
    }

    fn edit_2d(&mut self, apply: impl FnOnce(&mut Object2D)) -> bool {
        let Some(object) = self.context.selected_object_2d_mut() else {
            return false;
        };
        apply(object);
        object.update_world_matrix();
        true
    }

    pub fn object_2d_translation(&self) -> Option<Vec2> {
        self.context.selected_object_2d().map(|o| o.translation)
    }

    pub fn set_object_2d_translation(&mut self, translation: Vec2) -> bool {
        self.edit_2d(|o| {
            o.translation = translation.clamp(
                Vec2::splat(TRANSLATION_MIN),
                Vec2::splat(TRANSLATION_MAX),
            );
        })
    }

    /// Radians.
    pub fn object_2d_rotation(&self) -> Option<f32> {
        self.context.selected_object_2d().map(|o| o.rotation)
    }

    pub fn set_object_2d_rotation(&mut self, rotation: f32) -> bool {
        self.edit_2d(|o| o.rotation = rotation)
    }

    pub fn object_2d_scaling(&self) -> Option<Vec2> {
        self.context.selected_object_2d().map(|o| o.scaling)
    }

    pub fn set_object_2d_scaling(&mut self, scaling: Vec2) -> bool {
        self.edit_2d(|o| {
            o.scaling = scaling.clamp(Vec2::splat(SCALING_MIN), Vec2::splat(SCALING_MAX));
        })
    }

    pub fn set_object_2d_visible(&mut self, visible: bool) -> bool {
        self.edit_2d(|o| o.visible = visible)
    }

    // Lighting

    pub fn directional_light_direction(&self) -> Vec3 {
        self.context.lighting().directional_direction()
    }

    /// Returns false for a zero vector.
    pub fn set_directional_light_direction(&mut self, direction: Vec3) -> bool {
        self.context.lighting_mut().set_directional_direction(direction)
    }

    pub fn directional_light_color(&self) -> Vec3 {
        self.context.lighting().directional_color()
    }

    pub fn set_directional_light_color(&mut self, color: Vec3) {
        self.context.lighting_mut().set_directional_color(color);
    }

    pub fn ambient_light(&self) -> (Vec3, f32) {
        let lighting = self.context.lighting();
        (lighting.ambient_color(), lighting.ambient_intensity())
    }

    pub fn set_ambient_light(&mut self, color: Vec3, intensity: f32) {
        self.context.lighting_mut().set_ambient(color, intensity);
    }

    pub fn exposure(&self) -> f32 {
        self.context.lighting().exposure()
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.context.lighting_mut().set_exposure(exposure);
    }

    // Editor-wide

    pub fn rendering_flags(&self) -> RenderFlags {
        self.context.rendering_flags()
    }

    pub fn set_rendering_flag(&mut self, flag: RenderFlags, enabled: bool) {
        self.context.rendering_flags_mut().set(flag, enabled);
    }

    pub fn gizmo_mode(&self) -> GizmoMode {
        self.context.gizmo().mode()
    }

    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        self.context.set_gizmo_mode(mode);
    }
}
