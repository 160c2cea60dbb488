use super::{EditorContext, PickingData};
use crate::render::{
    BaseShader, CullMode, DomainShader, FillMode, GeometryShader, LightConstants,
    MeshBufferHandle, PixelShader, PrimitiveTopology, RasterState, RenderBackend, RenderFlags,
    ShadingConstants, TransformConstants, VertexShader,
};
use crate::scene::object::{LineVertex, Object3D, ObjectFlags};
use crate::scene::primitives;
use glam::{Mat4, Vec4};

const BOUNDING_SPHERE_SEGMENTS: u32 = 16;
const BOUNDING_SPHERE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);
const PICKING_RAY_COLOR: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
const PICKED_TRIANGLE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

/// Editor-owned debug geometry.
#[derive(Debug, Default)]
pub(crate) struct OverlayBuffers {
    bounding_sphere: Option<(MeshBufferHandle, u32)>,
    picking_ray: Option<MeshBufferHandle>,
    picked_triangle: Option<(MeshBufferHandle, u32)>,
    picking_dirty: bool,
}

impl OverlayBuffers {
    pub(crate) fn mark_picking_dirty(&mut self) {
        self.picking_dirty = true;
    }

    fn upload_picking(
        &mut self,
        backend: &mut dyn RenderBackend,
        picking: &PickingData,
        ray_length: f32,
    ) {
        if !self.picking_dirty && self.picking_ray.is_some() {
            return;
        }
        if let Some(ray) = picking.ray {
            let segment = [
                LineVertex::new(ray.origin, PICKING_RAY_COLOR),
                LineVertex::new(ray.at(ray_length), PICKING_RAY_COLOR),
            ];
            self.picking_ray = Some(backend.upload_lines(self.picking_ray, &segment));
        }
        if let Some([v0, v1, v2]) = picking.triangle {
            let outline: Vec<LineVertex> = [v0, v1, v1, v2, v2, v0]
                .into_iter()
                .map(|p| LineVertex::new(p, PICKED_TRIANGLE_COLOR))
                .collect();
            let existing = self.picked_triangle.map(|(handle, _)| handle);
            let handle = backend.upload_lines(existing, &outline);
            self.picked_triangle = Some((handle, outline.len() as u32));
        } else if let Some((handle, _)) = self.picked_triangle {
            self.picked_triangle = Some((handle, 0));
        }
        self.picking_dirty = false;
    }

    fn bounding_sphere(&mut self, backend: &mut dyn RenderBackend) -> (MeshBufferHandle, u32) {
        *self.bounding_sphere.get_or_insert_with(|| {
            let mesh = primitives::sphere(BOUNDING_SPHERE_SEGMENTS, BOUNDING_SPHERE_COLOR);
            (backend.upload_mesh(None, &mesh), mesh.index_count())
        })
    }
}

fn raster_state(flags: RenderFlags, object_flags: ObjectFlags) -> RasterState {
    RasterState {
        fill: if flags.contains(RenderFlags::DRAW_WIRE_FRAME) {
            FillMode::WireFrame
        } else {
            FillMode::Solid
        },
        cull: if object_flags.contains(ObjectFlags::NO_CULLING) {
            CullMode::None
        } else {
            CullMode::Back
        },
    }
}

fn upload_object_geometry(backend: &mut dyn RenderBackend, object: &mut Object3D) {
    if !object.needs_upload() {
        return;
    }
    let buffers = object
        .meshes
        .iter()
        .enumerate()
        .map(|(i, mesh)| backend.upload_mesh(object.buffers().get(i).copied(), mesh))
        .collect();
    object.set_buffers(buffers);
}

impl EditorContext {
    /// Issues one frame of draw commands. Opaque objects go first, then
    /// transparent ones, then debug overlays, 2D objects and the gizmo.
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) {
        let flags = self.rendering_flags;
        let view_projection = self.view_projection();
        let (eye_position, _, _) = self.camera_view();

        backend.clear(self.clear_color);
        backend.upload_lighting(&LightConstants {
            lighting: self.lighting,
            eye_position,
        });

        self.draw_objects(backend, view_projection, false);
        self.draw_objects(backend, view_projection, true);

        if flags.contains(RenderFlags::DRAW_NORMALS) {
            self.draw_normals(backend, view_projection);
        }
        if flags.contains(RenderFlags::DRAW_BOUNDING_SPHERE) {
            self.draw_bounding_spheres(backend, view_projection);
        }
        self.draw_lines(backend, view_projection);
        if flags.contains(RenderFlags::DRAW_PICKING_DATA) {
            self.draw_picking_data(backend, view_projection);
        }
        self.draw_objects_2d(backend);
        if flags.contains(RenderFlags::USE_3D_GIZMOS) {
            self.draw_gizmo(backend, view_projection);
        }
    }

    fn draw_objects(
        &mut self,
        backend: &mut dyn RenderBackend,
        view_projection: Mat4,
        transparent: bool,
    ) {
        let flags = self.rendering_flags;
        for object in self.objects.iter_mut() {
            if !object.visible || object.transparent != transparent {
                continue;
            }
            upload_object_geometry(backend, object);
            object.update_world_matrix();

            backend.upload_transform(&TransformConstants {
                world: object.world_matrix(),
                view_projection,
            });
            backend.upload_shading(&ShadingConstants {
                use_lighting: flags.contains(RenderFlags::USE_LIGHTING)
                    && !object.flags.contains(ObjectFlags::NO_LIGHTING),
                use_texture: object.uses_texture(),
                use_physically_based_rendering: flags
                    .contains(RenderFlags::USE_PHYSICALLY_BASED_RENDERING),
            });
            backend.bind_shader(BaseShader::Vertex(object.shaders.vertex));
            backend.bind_shader(BaseShader::Pixel(object.effective_pixel_shader()));
            backend.set_raster_state(raster_state(flags, object.flags));

            let tessellation = object.tessellation;
            if tessellation.enabled {
                backend.upload_tessellation(&tessellation.constants());
                backend.bind_shader(BaseShader::Hull(tessellation.kind.hull_shader()));
                backend.bind_shader(BaseShader::Domain(DomainShader::Tri));
                backend.set_topology(PrimitiveTopology::TrianglePatchList);
            }
            object.draw_meshes(backend);
            if tessellation.enabled {
                backend.unbind_tessellation_shaders();
                backend.set_topology(PrimitiveTopology::TriangleList);
            }
        }
    }

    fn draw_normals(&mut self, backend: &mut dyn RenderBackend, view_projection: Mat4) {
        backend.bind_shader(BaseShader::Geometry(GeometryShader::Normal));
        for object in self.objects.iter().filter(|o| o.visible) {
            backend.upload_transform(&TransformConstants {
                world: object.world_matrix(),
                view_projection,
            });
            backend.bind_shader(BaseShader::Vertex(object.shaders.vertex));
            backend.bind_shader(BaseShader::Pixel(PixelShader::VertexColor));
            object.draw_meshes(backend);
        }
        backend.unbind_geometry_shader();
    }

    fn draw_bounding_spheres(&mut self, backend: &mut dyn RenderBackend, view_projection: Mat4) {
        let (buffer, index_count) = self.overlay.bounding_sphere(backend);
        backend.bind_shader(BaseShader::Vertex(VertexShader::Base));
        backend.bind_shader(BaseShader::Pixel(PixelShader::VertexColor));
        backend.set_raster_state(RasterState {
            fill: FillMode::WireFrame,
            cull: CullMode::None,
        });
        for object in self.objects.iter().filter(|o| o.visible) {
            let world = Mat4::from_translation(object.pivot())
                * Mat4::from_scale(glam::Vec3::splat(object.bounding_sphere.radius));
            backend.upload_transform(&TransformConstants {
                world,
                view_projection,
            });
            backend.draw_indexed(buffer, index_count);
        }
    }

    fn draw_lines(&mut self, backend: &mut dyn RenderBackend, view_projection: Mat4) {
        let mut bound = false;
        for line in self.lines.iter_mut() {
            if !line.visible || line.vertices.is_empty() {
                continue;
            }
            if line.buffer_dirty || line.buffer.is_none() {
                line.buffer = Some(backend.upload_lines(line.buffer, &line.vertices));
                line.buffer_dirty = false;
            }
            let Some(buffer) = line.buffer else {
                continue;
            };
            if !bound {
                backend.bind_shader(BaseShader::Vertex(VertexShader::Line));
                backend.bind_shader(BaseShader::Pixel(PixelShader::Line));
                bound = true;
            }
            line.update_world_matrix();
            backend.upload_transform(&TransformConstants {
                world: line.transform.world_matrix(),
                view_projection,
            });
            backend.draw_lines(buffer, line.vertices.len() as u32);
        }
    }

    fn draw_picking_data(&mut self, backend: &mut dyn RenderBackend, view_projection: Mat4) {
        self.overlay
            .upload_picking(backend, &self.picking, self.picking_ray_length);
        backend.bind_shader(BaseShader::Vertex(VertexShader::Line));
        backend.bind_shader(BaseShader::Pixel(PixelShader::Line));
        backend.upload_transform(&TransformConstants {
            world: Mat4::IDENTITY,
            view_projection,
        });
        if let (Some(buffer), Some(_)) = (self.overlay.picking_ray, self.picking.ray) {
            backend.draw_lines(buffer, 2);
        }
        if let Some((buffer, count)) = self.overlay.picked_triangle {
            if count > 0 {
                backend.draw_lines(buffer, count);
            }
        }
    }

    fn draw_objects_2d(&mut self, backend: &mut dyn RenderBackend) {
        let orthographic = self.projection.orthographic();
        let mut bound = false;
        for object in self.objects_2d.iter_mut() {
            if !object.visible {
                continue;
            }
            if object.buffer_dirty || object.buffer.is_none() {
                object.buffer = Some(backend.upload_mesh(object.buffer, &object.mesh));
                object.buffer_dirty = false;
            }
            let Some(buffer) = object.buffer else {
                continue;
            };
            if !bound {
                backend.bind_shader(BaseShader::Vertex(VertexShader::Base2D));
                backend.bind_shader(BaseShader::Pixel(PixelShader::Base2D));
                backend.set_raster_state(RasterState {
                    fill: FillMode::Solid,
                    cull: CullMode::None,
                });
                bound = true;
            }
            object.update_world_matrix();
            backend.upload_transform(&TransformConstants {
                world: object.world_matrix(),
                view_projection: orthographic,
            });
            backend.draw_indexed(buffer, object.mesh.index_count());
        }
    }

    fn draw_gizmo(&mut self, backend: &mut dyn RenderBackend, view_projection: Mat4) {
        if self.selected_object().is_none() {
            return;
        }
        for handle in self.gizmo.all_handles_mut() {
            if handle.buffer.is_none() {
                handle.buffer = Some(backend.upload_mesh(None, &handle.mesh));
            }
        }
        backend.bind_shader(BaseShader::Vertex(VertexShader::Gizmo));
        backend.bind_shader(BaseShader::Pixel(PixelShader::Gizmo));
        backend.set_raster_state(RasterState {
            fill: FillMode::Solid,
            cull: CullMode::None,
        });
        for handle in self.gizmo.handles() {
            let Some(buffer) = handle.buffer else {
                continue;
            };
            backend.upload_transform(&TransformConstants {
                world: handle.transform.world_matrix(),
                view_projection,
            });
            backend.upload_gizmo_color(self.gizmo.color_factor(handle.axis));
            backend.draw_indexed(buffer, handle.mesh.index_count());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::InputSnapshot;
    use crate::render::gizmo::{HIGHLIGHT_COLOR_FACTOR, NORMAL_COLOR_FACTOR};
    use crate::render::{CommandRecorder, GizmoAxis, RenderCommand};
    use crate::scene::object::Object2D;
    use glam::Vec3;

    fn cube(name: &str, transparent: bool) -> Object3D {
        let mut object = Object3D::new(name);
        object.create(vec![primitives::cube(1.0, Vec4::ONE)], Vec::new());
        object.transparent = transparent;
        object.transform.translation = Vec3::new(0.0, 2.0, 5.0);
        object
    }

    fn drawn_buffers(recorder: &CommandRecorder) -> Vec<MeshBufferHandle> {
        recorder
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawIndexed { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect()
    }

    fn without_gizmos() -> EditorContext {
        let mut context = EditorContext::default();
        context
            .rendering_flags_mut()
            .remove(RenderFlags::USE_3D_GIZMOS);
        context
    }

    #[test]
    fn opaque_objects_draw_before_transparent_ones() {
        let mut context = without_gizmos();
        context.add_object(cube("glass", true)).unwrap();
        context.add_object(cube("stone", false)).unwrap();
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);

        let stone = context.object("stone").unwrap().buffers()[0];
        let glass = context.object("glass").unwrap().buffers()[0];
        assert_eq!(drawn_buffers(&recorder), vec![stone, glass]);
    }

    #[test]
    fn frame_starts_with_clear_and_lighting() {
        let mut config = crate::config::EditorConfig::default();
        config.clear_color = [0.1, 0.2, 0.3, 1.0];
        let mut context = EditorContext::new(&config);
        context.lighting_mut().set_exposure(2.5);
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);

        let commands = recorder.commands();
        assert_eq!(commands[0], RenderCommand::Clear(Vec4::new(0.1, 0.2, 0.3, 1.0)));
        match &commands[1] {
            RenderCommand::UploadLighting(constants) => {
                assert_eq!(constants.lighting.exposure(), 2.5);
                assert_eq!(constants.eye_position, context.current_camera().unwrap().position);
            }
            other => panic!("expected lighting upload, got {:?}", other),
        }
    }

    #[test]
    fn tessellated_objects_draw_as_patches() {
        let mut context = without_gizmos();
        let mut object = cube("terrain", false);
        object.tessellation.enabled = true;
        object.tessellation.kind = crate::scene::object::TessellationType::FractionalEven;
        object.tessellation.set_factors(8.0, 4.0);
        context.add_object(object).unwrap();
        context.add_object(cube("stone", false)).unwrap();
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);

        let commands = recorder.commands();
        let position = |wanted: &RenderCommand| commands.iter().position(|c| c == wanted);
        let hull = position(&RenderCommand::BindShader(BaseShader::Hull(
            crate::render::HullShader::TriFractionalEven,
        )))
        .unwrap();
        let patches = position(&RenderCommand::SetTopology(PrimitiveTopology::TrianglePatchList))
            .unwrap();
        let unbind = position(&RenderCommand::UnbindTessellationShaders).unwrap();
        let draws: Vec<usize> = commands
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, RenderCommand::DrawIndexed { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(draws.len(), 2);
        assert!(hull < patches && patches < draws[0] && draws[0] < unbind);
        assert!(unbind < draws[1]);
        assert!(commands.iter().any(|c| matches!(
            c,
            RenderCommand::UploadTessellation(constants) if constants.edge_factor == 8.0
        )));
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, RenderCommand::UnbindTessellationShaders))
                .count(),
            1
        );
    }

    #[test]
    fn geometry_is_uploaded_once() {
        let mut context = without_gizmos();
        context.add_object(cube("stone", false)).unwrap();
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);
        recorder.finish_frame();
        context.draw(&mut recorder);
        assert!(!recorder
            .commands()
            .iter()
            .any(|c| matches!(c, RenderCommand::UploadMesh { .. })));
        assert_eq!(recorder.draw_count(), 1);
    }

    #[test]
    fn hidden_objects_are_skipped() {
        let mut context = without_gizmos();
        let mut hidden = cube("hidden", false);
        hidden.visible = false;
        context.add_object(hidden).unwrap();
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);
        assert_eq!(recorder.draw_count(), 0);
    }

    #[test]
    fn raster_state_follows_flags() {
        let mut context = without_gizmos();
        let mut object = cube("stone", false);
        object.flags.insert(ObjectFlags::NO_CULLING);
        object.flags.insert(ObjectFlags::USE_RAW_VERTEX_COLOR);
        context.add_object(object).unwrap();
        context
            .rendering_flags_mut()
            .insert(RenderFlags::DRAW_WIRE_FRAME);
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);

        let commands = recorder.commands();
        assert!(commands.contains(&RenderCommand::SetRasterState(RasterState {
            fill: FillMode::WireFrame,
            cull: CullMode::None,
        })));
        assert!(commands.contains(&RenderCommand::BindShader(BaseShader::Pixel(
            PixelShader::VertexColor
        ))));
        assert!(commands.contains(&RenderCommand::UploadMaterial("Default".to_string())));
    }

    #[test]
    fn normals_pass_binds_and_unbinds_geometry_shader() {
        let mut context = without_gizmos();
        context.add_object(cube("stone", false)).unwrap();
        context.rendering_flags_mut().insert(RenderFlags::DRAW_NORMALS);
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);
        let commands = recorder.commands();
        let bind = commands
            .iter()
            .position(|c| *c == RenderCommand::BindShader(BaseShader::Geometry(GeometryShader::Normal)));
        let unbind = commands
            .iter()
            .position(|c| *c == RenderCommand::UnbindGeometryShader);
        assert!(bind.is_some() && unbind.is_some());
        assert!(bind < unbind);
        assert_eq!(recorder.draw_count(), 2);
    }

    #[test]
    fn gizmo_draws_three_handles_with_highlight() {
        let mut context = EditorContext::default();
        context.add_object(cube("stone", false)).unwrap();
        context.select_object("stone").unwrap();
        context.gizmo.begin_drag(GizmoAxis::Y, glam::Vec2::ZERO, Vec3::ZERO);
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);

        let colors: Vec<Vec4> = recorder
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::UploadGizmoColor(color) => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(
            colors,
            vec![NORMAL_COLOR_FACTOR, HIGHLIGHT_COLOR_FACTOR, NORMAL_COLOR_FACTOR]
        );
        assert_eq!(recorder.draw_count(), 4);
    }

    #[test]
    fn no_selection_means_no_gizmo() {
        let mut context = EditorContext::default();
        context.add_object(cube("stone", false)).unwrap();
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);
        assert_eq!(recorder.draw_count(), 1);
    }

    #[test]
    fn picking_data_draws_ray_and_triangle() {
        let mut context = without_gizmos();
        context.add_object(cube("stone", false)).unwrap();
        let mut input = InputSnapshot::default();
        input.mouse.x = 652.0;
        input.mouse.y = 351.0;
        input.mouse.left = true;
        context.update(&input, 0.016);
        assert_eq!(context.selected_name(), Some("stone"));

        context
            .rendering_flags_mut()
            .insert(RenderFlags::DRAW_PICKING_DATA);
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);
        let line_draws: Vec<u32> = recorder
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawLines { vertex_count, .. } => Some(*vertex_count),
                _ => None,
            })
            .collect();
        assert_eq!(line_draws, vec![2, 6]);
    }

    #[test]
    fn objects_2d_use_orthographic_projection() {
        let mut context = without_gizmos();
        context
            .add_object_2d(Object2D::new(
                "badge",
                primitives::screen_quad(64.0, 32.0, Vec4::ONE),
            ))
            .unwrap();
        let mut recorder = CommandRecorder::new();
        context.draw(&mut recorder);
        let orthographic = context.projection().orthographic();
        assert!(recorder.commands().iter().any(|c| matches!(
            c,
            RenderCommand::UploadTransform(constants) if constants.view_projection == orthographic
        )));
        assert_eq!(recorder.draw_count(), 1);
    }
}
