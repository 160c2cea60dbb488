mod input;
mod timing;

use crate::config::EditorConfig;
use crate::editor::EditorContext;
use crate::render::{Camera, CameraKind, CommandRecorder};
use crate::scene::material::MaterialData;
use crate::scene::object::{LineVertex, Object2D, Object3D, Object3DLine, ObjectFlags};
use crate::scene::pool;
use crate::scene::primitives;
use crate::scene::serialization::{load_scene_from_file, save_scene_to_file};
use input::{InputAction, InputState};
use timing::FrameTiming;

use glam::{Vec2, Vec3, Vec4};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

pub struct App {
    window: Option<Arc<Window>>,
    config: EditorConfig,
    editor: EditorContext,
    backend: CommandRecorder,
    input: InputState,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: EditorConfig) -> Self {
        let mut editor = EditorContext::new(&config);
        if let Err(err) = build_demo_scene(&mut editor) {
            log::warn!("Demo scene incomplete: {}", err);
        }
        Self {
            window: None,
            timing: FrameTiming::new(config.window_title.clone()),
            config,
            editor,
            backend: CommandRecorder::new(),
            input: InputState::default(),
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.editor
            .set_viewport(new_size.width as f32, new_size.height as f32);
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    /// One update and one draw. Returns false when the editor asked to quit.
    fn frame(&mut self) -> bool {
        let status = match self.editor.selected_name() {
            Some(name) => format!("{} [{}]", name, self.editor.gizmo().mode().label()),
            None => format!("{} objects", self.editor.objects().len()),
        };
        if let Some(title) = self.timing.update(Instant::now(), &status) {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
        }

        let outcome = self
            .editor
            .update(&self.input.snapshot(), self.timing.frame_dt);
        if outcome.exit_requested {
            return false;
        }
        self.editor.draw(&mut self.backend);
        self.backend.finish_frame();
        true
    }

    fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::SaveScene => self.handle_save_scene_action(),
            InputAction::LoadScene => self.handle_load_scene_action(),
            InputAction::None => {}
        }
    }

    fn handle_save_scene_action(&mut self) {
        let path = &self.config.scene_path;
        if let Err(e) = save_scene_to_file(&self.editor.to_document(), path) {
            log::warn!("Failed to save scene: {}", e);
        }
    }

    fn handle_load_scene_action(&mut self) {
        let path = &self.config.scene_path;
        match load_scene_from_file(path) {
            Ok(document) => {
                if let Err(e) = self.editor.apply_document(document) {
                    log::warn!("Scene {:?} rejected: {}", path, e);
                }
            }
            Err(e) => {
                log::warn!("Failed to load scene: {}", e);
            }
        }
    }
}

/// Startup content: a floor, a few primitives, an axis marker and a badge.
fn build_demo_scene(editor: &mut EditorContext) -> pool::Result<()> {
    editor.add_material(MaterialData::new("Floor").with_uniform_color(Vec3::splat(0.4)))?;
    editor.add_material(MaterialData::new("Red").with_uniform_color(Vec3::new(0.8, 0.1, 0.1)))?;

    let mut floor = Object3D::new("Floor");
    floor.create(
        vec![primitives::ground_quad(20.0, 20.0, Vec4::ONE)],
        vec![MaterialData::new("Floor").with_uniform_color(Vec3::splat(0.4))],
    );
    floor.pickable = false;
    floor.flags.insert(ObjectFlags::NO_CULLING);
    editor.add_object(floor)?;

    let mut cube = Object3D::new("Cube");
    cube.create(
        vec![primitives::cube(1.0, Vec4::ONE)],
        vec![MaterialData::new("Red").with_uniform_color(Vec3::new(0.8, 0.1, 0.1))],
    );
    cube.transform.translation = Vec3::new(-1.5, 0.5, 6.0);
    editor.add_object(cube)?;

    let mut ball = Object3D::new("Sphere");
    ball.create(vec![primitives::sphere(24, Vec4::new(0.2, 0.6, 1.0, 1.0))], Vec::new());
    ball.flags.insert(ObjectFlags::USE_RAW_VERTEX_COLOR);
    ball.transform.translation = Vec3::new(1.5, 1.0, 6.0);
    editor.add_object(ball)?;

    let mut glass = Object3D::new("Glass");
    glass.create(vec![primitives::cube(1.0, Vec4::new(1.0, 1.0, 1.0, 0.4))], Vec::new());
    glass.transparent = true;
    glass.transform.translation = Vec3::new(0.0, 0.5, 9.0);
    glass.transform.scaling = Vec3::new(3.0, 1.0, 0.2);
    editor.add_object(glass)?;

    let axis = [
        (Vec3::X, Vec4::new(1.0, 0.0, 0.0, 1.0)),
        (Vec3::Y, Vec4::new(0.0, 1.0, 0.0, 1.0)),
        (Vec3::Z, Vec4::new(0.0, 0.0, 1.0, 1.0)),
    ]
    .into_iter()
    .flat_map(|(dir, color)| [LineVertex::new(Vec3::ZERO, color), LineVertex::new(dir, color)])
    .collect();
    editor.add_line(Object3DLine::new("World Axis", axis))?;

    let mut badge = Object2D::new("Badge", primitives::screen_quad(48.0, 48.0, Vec4::ONE));
    badge.translation = Vec2::new(-580.0, 300.0);
    editor.add_object_2d(badge)?;

    let mut overview = Camera::new("Overview", CameraKind::FreeLook).with_position(Vec3::new(0.0, 8.0, -4.0));
    overview.look_at(Vec3::new(0.0, 0.0, 6.0));
    editor.add_camera(overview)?;

    Ok(())
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        self.handle_resize(window.inner_size());
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    self.input.release_all();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let action = self.input.handle_key(event.physical_key, pressed);
                self.handle_action(action);
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .handle_cursor(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input
                    .handle_mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                if !self.frame() {
                    log::info!("Exit requested");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("sceneforge editor");
    log::info!("   1/2/3 gizmo mode, F1-F4 overlays, F5 save, F9 load, Alt+Q quit");

    let config = EditorConfig::from_env();
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {}", err);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
    }

    log::info!("Goodbye");
}
