//! sceneforge - interactive 3D scene editor core
//!
//! CPU ray picking against bounding spheres and triangles, a
//! translate/rotate/scale gizmo driven by the mouse, and named entity pools
//! for objects, cameras, materials, lines and 2D overlays. Drawing goes
//! through the [`render::RenderBackend`] trait, so the core never owns a GPU
//! device.

pub mod app;
pub mod config;
pub mod editor;
pub mod math;
pub mod render;
pub mod scene;
pub mod ui;
