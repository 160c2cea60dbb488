use crate::render::{RenderFlags, DEFAULT_FAR_Z, DEFAULT_FOV_DEGREES, DEFAULT_NEAR_Z};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "SCENEFORGE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub fov_degrees: f32,
    pub near_z: f32,
    pub far_z: f32,
    /// Camera units per second for W/A/S/D.
    pub camera_movement_factor: f32,
    pub camera_rotation_factor: f32,
    pub picking_ray_length: f32,
    pub rendering_flags: RenderFlags,
    pub clear_color: [f32; 4],
    /// Where F5 saves and F9 loads the scene.
    pub scene_path: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_title: "sceneforge".to_string(),
            window_width: 1280,
            window_height: 720,
            fov_degrees: DEFAULT_FOV_DEGREES,
            near_z: DEFAULT_NEAR_Z,
            far_z: DEFAULT_FAR_Z,
            camera_movement_factor: 10.0,
            camera_rotation_factor: 1.0,
            picking_ray_length: 1000.0,
            rendering_flags: RenderFlags::USE_3D_GIZMOS | RenderFlags::USE_LIGHTING,
            clear_color: [0.2, 0.6, 0.9, 1.0],
            scene_path: PathBuf::from("scene.json"),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads the file named by `SCENEFORGE_CONFIG`, falling back to defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        let path = PathBuf::from(path);
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                log::warn!("Failed to load config {:?}: {}; using defaults", path, err);
                Self::default()
            }
        }
    }
}
