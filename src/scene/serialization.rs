use crate::render::Camera;
use crate::scene::material::MaterialData;
use crate::scene::object::{Object2D, Object3D, Object3DLine};
use crate::scene::pool::PoolError;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene: {0}")]
    Pool(#[from] PoolError),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

/// Everything that is saved with a scene. Backend buffer handles and
/// derived matrices are not part of it.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub objects: Vec<Object3D>,
    #[serde(default)]
    pub cameras: Vec<Camera>,
    #[serde(default)]
    pub materials: Vec<MaterialData>,
    #[serde(default)]
    pub lines: Vec<Object3DLine>,
    #[serde(default)]
    pub objects_2d: Vec<Object2D>,
}

pub fn save_scene_to_file(scene: &SceneDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(scene)?;
    std::fs::write(path, json)?;
    log::info!("Saved scene to {:?}", path);
    Ok(())
}

pub fn load_scene_from_file(path: &Path) -> Result<SceneDocument> {
    let json = std::fs::read_to_string(path)?;
    let scene: SceneDocument = serde_json::from_str(&json)?;
    log::info!("Loaded scene from {:?}", path);
    Ok(scene)
}
