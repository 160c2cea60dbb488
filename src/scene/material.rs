use crate::scene::pool::Named;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Texture file names attached to a material. Loading is done elsewhere;
/// the editor only carries the paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureSlots {
    pub diffuse: Option<String>,
    pub normal: Option<String>,
    pub opacity: Option<String>,
    pub specular_intensity: Option<String>,
    pub roughness: Option<String>,
    pub metalness: Option<String>,
    pub ambient_occlusion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    pub name: String,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub specular_exponent: f32,
    pub specular_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    #[serde(default)]
    pub textures: TextureSlots,
}

impl MaterialData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient_color: Vec3::ONE,
            diffuse_color: Vec3::ONE,
            specular_color: Vec3::ONE,
            specular_exponent: 1.0,
            specular_intensity: 0.0,
            roughness: 0.0,
            metalness: 0.0,
            textures: TextureSlots::default(),
        }
    }

    /// Sets ambient, diffuse and specular to the same color.
    pub fn with_uniform_color(mut self, color: Vec3) -> Self {
        self.ambient_color = color;
        self.diffuse_color = color;
        self.specular_color = color;
        self
    }

    pub fn has_texture(&self) -> bool {
        self.textures.diffuse.is_some()
    }
}

impl Default for MaterialData {
    fn default() -> Self {
        Self::new("Default")
    }
}

impl Named for MaterialData {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}
