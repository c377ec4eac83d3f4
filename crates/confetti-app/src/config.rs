use std::path::{Path, PathBuf};

use confetti_core::EffectConfig;
use confetti_platform::Result;
use confetti_render::BlendMode;
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub effect: EffectConfig,
    pub blend: BlendMode,
    pub texture: Option<PathBuf>,
    pub shader_dir: PathBuf,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
    pub frames: u32,
    pub frame_dt: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            effect: EffectConfig::confetti(),
            blend: BlendMode::Alpha,
            texture: Some(PathBuf::from("textures/particle.png")),
            shader_dir: PathBuf::from("shaders"),
            vertex_shader: "billboard.vs".into(),
            fragment_shader: "billboard.fs".into(),
            width: 500,
            height: 500,
            fov_degrees: 30.0,
            near: 0.1,
            far: 10.0,
            eye: Vec3::new(0.0, 0.0, 4.0),
            target: Vec3::ZERO,
            frames: 600,
            frame_dt: 1.0 / 60.0,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
        Ok(toml::from_str(&text)?)
    }
}
