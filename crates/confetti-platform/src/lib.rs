//! Collaborator traits so `confetti-render` stays independent of any graphics API,
//! image decoder, or shader storage.

use std::path::Path;

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Compiler or linker rejection, with the driver's diagnostic text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    #[error("{stage:?} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    Link { log: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

impl TextureId {
    /// Returned when a texture could not be loaded. Drawing with it is undefined.
    pub const INVALID: TextureId = TextureId(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// `result = src * src_factor + dst * dst_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendState {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Mat4(Mat4),
    Vec3(Vec3),
    Vec4(Vec4),
    Float(f32),
    Int(i32),
}

/// Decoded image, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.pixels
    }
}

/// Thin command surface over the graphics API. One instance is owned by the renderer.
pub trait GraphicsDevice {
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> std::result::Result<ProgramId, ShaderError>;
    /// Uploads tightly packed `vec3` positions.
    fn create_quad_geometry(&mut self, positions: &[u8]) -> Result<GeometryId>;
    fn use_program(&mut self, program: Option<ProgramId>);
    /// `None` disables blending.
    fn set_blend(&mut self, blend: Option<BlendState>);
    fn set_uniform(&mut self, program: ProgramId, name: &str, value: Uniform);
    fn bind_texture(&mut self, unit: u32, texture: TextureId);
    fn bind_geometry(&mut self, geometry: Option<GeometryId>);
    fn draw_triangles(&mut self, vertex_count: u32);
    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureId>;
}

/// Decodes image files into RGB8 pixels.
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<ImageData>;
}

/// Supplies shader text by resource name.
pub trait ShaderSource {
    fn load(&self, name: &str) -> Result<String>;
}
