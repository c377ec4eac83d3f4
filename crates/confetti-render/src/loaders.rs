//! File-backed shader and image collaborators.

use std::path::{Path, PathBuf};

use confetti_platform::{ImageData, ImageLoader, Result, ShaderSource};

/// Decodes PNG/JPEG files with the `image` crate, dropping any alpha channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> Result<ImageData> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(ImageData {
            width,
            height,
            pixels: rgb.into_raw(),
        })
    }
}

/// Reads shader text from files under `root`.
#[derive(Debug, Clone)]
pub struct FileShaderSource {
    root: PathBuf,
}

impl FileShaderSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ShaderSource for FileShaderSource {
    fn load(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()).into())
    }
}
