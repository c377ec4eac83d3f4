//! Camera-facing quad renderer for Confetti particle systems.
//!
//! Everything that touches the graphics API goes through
//! [`confetti_platform::GraphicsDevice`]; [`RecordingDevice`] is the headless backend.

mod blend;
mod camera;
mod error;
mod loaders;
mod recording;
mod renderer;

pub use blend::BlendMode;
pub use camera::Camera;
pub use error::{RenderError, Result};
pub use loaders::{FileImageLoader, FileShaderSource};
pub use recording::{DeviceCommand, RecordingDevice};
pub use renderer::{DrawSession, Renderer, RendererState};
