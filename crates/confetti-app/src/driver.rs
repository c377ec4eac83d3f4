use confetti_core::ParticleSystem;
use confetti_platform::{GraphicsDevice, ImageLoader, Result, ShaderSource, TextureId};
use confetti_render::{BlendMode, Renderer};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

/// Longest step fed to the simulation; stalls beyond this are absorbed.
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub quads: u64,
    pub peak_alive: usize,
}

/// Owns the simulation and renderer and steps them once per frame.
pub struct FrameDriver<D: GraphicsDevice> {
    system: ParticleSystem,
    renderer: Renderer<D>,
    texture: TextureId,
    blend: BlendMode,
    fov_radians: f32,
    near: f32,
    far: f32,
    stats: FrameStats,
}

impl<D: GraphicsDevice> FrameDriver<D> {
    pub fn new(
        config: &AppConfig,
        device: D,
        shaders: &dyn ShaderSource,
        images: &dyn ImageLoader,
    ) -> Result<Self> {
        let system = config.effect.build()?;
        let mut renderer = Renderer::new(device);
        renderer.init_from_source(shaders, &config.vertex_shader, &config.fragment_shader)?;

        let texture = match &config.texture {
            Some(path) => renderer.load_texture(images, path),
            None => {
                warn!("no particle texture configured");
                TextureId::INVALID
            }
        };

        let mut driver = Self {
            system,
            renderer,
            texture,
            blend: config.blend,
            fov_radians: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            stats: FrameStats::default(),
        };
        driver.resize(config.width, config.height)?;
        driver.renderer.set_camera(config.eye, config.target)?;
        info!(
            effect = %config.effect.name,
            capacity = driver.system.capacity(),
            blend = ?driver.blend,
            "frame driver ready"
        );
        Ok(driver)
    }

    /// Window resize: keeps the field of view and follows the new aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let height = height.max(1);
        let aspect = width.max(1) as f32 / height as f32;
        self.renderer
            .set_perspective(self.fov_radians, aspect, self.near, self.far)?;
        debug!(width, height, aspect, "projection updated");
        Ok(())
    }

    /// Advances the simulation and draws every live particle. Returns the
    /// number of quads drawn.
    pub fn frame(&mut self, dt: f32) -> Result<usize> {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.system.update(dt);

        let mut session = self.renderer.session(self.texture, self.blend)?;
        let drawn = session.draw_all(self.system.alive())?;
        session.finish()?;

        self.stats.frames += 1;
        self.stats.quads += drawn as u64;
        self.stats.peak_alive = self.stats.peak_alive.max(drawn);
        Ok(drawn)
    }

    pub fn run(&mut self, frames: u32, dt: f32) -> Result<FrameStats> {
        for _ in 0..frames {
            self.frame(dt)?;
        }
        info!(
            frames = self.stats.frames,
            quads = self.stats.quads,
            peak_alive = self.stats.peak_alive,
            "run finished"
        );
        Ok(self.stats)
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn renderer(&self) -> &Renderer<D> {
        &self.renderer
    }
}
