use std::path::Path;

use confetti_core::ParticleView;
use confetti_platform::{
    GeometryId, GraphicsDevice, ImageLoader, ProgramId, ShaderSource, TextureId, Uniform,
};
use glam::{Vec3, Vec4};
use tracing::{debug, error, info, warn};

use crate::blend::BlendMode;
use crate::camera::Camera;
use crate::error::{RenderError, Result};

/// Unit quad in the XY plane as two triangles. The vertex shader turns it to face
/// the camera and scales it by `uSize` around `uOffset`.
const QUAD_POSITIONS: [[f32; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

const TEXTURE_UNIT: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Uninitialized,
    Initialized,
    InSession(BlendMode),
}

struct Pipeline {
    program: ProgramId,
    geometry: GeometryId,
}

/// Draws particles as camera-facing quads through one shared program.
///
/// Constructed once by the frame driver and passed by `&mut` to whatever draws.
pub struct Renderer<D: GraphicsDevice> {
    device: D,
    camera: Camera,
    pipeline: Option<Pipeline>,
    state: RendererState,
    scratch: Vec<ParticleView>,
}

impl<D: GraphicsDevice> Renderer<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            camera: Camera::default(),
            pipeline: None,
            state: RendererState::Uninitialized,
            scratch: Vec::new(),
        }
    }

    /// Compiles the billboard program and uploads the quad. On failure the
    /// renderer is left uninitialized, even if an earlier init succeeded.
    pub fn init(&mut self, vertex_source: &str, fragment_source: &str) -> Result<()> {
        if let RendererState::InSession(_) = self.state {
            return Err(self.violation("init called during a draw session"));
        }
        self.pipeline = None;
        self.state = RendererState::Uninitialized;

        let program = self
            .device
            .create_program(vertex_source, fragment_source)
            .map_err(|e| {
                error!("shader initialization failed: {e}");
                RenderError::Initialization(e)
            })?;
        let geometry = self
            .device
            .create_quad_geometry(bytemuck::cast_slice::<[f32; 3], u8>(&QUAD_POSITIONS))
            .map_err(RenderError::Device)?;

        self.pipeline = Some(Pipeline { program, geometry });
        self.state = RendererState::Initialized;
        info!(program = program.0, "renderer initialized");
        Ok(())
    }

    /// Loads both shader texts by name, then calls [`init`](Self::init).
    pub fn init_from_source(
        &mut self,
        shaders: &dyn ShaderSource,
        vertex_name: &str,
        fragment_name: &str,
    ) -> Result<()> {
        let load = |name: &str| {
            shaders.load(name).map_err(|source| RenderError::ShaderSource {
                name: name.to_owned(),
                source,
            })
        };
        let vertex = load(vertex_name)?;
        let fragment = load(fragment_name)?;
        self.init(&vertex, &fragment)
    }

    /// Decodes and uploads an image. Failures are logged and yield
    /// [`TextureId::INVALID`]. Uploads are refused inside a draw session.
    pub fn load_texture(&mut self, loader: &dyn ImageLoader, path: &Path) -> TextureId {
        match self.state {
            RendererState::Uninitialized => {
                warn!(path = %path.display(), "texture requested before renderer init");
                return TextureId::INVALID;
            }
            RendererState::InSession(_) => {
                self.violation("texture upload during a draw session");
                return TextureId::INVALID;
            }
            RendererState::Initialized => {}
        }
        let image = match loader.load(path) {
            Ok(image) => image,
            Err(e) => {
                warn!(path = %path.display(), "cannot load texture: {e}");
                return TextureId::INVALID;
            }
        };
        match self.device.upload_texture(&image) {
            Ok(id) => {
                info!(
                    path = %path.display(),
                    width = image.width(),
                    height = image.height(),
                    "texture loaded"
                );
                id
            }
            Err(e) => {
                warn!(path = %path.display(), "cannot upload texture: {e}");
                TextureId::INVALID
            }
        }
    }

    pub fn set_perspective(&mut self, fov_radians: f32, aspect: f32, near: f32, far: f32) -> Result<()> {
        self.require_idle("set_perspective")?;
        self.camera.set_perspective(fov_radians, aspect, near, far);
        Ok(())
    }

    pub fn set_ortho(
        &mut self,
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
        min_z: f32,
        max_z: f32,
    ) -> Result<()> {
        self.require_idle("set_ortho")?;
        self.camera.set_ortho(min_x, max_x, min_y, max_y, min_z, max_z);
        Ok(())
    }

    /// Points the camera from `eye` at `target` with +Y as world up.
    pub fn set_camera(&mut self, eye: Vec3, target: Vec3) -> Result<()> {
        self.require_idle("set_camera")?;
        self.camera.look_at(eye, target);
        Ok(())
    }

    /// Opens a draw session: binds the program, blend state, camera uniforms,
    /// texture and quad geometry.
    pub fn begin(&mut self, texture: TextureId, mode: BlendMode) -> Result<()> {
        self.require_idle("begin")?;
        let Some(pipeline) = &self.pipeline else {
            return Err(RenderError::NotInitialized);
        };
        let program = pipeline.program;
        let geometry = pipeline.geometry;

        self.device.use_program(Some(program));
        self.device.set_blend(mode.blend_state());
        self.device
            .set_uniform(program, "uVP", Uniform::Mat4(self.camera.view_projection()));
        self.device
            .set_uniform(program, "uCameraPos", Uniform::Vec3(self.camera.eye()));
        self.device
            .set_uniform(program, "image", Uniform::Int(TEXTURE_UNIT as i32));
        self.device.bind_texture(TEXTURE_UNIT, texture);
        self.device.bind_geometry(Some(geometry));

        self.state = RendererState::InSession(mode);
        debug!(texture = texture.0, ?mode, "draw session opened");
        Ok(())
    }

    /// Draws one quad centred at `position`. Only valid inside a session.
    pub fn draw_particle(&mut self, position: Vec3, color: Vec4, size: f32) -> Result<()> {
        let program = self.require_session("draw_particle")?;
        self.device
            .set_uniform(program, "uOffset", Uniform::Vec3(position));
        self.device.set_uniform(program, "uColor", Uniform::Vec4(color));
        self.device.set_uniform(program, "uSize", Uniform::Float(size));
        self.device.draw_triangles(QUAD_POSITIONS.len() as u32);
        Ok(())
    }

    /// Closes the session, unbinding the program and disabling blending.
    pub fn end(&mut self) -> Result<()> {
        self.require_session("end")?;
        self.device.bind_geometry(None);
        self.device.set_blend(None);
        self.device.use_program(None);
        self.state = RendererState::Initialized;
        debug!("draw session closed");
        Ok(())
    }

    /// Opens a session that ends when the returned guard is dropped.
    pub fn session(&mut self, texture: TextureId, mode: BlendMode) -> Result<DrawSession<'_, D>> {
        self.begin(texture, mode)?;
        Ok(DrawSession {
            renderer: self,
            finished: false,
        })
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != RendererState::Uninitialized
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera.eye()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn require_idle(&self, operation: &'static str) -> Result<()> {
        match self.state {
            RendererState::Uninitialized => {
                warn!(operation, "renderer used before init");
                Err(RenderError::NotInitialized)
            }
            RendererState::Initialized => Ok(()),
            RendererState::InSession(_) => {
                Err(self.violation("operation not allowed during a draw session"))
            }
        }
    }

    fn require_session(&self, operation: &'static str) -> Result<ProgramId> {
        match (&self.state, &self.pipeline) {
            (RendererState::InSession(_), Some(pipeline)) => Ok(pipeline.program),
            (RendererState::Uninitialized, _) => {
                warn!(operation, "renderer used before init");
                Err(RenderError::NotInitialized)
            }
            _ => Err(self.violation("draw call outside of a draw session")),
        }
    }

    fn violation(&self, what: &'static str) -> RenderError {
        error!(state = ?self.state, "{what}");
        RenderError::ContractViolation(what)
    }
}

/// Scoped draw session. Dropping it ends the session, so blend state and the
/// bound program never leak into the next one.
pub struct DrawSession<'a, D: GraphicsDevice> {
    renderer: &'a mut Renderer<D>,
    finished: bool,
}

impl<'a, D: GraphicsDevice> DrawSession<'a, D> {
    pub fn draw_particle(&mut self, position: Vec3, color: Vec4, size: f32) -> Result<()> {
        self.renderer.draw_particle(position, color, size)
    }

    /// Draws every particle, sorted back to front first when the blend mode
    /// depends on order. Returns the number of quads drawn.
    pub fn draw_all<I>(&mut self, particles: I) -> Result<usize>
    where
        I: IntoIterator<Item = ParticleView>,
    {
        let mode = match self.renderer.state {
            RendererState::InSession(mode) => mode,
            _ => return Err(self.renderer.violation("draw call outside of a draw session")),
        };

        let mut batch = std::mem::take(&mut self.renderer.scratch);
        batch.clear();
        batch.extend(particles);
        if mode.is_order_dependent() {
            let eye = self.renderer.camera.eye();
            batch.sort_by(|a, b| {
                let da = a.position.distance_squared(eye);
                let db = b.position.distance_squared(eye);
                db.total_cmp(&da)
            });
        }

        let result = batch
            .iter()
            .try_for_each(|p| self.renderer.draw_particle(p.position, p.color, p.size))
            .map(|()| batch.len());
        self.renderer.scratch = batch;
        result
    }

    pub fn mode(&self) -> Option<BlendMode> {
        match self.renderer.state {
            RendererState::InSession(mode) => Some(mode),
            _ => None,
        }
    }

    /// Ends the session explicitly, reporting any error.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.renderer.end()
    }
}

impl<D: GraphicsDevice> Drop for DrawSession<'_, D> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.renderer.end() {
                warn!("draw session did not close cleanly: {e}");
            }
        }
    }
}
