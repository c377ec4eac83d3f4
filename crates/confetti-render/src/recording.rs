//! Headless [`GraphicsDevice`] that records every command instead of submitting it.

use std::collections::HashMap;

use confetti_platform::{
    BlendState, GeometryId, GraphicsDevice, ImageData, ProgramId, Result, ShaderError, ShaderStage,
    TextureId, Uniform,
};
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateProgram(ProgramId),
    CreateGeometry { id: GeometryId, vertex_count: usize },
    UseProgram(Option<ProgramId>),
    SetBlend(Option<BlendState>),
    SetUniform { name: String, value: Uniform },
    BindTexture { unit: u32, texture: TextureId },
    BindGeometry(Option<GeometryId>),
    DrawTriangles { vertex_count: u32 },
    UploadTexture { id: TextureId, width: u32, height: u32 },
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<DeviceCommand>,
    program: Option<ProgramId>,
    blend: Option<BlendState>,
    uniforms: HashMap<String, Uniform>,
    next_id: u32,
    pending_failure: Option<ShaderError>,
    draw_calls: usize,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create_program` fail with `error`.
    pub fn fail_next_program(&mut self, error: ShaderError) {
        self.pending_failure = Some(error);
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn current_blend(&self) -> Option<BlendState> {
        self.blend
    }

    /// Last value written to `name`.
    pub fn uniform(&self, name: &str) -> Option<Uniform> {
        self.uniforms.get(name).copied()
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    fn allocate_id(&mut self) -> u32 {
        // Zero is reserved for invalid handles.
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, command: DeviceCommand) {
        trace!(?command, "device command");
        self.commands.push(command);
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> std::result::Result<ProgramId, ShaderError> {
        if let Some(error) = self.pending_failure.take() {
            return Err(error);
        }
        for (stage, source) in [
            (ShaderStage::Vertex, vertex_source),
            (ShaderStage::Fragment, fragment_source),
        ] {
            if source.trim().is_empty() {
                return Err(ShaderError::Compile {
                    stage,
                    log: "empty shader source".into(),
                });
            }
        }
        let id = ProgramId(self.allocate_id());
        self.record(DeviceCommand::CreateProgram(id));
        Ok(id)
    }

    fn create_quad_geometry(&mut self, positions: &[u8]) -> Result<GeometryId> {
        const VERTEX_BYTES: usize = 3 * std::mem::size_of::<f32>();
        if positions.is_empty() || positions.len() % VERTEX_BYTES != 0 {
            return Err(format!("{} bytes is not a whole number of vec3 positions", positions.len()).into());
        }
        let id = GeometryId(self.allocate_id());
        self.record(DeviceCommand::CreateGeometry {
            id,
            vertex_count: positions.len() / VERTEX_BYTES,
        });
        Ok(id)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.program = program;
        self.record(DeviceCommand::UseProgram(program));
    }

    fn set_blend(&mut self, blend: Option<BlendState>) {
        self.blend = blend;
        self.record(DeviceCommand::SetBlend(blend));
    }

    fn set_uniform(&mut self, _program: ProgramId, name: &str, value: Uniform) {
        self.uniforms.insert(name.to_owned(), value);
        self.record(DeviceCommand::SetUniform {
            name: name.to_owned(),
            value,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.record(DeviceCommand::BindTexture { unit, texture });
    }

    fn bind_geometry(&mut self, geometry: Option<GeometryId>) {
        self.record(DeviceCommand::BindGeometry(geometry));
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.draw_calls += 1;
        self.record(DeviceCommand::DrawTriangles { vertex_count });
    }

    fn upload_texture(&mut self, image: &ImageData) -> Result<TextureId> {
        let expected = image.width() as usize * image.height() as usize * 3;
        if image.width() == 0 || image.height() == 0 || image.data().len() != expected {
            return Err(format!(
                "{}x{} image needs {expected} RGB bytes, got {}",
                image.width(),
                image.height(),
                image.data().len()
            )
            .into());
        }
        let id = TextureId(self.allocate_id());
        self.record(DeviceCommand::UploadTexture {
            id,
            width: image.width(),
            height: image.height(),
        });
        Ok(id)
    }
}
