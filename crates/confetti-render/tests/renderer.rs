use std::path::Path;

use confetti_core::{EffectConfig, ParticleView};
use confetti_platform::{
    BlendFactor, BlendState, ImageData, ImageLoader, ShaderError, ShaderStage, TextureId, Uniform,
};
use confetti_render::{
    BlendMode, DeviceCommand, FileShaderSource, RecordingDevice, RenderError, Renderer,
    RendererState,
};
use glam::{Vec3, Vec4};

const VERTEX: &str = "void main() { gl_Position = vec4(0.0); }";
const FRAGMENT: &str = "out vec4 c; void main() { c = vec4(1.0); }";

fn ready_renderer() -> Renderer<RecordingDevice> {
    let mut renderer = Renderer::new(RecordingDevice::new());
    renderer.init(VERTEX, FRAGMENT).unwrap();
    renderer
}

struct SolidImage;

impl ImageLoader for SolidImage {
    fn load(&self, _path: &Path) -> confetti_platform::Result<ImageData> {
        Ok(ImageData {
            width: 2,
            height: 2,
            pixels: vec![255; 12],
        })
    }
}

struct BrokenImage;

impl ImageLoader for BrokenImage {
    fn load(&self, path: &Path) -> confetti_platform::Result<ImageData> {
        Err(format!("{} is not an image", path.display()).into())
    }
}

fn drawn_offsets(device: &RecordingDevice) -> Vec<Vec3> {
    device
        .commands()
        .iter()
        .filter_map(|command| match command {
            DeviceCommand::SetUniform {
                name,
                value: Uniform::Vec3(v),
            } if name == "uOffset" => Some(*v),
            _ => None,
        })
        .collect()
}

#[test]
fn perspective_camera_single_quad_scenario() {
    let mut renderer = ready_renderer();
    renderer
        .set_perspective(30f32.to_radians(), 1.0, 0.1, 100.0)
        .unwrap();
    renderer
        .set_camera(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO)
        .unwrap();

    renderer.begin(TextureId(1), BlendMode::Default).unwrap();
    renderer
        .draw_particle(Vec3::ZERO, Vec4::ONE, 1.0)
        .unwrap();
    renderer.end().unwrap();

    assert_eq!(renderer.state(), RendererState::Initialized);
    let device = renderer.device();
    assert_eq!(device.draw_calls(), 1);
    assert_eq!(
        device.uniform("uVP"),
        Some(Uniform::Mat4(renderer.camera().view_projection()))
    );
    assert_eq!(
        device.uniform("uCameraPos"),
        Some(Uniform::Vec3(Vec3::new(0.0, 0.0, 4.0)))
    );
    assert_eq!(device.uniform("uSize"), Some(Uniform::Float(1.0)));
    assert!(device
        .commands()
        .contains(&DeviceCommand::DrawTriangles { vertex_count: 6 }));
    assert_eq!(device.current_program(), None);
    assert_eq!(device.current_blend(), None);
}

#[test]
fn draws_outside_a_session_are_rejected() {
    let mut renderer = ready_renderer();
    assert!(matches!(
        renderer.draw_particle(Vec3::ZERO, Vec4::ONE, 1.0),
        Err(RenderError::ContractViolation(_))
    ));

    renderer.begin(TextureId(1), BlendMode::Add).unwrap();
    renderer.end().unwrap();
    assert_eq!(renderer.state(), RendererState::Initialized);

    assert!(matches!(
        renderer.draw_particle(Vec3::ZERO, Vec4::ONE, 1.0),
        Err(RenderError::ContractViolation(_))
    ));
    assert!(matches!(renderer.end(), Err(RenderError::ContractViolation(_))));
    assert_eq!(renderer.device().draw_calls(), 0);
}

#[test]
fn nested_begin_and_camera_changes_in_session_are_rejected() {
    let mut renderer = ready_renderer();
    renderer.begin(TextureId(1), BlendMode::Alpha).unwrap();
    assert!(matches!(
        renderer.begin(TextureId(1), BlendMode::Add),
        Err(RenderError::ContractViolation(_))
    ));
    assert!(matches!(
        renderer.set_camera(Vec3::ONE, Vec3::ZERO),
        Err(RenderError::ContractViolation(_))
    ));
    // The rejected begin must not have changed the active blend mode.
    assert_eq!(renderer.state(), RendererState::InSession(BlendMode::Alpha));
    renderer.end().unwrap();
}

#[test]
fn uninitialized_renderer_rejects_everything_but_init() {
    let mut renderer = Renderer::new(RecordingDevice::new());
    assert!(matches!(
        renderer.begin(TextureId(1), BlendMode::Default),
        Err(RenderError::NotInitialized)
    ));
    assert!(matches!(
        renderer.draw_particle(Vec3::ZERO, Vec4::ONE, 1.0),
        Err(RenderError::NotInitialized)
    ));
    assert!(matches!(renderer.end(), Err(RenderError::NotInitialized)));
    assert!(matches!(
        renderer.set_perspective(1.0, 1.0, 0.1, 10.0),
        Err(RenderError::NotInitialized)
    ));
    assert_eq!(
        renderer.load_texture(&SolidImage, Path::new("a.png")),
        TextureId::INVALID
    );
    assert!(renderer.device().commands().is_empty());
}

#[test]
fn shader_failure_keeps_renderer_uninitialized() {
    let mut renderer = Renderer::new(RecordingDevice::new());
    renderer.device_mut().fail_next_program(ShaderError::Link {
        log: "undefined uColor".into(),
    });
    let err = renderer.init(VERTEX, FRAGMENT).unwrap_err();
    assert!(err.to_string().contains("undefined uColor"));
    assert_eq!(renderer.state(), RendererState::Uninitialized);

    let err = renderer.init("", FRAGMENT).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Initialization(ShaderError::Compile {
            stage: ShaderStage::Vertex,
            ..
        })
    ));
    assert!(!renderer.is_initialized());

    renderer.init(VERTEX, FRAGMENT).unwrap();
    assert_eq!(renderer.state(), RendererState::Initialized);
}

#[test]
fn failed_reinit_drops_the_previous_program() {
    let mut renderer = ready_renderer();
    renderer.device_mut().fail_next_program(ShaderError::Compile {
        stage: ShaderStage::Fragment,
        log: "syntax error".into(),
    });
    assert!(renderer.init(VERTEX, FRAGMENT).is_err());
    assert_eq!(renderer.state(), RendererState::Uninitialized);
    assert!(matches!(
        renderer.begin(TextureId(1), BlendMode::Default),
        Err(RenderError::NotInitialized)
    ));

    renderer.init(VERTEX, FRAGMENT).unwrap();
    renderer.begin(TextureId(1), BlendMode::Default).unwrap();
    renderer.end().unwrap();
}

#[test]
fn degenerate_camera_keeps_eye_and_view_consistent() {
    let mut renderer = ready_renderer();
    let eye = Vec3::new(0.0, 0.0, 10.0);
    renderer.set_camera(eye, Vec3::ZERO).unwrap();
    let view = renderer.camera().view();

    renderer.set_camera(Vec3::ONE, Vec3::ONE).unwrap();
    assert_eq!(renderer.camera_position(), eye);
    assert_eq!(renderer.camera().view(), view);

    renderer.begin(TextureId(1), BlendMode::Alpha).unwrap();
    assert_eq!(renderer.device().uniform("uCameraPos"), Some(Uniform::Vec3(eye)));
    renderer.end().unwrap();
}

#[test]
fn blend_modes_map_to_distinct_device_states() {
    let mut renderer = ready_renderer();
    let mut seen = Vec::new();
    for mode in [BlendMode::Default, BlendMode::Add, BlendMode::Alpha] {
        renderer.begin(TextureId(1), mode).unwrap();
        seen.push(renderer.device().current_blend());
        renderer.end().unwrap();
        assert_eq!(renderer.device().current_blend(), None);
    }
    assert_eq!(seen[0], None);
    assert_eq!(
        seen[1],
        Some(BlendState {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::One,
        })
    );
    assert_eq!(
        seen[2],
        Some(BlendState {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
        })
    );
}

#[test]
fn dropped_session_restores_device_state() {
    fn draw_then_fail(renderer: &mut Renderer<RecordingDevice>) -> Result<(), RenderError> {
        let mut session = renderer.session(TextureId(1), BlendMode::Add)?;
        session.draw_particle(Vec3::ZERO, Vec4::ONE, 0.5)?;
        Err(RenderError::ContractViolation("simulated mid-frame failure"))
    }

    let mut renderer = ready_renderer();
    assert!(draw_then_fail(&mut renderer).is_err());
    assert_eq!(renderer.state(), RendererState::Initialized);
    assert_eq!(renderer.device().current_program(), None);
    assert_eq!(renderer.device().current_blend(), None);

    let session = renderer.session(TextureId(1), BlendMode::Default).unwrap();
    assert_eq!(session.mode(), Some(BlendMode::Default));
    session.finish().unwrap();
    assert_eq!(renderer.state(), RendererState::Initialized);
}

#[test]
fn alpha_sessions_draw_back_to_front() {
    let mut renderer = ready_renderer();
    renderer
        .set_camera(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
        .unwrap();
    let particles = [0.0f32, 5.0, -3.0, 2.0].map(|z| ParticleView {
        position: Vec3::new(0.0, 0.0, z),
        color: Vec4::ONE,
        size: 1.0,
    });

    let mut session = renderer.session(TextureId(1), BlendMode::Alpha).unwrap();
    assert_eq!(session.draw_all(particles).unwrap(), 4);
    session.finish().unwrap();
    let zs: Vec<f32> = drawn_offsets(renderer.device()).iter().map(|v| v.z).collect();
    assert_eq!(zs, vec![-3.0, 0.0, 2.0, 5.0]);

    renderer.device_mut().take_commands();
    let mut session = renderer.session(TextureId(1), BlendMode::Add).unwrap();
    session.draw_all(particles).unwrap();
    drop(session);
    let zs: Vec<f32> = drawn_offsets(renderer.device()).iter().map(|v| v.z).collect();
    assert_eq!(zs, vec![0.0, 5.0, -3.0, 2.0]);
}

#[test]
fn draws_a_simulated_pool() {
    let mut system = EffectConfig {
        max_particles: 50,
        seed: Some(3),
        ..EffectConfig::confetti()
    }
    .build()
    .unwrap();
    system.update(0.1);

    let mut renderer = ready_renderer();
    let mut session = renderer.session(TextureId(1), BlendMode::Alpha).unwrap();
    let drawn = session.draw_all(system.alive()).unwrap();
    session.finish().unwrap();
    assert_eq!(drawn, system.alive_count());
    assert_eq!(renderer.device().draw_calls(), drawn);
}

#[test]
fn texture_loading_is_non_fatal() {
    let mut renderer = ready_renderer();
    let good = renderer.load_texture(&SolidImage, Path::new("solid.png"));
    assert!(good.is_valid());
    let bad = renderer.load_texture(&BrokenImage, Path::new("missing.png"));
    assert_eq!(bad, TextureId::INVALID);
    assert_eq!(renderer.state(), RendererState::Initialized);
}

#[test]
fn texture_upload_is_refused_inside_a_session() {
    let mut renderer = ready_renderer();
    renderer.begin(TextureId(1), BlendMode::Add).unwrap();
    renderer.device_mut().take_commands();

    let id = renderer.load_texture(&SolidImage, Path::new("solid.png"));
    assert_eq!(id, TextureId::INVALID);
    assert!(renderer.device().commands().is_empty());
    assert_eq!(renderer.state(), RendererState::InSession(BlendMode::Add));

    renderer.end().unwrap();
    assert!(renderer.load_texture(&SolidImage, Path::new("solid.png")).is_valid());
}

#[test]
fn missing_shader_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("billboard.vs"), VERTEX).unwrap();
    let shaders = FileShaderSource::new(dir.path());

    let mut renderer = Renderer::new(RecordingDevice::new());
    let err = renderer
        .init_from_source(&shaders, "billboard.vs", "billboard.fs")
        .unwrap_err();
    assert!(matches!(err, RenderError::ShaderSource { ref name, .. } if name == "billboard.fs"));
    assert!(!renderer.is_initialized());

    std::fs::write(dir.path().join("billboard.fs"), FRAGMENT).unwrap();
    renderer
        .init_from_source(&shaders, "billboard.vs", "billboard.fs")
        .unwrap();
    assert!(renderer.is_initialized());
}
