use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use super::*;
use crate::config::{LightingModel, ToneMapping};
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::UniformValue;
use crate::light::{DirectionalLight, PointLight, SpotLight};
use crate::shader::mock_shader_loader::MockShaderLoader;
use crate::texture_registry::TextureRegistry;

const SCREEN: ImageSize = ImageSize::new(32, 16);

fn small_config() -> RendererConfig {
    RendererConfig {
        shadow_map_size: 16,
        cubemap_size: 8,
        irradiance_map_size: 4,
        prefiltered_env_map_size: 8,
        brdf_lut_size: 8,
        ssao_kernel_size: 8,
        ssao_noise_size: 2,
        ssao_seed: 1,
    }
}

fn setup() -> (Rc<MockGraphicsDevice>, DeferredRenderer) {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: Rc<dyn GraphicsDevice> = mock.clone();
    let camera = Rc::new(RefCell::new(Camera::new(Vec3::new(0.0, 0.0, 3.0))));
    let renderer = DeferredRenderer::new(&device, &MockShaderLoader::new(), &small_config(), camera, SCREEN).unwrap();
    mock.clear_commands();
    (mock, renderer)
}

fn pass_labels(mock: &MockGraphicsDevice) -> Vec<String> {
    mock.commands_starting_with("push_debug_group ")
        .into_iter()
        .map(|c| c.trim_start_matches("push_debug_group ").to_string())
        .collect()
}

/// Records the transforms it is drawn with
struct RecordingDrawable(Rc<RefCell<Vec<Mat4>>>);

impl Drawable for RecordingDrawable {
    fn draw_with_transform(&self, transform: Mat4, _shader: &Shader, _registry: Option<&mut TextureRegistry>) -> Result<()> {
        self.0.borrow_mut().push(transform);
        Ok(())
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_construction_computes_brdf_lut_and_enables_culling() {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: Rc<dyn GraphicsDevice> = mock.clone();
    let camera = Rc::new(RefCell::new(Camera::default()));
    let renderer = DeferredRenderer::new(&device, &MockShaderLoader::new(), &small_config(), camera, SCREEN).unwrap();

    assert_eq!(pass_labels(&mock), vec!["BRDF LUT calculation"]);
    assert!(mock.commands().contains(&"face_culling true".to_string()));
    assert_eq!(mock.debug_depth(), 0);
    assert!(!renderer.has_environment());
    assert_eq!(renderer.lighting_registry().borrow().source_count(), 6);
}

// ============================================================================
// Frame order
// ============================================================================

#[test]
fn test_frame_runs_passes_in_dependency_order() {
    let (mock, renderer) = setup();
    renderer.lights().borrow_mut().add_light(DirectionalLight::default());
    renderer.lights().borrow_mut().add_light(PointLight::new(Vec3::ONE));

    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    assert_eq!(
        pass_labels(&mock),
        vec![
            "Directional shadow map",
            "Geometry pass",
            "SSAO pass",
            "Deferred lighting pass",
            "Forward pass",
            "Bloom pass",
            "Tonemap & gamma",
            "FXAA",
        ]
    );
    assert_eq!(mock.debug_depth(), 0);
    assert_eq!(mock.bound_framebuffer(), None);
    assert_eq!(mock.viewport(), Some(Viewport::full(32, 16)));
}

#[test]
fn test_ssao_blur_uses_noise_tile_size() {
    let (mock, renderer) = setup();
    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    assert_eq!(mock.any_uniform("fnk_ssaoNoiseTextureSideLength"), Some(UniformValue::Int(2)));
}

#[test]
fn test_default_directional_light_gives_finite_shadow_matrix() {
    let (mock, renderer) = setup();
    renderer.lights().borrow_mut().add_light(DirectionalLight::default());
    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    match mock.any_uniform("lightViewProjection") {
        Some(UniformValue::Mat4(matrix)) => assert!(matrix.is_finite()),
        other => panic!("unexpected light view projection {:?}", other),
    }
}

#[test]
fn test_disabled_passes_are_skipped() {
    let (mock, renderer) = setup();
    let options = RenderOptions {
        shadow_mapping: false,
        ssao: false,
        bloom: false,
        fxaa: false,
        ..RenderOptions::default()
    };

    renderer.render_frame(&options, &BuiltinMesh::Room).unwrap();

    assert_eq!(
        pass_labels(&mock),
        vec!["Geometry pass", "Deferred lighting pass", "Forward pass", "Tonemap & gamma"]
    );
    let blits = mock.commands_starting_with("blit");
    assert!(blits.last().unwrap().ends_with("-> default 32x16 color"));
}

#[test]
fn test_forward_pass_blits_g_buffer_depth_first() {
    let (mock, renderer) = setup();
    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    let commands = mock.commands();
    let forward = commands.iter().position(|c| c == "push_debug_group Forward pass").unwrap();
    assert!(commands[forward + 1].starts_with("blit"));
    assert!(commands[forward + 1].ends_with("depth"));
}

#[test]
fn test_wireframe_wraps_geometry_draw() {
    let (mock, renderer) = setup();
    let options = RenderOptions { wireframe: true, ..RenderOptions::default() };

    renderer.render_frame(&options, &BuiltinMesh::Room).unwrap();

    assert_eq!(mock.commands_starting_with("wireframe"), vec!["wireframe true", "wireframe false"]);
}

// ============================================================================
// G-buffer visualisation
// ============================================================================

#[test]
fn test_g_buffer_vis_stops_after_geometry() {
    let (mock, renderer) = setup();
    let id = renderer.lights().borrow_mut().add_light(PointLight::new(Vec3::ONE));
    let options = RenderOptions { g_buffer_vis: GBufferVis::Normals, ..RenderOptions::default() };

    renderer.render_frame(&options, &BuiltinMesh::Room).unwrap();

    assert_eq!(pass_labels(&mock), vec!["Directional shadow map", "Geometry pass", "G-Buffer vis"]);
    assert_eq!(mock.any_uniform("gBufferVis"), Some(UniformValue::Int(GBufferVis::Normals.code())));
    // Lights were never pushed, so they stay dirty
    assert!(renderer.lights().borrow().light(id).unwrap().has_light_changed());
}

#[test]
fn test_full_frame_resets_light_change_detection() {
    let (_mock, renderer) = setup();
    let id = renderer.lights().borrow_mut().add_light(PointLight::new(Vec3::ONE));

    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    let lights = renderer.lights().borrow();
    let light = lights.light(id).unwrap();
    assert!(!light.has_light_changed());
    assert!(!light.has_view_dependent_changed());
}

// ============================================================================
// Uniforms and options
// ============================================================================

#[test]
fn test_frame_pushes_lighting_and_postprocess_options() {
    let (mock, renderer) = setup();
    let options = RenderOptions {
        lighting_model: LightingModel::BlinnPhong,
        tone_mapping: ToneMapping::Reinhard,
        gamma: 1.8,
        ..RenderOptions::default()
    };

    renderer.render_frame(&options, &BuiltinMesh::Room).unwrap();

    assert_eq!(mock.any_uniform("lightingModel"), Some(UniformValue::Int(LightingModel::BlinnPhong.code())));
    assert_eq!(mock.any_uniform("toneMapping"), Some(UniformValue::Int(ToneMapping::Reinhard.code())));
    assert_eq!(mock.any_uniform("gamma"), Some(UniformValue::Float(1.8)));
    // No skybox loaded yet
    assert_eq!(mock.any_uniform("useIBL"), Some(UniformValue::Bool(false)));
}

#[test]
fn test_shadow_camera_follows_directional_light_and_options() {
    let (_mock, renderer) = setup();
    renderer.lights().borrow_mut().add_light(DirectionalLight::new(Vec3::new(1.0, -1.0, 0.0)));
    let options = RenderOptions { shadow_camera_cuboid_extents: 4.0, ..RenderOptions::default() };

    renderer.render_frame(&options, &BuiltinMesh::Room).unwrap();

    let shadow_camera = renderer.shadow_camera().borrow();
    assert!(shadow_camera
        .light_direction()
        .abs_diff_eq(Vec3::new(1.0, -1.0, 0.0).normalize(), 1e-5));
    assert_eq!(shadow_camera.cuboid_extents(), 4.0);
}

#[test]
fn test_lamps_drawn_for_point_and_spot_lights() {
    let (_mock, mut renderer) = setup();
    let transforms = Rc::new(RefCell::new(Vec::new()));
    renderer.set_lamp_mesh(Box::new(RecordingDrawable(transforms.clone())));
    let point = Vec3::new(1.0, 2.0, 3.0);
    let spot = Vec3::new(-1.0, 0.0, 0.0);
    {
        let mut lights = renderer.lights().borrow_mut();
        lights.add_light(DirectionalLight::default());
        lights.add_light(PointLight::new(point));
        lights.add_light(SpotLight::new(spot, Vec3::NEG_Y));
    }

    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    let transforms = transforms.borrow();
    assert_eq!(transforms.len(), 2);
    assert!(transforms.contains(&(Mat4::from_translation(point) * Mat4::from_scale(Vec3::splat(POINT_LAMP_SCALE)))));
    assert!(transforms.contains(&(Mat4::from_translation(spot) * Mat4::from_scale(Vec3::splat(SPOT_LAMP_SCALE)))));
}

// ============================================================================
// Resize / skybox
// ============================================================================

#[test]
fn test_resize_rebuilds_screen_targets() {
    let (mock, mut renderer) = setup();
    let framebuffers = mock.live_framebuffers();

    renderer.resize(ImageSize::new(64, 32)).unwrap();

    assert_eq!(renderer.size(), ImageSize::new(64, 32));
    assert_eq!(renderer.main_framebuffer().size(), ImageSize::new(64, 32));
    assert_eq!(renderer.final_framebuffer().size(), ImageSize::new(64, 32));
    assert_eq!(renderer.g_buffer().borrow().size(), ImageSize::new(64, 32));
    assert_eq!(renderer.ssao_buffer().borrow().size(), ImageSize::new(64, 32));
    assert_eq!(mock.live_framebuffers(), framebuffers);
}

#[test]
fn test_zero_sized_resize_is_ignored() {
    let (_mock, mut renderer) = setup();
    renderer.resize(ImageSize::new(0, 16)).unwrap();
    assert_eq!(renderer.size(), SCREEN);
}

#[test]
fn test_loaded_skybox_is_drawn_and_feeds_ibl() {
    let (mock, mut renderer) = setup();
    let device = Rc::clone(renderer.device());
    let mut equirect = Framebuffer::new(&device, ImageSize::new(16, 8)).unwrap();
    equirect.attach_texture(BufferType::ColorHdr).unwrap();

    renderer.load_skybox(equirect.texture(BufferType::ColorHdr).unwrap()).unwrap();
    assert!(renderer.has_environment());
    assert_eq!(pass_labels(&mock), vec!["Skybox IBL precompute"]);

    mock.clear_commands();
    renderer.render_frame(&RenderOptions::default(), &BuiltinMesh::Room).unwrap();

    assert_eq!(mock.any_uniform("useIBL"), Some(UniformValue::Bool(true)));
    assert_eq!(mock.any_uniform(SKYBOX_SAMPLER), Some(UniformValue::Int(0)));
}
