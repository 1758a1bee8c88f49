use std::rc::Rc;

use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{InternalFormat, UniformValue, Viewport};
use crate::shader::mock_shader_loader::MockShaderLoader;

fn setup() -> (Rc<MockGraphicsDevice>, Rc<dyn GraphicsDevice>) {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: Rc<dyn GraphicsDevice> = mock.clone();
    (mock, device)
}

fn environment(device: &Rc<dyn GraphicsDevice>) -> Framebuffer {
    let mut env = Framebuffer::new(device, ImageSize::new(16, 16)).unwrap();
    env.attach_texture(BufferType::ColorCubemapHdr).unwrap();
    env
}

// ============================================================================
// Irradiance
// ============================================================================

#[test]
fn test_irradiance_convolves_six_faces() {
    let (mock, device) = setup();
    let env = environment(&device);
    let calculator = CubemapIrradianceCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(16, 16)).unwrap();
    mock.clear_commands();

    calculator.multipass_draw(env.texture(BufferType::ColorCubemapHdr).unwrap()).unwrap();

    assert_eq!(mock.commands_starting_with("draw Room").len(), 6);
    let program = calculator.shader.program();
    assert_eq!(mock.uniform(program, ENVIRONMENT_MAP_SAMPLER), Some(UniformValue::Int(0)));
    assert_eq!(
        mock.uniform(program, "fnk_hemisphereSampleDelta"),
        Some(UniformValue::Float(DEFAULT_HEMISPHERE_SAMPLE_DELTA))
    );
}

#[test]
fn test_irradiance_sample_delta_setter() {
    let (mock, device) = setup();
    let mut calculator = CubemapIrradianceCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(16, 16)).unwrap();
    calculator.shader_mut().set_hemisphere_sample_delta(0.1);
    assert_eq!(calculator.shader.hemisphere_sample_delta(), 0.1);
    assert_eq!(mock.uniform(calculator.shader.program(), "fnk_hemisphereSampleDelta"), Some(UniformValue::Float(0.1)));
}

#[test]
fn test_irradiance_binds_map() {
    let (mock, device) = setup();
    let calculator = CubemapIrradianceCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(16, 16)).unwrap();
    let shader = ScreenShader::new(&device, &MockShaderLoader::new()).unwrap();
    assert_eq!(calculator.bind_texture(0, &shader).unwrap(), 1);
    assert_eq!(mock.uniform(shader.program(), IRRADIANCE_MAP_SAMPLER), Some(UniformValue::Int(0)));
    assert!(calculator.irradiance_map().is_ok());
}

// ============================================================================
// Prefiltered environment map
// ============================================================================

#[test]
fn test_prefilter_chain_is_capped() {
    let (_mock, device) = setup();
    let loader = MockShaderLoader::new();
    let capped = GGXPrefilteredEnvMapCalculator::new(&device, &loader, ImageSize::new(32, 32), 5).unwrap();
    assert_eq!(capped.num_mips(), 5);
    let full = GGXPrefilteredEnvMapCalculator::new(&device, &loader, ImageSize::new(8, 8), 10).unwrap();
    assert_eq!(full.num_mips(), 4);
}

#[test]
fn test_prefilter_roughness_spans_zero_to_one() {
    let (_mock, device) = setup();
    let calculator = GGXPrefilteredEnvMapCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(32, 32), 5).unwrap();
    assert_eq!(calculator.roughness_for_mip(0), 0.0);
    assert_eq!(calculator.roughness_for_mip(2), 0.5);
    assert_eq!(calculator.roughness_for_mip(4), 1.0);

    let single = GGXPrefilteredEnvMapCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(32, 32), 1).unwrap();
    assert_eq!(single.roughness_for_mip(0), 0.0);
}

#[test]
fn test_prefilter_renders_every_face_of_every_mip() {
    let (mock, device) = setup();
    let env = environment(&device);
    let calculator = GGXPrefilteredEnvMapCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(32, 32), 3).unwrap();
    mock.clear_commands();

    calculator.multipass_draw(env.texture(BufferType::ColorCubemapHdr).unwrap()).unwrap();

    assert_eq!(mock.commands_starting_with("draw Room").len(), 18);
    let mut expected = Vec::new();
    for side in [32, 16, 8] {
        expected.extend(std::iter::repeat(format!("viewport 0 0 {} {}", side, side)).take(6));
    }
    assert_eq!(mock.commands_starting_with("viewport"), expected);
    let program = calculator.shader.program();
    assert_eq!(mock.uniform(program, "fnk_roughness"), Some(UniformValue::Float(1.0)));
    assert_eq!(mock.uniform(program, "fnk_numSamples"), Some(UniformValue::UInt(DEFAULT_NUM_SAMPLES)));
}

#[test]
fn test_prefilter_pushes_max_lod_and_binds() {
    let (mock, device) = setup();
    let mut calculator = GGXPrefilteredEnvMapCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(32, 32), 5).unwrap();
    let shader = ScreenShader::new(&device, &MockShaderLoader::new()).unwrap();

    calculator.update_uniforms(&shader).unwrap();
    assert_eq!(calculator.bind_texture(3, &shader).unwrap(), 4);

    let program = shader.program();
    assert_eq!(mock.uniform(program, PREFILTERED_ENV_MAP_MAX_LOD_UNIFORM), Some(UniformValue::Float(4.0)));
    assert_eq!(mock.uniform(program, PREFILTERED_ENV_MAP_SAMPLER), Some(UniformValue::Int(3)));
    let params = mock.texture(calculator.prefiltered_env_map().unwrap().id()).unwrap().params.unwrap();
    assert_eq!(params.filtering, TextureFiltering::Trilinear);
    assert_eq!(params.wrap, TextureWrap::ClampToEdge);
}

#[test]
fn test_prefilter_num_samples_setter() {
    let (mock, device) = setup();
    let mut calculator = GGXPrefilteredEnvMapCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(8, 8), 2).unwrap();
    calculator.shader_mut().set_num_samples(256);
    assert_eq!(calculator.shader.num_samples(), 256);
    assert_eq!(mock.uniform(calculator.shader.program(), "fnk_numSamples"), Some(UniformValue::UInt(256)));
}

// ============================================================================
// BRDF integration
// ============================================================================

#[test]
fn test_brdf_integration_is_one_screen_quad() {
    let (mock, device) = setup();
    let calculator = GGXBrdfIntegrationCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(512, 512)).unwrap();
    mock.clear_commands();

    calculator.draw().unwrap();

    assert_eq!(mock.commands_starting_with("draw"), vec!["draw ScreenQuad"]);
    assert_eq!(mock.viewport(), Some(Viewport::full(512, 512)));
    assert_eq!(mock.bound_framebuffer(), None);
    let map = mock.texture(calculator.integration_map().unwrap().id()).unwrap();
    assert_eq!(map.desc.internal_format, InternalFormat::RGB16_SNORM);
    assert_eq!(mock.uniform(calculator.shader.program(), "fnk_numSamples"), Some(UniformValue::UInt(1024)));
}

#[test]
fn test_brdf_integration_binds_lut() {
    let (mock, device) = setup();
    let calculator = GGXBrdfIntegrationCalculator::new(&device, &MockShaderLoader::new(), ImageSize::new(16, 16)).unwrap();
    let shader = ScreenShader::new(&device, &MockShaderLoader::new()).unwrap();
    assert_eq!(calculator.bind_texture(7, &shader).unwrap(), 8);
    assert_eq!(mock.uniform(shader.program(), INTEGRATION_MAP_SAMPLER), Some(UniformValue::Int(7)));
}
