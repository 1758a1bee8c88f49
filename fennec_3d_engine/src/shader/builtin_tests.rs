use std::rc::Rc;

use glam::{Mat4, Vec3};

use super::*;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{GraphicsDevice, UniformValue};
use crate::shader::mock_shader_loader::MockShaderLoader;

fn setup() -> (Rc<MockGraphicsDevice>, Rc<dyn GraphicsDevice>) {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: Rc<dyn GraphicsDevice> = mock.clone();
    (mock, device)
}

#[test]
fn test_screen_shader_paths() {
    let (mock, device) = setup();
    let loader = MockShaderLoader::new();
    let shader = ScreenShader::new(&device, &loader).unwrap();
    assert_eq!(mock.program_paths(shader.program()), vec![SCREEN_QUAD_VERT, SCREEN_QUAD_FRAG]);

    let fxaa = FxaaShader::new(&device, &loader).unwrap();
    assert_eq!(mock.program_paths(fxaa.program()), vec![SCREEN_QUAD_VERT, FXAA_FRAG]);
}

#[test]
fn test_lod_shader_sets_mip_as_float() {
    let (mock, device) = setup();
    let shader = ScreenLodShader::new(&device, &MockShaderLoader::new()).unwrap();
    shader.set_mip_level(3);
    assert_eq!(mock.uniform(shader.program(), "lod"), Some(UniformValue::Float(3.0)));
}

#[test]
fn test_skybox_ignores_camera_translation() {
    let (mock, device) = setup();
    let shader = SkyboxShader::new(&device, &MockShaderLoader::new()).unwrap();
    shader.set_mat4("view", Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0)));
    assert_eq!(mock.uniform(shader.program(), "view"), Some(UniformValue::Mat4(Mat4::IDENTITY)));
}

#[test]
fn test_lamp_shader_color() {
    let (mock, device) = setup();
    let shader = LampShader::new(&device, &MockShaderLoader::new()).unwrap();
    shader.set_light_color(Vec3::new(1.0, 0.5, 0.0));
    assert_eq!(mock.uniform(shader.program(), "lightColor"), Some(UniformValue::Vec3(Vec3::new(1.0, 0.5, 0.0))));
    assert_eq!(mock.program_paths(shader.program()), vec![MODEL_VERT, LAMP_FRAG]);
}

#[test]
fn test_shadow_map_shader_paths() {
    let (mock, device) = setup();
    let shader = ShadowMapShader::new(&device, &MockShaderLoader::new()).unwrap();
    assert_eq!(mock.program_paths(shader.program()), vec![SHADOW_MAP_VERT, SHADOW_MAP_FRAG]);
}
