/// Renderer configuration
///
/// `RendererConfig` fixes the sizes of the frame-invariant targets at
/// construction. `RenderOptions` is re-read every frame; a UI or any other
/// caller writes it between frames.

use glam::Vec3;

// ============================================================================
// Construction-time configuration
// ============================================================================

/// Sizes and seeds of the targets built once
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Side of the square directional shadow map
    pub shadow_map_size: u32,
    /// Side of each face of the environment cubemap
    pub cubemap_size: u32,
    /// Side of each face of the diffuse irradiance map
    pub irradiance_map_size: u32,
    /// Side of mip 0 of the prefiltered specular map
    pub prefiltered_env_map_size: u32,
    /// Side of the BRDF integration lookup texture
    pub brdf_lut_size: u32,
    pub ssao_kernel_size: u32,
    /// Side of the tiling SSAO rotation noise texture
    pub ssao_noise_size: u32,
    /// Seed of the SSAO kernel generator
    pub ssao_seed: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: 2048,
            cubemap_size: 1024,
            irradiance_map_size: 16,
            prefiltered_env_map_size: 1024,
            brdf_lut_size: 1024,
            ssao_kernel_size: 64,
            ssao_noise_size: 4,
            ssao_seed: 0x5EED,
        }
    }
}

// ============================================================================
// Shader-facing enums
// ============================================================================

/// Lighting model selected in the lighting pass (`lightingModel` uniform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LightingModel {
    Phong = 0,
    BlinnPhong = 1,
    CookTorranceGgx = 2,
}

/// Tone mapping operator (`toneMapping` uniform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ToneMapping {
    None = 0,
    Reinhard = 1,
    ReinhardLuminance = 2,
    AcesApprox = 3,
    Aces = 4,
}

/// G-buffer channel shown instead of the lit image (`gBufferVis` uniform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum GBufferVis {
    Disabled = 0,
    Positions = 1,
    AmbientOcclusion = 2,
    Normals = 3,
    Roughness = 4,
    Albedo = 5,
    Metallic = 6,
    Emission = 7,
}

impl LightingModel {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl ToneMapping {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl GBufferVis {
    pub fn code(self) -> i32 {
        self as i32
    }
}

// ============================================================================
// Per-frame options
// ============================================================================

/// Options consumed by the frame driver each frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    // ===== SHADOWS =====
    pub shadow_mapping: bool,
    /// Half extent of the shadow camera cuboid
    pub shadow_camera_cuboid_extents: f32,
    pub shadow_camera_near: f32,
    pub shadow_camera_far: f32,
    /// Distance of the shadow camera from the origin, against the light direction
    pub shadow_camera_distance: f32,
    pub shadow_bias_min: f32,
    pub shadow_bias_max: f32,

    // ===== LIGHTING =====
    pub use_ibl: bool,
    pub lighting_model: LightingModel,
    pub ambient_color: Vec3,
    pub shininess: f32,
    pub emission_intensity: f32,
    /// constant, linear, quadratic
    pub emission_attenuation: Vec3,

    // ===== SSAO =====
    pub ssao: bool,
    pub ssao_radius: f32,
    pub ssao_bias: f32,

    // ===== POST PROCESSING =====
    pub bloom: bool,
    pub bloom_mix: f32,
    pub bloom_filter_radius: f32,
    pub tone_mapping: ToneMapping,
    pub gamma_correct: bool,
    pub gamma: f32,
    pub fxaa: bool,

    // ===== DEBUG =====
    pub g_buffer_vis: GBufferVis,
    pub draw_normals: bool,
    pub wireframe: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            shadow_mapping: true,
            shadow_camera_cuboid_extents: 2.0,
            shadow_camera_near: 0.1,
            shadow_camera_far: 15.0,
            shadow_camera_distance: 5.0,
            shadow_bias_min: 0.0001,
            shadow_bias_max: 0.001,

            use_ibl: true,
            lighting_model: LightingModel::CookTorranceGgx,
            ambient_color: Vec3::splat(0.1),
            shininess: 32.0,
            emission_intensity: 5.0,
            emission_attenuation: Vec3::new(0.0, 0.0, 1.0),

            ssao: true,
            ssao_radius: 0.5,
            ssao_bias: 0.025,

            bloom: true,
            bloom_mix: 0.004,
            bloom_filter_radius: 0.005,
            tone_mapping: ToneMapping::AcesApprox,
            gamma_correct: true,
            gamma: 2.2,
            fxaa: true,

            g_buffer_vis: GBufferVis::Disabled,
            draw_normals: false,
            wireframe: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
