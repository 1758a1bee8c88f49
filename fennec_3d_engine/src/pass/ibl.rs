/// Image-based lighting precompute
///
/// Three one-off passes over an environment cubemap, plus the BRDF lookup:
/// - diffuse irradiance convolution (low resolution, angularly smooth)
/// - GGX prefiltered specular map, one roughness per mip
/// - GGX BRDF integration into a 2D lookup texture, computed once
///
/// Each result joins a `TextureRegistry` as a `TextureSource`.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{
    BuiltinMesh, GraphicsDevice, ImageSize, MipGeneration, TextureFiltering, TextureParams, TextureWrap,
};
use crate::pass::cubemap::CubemapRenderHelper;
use crate::pass::screen_quad::draw_builtin;
use crate::resource::Texture;
use crate::shader::{ScreenShader, Shader, ShaderCode, ShaderSourceLoader, UniformSource, CUBEMAP_VERT};
use crate::texture_registry::TextureSource;

pub const IRRADIANCE_CUBEMAP_FRAG: &str = "content/shaders/builtin/irradiance_cubemap.frag";
pub const GGX_PREFILTER_CUBEMAP_FRAG: &str = "content/shaders/builtin/ggx_prefilter_cubemap.frag";
pub const GGX_BRDF_INTEGRATION_FRAG: &str = "content/shaders/builtin/ggx_brdf_integration.frag";

pub const DEFAULT_HEMISPHERE_SAMPLE_DELTA: f32 = 0.025;
pub const DEFAULT_NUM_SAMPLES: u32 = 1024;

pub const ENVIRONMENT_MAP_SAMPLER: &str = "fnk_environmentMap";
pub const IRRADIANCE_MAP_SAMPLER: &str = "fnk_irradianceMap";
pub const PREFILTERED_ENV_MAP_SAMPLER: &str = "fnk_ggxPrefilteredEnvMap";
pub const PREFILTERED_ENV_MAP_MAX_LOD_UNIFORM: &str = "fnk_ggxPrefilteredEnvMapMaxLOD";
pub const INTEGRATION_MAP_SAMPLER: &str = "fnk_ggxIntegrationMap";

/// Bind a source cubemap at unit 0 as the environment map
fn bind_environment(shader: &Shader, source: &Texture) -> Result<()> {
    source.bind(0)?;
    shader.set_sampler(ENVIRONMENT_MAP_SAMPLER, 0);
    Ok(())
}

// ============================================================================
// Irradiance
// ============================================================================

/// Hemisphere convolution of an environment cubemap
#[derive(Debug)]
pub struct CubemapIrradianceShader {
    shader: Shader,
    hemisphere_sample_delta: f32,
}

impl CubemapIrradianceShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let shader = Shader::new(
            device,
            loader,
            ShaderCode::Path(CUBEMAP_VERT),
            ShaderCode::Path(IRRADIANCE_CUBEMAP_FRAG),
        )?;
        let mut irradiance = Self { shader, hemisphere_sample_delta: DEFAULT_HEMISPHERE_SAMPLE_DELTA };
        irradiance.set_hemisphere_sample_delta(DEFAULT_HEMISPHERE_SAMPLE_DELTA);
        Ok(irradiance)
    }

    pub fn hemisphere_sample_delta(&self) -> f32 {
        self.hemisphere_sample_delta
    }

    /// Angular step, in radians, between hemisphere samples
    pub fn set_hemisphere_sample_delta(&mut self, delta: f32) {
        self.hemisphere_sample_delta = delta;
        self.shader.set_float("fnk_hemisphereSampleDelta", delta);
    }
}

impl Deref for CubemapIrradianceShader {
    type Target = Shader;

    fn deref(&self) -> &Shader {
        &self.shader
    }
}

#[derive(Debug)]
pub struct CubemapIrradianceCalculator {
    buffer: Framebuffer,
    helper: CubemapRenderHelper,
    shader: CubemapIrradianceShader,
}

impl CubemapIrradianceCalculator {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader, face_size: ImageSize) -> Result<Self> {
        let mut buffer = Framebuffer::new(device, face_size)?;
        buffer.attach_texture(BufferType::ColorCubemapHdr)?;
        Ok(Self {
            buffer,
            helper: CubemapRenderHelper::new(),
            shader: CubemapIrradianceShader::new(device, loader)?,
        })
    }

    pub fn shader_mut(&mut self) -> &mut CubemapIrradianceShader {
        &mut self.shader
    }

    pub fn irradiance_map(&self) -> Result<&Texture> {
        self.buffer.texture(BufferType::ColorCubemapHdr)
    }

    /// Convolve the environment cubemap `source` into the irradiance map
    pub fn multipass_draw(&self, source: &Texture) -> Result<()> {
        bind_environment(&self.shader, source)?;
        self.helper.multipass_draw(&self.buffer, &self.shader)
    }
}

impl Deref for CubemapIrradianceCalculator {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.buffer
    }
}

impl TextureSource for CubemapIrradianceCalculator {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.irradiance_map()?.bind(next_unit)?;
        shader.set_sampler(IRRADIANCE_MAP_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

// ============================================================================
// GGX prefiltered environment map
// ============================================================================

/// GGX importance-sampled convolution at one roughness
#[derive(Debug)]
pub struct GGXPrefilterShader {
    shader: Shader,
    num_samples: u32,
}

impl GGXPrefilterShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let shader = Shader::new(
            device,
            loader,
            ShaderCode::Path(CUBEMAP_VERT),
            ShaderCode::Path(GGX_PREFILTER_CUBEMAP_FRAG),
        )?;
        let mut prefilter = Self { shader, num_samples: DEFAULT_NUM_SAMPLES };
        prefilter.set_num_samples(DEFAULT_NUM_SAMPLES);
        Ok(prefilter)
    }

    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    pub fn set_num_samples(&mut self, samples: u32) {
        self.num_samples = samples;
        self.shader.set_uint("fnk_numSamples", samples);
    }

    pub fn set_roughness(&self, roughness: f32) {
        self.shader.set_float("fnk_roughness", roughness);
    }
}

impl Deref for GGXPrefilterShader {
    type Target = Shader;

    fn deref(&self) -> &Shader {
        &self.shader
    }
}

/// Split-sum specular map: mip `m` of `n` is prefiltered at roughness `m / (n - 1)`
#[derive(Debug)]
pub struct GGXPrefilteredEnvMapCalculator {
    buffer: Framebuffer,
    shader: GGXPrefilterShader,
}

impl GGXPrefilteredEnvMapCalculator {
    /// `max_num_mips` caps the chain; the full chain is used when it is larger
    pub fn new(
        device: &Rc<dyn GraphicsDevice>,
        loader: &dyn ShaderSourceLoader,
        face_size: ImageSize,
        max_num_mips: u32,
    ) -> Result<Self> {
        let params = TextureParams::attachment_default()
            .with_filtering(TextureFiltering::Trilinear)
            .with_wrap(TextureWrap::ClampToEdge)
            .with_mips(MipGeneration::Always)
            .with_max_num_mips(max_num_mips);
        let mut buffer = Framebuffer::new(device, face_size)?;
        buffer.attach_texture_with(BufferType::ColorCubemapHdr, params)?;
        Ok(Self { buffer, shader: GGXPrefilterShader::new(device, loader)? })
    }

    pub fn shader_mut(&mut self) -> &mut GGXPrefilterShader {
        &mut self.shader
    }

    pub fn prefiltered_env_map(&self) -> Result<&Texture> {
        self.buffer.texture(BufferType::ColorCubemapHdr)
    }

    pub fn num_mips(&self) -> u32 {
        self.buffer.attachments().first().map_or(1, |a| a.num_mips())
    }

    /// Roughness rendered into `mip`; a single-mip chain is perfectly smooth
    pub fn roughness_for_mip(&self, mip: u32) -> f32 {
        let num_mips = self.num_mips();
        if num_mips <= 1 {
            0.0
        } else {
            mip as f32 / (num_mips - 1) as f32
        }
    }

    /// Prefilter `source` into every mip of the chain
    pub fn multipass_draw(&self, source: &Texture) -> Result<()> {
        bind_environment(&self.shader, source)?;

        let mut helper = CubemapRenderHelper::new();
        for mip in 0..self.num_mips() {
            helper.set_target_mip(mip);
            self.shader.set_roughness(self.roughness_for_mip(mip));
            helper.multipass_draw(&self.buffer, &self.shader)?;
        }
        Ok(())
    }
}

impl Deref for GGXPrefilteredEnvMapCalculator {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.buffer
    }
}

impl UniformSource for GGXPrefilteredEnvMapCalculator {
    /// Highest LOD, so lighting maps roughness 1 to the last mip
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()> {
        shader.set_float(PREFILTERED_ENV_MAP_MAX_LOD_UNIFORM, (self.num_mips() - 1) as f32);
        Ok(())
    }
}

impl TextureSource for GGXPrefilteredEnvMapCalculator {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.prefiltered_env_map()?.bind(next_unit)?;
        shader.set_sampler(PREFILTERED_ENV_MAP_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

// ============================================================================
// GGX BRDF integration
// ============================================================================

/// Integrates the GGX BRDF over (NdotV, roughness)
#[derive(Debug)]
pub struct GGXBrdfIntegrationShader {
    shader: Shader,
    num_samples: u32,
}

impl GGXBrdfIntegrationShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let screen = ScreenShader::with_fragment(device, loader, ShaderCode::Path(GGX_BRDF_INTEGRATION_FRAG))?;
        let mut integration = Self { shader: screen.into_inner(), num_samples: DEFAULT_NUM_SAMPLES };
        integration.set_num_samples(DEFAULT_NUM_SAMPLES);
        Ok(integration)
    }

    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    pub fn set_num_samples(&mut self, samples: u32) {
        self.num_samples = samples;
        self.shader.set_uint("fnk_numSamples", samples);
    }
}

impl Deref for GGXBrdfIntegrationShader {
    type Target = Shader;

    fn deref(&self) -> &Shader {
        &self.shader
    }
}

/// 2D lookup texture of the split-sum BRDF terms
#[derive(Debug)]
pub struct GGXBrdfIntegrationCalculator {
    buffer: Framebuffer,
    shader: GGXBrdfIntegrationShader,
}

impl GGXBrdfIntegrationCalculator {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader, size: ImageSize) -> Result<Self> {
        let mut buffer = Framebuffer::new(device, size)?;
        // Values stay in [0, 1]; SNORM gives more precision than 8-bit.
        buffer.attach_texture(BufferType::ColorSnorm)?;
        Ok(Self { buffer, shader: GGXBrdfIntegrationShader::new(device, loader)? })
    }

    pub fn integration_map(&self) -> Result<&Texture> {
        self.buffer.texture(BufferType::ColorSnorm)
    }

    pub fn draw(&self) -> Result<()> {
        self.buffer.activate()?;
        draw_builtin(&self.shader, BuiltinMesh::ScreenQuad)?;
        self.buffer.deactivate()
    }
}

impl Deref for GGXBrdfIntegrationCalculator {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.buffer
    }
}

impl TextureSource for GGXBrdfIntegrationCalculator {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.integration_map()?.bind(next_unit)?;
        shader.set_sampler(INTEGRATION_MAP_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

#[cfg(test)]
#[path = "ibl_tests.rs"]
mod tests;
