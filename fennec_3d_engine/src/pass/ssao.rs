/// Screen-space ambient occlusion
///
/// `SsaoShader` reads the G-buffer and a `SsaoKernel` into a raw `SsaoBuffer`;
/// `SsaoBlurShader` then smooths that buffer into a second one over a window
/// matching the noise tile, which hides the per-pixel kernel rotation.

use std::ops::Deref;
use std::rc::Rc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RendererConfig;
use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{GraphicsDevice, ImageSize, TextureFiltering, TextureParams, TextureWrap};
use crate::resource::Texture;
use crate::shader::{shader_variant, Shader, ShaderCode, ShaderSourceLoader, UniformSource, SCREEN_QUAD_VERT};
use crate::texture_registry::TextureSource;

pub const SSAO_FRAG: &str = "content/shaders/builtin/ssao.frag";
pub const SSAO_BLUR_FRAG: &str = "content/shaders/builtin/ssao_blur.frag";

pub const DEFAULT_SAMPLE_RADIUS: f32 = 0.5;
pub const DEFAULT_SAMPLE_BIAS: f32 = 0.025;

pub const SSAO_SAMPLER: &str = "fnk_ssao";
pub const SSAO_NOISE_SAMPLER: &str = "fnk_ssaoNoise";

// ============================================================================
// Shaders
// ============================================================================

shader_variant! {
    /// Computes raw occlusion from the G-buffer and the sample kernel
    SsaoShader
}

impl SsaoShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Ok(Self(Shader::new(
            device,
            loader,
            ShaderCode::Path(SCREEN_QUAD_VERT),
            ShaderCode::Path(SSAO_FRAG),
        )?))
    }
}

shader_variant! {
    /// Box blur over a raw occlusion buffer
    SsaoBlurShader
}

impl SsaoBlurShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Ok(Self(Shader::new(
            device,
            loader,
            ShaderCode::Path(SCREEN_QUAD_VERT),
            ShaderCode::Path(SSAO_BLUR_FRAG),
        )?))
    }

    /// Blur `buffer` with a window sized to the kernel's noise tile
    ///
    /// The source is the only texture of this pass, so it goes to unit 0.
    /// Draw into another `SsaoBuffer` afterwards.
    pub fn configure_with(&self, kernel: &SsaoKernel, buffer: &SsaoBuffer) -> Result<()> {
        self.set_int("fnk_ssaoNoiseTextureSideLength", kernel.noise_texture_side_length() as i32);
        buffer.ssao_texture()?.bind(0)?;
        self.set_sampler(SSAO_SAMPLER, 0);
        Ok(())
    }
}

// ============================================================================
// SsaoKernel
// ============================================================================

/// Hemisphere sample kernel plus the noise tile that rotates it per pixel
#[derive(Debug)]
pub struct SsaoKernel {
    radius: f32,
    bias: f32,
    samples: Vec<Vec3>,
    noise_texture: Texture,
}

impl SsaoKernel {
    /// Kernel sized from `config`, with default radius and bias
    pub fn new(device: &Rc<dyn GraphicsDevice>, config: &RendererConfig) -> Result<Self> {
        Self::with_params(
            device,
            DEFAULT_SAMPLE_RADIUS,
            DEFAULT_SAMPLE_BIAS,
            config.ssao_kernel_size,
            config.ssao_noise_size,
            config.ssao_seed,
        )
    }

    pub fn with_params(
        device: &Rc<dyn GraphicsDevice>,
        radius: f32,
        bias: f32,
        kernel_size: u32,
        noise_side_length: u32,
        seed: u64,
    ) -> Result<Self> {
        if noise_side_length == 0 {
            crate::engine_bail!(InvalidState, "fennec3d::SsaoKernel", "SSAO noise texture side length must be non-zero");
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let samples = generate_samples(&mut rng, kernel_size);
        let noise = generate_noise(&mut rng, noise_side_length);

        // Nearest + repeat so the tile repeats exactly over the screen.
        let params = TextureParams::attachment_default()
            .with_filtering(TextureFiltering::Nearest)
            .with_wrap(TextureWrap::Repeat);
        let noise_texture = Texture::from_rgb_f32(device, noise_side_length, noise_side_length, &noise, params)?;

        crate::engine_debug!(
            "fennec3d::SsaoKernel",
            "Generated {} kernel samples, {}x{} noise tile",
            kernel_size,
            noise_side_length,
            noise_side_length
        );

        Ok(Self { radius, bias, samples, noise_texture })
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[Vec3] {
        &self.samples
    }

    pub fn noise_texture(&self) -> &Texture {
        &self.noise_texture
    }

    pub fn noise_texture_side_length(&self) -> u32 {
        self.noise_texture.width()
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }
}

/// Points in the +Z unit hemisphere, clustered toward the origin
fn generate_samples(rng: &mut StdRng, count: u32) -> Vec<Vec3> {
    let mut samples = Vec::with_capacity(count as usize);
    while samples.len() < count as usize {
        let candidate = Vec3::new(
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>(),
        );
        // Rejecting the cube corners keeps the distribution spherical.
        if candidate.length_squared() >= 1.0 {
            continue;
        }
        let sample = candidate.normalize_or_zero() * rng.random::<f32>();

        let t = samples.len() as f32 / count as f32;
        let scale = 0.1 + (1.0 - 0.1) * t * t;
        samples.push(sample * scale);
    }
    samples
}

/// Random rotation vectors in the XY plane
fn generate_noise(rng: &mut StdRng, side_length: u32) -> Vec<Vec3> {
    (0..side_length * side_length)
        .map(|_| Vec3::new(rng.random::<f32>() * 2.0 - 1.0, rng.random::<f32>() * 2.0 - 1.0, 0.0))
        .collect()
}

impl UniformSource for SsaoKernel {
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()> {
        shader.set_float("fnk_ssaoSampleRadius", self.radius);
        shader.set_float("fnk_ssaoSampleBias", self.bias);
        shader.set_int("fnk_ssaoKernelSize", self.samples.len() as i32);
        for (i, sample) in self.samples.iter().enumerate() {
            shader.set_vec3(&format!("fnk_ssaoKernel[{}]", i), *sample);
        }
        Ok(())
    }
}

impl TextureSource for SsaoKernel {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.noise_texture.bind(next_unit)?;
        shader.set_sampler(SSAO_NOISE_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

// ============================================================================
// SsaoBuffer
// ============================================================================

/// Single-channel occlusion target, cleared to zero
#[derive(Debug)]
pub struct SsaoBuffer {
    framebuffer: Framebuffer,
}

impl SsaoBuffer {
    pub fn new(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Self> {
        let mut framebuffer = Framebuffer::new(device, size)?;
        framebuffer.set_clear_color(glam::Vec4::ZERO);
        framebuffer.attach_texture(BufferType::Grayscale)?;
        Ok(Self { framebuffer })
    }

    pub fn resize(&mut self, size: ImageSize) -> Result<()> {
        let device = Rc::clone(self.framebuffer.device());
        *self = Self::new(&device, size)?;
        Ok(())
    }

    pub fn ssao_texture(&self) -> Result<&Texture> {
        self.framebuffer.texture(BufferType::Grayscale)
    }
}

impl Deref for SsaoBuffer {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

impl TextureSource for SsaoBuffer {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.ssao_texture()?.bind(next_unit)?;
        shader.set_sampler(SSAO_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

#[cfg(test)]
#[path = "ssao_tests.rs"]
mod tests;
