/// Bloom over a single mip-chain texture
///
/// The lit image is copied into mip 0, filtered down the chain, then
/// filtered back up with additive blending. Mip 0 holds the result.
/// While one mip is rendered, sampling is locked to its neighbour with
/// `select_mip` so no mip is read and written in the same draw.

use std::ops::Deref;
use std::rc::Rc;

use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{
    BufferBits, BuiltinMesh, GraphicsDevice, ImageSize, MipGeneration, TextureFiltering, TextureParams,
    TextureWrap,
};
use crate::pass::screen_quad::draw_builtin;
use crate::resource::Texture;
use crate::shader::{ScreenShader, Shader, ShaderCode, ShaderSourceLoader};
use crate::texture_registry::TextureSource;

pub const BLOOM_DOWNSAMPLE_FRAG: &str = "content/shaders/builtin/bloom_downsample.frag";
pub const BLOOM_UPSAMPLE_FRAG: &str = "content/shaders/builtin/bloom_upsample.frag";

pub const DEFAULT_FILTER_RADIUS: f32 = 0.005;

pub const BLOOM_MIP_CHAIN_SAMPLER: &str = "fnk_bloomMipChain";
pub const BLOOM_SAMPLER: &str = "fnk_bloom";
pub const FILTER_RADIUS_UNIFORM: &str = "fnk_filterRadius";

// ============================================================================
// BloomBuffer
// ============================================================================

/// Framebuffer with one HDR color attachment carrying a full mip chain
#[derive(Debug)]
pub struct BloomBuffer {
    framebuffer: Framebuffer,
}

impl BloomBuffer {
    pub fn new(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Self> {
        let mut framebuffer = Framebuffer::new(device, size)?;
        let params = TextureParams::attachment_default()
            .with_filtering(TextureFiltering::Bilinear)
            .with_wrap(TextureWrap::ClampToEdge)
            .with_mips(MipGeneration::Always);
        framebuffer.attach_texture_with(BufferType::ColorHdrAlpha, params)?;
        Ok(Self { framebuffer })
    }

    pub fn mip_chain_texture(&self) -> Result<&Texture> {
        self.framebuffer.texture(BufferType::ColorHdrAlpha)
    }

    pub fn num_mips(&self) -> u32 {
        self.framebuffer.attachments().first().map_or(1, |a| a.num_mips())
    }

    /// Restrict sampling to `mip` only
    pub fn select_mip(&self, mip: u32) -> Result<()> {
        if mip >= self.num_mips() {
            crate::engine_bail!(
                InvalidState,
                "fennec3d::BloomBuffer",
                "Source mip {} out of range for a chain of {} mips",
                mip,
                self.num_mips()
            );
        }
        self.mip_chain_texture()?.set_sampler_mip_range(mip, mip)
    }

    pub fn deselect_mip(&self) -> Result<()> {
        self.mip_chain_texture()?.unset_sampler_mip_range()
    }
}

impl Deref for BloomBuffer {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

impl TextureSource for BloomBuffer {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.mip_chain_texture()?.bind(next_unit)?;
        shader.set_sampler(BLOOM_MIP_CHAIN_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

/// Bind the whole chain at unit 0; the resample shaders sample nothing else
fn bind_mip_chain(shader: &Shader, buffer: &BloomBuffer) -> Result<()> {
    buffer.mip_chain_texture()?.bind(0)?;
    shader.set_sampler(BLOOM_MIP_CHAIN_SAMPLER, 0);
    Ok(())
}

// ============================================================================
// Shaders
// ============================================================================

/// 13-tap downsample filter
#[derive(Debug)]
pub struct BloomDownsampleShader(Shader);

impl BloomDownsampleShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let screen = ScreenShader::with_fragment(device, loader, ShaderCode::Path(BLOOM_DOWNSAMPLE_FRAG))?;
        Ok(Self(screen.into_inner()))
    }

    pub fn configure_with(&self, buffer: &BloomBuffer) -> Result<()> {
        bind_mip_chain(&self.0, buffer)
    }
}

impl Deref for BloomDownsampleShader {
    type Target = Shader;

    fn deref(&self) -> &Shader {
        &self.0
    }
}

/// Tent upsample filter with a radius in UV units
#[derive(Debug)]
pub struct BloomUpsampleShader {
    shader: Shader,
    filter_radius: f32,
}

impl BloomUpsampleShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let screen = ScreenShader::with_fragment(device, loader, ShaderCode::Path(BLOOM_UPSAMPLE_FRAG))?;
        let mut shader = Self { shader: screen.into_inner(), filter_radius: DEFAULT_FILTER_RADIUS };
        shader.set_filter_radius(DEFAULT_FILTER_RADIUS);
        Ok(shader)
    }

    pub fn configure_with(&self, buffer: &BloomBuffer) -> Result<()> {
        bind_mip_chain(&self.shader, buffer)
    }

    pub fn filter_radius(&self) -> f32 {
        self.filter_radius
    }

    pub fn set_filter_radius(&mut self, radius: f32) {
        self.filter_radius = radius;
        self.shader.set_float(FILTER_RADIUS_UNIFORM, radius);
    }
}

impl Deref for BloomUpsampleShader {
    type Target = Shader;

    fn deref(&self) -> &Shader {
        &self.shader
    }
}

// ============================================================================
// BloomPass
// ============================================================================

#[derive(Debug)]
pub struct BloomPass {
    buffer: BloomBuffer,
    downsample_shader: BloomDownsampleShader,
    upsample_shader: BloomUpsampleShader,
}

impl BloomPass {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader, size: ImageSize) -> Result<Self> {
        Ok(Self {
            buffer: BloomBuffer::new(device, size)?,
            downsample_shader: BloomDownsampleShader::new(device, loader)?,
            upsample_shader: BloomUpsampleShader::new(device, loader)?,
        })
    }

    /// Rebuild the mip chain at `size`; shaders are kept
    pub fn resize(&mut self, size: ImageSize) -> Result<()> {
        let device = Rc::clone(self.buffer.device());
        self.buffer = BloomBuffer::new(&device, size)?;
        Ok(())
    }

    pub fn buffer(&self) -> &BloomBuffer {
        &self.buffer
    }

    pub fn num_mips(&self) -> u32 {
        self.buffer.num_mips()
    }

    pub fn filter_radius(&self) -> f32 {
        self.upsample_shader.filter_radius()
    }

    pub fn set_filter_radius(&mut self, radius: f32) {
        self.upsample_shader.set_filter_radius(radius);
    }

    pub fn output(&self) -> Result<&Texture> {
        self.buffer.mip_chain_texture()
    }

    /// Run the whole down/up chain over the color of `source`
    ///
    /// Blending, the sampler mip range and the draw target are restored even
    /// when a step of the chain fails.
    pub fn multipass_draw(&self, source: &Framebuffer) -> Result<()> {
        let result = self.draw_chain(source);
        let deselected = self.buffer.deselect_mip();
        self.buffer.disable_additive_blending();
        let deactivated = self.buffer.deactivate();
        result.and(deselected).and(deactivated)
    }

    fn draw_chain(&self, source: &Framebuffer) -> Result<()> {
        let num_mips = self.buffer.num_mips();

        self.buffer.activate_mip(0, None)?;
        source.blit(&self.buffer, BufferBits::COLOR)?;

        self.downsample_shader.configure_with(&self.buffer)?;
        for dest_mip in 1..num_mips {
            self.buffer.activate_mip(dest_mip, None)?;
            self.buffer.select_mip(dest_mip - 1)?;
            draw_builtin(&self.downsample_shader, BuiltinMesh::ScreenQuad)?;
        }

        // Upsampling accumulates into the existing mip contents.
        self.buffer.enable_additive_blending();
        self.upsample_shader.configure_with(&self.buffer)?;
        for dest_mip in (0..num_mips.saturating_sub(1)).rev() {
            self.buffer.activate_mip(dest_mip, None)?;
            self.buffer.select_mip(dest_mip + 1)?;
            draw_builtin(&self.upsample_shader, BuiltinMesh::ScreenQuad)?;
        }
        Ok(())
    }
}

impl TextureSource for BloomPass {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.output()?.bind(next_unit)?;
        shader.set_sampler(BLOOM_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

#[cfg(test)]
#[path = "bloom_tests.rs"]
mod tests;
