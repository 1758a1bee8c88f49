/// G-buffer - geometry pass target of the deferred pipeline
///
/// Four color attachments, in this fixed order:
/// 0. position (RGB) + ambient occlusion (A), half float
/// 1. normal (RGB) + roughness (A), signed normalized
/// 2. albedo (RGB) + metallic (A)
/// 3. emission (RGB)
///
/// plus a depth-stencil renderbuffer. The clear color is all zero so that
/// empty pixels are told apart from geometry in the lighting pass.

use std::ops::Deref;
use std::rc::Rc;

use glam::Vec4;

use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{GraphicsDevice, ImageSize};
use crate::resource::Texture;
use crate::shader::{shader_variant, Shader, ShaderCode, ShaderSourceLoader};
use crate::texture_registry::TextureSource;

pub const DEFERRED_VERT: &str = "content/shaders/builtin/deferred.vert";
pub const DEFERRED_FRAG: &str = "content/shaders/builtin/deferred.frag";

/// Sampler uniforms, in binding order
pub const G_BUFFER_SAMPLERS: [&str; 4] = ["gPositionAO", "gNormalRoughness", "gAlbedoMetallic", "gEmission"];

const COLOR_LAYOUT: [BufferType; 4] = [
    BufferType::ColorHdrAlpha,
    BufferType::ColorSnormAlpha,
    BufferType::ColorAlpha,
    BufferType::ColorAlpha,
];

shader_variant! {
    /// Writes model surface attributes into the G-buffer
    DeferredGeometryPassShader
}

impl DeferredGeometryPassShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Ok(Self(Shader::new(
            device,
            loader,
            ShaderCode::Path(DEFERRED_VERT),
            ShaderCode::Path(DEFERRED_FRAG),
        )?))
    }
}

#[derive(Debug)]
pub struct GBuffer {
    framebuffer: Framebuffer,
}

impl GBuffer {
    pub fn new(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Self> {
        let mut framebuffer = Framebuffer::new(device, size)?;
        framebuffer.set_clear_color(Vec4::ZERO);
        framebuffer.attach_renderbuffer(BufferType::DepthAndStencil)?;
        for buffer_type in COLOR_LAYOUT {
            framebuffer.attach_texture(buffer_type)?;
        }
        Ok(Self { framebuffer })
    }

    /// Rebuild every attachment at `size`
    pub fn resize(&mut self, size: ImageSize) -> Result<()> {
        let device = Rc::clone(self.framebuffer.device());
        *self = Self::new(&device, size)?;
        Ok(())
    }

    pub fn position_ao_texture(&self) -> Result<&Texture> {
        self.color_texture(0)
    }

    pub fn normal_roughness_texture(&self) -> Result<&Texture> {
        self.color_texture(1)
    }

    pub fn albedo_metallic_texture(&self) -> Result<&Texture> {
        self.color_texture(2)
    }

    pub fn emission_texture(&self) -> Result<&Texture> {
        self.color_texture(3)
    }

    fn color_texture(&self, index: u32) -> Result<&Texture> {
        match self.framebuffer.attachments().iter().find(|a| a.color_index() == Some(index)) {
            Some(attachment) => attachment.as_texture(),
            None => crate::engine_bail!(
                InvalidState,
                "fennec3d::GBuffer",
                "No color attachment {}",
                index
            ),
        }
    }
}

impl Deref for GBuffer {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

impl TextureSource for GBuffer {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        let mut unit = next_unit;
        for (index, sampler) in G_BUFFER_SAMPLERS.iter().enumerate() {
            self.color_texture(index as u32)?.bind(unit)?;
            shader.set_sampler(sampler, unit);
            unit += 1;
        }
        Ok(unit)
    }
}

#[cfg(test)]
#[path = "g_buffer_tests.rs"]
mod tests;
