/// Owned GPU textures and renderbuffers.
///
/// A `Texture` or `Renderbuffer` is the single owner of its device object and
/// releases it on drop. Framebuffer attachments, IBL maps and the SSAO noise
/// texture are all built on these.

use std::rc::Rc;

use glam::Vec3;

use crate::error::Result;
use crate::graphics_device::{
    DataType, GraphicsDevice, ImageSize, InternalFormat, MipGeneration, PixelFormat,
    RenderbufferDesc, RenderbufferId, TextureDesc, TextureId, TextureKind, TextureParams,
};

/// Max level restored by `unset_sampler_mip_range` (the GL default)
pub const UNBOUNDED_MAX_MIP: u32 = 1000;

// ===== TEXTURE =====

/// Sampleable GPU image (2D or cubemap) with its sampling parameters
pub struct Texture {
    device: Rc<dyn GraphicsDevice>,
    id: TextureId,
    desc: TextureDesc,
    params: TextureParams,
}

impl Texture {
    /// Allocate a texture and apply `params`
    pub fn new(device: &Rc<dyn GraphicsDevice>, desc: TextureDesc, params: TextureParams) -> Result<Self> {
        let id = device.create_texture(&desc)?;
        let texture = Self {
            device: Rc::clone(device),
            id,
            desc,
            params,
        };
        // Dropping `texture` on error releases the allocation.
        texture.device.set_texture_params(id, &params)?;
        Ok(texture)
    }

    /// 2D RGB16F texture filled with `data` (row-major, `width * height` texels)
    pub fn from_rgb_f32(
        device: &Rc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        data: &[Vec3],
        params: TextureParams,
    ) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            crate::engine_bail!(
                InvalidResource,
                "fennec3d::Texture",
                "{} texels given for a {}x{} texture",
                data.len(),
                width,
                height
            );
        }
        let desc = TextureDesc {
            kind: TextureKind::Tex2D,
            width,
            height,
            mip_levels: params.mip_count_for(width, height),
            samples: 0,
            internal_format: InternalFormat::RGB16F,
            pixel_format: PixelFormat::RGB,
            data_type: DataType::FLOAT,
        };
        let texture = Self::new(device, desc, params)?;
        texture.device.write_texture(texture.id, bytemuck::cast_slice(data))?;
        if params.generate_mips == MipGeneration::OnLoad && desc.mip_levels > 1 {
            texture.generate_mips(None)?;
        }
        Ok(texture)
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn kind(&self) -> TextureKind {
        self.desc.kind
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.desc.width, self.desc.height)
    }

    pub fn num_mips(&self) -> u32 {
        self.desc.mip_levels
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn params(&self) -> &TextureParams {
        &self.params
    }

    pub fn set_params(&mut self, params: TextureParams) -> Result<()> {
        self.device.set_texture_params(self.id, &params)?;
        self.params = params;
        Ok(())
    }

    /// Restrict sampling to mips `min..=max`
    pub fn set_sampler_mip_range(&self, min: u32, max: u32) -> Result<()> {
        if min > max || max >= self.desc.mip_levels {
            crate::engine_bail!(
                InvalidState,
                "fennec3d::Texture",
                "Sampler mip range {}..={} outside the {} allocated mips",
                min,
                max,
                self.desc.mip_levels
            );
        }
        self.device.set_sampler_mip_range(self.id, min, max)
    }

    /// Make every mip sampleable again
    pub fn unset_sampler_mip_range(&self) -> Result<()> {
        self.device.set_sampler_mip_range(self.id, 0, UNBOUNDED_MAX_MIP)
    }

    /// Regenerate the chain from mip 0, optionally stopping at `max_level`
    pub fn generate_mips(&self, max_level: Option<u32>) -> Result<()> {
        self.device.generate_mips(self.id, max_level)
    }

    /// Bind to texture unit `unit`
    pub fn bind(&self, unit: u32) -> Result<()> {
        self.device.bind_texture(unit, self.id)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.device.destroy_texture(self.id);
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .finish()
    }
}

// ===== RENDERBUFFER =====

/// Write-only GPU image, used when an attachment is never sampled
pub struct Renderbuffer {
    device: Rc<dyn GraphicsDevice>,
    id: RenderbufferId,
    desc: RenderbufferDesc,
}

impl Renderbuffer {
    pub fn new(device: &Rc<dyn GraphicsDevice>, desc: RenderbufferDesc) -> Result<Self> {
        let id = device.create_renderbuffer(&desc)?;
        Ok(Self {
            device: Rc::clone(device),
            id,
            desc,
        })
    }

    pub fn id(&self) -> RenderbufferId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn internal_format(&self) -> InternalFormat {
        self.desc.internal_format
    }
}

impl Drop for Renderbuffer {
    fn drop(&mut self) {
        self.device.destroy_renderbuffer(self.id);
    }
}

impl std::fmt::Debug for Renderbuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderbuffer")
            .field("id", &self.id)
            .field("desc", &self.desc)
            .finish()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
