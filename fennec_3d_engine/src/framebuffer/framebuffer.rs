/// Off-screen render target aggregating color, depth and stencil attachments
///
/// Attachments are added right after construction. At most one depth, one
/// stencil, or one combined depth-stencil buffer may exist; color buffers
/// are unlimited and get sequential color indices. The framebuffer owns its
/// attachments and releases them, and its own device object, on drop.

use std::rc::Rc;

use glam::Vec4;

use crate::error::Result;
use crate::framebuffer::{Attachment, AttachmentResource, AttachmentTarget, BufferType};
use crate::graphics_device::{
    calculate_mip_level, BlendMode, BufferBits, FramebufferId, FramebufferStatus, GraphicsDevice,
    ImageSize, MipGeneration, RenderbufferDesc, TextureDesc, TextureKind, TextureParams, Viewport,
    CUBEMAP_FACE_COUNT,
};
use crate::resource::{Renderbuffer, Texture};

/// Clear color used unless a framebuffer overrides it (opaque black)
pub const DEFAULT_CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

pub struct Framebuffer {
    device: Rc<dyn GraphicsDevice>,
    id: FramebufferId,
    size: ImageSize,
    samples: u32,
    clear_color: Vec4,
    attachments: Vec<Attachment>,
    has_color: bool,
    has_depth: bool,
    has_stencil: bool,
    num_color_attachments: u32,
}

impl Framebuffer {
    pub fn new(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Self> {
        Self::with_samples(device, size, 0)
    }

    /// Framebuffer whose 2D attachments are multisampled with `samples` samples
    pub fn with_samples(device: &Rc<dyn GraphicsDevice>, size: ImageSize, samples: u32) -> Result<Self> {
        if size.width == 0 || size.height == 0 {
            crate::engine_bail!(
                InvalidState,
                "fennec3d::Framebuffer",
                "Framebuffer size must be non-zero, got {}x{}",
                size.width,
                size.height
            );
        }
        let id = device.create_framebuffer()?;
        Ok(Self {
            device: Rc::clone(device),
            id,
            size,
            samples,
            clear_color: DEFAULT_CLEAR_COLOR,
            attachments: Vec::new(),
            has_color: false,
            has_depth: false,
            has_stencil: false,
            num_color_attachments: 0,
        })
    }

    // ===== ATTACHING =====

    /// Attach a sampleable texture with the default attachment parameters
    pub fn attach_texture(&mut self, buffer_type: BufferType) -> Result<&Attachment> {
        self.attach_texture_with(buffer_type, TextureParams::attachment_default())
    }

    /// Attach a sampleable texture sized to the framebuffer
    pub fn attach_texture_with(&mut self, buffer_type: BufferType, params: TextureParams) -> Result<&Attachment> {
        self.check_flags(buffer_type)?;

        let kind = buffer_type.texture_kind();
        let num_mips = match params.generate_mips {
            MipGeneration::Always => params.mip_count_for(self.size.width, self.size.height),
            MipGeneration::Never | MipGeneration::OnLoad => 1,
        };
        let desc = TextureDesc {
            kind,
            width: self.size.width,
            height: self.size.height,
            mip_levels: num_mips,
            samples: if kind == TextureKind::Cubemap { 0 } else { self.samples },
            internal_format: buffer_type.internal_format(),
            pixel_format: buffer_type.pixel_format(),
            data_type: buffer_type.data_type(),
        };
        let texture = Texture::new(&self.device, desc, params)?;

        let color_index = buffer_type.is_color().then_some(self.num_color_attachments);
        let point = buffer_type.attachment_point(color_index.unwrap_or(0));
        // Cubemaps start out bound at +X; activate() rebinds the requested face.
        let face = (kind == TextureKind::Cubemap).then_some(0);

        self.device.bind_framebuffer(Some(self.id))?;
        self.device.attach_texture(self.id, point, texture.id(), 0, face)?;

        let attachment = Attachment::new(
            AttachmentResource::Texture(texture),
            buffer_type,
            color_index,
            self.size,
            num_mips,
        );
        self.commit(attachment)
    }

    /// Attach a write-only renderbuffer sized to the framebuffer
    pub fn attach_renderbuffer(&mut self, buffer_type: BufferType) -> Result<&Attachment> {
        self.check_flags(buffer_type)?;
        if buffer_type.is_cubemap() {
            crate::engine_bail!(
                InvalidState,
                "fennec3d::Framebuffer",
                "{:?} cannot be a renderbuffer",
                buffer_type
            );
        }

        let renderbuffer = Renderbuffer::new(
            &self.device,
            RenderbufferDesc {
                width: self.size.width,
                height: self.size.height,
                samples: self.samples,
                internal_format: buffer_type.internal_format(),
            },
        )?;

        let color_index = buffer_type.is_color().then_some(self.num_color_attachments);
        let point = buffer_type.attachment_point(color_index.unwrap_or(0));

        self.device.bind_framebuffer(Some(self.id))?;
        self.device.attach_renderbuffer(self.id, point, renderbuffer.id())?;

        let attachment = Attachment::new(
            AttachmentResource::Renderbuffer(renderbuffer),
            buffer_type,
            color_index,
            self.size,
            1,
        );
        self.commit(attachment)
    }

    fn check_flags(&self, buffer_type: BufferType) -> Result<()> {
        let duplicate = match buffer_type {
            BufferType::Depth => self.has_depth,
            BufferType::Stencil => self.has_stencil,
            BufferType::DepthAndStencil => self.has_depth || self.has_stencil,
            _ => false,
        };
        if duplicate {
            crate::engine_bail!(
                InvalidState,
                "fennec3d::Framebuffer",
                "Cannot attach {:?}: framebuffer already has a depth or stencil attachment",
                buffer_type
            );
        }
        Ok(())
    }

    /// Finalize an attachment already bound on the device
    fn commit(&mut self, attachment: Attachment) -> Result<&Attachment> {
        let buffer_type = attachment.buffer_type();
        let color_count = self.num_color_attachments + u32::from(buffer_type.is_color());
        self.device.set_draw_buffers(self.id, color_count)?;

        if let FramebufferStatus::Incomplete(reason) = self.device.check_framebuffer_status(self.id)? {
            self.device.bind_framebuffer(None)?;
            crate::engine_bail!(
                IncompleteFramebuffer,
                "fennec3d::Framebuffer",
                "Framebuffer {}x{} incomplete after attaching {:?}: {}",
                self.size.width,
                self.size.height,
                buffer_type,
                reason
            );
        }

        match buffer_type {
            BufferType::Depth => self.has_depth = true,
            BufferType::Stencil => self.has_stencil = true,
            BufferType::DepthAndStencil => {
                self.has_depth = true;
                self.has_stencil = true;
            }
            _ => {
                self.has_color = true;
                self.num_color_attachments = color_count;
            }
        }

        self.device.bind_framebuffer(None)?;
        let index = self.attachments.len();
        self.attachments.push(attachment);
        Ok(&self.attachments[index])
    }

    // ===== ACTIVATION =====

    /// Render into mip 0 of every attachment
    pub fn activate(&self) -> Result<()> {
        self.activate_mip(0, None)
    }

    /// Render into `mip` of every attachment, and into one `face` of cubemap attachments
    ///
    /// The viewport is set to the size of that mip.
    pub fn activate_mip(&self, mip: u32, face: Option<u32>) -> Result<()> {
        if let Some(face) = face {
            if face >= CUBEMAP_FACE_COUNT {
                crate::engine_bail!(
                    InvalidState,
                    "fennec3d::Framebuffer",
                    "Cubemap face {} out of range [0, {})",
                    face,
                    CUBEMAP_FACE_COUNT
                );
            }
        }

        self.device.bind_framebuffer(Some(self.id))?;

        for attachment in &self.attachments {
            match attachment.resource() {
                AttachmentResource::Texture(texture) => {
                    if mip >= attachment.num_mips() {
                        crate::engine_bail!(
                            InvalidState,
                            "fennec3d::Framebuffer",
                            "Mip {} out of range for {:?} attachment with {} mips",
                            mip,
                            attachment.buffer_type(),
                            attachment.num_mips()
                        );
                    }
                    if face.is_some() && attachment.texture_kind() != TextureKind::Cubemap {
                        crate::engine_bail!(
                            InvalidState,
                            "fennec3d::Framebuffer",
                            "Cubemap face given for 2D {:?} attachment",
                            attachment.buffer_type()
                        );
                    }
                    self.device.attach_texture(self.id, attachment.point(), texture.id(), mip, face)?;
                }
                AttachmentResource::Renderbuffer(_) => {
                    if mip != 0 {
                        crate::engine_bail!(
                            InvalidState,
                            "fennec3d::Framebuffer",
                            "Mip {} activated for {:?} renderbuffer",
                            mip,
                            attachment.buffer_type()
                        );
                    }
                    if face.is_some() {
                        crate::engine_bail!(
                            InvalidState,
                            "fennec3d::Framebuffer",
                            "Cubemap face given for {:?} renderbuffer",
                            attachment.buffer_type()
                        );
                    }
                }
            }
        }

        let mip_size = calculate_mip_level(self.size.width, self.size.height, mip);
        self.device.set_viewport(Viewport::full(mip_size.width, mip_size.height));
        Ok(())
    }

    /// Return to the default (screen) target
    pub fn deactivate(&self) -> Result<()> {
        self.device.bind_framebuffer(None)
    }

    // ===== CLEAR / BLIT =====

    /// Buffer bits that have an attachment
    pub fn clear_bits(&self) -> BufferBits {
        let mut bits = BufferBits::empty();
        if self.has_color {
            bits |= BufferBits::COLOR;
        }
        if self.has_depth {
            bits |= BufferBits::DEPTH;
        }
        if self.has_stencil {
            bits |= BufferBits::STENCIL;
        }
        bits
    }

    /// Clear the active target, touching only attached buffer kinds
    pub fn clear(&self) {
        self.device.set_clear_color(self.clear_color);
        self.device.clear(self.clear_bits());
    }

    /// Same-size copy of `bits` into `target`
    pub fn blit(&self, target: &Framebuffer, bits: BufferBits) -> Result<()> {
        self.device
            .blit_framebuffer(Some(self.id), self.size, Some(target.id), self.size, bits)?;
        self.deactivate()
    }

    /// Same-size copy of `bits` onto the screen
    pub fn blit_to_default(&self, bits: BufferBits) -> Result<()> {
        self.device.blit_framebuffer(Some(self.id), self.size, None, self.size, bits)?;
        self.deactivate()
    }

    // ===== BLENDING =====

    pub fn enable_alpha_blending(&self) {
        self.device.set_blend_mode(BlendMode::Alpha);
    }

    pub fn disable_alpha_blending(&self) {
        self.device.set_blend_mode(BlendMode::Disabled);
    }

    pub fn enable_additive_blending(&self) {
        self.device.set_blend_mode(BlendMode::Additive);
    }

    pub fn disable_additive_blending(&self) {
        self.device.set_blend_mode(BlendMode::Disabled);
    }

    // ===== GETTERS =====

    pub fn id(&self) -> FramebufferId {
        self.id
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn num_color_attachments(&self) -> u32 {
        self.num_color_attachments
    }

    pub fn device(&self) -> &Rc<dyn GraphicsDevice> {
        &self.device
    }

    /// Texture attachment of the given buffer type
    pub fn texture(&self, buffer_type: BufferType) -> Result<&Texture> {
        self.find(AttachmentTarget::Texture, buffer_type)?.as_texture()
    }

    /// Renderbuffer attachment of the given buffer type
    pub fn renderbuffer(&self, buffer_type: BufferType) -> Result<&Renderbuffer> {
        let attachment = self.find(AttachmentTarget::Renderbuffer, buffer_type)?;
        attachment.as_renderbuffer().ok_or_else(|| {
            crate::engine_err!(
                InvalidResource,
                "fennec3d::Framebuffer",
                "{:?} attachment is not a renderbuffer",
                buffer_type
            )
        })
    }

    fn find(&self, target: AttachmentTarget, buffer_type: BufferType) -> Result<&Attachment> {
        match self
            .attachments
            .iter()
            .find(|a| a.target() == target && a.buffer_type() == buffer_type)
        {
            Some(attachment) => Ok(attachment),
            None => Err(crate::engine_err!(
                InvalidResource,
                "fennec3d::Framebuffer",
                "No {:?} {:?} attachment",
                buffer_type,
                target
            )),
        }
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        self.device.destroy_framebuffer(self.id);
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("attachments", &self.attachments)
            .finish()
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
