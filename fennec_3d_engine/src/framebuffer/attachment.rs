/// One image bound into a framebuffer

use crate::error::Result;
use crate::framebuffer::BufferType;
use crate::graphics_device::{AttachmentPoint, ImageSize, TextureKind};
use crate::resource::{Renderbuffer, Texture};

/// Whether the attachment can be sampled later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentTarget {
    Texture,
    Renderbuffer,
}

/// Owned GPU image behind an attachment
#[derive(Debug)]
pub enum AttachmentResource {
    Texture(Texture),
    Renderbuffer(Renderbuffer),
}

/// Image owned by a framebuffer. Immutable once created.
#[derive(Debug)]
pub struct Attachment {
    resource: AttachmentResource,
    buffer_type: BufferType,
    color_index: Option<u32>,
    size: ImageSize,
    num_mips: u32,
}

impl Attachment {
    pub(crate) fn new(
        resource: AttachmentResource,
        buffer_type: BufferType,
        color_index: Option<u32>,
        size: ImageSize,
        num_mips: u32,
    ) -> Self {
        Self { resource, buffer_type, color_index, size, num_mips }
    }

    pub fn buffer_type(&self) -> BufferType {
        self.buffer_type
    }

    pub fn target(&self) -> AttachmentTarget {
        match self.resource {
            AttachmentResource::Texture(_) => AttachmentTarget::Texture,
            AttachmentResource::Renderbuffer(_) => AttachmentTarget::Renderbuffer,
        }
    }

    pub fn texture_kind(&self) -> TextureKind {
        self.buffer_type.texture_kind()
    }

    /// Color attachment index, `None` for depth/stencil
    pub fn color_index(&self) -> Option<u32> {
        self.color_index
    }

    pub fn point(&self) -> AttachmentPoint {
        self.buffer_type.attachment_point(self.color_index.unwrap_or(0))
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

    pub fn num_mips(&self) -> u32 {
        self.num_mips
    }

    pub fn resource(&self) -> &AttachmentResource {
        &self.resource
    }

    /// The sampleable texture, or an error for renderbuffer attachments
    pub fn as_texture(&self) -> Result<&Texture> {
        match &self.resource {
            AttachmentResource::Texture(texture) => Ok(texture),
            AttachmentResource::Renderbuffer(_) => {
                crate::engine_bail!(
                    InvalidResource,
                    "fennec3d::Attachment",
                    "{:?} attachment is a renderbuffer, not a texture",
                    self.buffer_type
                );
            }
        }
    }

    pub fn as_renderbuffer(&self) -> Option<&Renderbuffer> {
        match &self.resource {
            AttachmentResource::Renderbuffer(rb) => Some(rb),
            AttachmentResource::Texture(_) => None,
        }
    }
}
