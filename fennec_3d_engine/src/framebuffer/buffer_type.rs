/// Framebuffer buffer types and their format mapping

use crate::graphics_device::{AttachmentPoint, DataType, InternalFormat, PixelFormat, TextureKind};

/// What an attachment stores. Formats are always derived from this, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// RGB, 8 bits per channel
    Color,
    /// RGB, half float
    ColorHdr,
    /// RGB, signed normalized
    ColorSnorm,
    /// RGBA, 8 bits per channel
    ColorAlpha,
    /// RGBA, half float
    ColorHdrAlpha,
    /// RGBA, signed normalized
    ColorSnormAlpha,
    /// Cubemap, RGB half float
    ColorCubemapHdr,
    /// Cubemap, RGBA half float
    ColorCubemapHdrAlpha,
    /// Single 8-bit channel
    Grayscale,
    Depth,
    Stencil,
    DepthAndStencil,
}

/// Which group of attachment points a buffer type binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Color,
    Depth,
    Stencil,
    DepthStencil,
}

impl BufferType {
    pub const ALL: [BufferType; 12] = [
        BufferType::Color,
        BufferType::ColorHdr,
        BufferType::ColorSnorm,
        BufferType::ColorAlpha,
        BufferType::ColorHdrAlpha,
        BufferType::ColorSnormAlpha,
        BufferType::ColorCubemapHdr,
        BufferType::ColorCubemapHdrAlpha,
        BufferType::Grayscale,
        BufferType::Depth,
        BufferType::Stencil,
        BufferType::DepthAndStencil,
    ];

    pub fn internal_format(&self) -> InternalFormat {
        match self {
            BufferType::Color => InternalFormat::RGB8,
            BufferType::ColorHdr | BufferType::ColorCubemapHdr => InternalFormat::RGB16F,
            BufferType::ColorSnorm => InternalFormat::RGB16_SNORM,
            BufferType::ColorAlpha => InternalFormat::RGBA8,
            BufferType::ColorHdrAlpha | BufferType::ColorCubemapHdrAlpha => InternalFormat::RGBA16F,
            BufferType::ColorSnormAlpha => InternalFormat::RGBA16_SNORM,
            BufferType::Grayscale => InternalFormat::R8,
            BufferType::Depth => InternalFormat::DEPTH_COMPONENT32F,
            BufferType::Stencil => InternalFormat::STENCIL_INDEX8,
            BufferType::DepthAndStencil => InternalFormat::DEPTH24_STENCIL8,
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            BufferType::Color
            | BufferType::ColorHdr
            | BufferType::ColorSnorm
            | BufferType::ColorCubemapHdr => PixelFormat::RGB,
            BufferType::ColorAlpha
            | BufferType::ColorHdrAlpha
            | BufferType::ColorSnormAlpha
            | BufferType::ColorCubemapHdrAlpha => PixelFormat::RGBA,
            BufferType::Grayscale => PixelFormat::RED,
            BufferType::Depth => PixelFormat::DEPTH_COMPONENT,
            BufferType::Stencil => PixelFormat::STENCIL_INDEX,
            BufferType::DepthAndStencil => PixelFormat::DEPTH_STENCIL,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            BufferType::Color
            | BufferType::ColorAlpha
            | BufferType::Grayscale
            | BufferType::Stencil => DataType::UNSIGNED_BYTE,
            BufferType::ColorHdr
            | BufferType::ColorSnorm
            | BufferType::ColorHdrAlpha
            | BufferType::ColorSnormAlpha
            | BufferType::ColorCubemapHdr
            | BufferType::ColorCubemapHdrAlpha
            | BufferType::Depth => DataType::FLOAT,
            BufferType::DepthAndStencil => DataType::UNSIGNED_INT_24_8,
        }
    }

    pub fn texture_kind(&self) -> TextureKind {
        if self.is_cubemap() {
            TextureKind::Cubemap
        } else {
            TextureKind::Tex2D
        }
    }

    pub fn is_cubemap(&self) -> bool {
        matches!(self, BufferType::ColorCubemapHdr | BufferType::ColorCubemapHdrAlpha)
    }

    pub fn attachment_kind(&self) -> AttachmentKind {
        match self {
            BufferType::Depth => AttachmentKind::Depth,
            BufferType::Stencil => AttachmentKind::Stencil,
            BufferType::DepthAndStencil => AttachmentKind::DepthStencil,
            _ => AttachmentKind::Color,
        }
    }

    pub fn is_color(&self) -> bool {
        self.attachment_kind() == AttachmentKind::Color
    }

    /// Attachment point; `color_index` is only used for color buffers
    pub fn attachment_point(&self, color_index: u32) -> AttachmentPoint {
        match self.attachment_kind() {
            AttachmentKind::Color => AttachmentPoint::Color(color_index),
            AttachmentKind::Depth => AttachmentPoint::Depth,
            AttachmentKind::Stencil => AttachmentPoint::Stencil,
            AttachmentKind::DepthStencil => AttachmentPoint::DepthStencil,
        }
    }
}

#[cfg(test)]
#[path = "buffer_type_tests.rs"]
mod tests;
