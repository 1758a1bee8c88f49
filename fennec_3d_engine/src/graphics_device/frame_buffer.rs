/// Framebuffer-level device types: attachment points, buffer bits, blend modes

use bitflags::bitflags;

/// Where an image is bound inside a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// Color attachment with its index (COLOR_ATTACHMENT0 + n)
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

bitflags! {
    /// Buffer kinds selected by clear and blit operations
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferBits: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Outcome of a framebuffer completeness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    /// Incomplete, with the driver's reason
    Incomplete(String),
}

impl FramebufferStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, FramebufferStatus::Complete)
    }
}

/// Color blending state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Disabled,
    /// src * alpha + dst * (1 - alpha)
    Alpha,
    /// src + dst
    Additive,
}

/// Pixel rectangle the rasterizer writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport covering a whole `width` x `height` target from the origin
    pub fn full(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Number of faces of a cubemap
pub const CUBEMAP_FACE_COUNT: u32 = 6;
