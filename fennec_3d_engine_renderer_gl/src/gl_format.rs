/// Engine enums to OpenGL enums
///
/// Pure lookups, kept apart from the device so they can be tested without a
/// context.

use fennec_3d_engine::fennec3d::device::{
    AttachmentPoint, BlendMode, BufferBits, DataType, InternalFormat, PixelFormat, ShaderStage, TextureFiltering,
    TextureKind, TextureWrap,
};

// ============================================================================
// Texture storage
// ============================================================================

pub fn internal_format(format: InternalFormat) -> u32 {
    match format {
        InternalFormat::RGB8 => glow::RGB8,
        InternalFormat::RGB16F => glow::RGB16F,
        InternalFormat::RGB16_SNORM => glow::RGB16_SNORM,
        InternalFormat::RGBA8 => glow::RGBA8,
        InternalFormat::RGBA16F => glow::RGBA16F,
        InternalFormat::RGBA16_SNORM => glow::RGBA16_SNORM,
        InternalFormat::R8 => glow::R8,
        InternalFormat::DEPTH_COMPONENT32F => glow::DEPTH_COMPONENT32F,
        InternalFormat::STENCIL_INDEX8 => glow::STENCIL_INDEX8,
        InternalFormat::DEPTH24_STENCIL8 => glow::DEPTH24_STENCIL8,
    }
}

pub fn pixel_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::RGB => glow::RGB,
        PixelFormat::RGBA => glow::RGBA,
        PixelFormat::RED => glow::RED,
        PixelFormat::DEPTH_COMPONENT => glow::DEPTH_COMPONENT,
        PixelFormat::STENCIL_INDEX => glow::STENCIL_INDEX,
        PixelFormat::DEPTH_STENCIL => glow::DEPTH_STENCIL,
    }
}

pub fn data_type(data_type: DataType) -> u32 {
    match data_type {
        DataType::UNSIGNED_BYTE => glow::UNSIGNED_BYTE,
        DataType::FLOAT => glow::FLOAT,
        DataType::UNSIGNED_INT_24_8 => glow::UNSIGNED_INT_24_8,
    }
}

/// Size in bytes of one component of `data_type`
pub fn component_size(data_type: DataType) -> usize {
    match data_type {
        DataType::UNSIGNED_BYTE => 1,
        DataType::FLOAT | DataType::UNSIGNED_INT_24_8 => 4,
    }
}

/// Bind target of a texture; multisampling only applies to 2D textures
pub fn texture_target(kind: TextureKind, samples: u32) -> u32 {
    match kind {
        TextureKind::Tex2D if samples > 0 => glow::TEXTURE_2D_MULTISAMPLE,
        TextureKind::Tex2D => glow::TEXTURE_2D,
        TextureKind::Cubemap => glow::TEXTURE_CUBE_MAP,
    }
}

/// Image target of cubemap `face` (+X, -X, +Y, -Y, +Z, -Z)
pub fn cubemap_face_target(face: u32) -> u32 {
    glow::TEXTURE_CUBE_MAP_POSITIVE_X + face
}

// ============================================================================
// Sampling
// ============================================================================

/// Min/mag filters and anisotropy level
///
/// Trilinear filtering on a single-mip texture falls back to bilinear, since
/// a mipmapped min filter would make it incomplete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub min: u32,
    pub mag: u32,
    pub anisotropy: Option<f32>,
}

pub fn filter_state(filtering: TextureFiltering, mip_levels: u32) -> FilterState {
    let mipmapped = mip_levels > 1;
    match filtering {
        TextureFiltering::Nearest => FilterState { min: glow::NEAREST, mag: glow::NEAREST, anisotropy: None },
        TextureFiltering::Bilinear => FilterState { min: glow::LINEAR, mag: glow::LINEAR, anisotropy: None },
        TextureFiltering::Trilinear | TextureFiltering::Anisotropic(_) => {
            let min = if mipmapped { glow::LINEAR_MIPMAP_LINEAR } else { glow::LINEAR };
            let anisotropy = match filtering {
                TextureFiltering::Anisotropic(level) => Some(level),
                _ => None,
            };
            FilterState { min, mag: glow::LINEAR, anisotropy }
        }
    }
}

/// Wrap mode plus the border color it needs, if any
pub fn wrap_state(wrap: TextureWrap) -> (u32, Option<[f32; 4]>) {
    match wrap {
        TextureWrap::Repeat => (glow::REPEAT, None),
        TextureWrap::ClampToEdge => (glow::CLAMP_TO_EDGE, None),
        TextureWrap::ClampToBorder(color) => (glow::CLAMP_TO_BORDER, Some(color.to_array())),
    }
}

// ============================================================================
// Framebuffers / state
// ============================================================================

pub fn attachment_point(point: AttachmentPoint) -> u32 {
    match point {
        AttachmentPoint::Color(index) => glow::COLOR_ATTACHMENT0 + index,
        AttachmentPoint::Depth => glow::DEPTH_ATTACHMENT,
        AttachmentPoint::Stencil => glow::STENCIL_ATTACHMENT,
        AttachmentPoint::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
    }
}

pub fn buffer_mask(bits: BufferBits) -> u32 {
    let mut mask = 0;
    if bits.contains(BufferBits::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if bits.contains(BufferBits::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    if bits.contains(BufferBits::STENCIL) {
        mask |= glow::STENCIL_BUFFER_BIT;
    }
    mask
}

/// Source/destination blend factors; `None` disables blending
pub fn blend_factors(mode: BlendMode) -> Option<(u32, u32)> {
    match mode {
        BlendMode::Disabled => None,
        BlendMode::Alpha => Some((glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA)),
        BlendMode::Additive => Some((glow::ONE, glow::ONE)),
    }
}

/// Driver name of an incomplete framebuffer status; `None` when complete
pub fn framebuffer_status_name(status: u32) -> Option<&'static str> {
    match status {
        glow::FRAMEBUFFER_COMPLETE => None,
        glow::FRAMEBUFFER_UNDEFINED => Some("FRAMEBUFFER_UNDEFINED"),
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Some("FRAMEBUFFER_INCOMPLETE_ATTACHMENT"),
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Some("FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT"),
        glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => Some("FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER"),
        glow::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => Some("FRAMEBUFFER_INCOMPLETE_READ_BUFFER"),
        glow::FRAMEBUFFER_UNSUPPORTED => Some("FRAMEBUFFER_UNSUPPORTED"),
        glow::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => Some("FRAMEBUFFER_INCOMPLETE_MULTISAMPLE"),
        glow::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => Some("FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS"),
        _ => Some("FRAMEBUFFER_STATUS_UNKNOWN"),
    }
}

// ============================================================================
// Programs
// ============================================================================

pub fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;
