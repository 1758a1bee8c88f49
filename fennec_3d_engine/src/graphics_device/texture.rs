/// Texture descriptors, sampling parameters, and mip-chain arithmetic

use glam::Vec4;

/// Dimensionality of a texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Single 2D image (optionally multisampled)
    Tex2D,
    /// Six square faces, +X -X +Y -Y +Z -Z
    Cubemap,
}

/// Sized GPU-side storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum InternalFormat {
    RGB8,
    RGB16F,
    RGB16_SNORM,
    RGBA8,
    RGBA16F,
    RGBA16_SNORM,
    R8,
    DEPTH_COMPONENT32F,
    STENCIL_INDEX8,
    DEPTH24_STENCIL8,
}

/// Client-side layout of the pixel components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    RGB,
    RGBA,
    RED,
    DEPTH_COMPONENT,
    STENCIL_INDEX,
    DEPTH_STENCIL,
}

/// Component data type of uploaded pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum DataType {
    UNSIGNED_BYTE,
    FLOAT,
    UNSIGNED_INT_24_8,
}

impl PixelFormat {
    /// Number of components per pixel
    pub fn components(&self) -> usize {
        match self {
            PixelFormat::RGB => 3,
            PixelFormat::RGBA => 4,
            PixelFormat::DEPTH_STENCIL => 2,
            PixelFormat::RED | PixelFormat::DEPTH_COMPONENT | PixelFormat::STENCIL_INDEX => 1,
        }
    }
}

// ===== SAMPLING PARAMETERS =====

/// Minification/magnification filtering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureFiltering {
    Nearest,
    Bilinear,
    /// Linear between mips; only meaningful with more than one mip
    Trilinear,
    /// Trilinear plus anisotropic filtering with the given max ratio
    Anisotropic(f32),
}

impl TextureFiltering {
    /// Anisotropy level used by the engine when asking for anisotropic sampling
    pub const DEFAULT_ANISOTROPY: f32 = 4.0;
}

/// Wrap mode applied to every texture coordinate axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
    /// Samples outside [0,1] read the given border color
    ClampToBorder(Vec4),
}

/// When the mip chain gets populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipGeneration {
    /// Single level only
    Never,
    /// Allocate a full chain and generate it once, right after upload
    OnLoad,
    /// Allocate a full chain; the owner renders or regenerates it itself
    Always,
}

/// Sampling and storage parameters of a texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    pub filtering: TextureFiltering,
    pub wrap: TextureWrap,
    pub generate_mips: MipGeneration,
    /// Upper bound on the number of allocated mips (`None` = full chain)
    pub max_num_mips: Option<u32>,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            filtering: TextureFiltering::Anisotropic(TextureFiltering::DEFAULT_ANISOTROPY),
            wrap: TextureWrap::Repeat,
            generate_mips: MipGeneration::OnLoad,
            max_num_mips: None,
        }
    }
}

impl TextureParams {
    /// Parameters used for framebuffer attachments unless the caller overrides them
    pub fn attachment_default() -> Self {
        Self {
            filtering: TextureFiltering::Bilinear,
            wrap: TextureWrap::ClampToEdge,
            generate_mips: MipGeneration::Never,
            max_num_mips: None,
        }
    }

    pub fn with_filtering(mut self, filtering: TextureFiltering) -> Self {
        self.filtering = filtering;
        self
    }

    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_mips(mut self, generate_mips: MipGeneration) -> Self {
        self.generate_mips = generate_mips;
        self
    }

    pub fn with_max_num_mips(mut self, max_num_mips: u32) -> Self {
        self.max_num_mips = Some(max_num_mips);
        self
    }

    /// Number of mips to allocate for an image of the given size
    pub fn mip_count_for(&self, width: u32, height: u32) -> u32 {
        match self.generate_mips {
            MipGeneration::Never => 1,
            MipGeneration::OnLoad | MipGeneration::Always => {
                let full = calculate_num_mips(width, height);
                match self.max_num_mips {
                    Some(max) => full.min(max.max(1)),
                    None => full,
                }
            }
        }
    }
}

// ===== DESCRIPTORS =====

/// Descriptor for creating a texture object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDesc {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    /// Number of allocated mip levels (>= 1)
    pub mip_levels: u32,
    /// Sample count; 0 means not multisampled
    pub samples: u32,
    pub internal_format: InternalFormat,
    pub pixel_format: PixelFormat,
    pub data_type: DataType,
}

/// Descriptor for creating a non-sampleable renderbuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderbufferDesc {
    pub width: u32,
    pub height: u32,
    /// Sample count; 0 means not multisampled
    pub samples: u32,
    pub internal_format: InternalFormat,
}

// ===== MIP MATH =====

/// Width/height pair of an image or mip level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Mip count of a full chain: `1 + floor(log2(max(width, height)))`
pub fn calculate_num_mips(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    1 + (u32::BITS - 1 - largest.leading_zeros())
}

/// Size of the mip following `size`: halved, floored, never below 1
pub fn calculate_next_mip(size: ImageSize) -> ImageSize {
    ImageSize {
        width: (size.width / 2).max(1),
        height: (size.height / 2).max(1),
    }
}

/// Size of mip `level` for a base image of `width` x `height`
pub fn calculate_mip_level(width: u32, height: u32, level: u32) -> ImageSize {
    let mut size = ImageSize::new(width, height);
    for _ in 0..level {
        size = calculate_next_mip(size);
    }
    size
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
