/// GraphicsDevice trait - the single seam between the render core and the GPU
///
/// The device owns every GPU object and hands out generation-checked
/// handles. A handle that outlived its object is rejected instead of
/// aliasing a newer one. Higher-level owners (`Texture`, `Framebuffer`,
/// `Shader`...) release their handle exactly once on drop.
///
/// All methods take `&self`: the device is shared as `Rc<dyn GraphicsDevice>`
/// by every pass and is only ever driven from the thread owning the context.

use glam::Vec4;
use slotmap::new_key_type;

use crate::error::Result;
use crate::graphics_device::{
    AttachmentPoint, BlendMode, BufferBits, FramebufferStatus, ImageSize, RenderbufferDesc,
    ShaderStageSource, TextureDesc, TextureParams, UniformLocation, UniformValue, Viewport,
};

new_key_type! {
    /// Handle to a device texture
    pub struct TextureId;
    /// Handle to a device renderbuffer
    pub struct RenderbufferId;
    /// Handle to a device framebuffer object
    pub struct FramebufferId;
    /// Handle to a linked shader program
    pub struct ProgramId;
}

/// Built-in meshes the passes draw without a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMesh {
    /// Two triangles covering clip space, UVs in [0,1]
    ScreenQuad,
    /// Unit cube seen from the inside (skybox / cubemap faces)
    Room,
}

/// Platform-agnostic GPU device
pub trait GraphicsDevice {
    // ===== TEXTURES =====

    /// Allocate storage for a texture (no data)
    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId>;

    /// Upload tightly packed pixels into mip 0 (face +X..-Z in order for cubemaps)
    fn write_texture(&self, texture: TextureId, data: &[u8]) -> Result<()>;

    /// Apply filtering / wrap parameters
    fn set_texture_params(&self, texture: TextureId, params: &TextureParams) -> Result<()>;

    /// Restrict sampling to mips `min..=max`
    fn set_sampler_mip_range(&self, texture: TextureId, min: u32, max: u32) -> Result<()>;

    /// Regenerate mips from level 0, optionally stopping at `max_level`
    fn generate_mips(&self, texture: TextureId, max_level: Option<u32>) -> Result<()>;

    /// Bind a texture to a texture unit
    fn bind_texture(&self, unit: u32, texture: TextureId) -> Result<()>;

    fn destroy_texture(&self, texture: TextureId);

    // ===== RENDERBUFFERS =====

    fn create_renderbuffer(&self, desc: &RenderbufferDesc) -> Result<RenderbufferId>;

    fn destroy_renderbuffer(&self, renderbuffer: RenderbufferId);

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<FramebufferId>;

    /// Bind `framebuffer` as the draw target; `None` selects the default (screen) target
    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) -> Result<()>;

    /// Attach `mip` of a texture (or one cubemap `face` of it) to the bound framebuffer
    fn attach_texture(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        texture: TextureId,
        mip: u32,
        face: Option<u32>,
    ) -> Result<()>;

    fn attach_renderbuffer(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        renderbuffer: RenderbufferId,
    ) -> Result<()>;

    /// Enable draw buffers for color attachments `0..color_count` (none when 0)
    fn set_draw_buffers(&self, framebuffer: FramebufferId, color_count: u32) -> Result<()>;

    fn check_framebuffer_status(&self, framebuffer: FramebufferId) -> Result<FramebufferStatus>;

    /// Copy the selected buffers between two targets (`None` = screen), nearest filtering
    fn blit_framebuffer(
        &self,
        source: Option<FramebufferId>,
        source_size: ImageSize,
        destination: Option<FramebufferId>,
        destination_size: ImageSize,
        bits: BufferBits,
    ) -> Result<()>;

    fn destroy_framebuffer(&self, framebuffer: FramebufferId);

    // ===== FIXED-FUNCTION STATE =====

    fn set_viewport(&self, viewport: Viewport);

    fn set_clear_color(&self, color: Vec4);

    fn clear(&self, bits: BufferBits);

    fn set_blend_mode(&self, mode: BlendMode);

    fn set_face_culling(&self, enabled: bool);

    fn set_wireframe(&self, enabled: bool);

    // ===== PROGRAMS =====

    /// Compile every stage and link them into a program
    fn create_program(&self, stages: &[ShaderStageSource]) -> Result<ProgramId>;

    /// Make `program` current; `None` unbinds
    fn use_program(&self, program: Option<ProgramId>) -> Result<()>;

    /// Location of a uniform, `None` when the program has no such uniform
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Write a uniform of `program`, whether or not it is current
    fn set_uniform(&self, program: ProgramId, location: UniformLocation, value: UniformValue);

    fn destroy_program(&self, program: ProgramId);

    // ===== DRAWING =====

    /// Draw one of the built-in meshes with the current program
    fn draw_builtin(&self, mesh: BuiltinMesh) -> Result<()>;

    // ===== DEBUG =====

    /// Open a labelled command group (shows up in GPU captures)
    fn push_debug_group(&self, label: &str);

    fn pop_debug_group(&self);
}
