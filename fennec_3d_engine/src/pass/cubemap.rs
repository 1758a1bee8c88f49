/// Rendering into the six faces of a cubemap
///
/// `CubemapRenderHelper` owns the per-face loop shared by every cubemap
/// pass: a 90 degree square projection, one fixed view per face, and a unit
/// cube drawn from the inside. `EquirectCubemapConverter` uses it to turn an
/// equirectangular HDR image into an environment cubemap.

use std::ops::Deref;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{
    BuiltinMesh, GraphicsDevice, ImageSize, MipGeneration, TextureFiltering, TextureParams, TextureWrap,
    CUBEMAP_FACE_COUNT,
};
use crate::pass::screen_quad::draw_builtin;
use crate::resource::Texture;
use crate::shader::{shader_variant, Shader, ShaderCode, ShaderSourceLoader, CUBEMAP_VERT};
use crate::texture_registry::TextureSource;

pub const EQUIRECT_CUBEMAP_FRAG: &str = "content/shaders/builtin/equirect_cubemap.frag";

pub const EQUIRECT_MAP_SAMPLER: &str = "fnk_equirectMap";
pub const CUBEMAP_SAMPLER: &str = "fnk_cubemap";

const FACE_NEAR: f32 = 0.1;
const FACE_FAR: f32 = 10.0;

/// Projection covering exactly one cube face
pub fn face_projection() -> Mat4 {
    Mat4::perspective_rh_gl(90f32.to_radians(), 1.0, FACE_NEAR, FACE_FAR)
}

/// View matrices for faces +X, -X, +Y, -Y, +Z, -Z, from the origin
///
/// Cubemap faces are addressed with t pointing down, hence the -Y up
/// vectors on the side faces.
pub fn face_views() -> [Mat4; 6] {
    let look = |target: Vec3, up: Vec3| Mat4::look_at_rh(Vec3::ZERO, target, up);
    [
        look(Vec3::X, Vec3::NEG_Y),
        look(Vec3::NEG_X, Vec3::NEG_Y),
        look(Vec3::Y, Vec3::Z),
        look(Vec3::NEG_Y, Vec3::NEG_Z),
        look(Vec3::Z, Vec3::NEG_Y),
        look(Vec3::NEG_Z, Vec3::NEG_Y),
    ]
}

// ============================================================================
// CubemapRenderHelper
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CubemapRenderHelper {
    target_mip: u32,
}

impl CubemapRenderHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_mip(&self) -> u32 {
        self.target_mip
    }

    pub fn set_target_mip(&mut self, mip: u32) {
        self.target_mip = mip;
    }

    /// Draw the inside of the unit cube once per face of `buffer`
    ///
    /// Sets "projection" once and "view" per face. Leaves the default
    /// target bound.
    pub fn multipass_draw(&self, buffer: &Framebuffer, shader: &Shader) -> Result<()> {
        shader.set_mat4("projection", face_projection());

        let views = face_views();
        for face in 0..CUBEMAP_FACE_COUNT {
            buffer.activate_mip(self.target_mip, Some(face))?;
            buffer.clear();
            shader.set_mat4("view", views[face as usize]);
            draw_builtin(shader, BuiltinMesh::Room)?;
        }

        buffer.deactivate()
    }
}

// ============================================================================
// Equirectangular conversion
// ============================================================================

shader_variant! {
    /// Samples an equirectangular map along the cube direction
    EquirectCubemapShader
}

impl EquirectCubemapShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Ok(Self(Shader::new(
            device,
            loader,
            ShaderCode::Path(CUBEMAP_VERT),
            ShaderCode::Path(EQUIRECT_CUBEMAP_FRAG),
        )?))
    }
}

/// Projects an equirectangular image onto an HDR cubemap
#[derive(Debug)]
pub struct EquirectCubemapConverter {
    buffer: Framebuffer,
    helper: CubemapRenderHelper,
    shader: EquirectCubemapShader,
    generate_mips: bool,
}

impl EquirectCubemapConverter {
    /// `face_size` must be square; with `generate_mips` a full chain is
    /// allocated and filled after each conversion
    pub fn new(
        device: &Rc<dyn GraphicsDevice>,
        loader: &dyn ShaderSourceLoader,
        face_size: ImageSize,
        generate_mips: bool,
    ) -> Result<Self> {
        let (filtering, mips) = if generate_mips {
            (TextureFiltering::Trilinear, MipGeneration::Always)
        } else {
            (TextureFiltering::Bilinear, MipGeneration::Never)
        };
        let params = TextureParams::attachment_default()
            .with_filtering(filtering)
            .with_wrap(TextureWrap::ClampToEdge)
            .with_mips(mips);

        let mut buffer = Framebuffer::new(device, face_size)?;
        buffer.attach_texture_with(BufferType::ColorCubemapHdr, params)?;

        Ok(Self {
            buffer,
            helper: CubemapRenderHelper::new(),
            shader: EquirectCubemapShader::new(device, loader)?,
            generate_mips,
        })
    }

    pub fn cubemap(&self) -> Result<&Texture> {
        self.buffer.texture(BufferType::ColorCubemapHdr)
    }

    pub fn generates_mips(&self) -> bool {
        self.generate_mips
    }

    /// Render `source` (a 2D equirectangular texture) into every face
    pub fn multipass_draw(&self, source: &Texture) -> Result<()> {
        source.bind(0)?;
        self.shader.set_sampler(EQUIRECT_MAP_SAMPLER, 0);

        self.helper.multipass_draw(&self.buffer, &self.shader)?;

        if self.generate_mips {
            self.cubemap()?.generate_mips(None)?;
        }
        crate::engine_debug!(
            "fennec3d::EquirectCubemapConverter",
            "Converted equirect map into a {}x{} cubemap",
            self.buffer.width(),
            self.buffer.height()
        );
        Ok(())
    }
}

impl Deref for EquirectCubemapConverter {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.buffer
    }
}

impl TextureSource for EquirectCubemapConverter {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.cubemap()?.bind(next_unit)?;
        shader.set_sampler(CUBEMAP_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

#[cfg(test)]
#[path = "cubemap_tests.rs"]
mod tests;
