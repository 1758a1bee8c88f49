/// Drawable objects supplied by the scene collaborator
///
/// The renderer never sees vertex data or materials. A drawable binds its
/// own buffers and per-material textures, pulling texture units from the
/// optional registry inside a usage block so frame-wide bindings survive.

use glam::Mat4;

use crate::error::Result;
use crate::graphics_device::BuiltinMesh;
use crate::pass::draw_builtin;
use crate::shader::Shader;
use crate::texture_registry::TextureRegistry;

/// Uniform receiving the model-to-world transform
pub const MODEL_UNIFORM: &str = "model";

pub trait Drawable {
    /// Draw with `transform` as the model matrix
    fn draw_with_transform(
        &self,
        transform: Mat4,
        shader: &Shader,
        registry: Option<&mut TextureRegistry>,
    ) -> Result<()>;

    /// Draw with the drawable's own placement
    fn draw(&self, shader: &Shader, registry: Option<&mut TextureRegistry>) -> Result<()> {
        self.draw_with_transform(Mat4::IDENTITY, shader, registry)
    }
}

/// Built-in meshes are untextured; the registry is not touched
impl Drawable for BuiltinMesh {
    fn draw_with_transform(
        &self,
        transform: Mat4,
        shader: &Shader,
        _registry: Option<&mut TextureRegistry>,
    ) -> Result<()> {
        shader.set_mat4(MODEL_UNIFORM, transform);
        draw_builtin(shader, *self)
    }
}

#[cfg(test)]
#[path = "drawable_tests.rs"]
mod tests;
