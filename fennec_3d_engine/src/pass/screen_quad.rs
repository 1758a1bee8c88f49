/// Built-in mesh draws shared by every pass
///
/// A pass either draws the fullscreen quad (optionally sampling one texture
/// through `fnk_screenTexture`) or the inside-out unit cube used for cubemap
/// faces and the skybox.

use crate::error::Result;
use crate::graphics_device::BuiltinMesh;
use crate::resource::Texture;
use crate::shader::{Shader, SCREEN_TEXTURE_UNIFORM};
use crate::texture_registry::TextureRegistry;

/// Draw a built-in mesh with `shader` bound for the duration of the draw
pub fn draw_builtin(shader: &Shader, mesh: BuiltinMesh) -> Result<()> {
    shader.activate()?;
    shader.device().draw_builtin(mesh)?;
    shader.deactivate()
}

/// Draw the fullscreen quad, sampling `texture` if one is given
///
/// With a registry the texture takes the first unit past the registry's
/// sources, inside a usage block; without one it goes to unit 0.
pub fn draw_screen_quad(shader: &Shader, texture: Option<&Texture>, registry: Option<&mut TextureRegistry>) -> Result<()> {
    if let Some(texture) = texture {
        let unit = match registry {
            Some(registry) => registry.usage_block().next_texture_unit(),
            None => 0,
        };
        texture.bind(unit)?;
        shader.set_sampler(SCREEN_TEXTURE_UNIFORM, unit);
    }
    draw_builtin(shader, BuiltinMesh::ScreenQuad)
}

#[cfg(test)]
#[path = "screen_quad_tests.rs"]
mod tests;
