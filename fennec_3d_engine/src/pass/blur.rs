/// Separable Gaussian blur through a pair of ping-pong framebuffers

use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{GraphicsDevice, ImageSize};
use crate::pass::screen_quad::draw_screen_quad;
use crate::resource::Texture;
use crate::shader::{ScreenShader, Shader, ShaderCode, ShaderSourceLoader};
use crate::texture_registry::TextureRegistry;

pub const GAUSSIAN_BLUR_FRAG: &str = "content/shaders/builtin/gaussian_blur.frag";

/// One-dimensional Gaussian blur, horizontal or vertical
#[derive(Debug)]
pub struct GaussianBlurShader {
    shader: Shader,
    horizontal: Cell<bool>,
}

impl GaussianBlurShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let screen = ScreenShader::with_fragment(device, loader, ShaderCode::Path(GAUSSIAN_BLUR_FRAG))?;
        Ok(Self { shader: screen.into_inner(), horizontal: Cell::new(false) })
    }

    pub fn horizontal(&self) -> bool {
        self.horizontal.get()
    }

    pub fn set_horizontal(&self, horizontal: bool) {
        self.horizontal.set(horizontal);
        self.shader.set_bool("horizontal", horizontal);
    }
}

impl Deref for GaussianBlurShader {
    type Target = Shader;

    fn deref(&self) -> &Shader {
        &self.shader
    }
}

/// Two same-size HDR targets drawn into alternately
#[derive(Debug)]
pub struct PingPongPass {
    buffers: [Framebuffer; 2],
}

impl PingPongPass {
    pub fn new(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Self> {
        Ok(Self { buffers: [Self::make_buffer(device, size)?, Self::make_buffer(device, size)?] })
    }

    fn make_buffer(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Framebuffer> {
        let mut framebuffer = Framebuffer::new(device, size)?;
        framebuffer.attach_texture(BufferType::ColorHdrAlpha)?;
        Ok(framebuffer)
    }

    pub fn resize(&mut self, size: ImageSize) -> Result<()> {
        let device = Rc::clone(self.buffers[0].device());
        *self = Self::new(&device, size)?;
        Ok(())
    }

    /// Draw `passes` round trips (`passes * 2` draws) starting from `source`
    ///
    /// `before_draw` runs before each draw with the iteration index, to update
    /// per-iteration uniforms such as the blur direction. The first draw
    /// samples `source`; every later one samples the other buffer.
    pub fn multipass_draw<F>(
        &self,
        source: &Texture,
        shader: &Shader,
        passes: u32,
        mut before_draw: F,
        mut registry: Option<&mut TextureRegistry>,
    ) -> Result<()>
    where
        F: FnMut(u32),
    {
        for iteration in 0..passes * 2 {
            let target = &self.buffers[(iteration % 2) as usize];
            let input = if iteration == 0 {
                source
            } else {
                self.buffers[((iteration + 1) % 2) as usize].texture(BufferType::ColorHdrAlpha)?
            };

            target.activate()?;
            before_draw(iteration);
            draw_screen_quad(shader, Some(input), registry.as_deref_mut())?;
            target.deactivate()?;
        }
        Ok(())
    }

    /// Result of the last round trip; always the second buffer
    pub fn output(&self) -> Result<&Texture> {
        self.buffers[1].texture(BufferType::ColorHdrAlpha)
    }
}

#[cfg(test)]
#[path = "blur_tests.rs"]
mod tests;
