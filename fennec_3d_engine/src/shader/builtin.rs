/// Built-in shader variants shared by several passes
///
/// Each variant is a thin newtype over `Shader` (deref gives the full
/// uniform API) that fixes its stage paths and adds typed setters.
/// Pass-specific variants live next to their pass.

use std::rc::Rc;

use glam::Vec3;

use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use crate::shader::{Shader, ShaderCode, ShaderSourceLoader};

pub const SCREEN_QUAD_VERT: &str = "content/shaders/builtin/screen_quad.vert";
pub const SCREEN_QUAD_FRAG: &str = "content/shaders/builtin/screen_quad.frag";
pub const SCREEN_QUAD_LOD_FRAG: &str = "content/shaders/builtin/screen_quad_lod.frag";
pub const SKYBOX_VERT: &str = "content/shaders/builtin/skybox.vert";
pub const SKYBOX_FRAG: &str = "content/shaders/builtin/skybox.frag";
pub const SHADOW_MAP_VERT: &str = "content/shaders/builtin/shadow_map.vert";
pub const SHADOW_MAP_FRAG: &str = "content/shaders/builtin/shadow_map.frag";
pub const FXAA_FRAG: &str = "content/shaders/builtin/fxaa.frag";
pub const CUBEMAP_VERT: &str = "content/shaders/builtin/cubemap.vert";
pub const MODEL_VERT: &str = "content/shaders/model.vert";
pub const LAMP_FRAG: &str = "content/shaders/lamp.frag";

/// Sampler uniform the screen quad binds its texture to
pub const SCREEN_TEXTURE_UNIFORM: &str = "fnk_screenTexture";

/// Declare a newtype shader variant that derefs to `Shader`
macro_rules! shader_variant {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name(pub(crate) $crate::shader::Shader);

        impl std::ops::Deref for $name {
            type Target = $crate::shader::Shader;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

pub(crate) use shader_variant;

shader_variant! {
    /// Fullscreen-quad shader, sampling `fnk_screenTexture` by default
    ScreenShader
}

impl ScreenShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Self::with_fragment(device, loader, ShaderCode::Path(SCREEN_QUAD_FRAG))
    }

    /// Fullscreen quad with a custom fragment stage
    pub fn with_fragment(
        device: &Rc<dyn GraphicsDevice>,
        loader: &dyn ShaderSourceLoader,
        fragment: ShaderCode<'_>,
    ) -> Result<Self> {
        Ok(Self(Shader::new(device, loader, ShaderCode::Path(SCREEN_QUAD_VERT), fragment)?))
    }

    pub fn into_inner(self) -> Shader {
        self.0
    }
}

shader_variant! {
    /// Screen shader sampling one explicit mip ("lod")
    ScreenLodShader
}

impl ScreenLodShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let screen = ScreenShader::with_fragment(device, loader, ShaderCode::Path(SCREEN_QUAD_LOD_FRAG))?;
        Ok(Self(screen.into_inner()))
    }

    pub fn set_mip_level(&self, mip: u32) {
        self.set_float("lod", mip as f32);
    }
}

shader_variant! {
    /// Skybox drawn last, behind all geometry; ignores camera translation
    SkyboxShader
}

impl SkyboxShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let mut shader = Shader::new(device, loader, ShaderCode::Path(SKYBOX_VERT), ShaderCode::Path(SKYBOX_FRAG))?;
        shader.set_strip_view_translation(true);
        Ok(Self(shader))
    }
}

shader_variant! {
    /// Depth-only shader used to fill a shadow map
    ShadowMapShader
}

impl ShadowMapShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Ok(Self(Shader::new(
            device,
            loader,
            ShaderCode::Path(SHADOW_MAP_VERT),
            ShaderCode::Path(SHADOW_MAP_FRAG),
        )?))
    }
}

shader_variant! {
    /// Fast approximate anti-aliasing, drawn straight to the screen
    FxaaShader
}

impl FxaaShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        let screen = ScreenShader::with_fragment(device, loader, ShaderCode::Path(FXAA_FRAG))?;
        Ok(Self(screen.into_inner()))
    }
}

shader_variant! {
    /// Unlit shader drawing light gizmos in their diffuse color
    LampShader
}

impl LampShader {
    pub fn new(device: &Rc<dyn GraphicsDevice>, loader: &dyn ShaderSourceLoader) -> Result<Self> {
        Ok(Self(Shader::new(device, loader, ShaderCode::Path(MODEL_VERT), ShaderCode::Path(LAMP_FRAG))?))
    }

    pub fn set_light_color(&self, color: Vec3) {
        self.set_vec3("lightColor", color);
    }
}

#[cfg(test)]
#[path = "builtin_tests.rs"]
mod tests;
