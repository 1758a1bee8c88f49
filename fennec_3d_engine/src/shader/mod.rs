//! Shaders, uniform sources and shader source loading

mod builtin;
mod shader;
mod shader_loader;

pub(crate) use builtin::shader_variant;
pub use builtin::{
    FxaaShader, LampShader, ScreenLodShader, ScreenShader, ShadowMapShader, SkyboxShader, CUBEMAP_VERT,
    FXAA_FRAG, LAMP_FRAG, MODEL_VERT, SCREEN_QUAD_FRAG, SCREEN_QUAD_LOD_FRAG, SCREEN_QUAD_VERT,
    SCREEN_TEXTURE_UNIFORM, SHADOW_MAP_FRAG, SHADOW_MAP_VERT, SKYBOX_FRAG, SKYBOX_VERT,
};
pub use shader::{SharedUniformSource, Shader, UniformSource, TIME_UNIFORM};
pub use shader_loader::{
    load_stage, DirectoryShaderLoader, InMemoryShaderLoader, ShaderCode, ShaderSourceLoader,
    INLINE_SHADER_PATH, SHADER_ROOT,
};

// Mock loader for tests (serves a stub for any path)
#[cfg(test)]
pub mod mock_shader_loader;
