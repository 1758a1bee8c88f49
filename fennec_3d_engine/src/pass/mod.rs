//! Render passes - framebuffer + shader combinations implementing one algorithm each
//!
//! Every pass owns its targets and shaders. Passes whose output is sampled
//! later implement `TextureSource` so they can join a `TextureRegistry`.

pub mod bloom;
pub mod blur;
pub mod cubemap;
pub mod g_buffer;
pub mod ibl;
pub mod screen_quad;
pub mod shadow;
pub mod ssao;

pub use bloom::{BloomBuffer, BloomDownsampleShader, BloomPass, BloomUpsampleShader};
pub use blur::{GaussianBlurShader, PingPongPass};
pub use cubemap::{face_projection, face_views, CubemapRenderHelper, EquirectCubemapConverter, EquirectCubemapShader};
pub use g_buffer::{DeferredGeometryPassShader, GBuffer, G_BUFFER_SAMPLERS};
pub use ibl::{
    CubemapIrradianceCalculator, CubemapIrradianceShader, GGXBrdfIntegrationCalculator, GGXBrdfIntegrationShader,
    GGXPrefilterShader, GGXPrefilteredEnvMapCalculator,
};
pub use screen_quad::{draw_builtin, draw_screen_quad};
pub use shadow::{ShadowCamera, ShadowMap};
pub use ssao::{SsaoBlurShader, SsaoBuffer, SsaoKernel, SsaoShader};
