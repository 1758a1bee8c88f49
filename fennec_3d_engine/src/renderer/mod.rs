/// Renderer module - the frame driver and what it draws

mod debug_group;
mod deferred_renderer;
mod drawable;

pub use debug_group::DebugGroup;
pub use deferred_renderer::{
    DeferredRenderer, GBUFFER_VIS_FRAG, LIGHTING_PASS_FRAG, MODEL_NORMALS_GEOM, NORMAL_FRAG, POINT_LAMP_SCALE,
    POST_PROCESSING_FRAG, SKYBOX_SAMPLER, SPOT_LAMP_SCALE,
};
pub use drawable::{Drawable, MODEL_UNIFORM};
