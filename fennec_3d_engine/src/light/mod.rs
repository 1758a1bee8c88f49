//! Light module - light variants and the registry pushing them to shaders.

mod light;
mod light_registry;

pub use light::{
    Attenuation, DirectionalLight, Light, LightKind, LightType, PointLight, SpotLight,
    DEFAULT_ATTENUATION, DEFAULT_DIFFUSE, DEFAULT_INNER_ANGLE, DEFAULT_OUTER_ANGLE, DEFAULT_SPECULAR,
};
pub use light_registry::{LightId, LightRegistry, SharedViewSource};
