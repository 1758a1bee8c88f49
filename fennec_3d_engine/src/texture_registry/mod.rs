//! Texture-unit binding protocol shared by all passes

mod texture_registry;

pub use texture_registry::{SharedTextureSource, TextureRegistry, TextureSource, UsageBlock};
