/*!
# Fennec 3D Engine

Deferred-shading render core of the Fennec 3D engine.

The crate drives a fixed pipeline of render passes over an abstract
`GraphicsDevice`. Backends (OpenGL through glow, or the in-crate mock used by
the tests) implement the device trait; everything above it is backend
agnostic.

## Architecture

- **GraphicsDevice**: the seam to the graphics API (textures, framebuffers,
  programs, state, built-in meshes)
- **Framebuffer / Texture**: RAII owners of device objects
- **Shader / UniformSource**: programs fed by shared uniform sources
- **TextureRegistry**: hands out texture units to the sources of one shader
- **Passes**: G-buffer, shadow map, SSAO, bloom, blur, cubemap and IBL
- **Camera / LightRegistry**: view state and lights pushed as uniforms
- **DeferredRenderer**: the frame driver running the passes in order
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod framebuffer;
pub mod shader;
pub mod texture_registry;
pub mod camera;
pub mod light;
pub mod config;
pub mod pass;
pub mod renderer;

// Main fennec3d namespace module
pub mod fennec3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Frame driver
    pub use crate::renderer::{DeferredRenderer, Drawable};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{AsyncLogger, DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Device seam and the plain types it speaks
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Render sub-module: resources, framebuffers, shaders and binding
    pub mod render {
        pub use crate::framebuffer::*;
        pub use crate::renderer::*;
        pub use crate::resource::*;
        pub use crate::shader::*;
        pub use crate::texture_registry::*;
    }

    pub mod pass {
        pub use crate::pass::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod light {
        pub use crate::light::*;
    }

    pub mod config {
        pub use crate::config::*;
    }
}

// Re-export math library at crate root
pub use glam;
