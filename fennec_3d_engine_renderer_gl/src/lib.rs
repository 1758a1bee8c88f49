/*!
# Fennec 3D Engine - OpenGL Backend

OpenGL 4.x implementation of the `fennec_3d_engine` graphics device, built on
`glow`. The caller owns the window and creates the context; this crate wraps
a current `glow::Context` in a [`GlGraphicsDevice`] that the deferred
renderer drives through the `GraphicsDevice` trait.

```no_run
use std::rc::Rc;
use fennec_3d_engine_renderer_gl::GlGraphicsDevice;
use fennec_3d_engine::fennec3d::device::GraphicsDevice;

# fn context() -> glow::Context { unimplemented!() }
let device: Rc<dyn GraphicsDevice> = Rc::new(GlGraphicsDevice::new(context())?);
# Ok::<(), fennec_3d_engine::fennec3d::Error>(())
```

Enable the `gl-debug-groups` feature to label every pass in GPU captures.
*/

mod debug;
mod gl_format;
mod gl_graphics_device;
mod gl_mesh;

pub use gl_graphics_device::GlGraphicsDevice;

// Re-export debug utilities
pub use debug::{
    debug_stats, handle_debug_message, init_debug_config, log_debug_stats_report, DebugMessageFilter,
    DebugSeverity, DebugStats, GlDebugConfig,
};
