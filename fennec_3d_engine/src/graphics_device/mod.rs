/// Graphics device module - device trait and the plain types it speaks

pub mod graphics_device;
pub mod texture;
pub mod frame_buffer;
pub mod shader;

pub use graphics_device::*;
pub use texture::*;
pub use frame_buffer::*;
pub use shader::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
