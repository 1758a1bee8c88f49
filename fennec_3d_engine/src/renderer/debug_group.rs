/// Scoped debug group; labels every command issued while it is alive

use crate::graphics_device::GraphicsDevice;

pub struct DebugGroup<'a> {
    device: &'a dyn GraphicsDevice,
}

impl<'a> DebugGroup<'a> {
    pub fn new(device: &'a dyn GraphicsDevice, label: &str) -> Self {
        device.push_debug_group(label);
        Self { device }
    }
}

impl Drop for DebugGroup<'_> {
    fn drop(&mut self) {
        self.device.pop_debug_group();
    }
}
