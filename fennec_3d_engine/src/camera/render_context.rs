/// RenderContext - the camera plus the input strategy driving it
///
/// Controls can only be attached through `set_controls_with`, which hands the
/// factory the already existing camera. The camera is shared (`Rc<RefCell>`)
/// because shaders read it as a uniform source and the light registry reads
/// it as a view source.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use crate::camera::{ButtonAction, Camera, CameraControls, MouseButton, MovementKeys};
use crate::error::Result;
use crate::graphics_device::ImageSize;

pub struct RenderContext {
    camera: Rc<RefCell<Camera>>,
    controls: Option<Box<dyn CameraControls>>,
    size: ImageSize,
    mouse_captured: bool,
}

impl RenderContext {
    /// Context for a target of `size`; the camera aspect ratio follows it
    pub fn new(mut camera: Camera, size: ImageSize) -> Self {
        camera.set_aspect_ratio_for(size);
        Self {
            camera: Rc::new(RefCell::new(camera)),
            controls: None,
            size,
            mouse_captured: false,
        }
    }

    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Build and attach controls for the context's camera, replacing any previous ones
    pub fn set_controls_with<F>(&mut self, factory: F) -> Result<()>
    where
        F: FnOnce(&mut Camera) -> Box<dyn CameraControls>,
    {
        let controls = factory(&mut *self.camera_mut()?);
        self.controls = Some(controls);
        Ok(())
    }

    pub fn clear_controls(&mut self) {
        self.controls = None;
    }

    pub fn has_controls(&self) -> bool {
        self.controls.is_some()
    }

    pub fn controls(&self) -> Option<&dyn CameraControls> {
        self.controls.as_deref()
    }

    pub fn is_mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    pub fn set_mouse_captured(&mut self, captured: bool) {
        self.mouse_captured = captured;
    }

    // ===== EVENTS =====

    /// Window size changed: update the camera aspect ratio and notify the controls
    pub fn resize(&mut self, size: ImageSize) -> Result<()> {
        self.size = size;
        self.camera_mut()?.set_aspect_ratio_for(size);
        if let Some(controls) = self.controls.as_mut() {
            controls.resize_window(size);
        }
        Ok(())
    }

    pub fn scroll(&mut self, x_offset: f32, y_offset: f32) -> Result<()> {
        let captured = self.mouse_captured;
        self.with_controls(|controls, camera| controls.scroll(camera, x_offset, y_offset, captured))
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) -> Result<()> {
        let captured = self.mouse_captured;
        self.with_controls(|controls, camera| controls.mouse_move(camera, x, y, captured))
    }

    pub fn mouse_button(&mut self, button: MouseButton, action: ButtonAction) -> Result<()> {
        let captured = self.mouse_captured;
        self.with_controls(|controls, camera| controls.mouse_button(camera, button, action, captured))
    }

    /// Per-frame held-key input
    pub fn process_input(&mut self, keys: MovementKeys, delta_time: f32) -> Result<()> {
        self.with_controls(|controls, camera| controls.process_input(camera, keys, delta_time))
    }

    fn with_controls<F>(&mut self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut dyn CameraControls, &mut Camera),
    {
        let Some(controls) = self.controls.as_mut() else {
            return Ok(());
        };
        let mut camera = self.camera.try_borrow_mut().map_err(|_| {
            crate::engine_err!(InvalidState, "fennec3d::RenderContext", "Camera is borrowed elsewhere")
        })?;
        apply(controls.as_mut(), &mut camera);
        Ok(())
    }

    fn camera_mut(&self) -> Result<RefMut<'_, Camera>> {
        self.camera.try_borrow_mut().map_err(|_| {
            crate::engine_err!(InvalidState, "fennec3d::RenderContext", "Camera is borrowed elsewhere")
        })
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("size", &self.size)
            .field("has_controls", &self.controls.is_some())
            .field("mouse_captured", &self.mouse_captured)
            .finish()
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
