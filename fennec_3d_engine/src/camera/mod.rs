//! Camera module - view/projection camera, input controls and the render context.

mod camera;
mod camera_controls;
mod render_context;

pub use camera::{
    Camera, CameraDirection, ViewSource,
    DEFAULT_ASPECT_RATIO, DEFAULT_FAR, DEFAULT_FOV, DEFAULT_NEAR, DEFAULT_PITCH, DEFAULT_YAW,
    MAX_FOV, MIN_FOV, POLAR_CAP,
};
pub use camera_controls::{
    ButtonAction, CameraControls, ControlState, FlyCameraControls, MouseButton, MovementKeys,
    OrbitCameraControls, DEFAULT_SENSITIVITY, DEFAULT_SPEED, MAX_ORBIT_RADIUS, MIN_ORBIT_RADIUS,
};
pub use render_context::RenderContext;
