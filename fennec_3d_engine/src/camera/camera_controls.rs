/// Camera controls - input strategies driving a `Camera`
///
/// Controls are window-system agnostic: the driver forwards scroll, cursor,
/// button and held-key state, the controls turn them into camera motion.

use bitflags::bitflags;
use glam::{Vec2, Vec3};

use crate::camera::{Camera, CameraDirection, POLAR_CAP};
use crate::graphics_device::ImageSize;

pub const DEFAULT_SPEED: f32 = 5.0;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;

pub const MIN_ORBIT_RADIUS: f32 = 0.1;
pub const MAX_ORBIT_RADIUS: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Press,
    Release,
}

bitflags! {
    /// Movement keys held down this frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MovementKeys: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const UP = 1 << 4;
        const DOWN = 1 << 5;
    }
}

const KEY_DIRECTIONS: [(MovementKeys, CameraDirection); 6] = [
    (MovementKeys::FORWARD, CameraDirection::Forward),
    (MovementKeys::LEFT, CameraDirection::Left),
    (MovementKeys::BACKWARD, CameraDirection::Backward),
    (MovementKeys::RIGHT, CameraDirection::Right),
    (MovementKeys::UP, CameraDirection::Up),
    (MovementKeys::DOWN, CameraDirection::Down),
];

// ============================================================================
// Shared state
// ============================================================================

/// Speed, sensitivity and mouse-drag bookkeeping shared by every control scheme
#[derive(Debug, Clone)]
pub struct ControlState {
    pub speed: f32,
    pub sensitivity: f32,
    /// False until a cursor position has been seen since the last drag start
    initialized: bool,
    dragging: bool,
    last_mouse: Vec2,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            sensitivity: DEFAULT_SENSITIVITY,
            initialized: false,
            dragging: false,
            last_mouse: Vec2::ZERO,
        }
    }
}

impl ControlState {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Left press starts a drag and restarts delta tracking, left release ends it
    pub fn handle_drag_start_end(&mut self, button: MouseButton, action: ButtonAction) {
        match (button, action) {
            (MouseButton::Left, ButtonAction::Press) => {
                self.dragging = true;
                self.initialized = false;
            }
            (MouseButton::Left, ButtonAction::Release) => self.dragging = false,
            _ => {}
        }
    }

    /// Cursor motion since the previous call; y grows upwards
    pub fn mouse_delta(&mut self, x: f32, y: f32) -> Vec2 {
        if !self.initialized {
            self.last_mouse = Vec2::new(x, y);
            self.initialized = true;
        }
        let delta = Vec2::new(x - self.last_mouse.x, self.last_mouse.y - y);
        self.last_mouse = Vec2::new(x, y);
        delta
    }

    fn tracks_mouse(&self, mouse_captured: bool) -> bool {
        self.dragging || mouse_captured
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Input strategy attached to a render context's camera
pub trait CameraControls {
    fn state(&self) -> &ControlState;

    fn state_mut(&mut self) -> &mut ControlState;

    fn resize_window(&mut self, _size: ImageSize) {}

    fn scroll(&mut self, camera: &mut Camera, x_offset: f32, y_offset: f32, mouse_captured: bool);

    fn mouse_move(&mut self, camera: &mut Camera, x: f32, y: f32, mouse_captured: bool);

    fn mouse_button(&mut self, _camera: &mut Camera, button: MouseButton, action: ButtonAction, _mouse_captured: bool) {
        self.state_mut().handle_drag_start_end(button, action);
    }

    /// Apply held keys for a frame lasting `delta_time` seconds
    fn process_input(&mut self, camera: &mut Camera, keys: MovementKeys, delta_time: f32);
}

// ============================================================================
// Fly
// ============================================================================

/// Free-flying first person controls: drag (or captured mouse) to look, keys to move
#[derive(Debug, Clone, Default)]
pub struct FlyCameraControls {
    state: ControlState,
}

impl FlyCameraControls {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CameraControls for FlyCameraControls {
    fn state(&self) -> &ControlState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControlState {
        &mut self.state
    }

    fn scroll(&mut self, camera: &mut Camera, _x_offset: f32, y_offset: f32, _mouse_captured: bool) {
        camera.zoom(y_offset * self.state.sensitivity);
    }

    fn mouse_move(&mut self, camera: &mut Camera, x: f32, y: f32, mouse_captured: bool) {
        if !self.state.tracks_mouse(mouse_captured) {
            return;
        }
        let delta = self.state.mouse_delta(x, y) * self.state.sensitivity;
        camera.rotate(delta.x, delta.y, true);
    }

    fn process_input(&mut self, camera: &mut Camera, keys: MovementKeys, delta_time: f32) {
        let velocity = self.state.speed * delta_time;
        for (key, direction) in KEY_DIRECTIONS {
            if keys.contains(key) {
                camera.translate(direction, velocity);
            }
        }
    }
}

// ============================================================================
// Orbit
// ============================================================================

/// Orbits a focal point: drag to turn around it, scroll to change the distance
#[derive(Debug, Clone)]
pub struct OrbitCameraControls {
    state: ControlState,
    center: Vec3,
    radius: f32,
    /// Degrees, clockwise around the center
    azimuth: f32,
    /// Degrees above the horizon
    altitude: f32,
}

impl OrbitCameraControls {
    /// Orbit `center` from the camera's current position; the camera is snapped onto the orbit
    pub fn new(camera: &mut Camera, center: Vec3) -> Self {
        let offset = camera.position() - center;
        let direction = offset.try_normalize().unwrap_or(Vec3::Z);
        let controls = Self {
            state: ControlState::default(),
            center,
            radius: offset.length().clamp(MIN_ORBIT_RADIUS, MAX_ORBIT_RADIUS),
            azimuth: (-direction.x.atan2(direction.z).to_degrees()).rem_euclid(360.0) + 90.0,
            altitude: direction.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-POLAR_CAP, POLAR_CAP),
        };
        controls.update_camera(camera);
        controls
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn altitude(&self) -> f32 {
        self.altitude
    }

    /// Place the camera at the current orbit position, facing the center
    pub fn update_camera(&self, camera: &mut Camera) {
        let (altitude, azimuth) = (self.altitude.to_radians(), self.azimuth.to_radians());
        let position = self.center
            + self.radius * Vec3::new(altitude.cos() * azimuth.cos(), altitude.sin(), altitude.cos() * azimuth.sin());
        camera.set_position(position);
        camera.look_at(self.center);
    }
}

impl CameraControls for OrbitCameraControls {
    fn state(&self) -> &ControlState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControlState {
        &mut self.state
    }

    fn scroll(&mut self, camera: &mut Camera, _x_offset: f32, y_offset: f32, _mouse_captured: bool) {
        self.radius = (self.radius - y_offset * self.state.sensitivity).clamp(MIN_ORBIT_RADIUS, MAX_ORBIT_RADIUS);
        self.update_camera(camera);
    }

    fn mouse_move(&mut self, camera: &mut Camera, x: f32, y: f32, mouse_captured: bool) {
        if !self.state.tracks_mouse(mouse_captured) {
            return;
        }
        let delta = self.state.mouse_delta(x, y) * self.state.sensitivity;
        self.azimuth = (self.azimuth + delta.x).rem_euclid(360.0);
        self.altitude = (self.altitude - delta.y).clamp(-POLAR_CAP, POLAR_CAP);
        self.update_camera(camera);
    }

    fn process_input(&mut self, _camera: &mut Camera, _keys: MovementKeys, _delta_time: f32) {}
}

#[cfg(test)]
#[path = "camera_controls_tests.rs"]
mod tests;
