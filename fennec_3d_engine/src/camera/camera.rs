/// Camera - yaw/pitch perspective camera
///
/// Angles are stored in degrees. Yaw is measured clockwise from +X, so the
/// default yaw of 270 degrees looks down -Z. The camera feeds "view" and
/// "projection" to shaders as a `UniformSource` and hands its view matrix to
/// the light registry as a `ViewSource`.

use glam::{Mat4, Vec3};

use crate::error::Result;
use crate::graphics_device::ImageSize;
use crate::shader::{Shader, UniformSource};

pub const DEFAULT_YAW: f32 = 270.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_FOV: f32 = 45.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;
pub const DEFAULT_ASPECT_RATIO: f32 = 4.0 / 3.0;

pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 135.0;

/// Pitch limit keeping the camera off the poles
pub const POLAR_CAP: f32 = 90.0 - 0.1;

/// Source of the current camera view transform
pub trait ViewSource {
    fn view_transform(&self) -> Mat4;
}

/// Direction of a camera translation, relative to its orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    /// Camera at `position` with default orientation and lens
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            fov: DEFAULT_FOV,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        };
        camera.update_vectors();
        camera
    }

    /// Turn towards `center`
    pub fn look_at(&mut self, center: Vec3) {
        let direction = (center - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }
        self.pitch = direction.y.clamp(-1.0, 1.0).asin().to_degrees();
        self.yaw = (-direction.x.atan2(direction.z).to_degrees()).rem_euclid(360.0) + 90.0;
        self.update_vectors();
    }

    // ===== GETTERS / SETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update_vectors();
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        self.update_vectors();
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Aspect ratio of a target of `size`
    pub fn set_aspect_ratio_for(&mut self, size: ImageSize) {
        if size.height > 0 {
            self.aspect_ratio = size.width as f32 / size.height as f32;
        }
    }

    pub fn near_plane(&self) -> f32 {
        self.near
    }

    pub fn set_near_plane(&mut self, near: f32) {
        self.near = near;
    }

    pub fn far_plane(&self) -> f32 {
        self.far
    }

    pub fn set_far_plane(&mut self, far: f32) {
        self.far = far;
    }

    // ===== TRANSFORMS =====

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    // ===== MOVEMENT =====

    /// Translate by `velocity` world units along `direction`
    pub fn translate(&mut self, direction: CameraDirection, velocity: f32) {
        let offset = match direction {
            CameraDirection::Forward => self.front,
            CameraDirection::Backward => -self.front,
            CameraDirection::Left => -self.right,
            CameraDirection::Right => self.right,
            CameraDirection::Up => self.up,
            CameraDirection::Down => -self.up,
        };
        self.position += offset * velocity;
    }

    /// Rotate by yaw/pitch offsets in degrees; pitch is clamped to the polar cap when constrained
    pub fn rotate(&mut self, yaw_offset: f32, pitch_offset: f32, constrain_pitch: bool) {
        self.yaw = (self.yaw + yaw_offset).rem_euclid(360.0);
        self.pitch += pitch_offset;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-POLAR_CAP, POLAR_CAP);
        }
        self.update_vectors();
    }

    /// Narrow (positive offset) or widen the field of view
    pub fn zoom(&mut self, offset: f32) {
        self.fov = (self.fov - offset).clamp(MIN_FOV, MAX_FOV);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl ViewSource for Camera {
    fn view_transform(&self) -> Mat4 {
        self.view_matrix()
    }
}

impl UniformSource for Camera {
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()> {
        shader.set_mat4("view", self.view_matrix());
        shader.set_mat4("projection", self.projection_matrix());
        Ok(())
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
