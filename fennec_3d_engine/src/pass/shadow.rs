/// Directional shadow mapping: the light-space camera and its depth target

use std::ops::Deref;
use std::rc::Rc;

use glam::{Mat4, Vec3, Vec4};

use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{GraphicsDevice, ImageSize, TextureFiltering, TextureParams, TextureWrap};
use crate::resource::Texture;
use crate::shader::{Shader, UniformSource};
use crate::texture_registry::TextureSource;

pub const DEFAULT_CUBOID_EXTENTS: f32 = 2.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 15.0;
pub const DEFAULT_DISTANCE_FROM_ORIGIN: f32 = 5.0;

const PARALLEL_EPSILON: f32 = 1e-6;

/// Uniform holding `projection * view` of the shadow camera
pub const LIGHT_VIEW_PROJECTION_UNIFORM: &str = "lightViewProjection";
pub const SHADOW_MAP_SAMPLER: &str = "shadowMap";

// ============================================================================
// ShadowCamera
// ============================================================================

/// Orthographic camera looking at the origin along a directional light
///
/// The cuboid is centred on the origin and does not follow the scene bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowCamera {
    light_direction: Vec3,
    cuboid_extents: f32,
    near: f32,
    far: f32,
    distance_from_origin: f32,
    world_up: Vec3,
}

impl ShadowCamera {
    pub fn new(light_direction: Vec3) -> Self {
        Self {
            light_direction: light_direction.normalize_or_zero(),
            cuboid_extents: DEFAULT_CUBOID_EXTENTS,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            distance_from_origin: DEFAULT_DISTANCE_FROM_ORIGIN,
            world_up: Vec3::Y,
        }
    }

    pub fn with_world_up(mut self, world_up: Vec3) -> Self {
        self.world_up = world_up;
        self
    }

    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    pub fn set_light_direction(&mut self, direction: Vec3) {
        self.light_direction = direction.normalize_or_zero();
    }

    pub fn cuboid_extents(&self) -> f32 {
        self.cuboid_extents
    }

    pub fn set_cuboid_extents(&mut self, extents: f32) {
        self.cuboid_extents = extents;
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
    }

    pub fn distance_from_origin(&self) -> f32 {
        self.distance_from_origin
    }

    pub fn set_distance_from_origin(&mut self, distance: f32) {
        self.distance_from_origin = distance;
    }

    /// Light-space view; a light parallel to the world up picks another up axis
    pub fn view_matrix(&self) -> Mat4 {
        let direction = self.light_direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        let up = if direction.cross(self.world_up).length_squared() < PARALLEL_EPSILON {
            direction.any_orthonormal_vector()
        } else {
            self.world_up
        };
        let eye = -direction * self.distance_from_origin;
        Mat4::look_at_rh(eye, Vec3::ZERO, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let e = self.cuboid_extents;
        Mat4::orthographic_rh_gl(-e, e, -e, e, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl UniformSource for ShadowCamera {
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()> {
        shader.set_mat4(LIGHT_VIEW_PROJECTION_UNIFORM, self.view_projection());
        Ok(())
    }
}

// ============================================================================
// ShadowMap
// ============================================================================

/// Depth-only target; samples outside the light frustum read as lit
#[derive(Debug)]
pub struct ShadowMap {
    framebuffer: Framebuffer,
}

impl ShadowMap {
    pub fn new(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Self> {
        let mut framebuffer = Framebuffer::new(device, size)?;
        let params = TextureParams::attachment_default()
            .with_filtering(TextureFiltering::Nearest)
            .with_wrap(TextureWrap::ClampToBorder(Vec4::ONE));
        framebuffer.attach_texture_with(BufferType::Depth, params)?;
        Ok(Self { framebuffer })
    }

    pub fn depth_texture(&self) -> Result<&Texture> {
        self.framebuffer.texture(BufferType::Depth)
    }
}

impl Deref for ShadowMap {
    type Target = Framebuffer;

    fn deref(&self) -> &Framebuffer {
        &self.framebuffer
    }
}

impl TextureSource for ShadowMap {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        self.depth_texture()?.bind(next_unit)?;
        shader.set_sampler(SHADOW_MAP_SAMPLER, next_unit);
        Ok(next_unit + 1)
    }
}

#[cfg(test)]
#[path = "shadow_tests.rs"]
mod tests;
