/// LightRegistry - owns the scene lights and pushes them as uniforms
///
/// Lights live in a `SlotMap` and are addressed by stable `LightId` keys.
/// Each light gets an index among lights of its own type on registration, so
/// `fnk_pointLights[0]` is the first point light regardless of how many
/// directional or spot lights were added before it.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;
use slotmap::{new_key_type, SlotMap};

use crate::camera::ViewSource;
use crate::error::Result;
use crate::light::{Light, LightKind, LightType};
use crate::shader::{Shader, UniformSource};

new_key_type! {
    /// Stable handle to a registered light
    pub struct LightId;
}

/// View transform provider shared with the registry (usually the camera)
pub type SharedViewSource = Rc<RefCell<dyn ViewSource>>;

#[derive(Default)]
pub struct LightRegistry {
    lights: SlotMap<LightId, Light>,
    directional_count: u32,
    point_count: u32,
    spot_count: u32,
    view_source: Option<SharedViewSource>,
}

impl LightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a light; it receives the next index of its type
    pub fn add_light(&mut self, light: impl Into<LightKind>) -> LightId {
        let kind = light.into();
        let counter = match kind {
            LightKind::Directional(_) => &mut self.directional_count,
            LightKind::Point(_) => &mut self.point_count,
            LightKind::Spot(_) => &mut self.spot_count,
        };
        let index = *counter;
        *counter += 1;
        let light = Light::new(kind, index);
        crate::engine_debug!("fennec3d::LightRegistry", "Registered {}", light.uniform_name());
        self.lights.insert(light)
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id)
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.lights.iter()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Number of registered lights of `light_type`
    pub fn count(&self, light_type: LightType) -> u32 {
        match light_type {
            LightType::Directional => self.directional_count,
            LightType::Point => self.point_count,
            LightType::Spot => self.spot_count,
        }
    }

    /// View transform re-applied to every light before each uniform push
    pub fn set_view_source(&mut self, view_source: SharedViewSource) {
        self.view_source = Some(view_source);
    }

    pub fn clear_view_source(&mut self) {
        self.view_source = None;
    }

    pub fn apply_view_transform(&mut self, view: &Mat4) {
        for light in self.lights.values_mut() {
            light.apply_view_transform(view);
        }
    }

    /// Push world-space (`false`) or view-space (`true`) placements
    pub fn set_use_view_transform(&mut self, use_view_transform: bool) {
        for light in self.lights.values_mut() {
            light.set_use_view_transform(use_view_transform);
        }
    }

    /// Fails if any light changed placement without a view being applied
    pub fn check_state(&self) -> Result<()> {
        self.lights.values().try_for_each(Light::check_state)
    }

    /// End of frame: clear every light's change flags
    pub fn reset_change_detection(&mut self) {
        for light in self.lights.values_mut() {
            light.reset_change_detection();
        }
    }

    fn current_view(&self) -> Result<Option<Mat4>> {
        let Some(source) = &self.view_source else {
            return Ok(None);
        };
        let source = source.try_borrow().map_err(|_| {
            crate::engine_err!(InvalidState, "fennec3d::LightRegistry", "View source is mutably borrowed")
        })?;
        Ok(Some(source.view_transform()))
    }
}

impl UniformSource for LightRegistry {
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()> {
        if let Some(view) = self.current_view()? {
            self.apply_view_transform(&view);
        }
        for light_type in [LightType::Directional, LightType::Point, LightType::Spot] {
            shader.set_int(light_type.count_uniform(), self.count(light_type) as i32);
        }
        for light in self.lights.values() {
            light.update_uniforms(shader)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LightRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightRegistry")
            .field("directional_count", &self.directional_count)
            .field("point_count", &self.point_count)
            .field("spot_count", &self.spot_count)
            .field("has_view_source", &self.view_source.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "light_registry_tests.rs"]
mod tests;
