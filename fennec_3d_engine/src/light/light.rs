/// Lights - directional, point and spot lights with change tracking
///
/// Each light keeps its world-space state and the view-space copy derived
/// from the last applied view transform. Setters flag what changed so the
/// registry only re-pushes stale uniforms.

use glam::{Mat4, Vec3};

use crate::error::Result;
use crate::shader::Shader;

/// Distance falloff: `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub const fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self { constant, linear, quadratic }
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        DEFAULT_ATTENUATION
    }
}

pub const DEFAULT_ATTENUATION: Attenuation = Attenuation::new(1.0, 0.09, 0.032);
pub const DEFAULT_DIFFUSE: Vec3 = Vec3::splat(0.5);
pub const DEFAULT_SPECULAR: Vec3 = Vec3::ONE;
/// 10.5 degrees
pub const DEFAULT_INNER_ANGLE: f32 = 10.5 * std::f32::consts::PI / 180.0;
/// 19.5 degrees
pub const DEFAULT_OUTER_ANGLE: f32 = 19.5 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    /// Uniform array holding lights of this type
    pub fn uniform_array(&self) -> &'static str {
        match self {
            LightType::Directional => "fnk_directionalLights",
            LightType::Point => "fnk_pointLights",
            LightType::Spot => "fnk_spotLights",
        }
    }

    /// Uniform holding the number of lights of this type
    pub fn count_uniform(&self) -> &'static str {
        match self {
            LightType::Directional => "fnk_directionalLightCount",
            LightType::Point => "fnk_pointLightCount",
            LightType::Spot => "fnk_spotLightCount",
        }
    }
}

// ============================================================================
// Change tracking
// ============================================================================

#[derive(Debug, Clone)]
struct ChangeTracking {
    view_dependent_changed: bool,
    light_changed: bool,
    view_applied: bool,
}

impl Default for ChangeTracking {
    fn default() -> Self {
        Self {
            view_dependent_changed: true,
            light_changed: true,
            view_applied: false,
        }
    }
}

// ============================================================================
// Variants
// ============================================================================

/// Light at infinity shining along `direction`
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    direction: Vec3,
    view_direction: Vec3,
    diffuse: Vec3,
    specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::NEG_Y)
    }
}

impl DirectionalLight {
    /// `direction` is normalized
    pub fn new(direction: Vec3) -> Self {
        let direction = direction.normalize_or_zero();
        Self {
            direction,
            view_direction: direction,
            diffuse: DEFAULT_DIFFUSE,
            specular: DEFAULT_SPECULAR,
        }
    }

    pub fn with_colors(mut self, diffuse: Vec3, specular: Vec3) -> Self {
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn view_direction(&self) -> Vec3 {
        self.view_direction
    }
}

/// Omnidirectional light at `position`
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    view_position: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl PointLight {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            view_position: position,
            diffuse: DEFAULT_DIFFUSE,
            specular: DEFAULT_SPECULAR,
            attenuation: DEFAULT_ATTENUATION,
        }
    }

    pub fn with_colors(mut self, diffuse: Vec3, specular: Vec3) -> Self {
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view_position(&self) -> Vec3 {
        self.view_position
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }
}

/// Cone light; angles are half-angles in radians, smooth falloff between inner and outer
#[derive(Debug, Clone)]
pub struct SpotLight {
    position: Vec3,
    view_position: Vec3,
    direction: Vec3,
    view_direction: Vec3,
    inner_angle: f32,
    outer_angle: f32,
    diffuse: Vec3,
    specular: Vec3,
    attenuation: Attenuation,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(Vec3::Y, Vec3::NEG_Y)
    }
}

impl SpotLight {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            view_position: position,
            direction,
            view_direction: direction,
            inner_angle: DEFAULT_INNER_ANGLE,
            outer_angle: DEFAULT_OUTER_ANGLE,
            diffuse: DEFAULT_DIFFUSE,
            specular: DEFAULT_SPECULAR,
            attenuation: DEFAULT_ATTENUATION,
        }
    }

    pub fn with_angles(mut self, inner_angle: f32, outer_angle: f32) -> Self {
        self.inner_angle = inner_angle;
        self.outer_angle = outer_angle;
        self
    }

    pub fn with_colors(mut self, diffuse: Vec3, specular: Vec3) -> Self {
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn view_position(&self) -> Vec3 {
        self.view_position
    }

    pub fn view_direction(&self) -> Vec3 {
        self.view_direction
    }

    pub fn inner_angle(&self) -> f32 {
        self.inner_angle
    }

    pub fn outer_angle(&self) -> f32 {
        self.outer_angle
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

impl From<DirectionalLight> for LightKind {
    fn from(light: DirectionalLight) -> Self {
        LightKind::Directional(light)
    }
}

impl From<PointLight> for LightKind {
    fn from(light: PointLight) -> Self {
        LightKind::Point(light)
    }
}

impl From<SpotLight> for LightKind {
    fn from(light: SpotLight) -> Self {
        LightKind::Spot(light)
    }
}

// ============================================================================
// Light
// ============================================================================

/// A registered light: its variant, its per-type index and its change flags
#[derive(Debug, Clone)]
pub struct Light {
    kind: LightKind,
    index: u32,
    uniform_name: String,
    use_view_transform: bool,
    tracking: ChangeTracking,
}

impl Light {
    pub(crate) fn new(kind: LightKind, index: u32) -> Self {
        let mut light = Self {
            kind,
            index,
            uniform_name: String::new(),
            use_view_transform: true,
            tracking: ChangeTracking::default(),
        };
        light.uniform_name = format!("{}[{}]", light.light_type().uniform_array(), index);
        light
    }

    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Directional(_) => LightType::Directional,
            LightKind::Point(_) => LightType::Point,
            LightKind::Spot(_) => LightType::Spot,
        }
    }

    pub fn kind(&self) -> &LightKind {
        &self.kind
    }

    /// Index among the lights of the same type
    pub fn index(&self) -> u32 {
        self.index
    }

    /// e.g. `fnk_pointLights[2]`
    pub fn uniform_name(&self) -> &str {
        &self.uniform_name
    }

    pub fn uses_view_transform(&self) -> bool {
        self.use_view_transform
    }

    pub fn set_use_view_transform(&mut self, use_view_transform: bool) {
        self.use_view_transform = use_view_transform;
    }

    pub fn has_view_dependent_changed(&self) -> bool {
        self.tracking.view_dependent_changed
    }

    pub fn has_light_changed(&self) -> bool {
        self.tracking.light_changed
    }

    pub fn has_view_been_applied(&self) -> bool {
        self.tracking.view_applied
    }

    // ===== WORLD STATE (view dependent) =====

    /// World position; `None` for directional lights
    pub fn position(&self) -> Option<Vec3> {
        match &self.kind {
            LightKind::Directional(_) => None,
            LightKind::Point(light) => Some(light.position),
            LightKind::Spot(light) => Some(light.position),
        }
    }

    /// Ignored by directional lights
    pub fn set_position(&mut self, position: Vec3) {
        match &mut self.kind {
            LightKind::Directional(_) => return,
            LightKind::Point(light) => light.position = position,
            LightKind::Spot(light) => light.position = position,
        }
        self.tracking.view_dependent_changed = true;
    }

    /// World direction; `None` for point lights
    pub fn direction(&self) -> Option<Vec3> {
        match &self.kind {
            LightKind::Directional(light) => Some(light.direction),
            LightKind::Point(_) => None,
            LightKind::Spot(light) => Some(light.direction),
        }
    }

    /// Ignored by point lights
    pub fn set_direction(&mut self, direction: Vec3) {
        match &mut self.kind {
            LightKind::Directional(light) => light.direction = direction.normalize_or_zero(),
            LightKind::Point(_) => return,
            LightKind::Spot(light) => light.direction = direction,
        }
        self.tracking.view_dependent_changed = true;
    }

    // ===== COLORS =====

    pub fn diffuse(&self) -> Vec3 {
        match &self.kind {
            LightKind::Directional(light) => light.diffuse,
            LightKind::Point(light) => light.diffuse,
            LightKind::Spot(light) => light.diffuse,
        }
    }

    pub fn set_diffuse(&mut self, diffuse: Vec3) {
        match &mut self.kind {
            LightKind::Directional(light) => light.diffuse = diffuse,
            LightKind::Point(light) => light.diffuse = diffuse,
            LightKind::Spot(light) => light.diffuse = diffuse,
        }
        self.tracking.light_changed = true;
    }

    pub fn specular(&self) -> Vec3 {
        match &self.kind {
            LightKind::Directional(light) => light.specular,
            LightKind::Point(light) => light.specular,
            LightKind::Spot(light) => light.specular,
        }
    }

    pub fn set_specular(&mut self, specular: Vec3) {
        match &mut self.kind {
            LightKind::Directional(light) => light.specular = specular,
            LightKind::Point(light) => light.specular = specular,
            LightKind::Spot(light) => light.specular = specular,
        }
        self.tracking.light_changed = true;
    }

    /// `None` for directional lights
    pub fn attenuation(&self) -> Option<Attenuation> {
        match &self.kind {
            LightKind::Directional(_) => None,
            LightKind::Point(light) => Some(light.attenuation),
            LightKind::Spot(light) => Some(light.attenuation),
        }
    }

    /// Ignored by directional lights
    pub fn set_attenuation(&mut self, attenuation: Attenuation) {
        match &mut self.kind {
            LightKind::Directional(_) => return,
            LightKind::Point(light) => light.attenuation = attenuation,
            LightKind::Spot(light) => light.attenuation = attenuation,
        }
        self.tracking.light_changed = true;
    }

    /// Ignored by everything but spot lights
    pub fn set_spot_angles(&mut self, inner_angle: f32, outer_angle: f32) {
        if let LightKind::Spot(light) = &mut self.kind {
            light.inner_angle = inner_angle;
            light.outer_angle = outer_angle;
            self.tracking.light_changed = true;
        }
    }

    // ===== UNIFORMS =====

    /// Derive the view-space position/direction from `view`
    pub fn apply_view_transform(&mut self, view: &Mat4) {
        match &mut self.kind {
            LightKind::Directional(light) => {
                light.view_direction = view.transform_vector3(light.direction);
            }
            LightKind::Point(light) => {
                light.view_position = view.transform_point3(light.position);
            }
            LightKind::Spot(light) => {
                light.view_position = view.transform_point3(light.position);
                light.view_direction = view.transform_vector3(light.direction);
            }
        }
        self.tracking.view_applied = true;
    }

    /// Fails when view-dependent state changed since the view was last applied
    pub fn check_state(&self) -> Result<()> {
        if self.tracking.view_dependent_changed && !self.tracking.view_applied {
            crate::engine_bail!(
                InvalidState,
                "fennec3d::Light",
                "Light state changed without re-applying view transform."
            );
        }
        Ok(())
    }

    /// Start a new tracking period: nothing changed, no view applied
    pub fn reset_change_detection(&mut self) {
        self.tracking = ChangeTracking {
            view_dependent_changed: false,
            light_changed: false,
            view_applied: false,
        };
    }

    /// Push this light's uniforms: placement once a view was applied, colors when they changed
    pub fn update_uniforms(&self, shader: &Shader) -> Result<()> {
        self.check_state()?;
        let name = &self.uniform_name;
        let view_space = self.use_view_transform;

        if self.tracking.view_applied {
            match &self.kind {
                LightKind::Directional(light) => {
                    let direction = if view_space { light.view_direction } else { light.direction };
                    shader.set_vec3(&format!("{name}.direction"), direction);
                }
                LightKind::Point(light) => {
                    let position = if view_space { light.view_position } else { light.position };
                    shader.set_vec3(&format!("{name}.position"), position);
                }
                LightKind::Spot(light) => {
                    let position = if view_space { light.view_position } else { light.position };
                    let direction = if view_space { light.view_direction } else { light.direction };
                    shader.set_vec3(&format!("{name}.position"), position);
                    shader.set_vec3(&format!("{name}.direction"), direction);
                }
            }
        }

        if self.tracking.light_changed {
            if let LightKind::Spot(light) = &self.kind {
                shader.set_float(&format!("{name}.innerAngle"), light.inner_angle);
                shader.set_float(&format!("{name}.outerAngle"), light.outer_angle);
            }
            shader.set_vec3(&format!("{name}.diffuse"), self.diffuse());
            shader.set_vec3(&format!("{name}.specular"), self.specular());
            if let Some(attenuation) = self.attenuation() {
                shader.set_float(&format!("{name}.attenuation.constant"), attenuation.constant);
                shader.set_float(&format!("{name}.attenuation.linear"), attenuation.linear);
                shader.set_float(&format!("{name}.attenuation.quadratic"), attenuation.quadratic);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
