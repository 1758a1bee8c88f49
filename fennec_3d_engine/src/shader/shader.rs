/// Shader - a linked GPU program plus the uniform sources feeding it
///
/// Uniform setters never fail: a name the program does not declare is a
/// silent no-op, so one uniform-update path can serve every shader variant.
/// Locations are looked up once and cached (misses included).

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, ProgramId, ShaderStage, ShaderStageSource, UniformLocation, UniformValue,
};
use crate::shader::{load_stage, ShaderCode, ShaderSourceLoader};

/// Uniform pushed by every shader before its sources run
pub const TIME_UNIFORM: &str = "fnk_time";

/// Collaborator that writes its own uniforms into a shader
///
/// Sources are shared (`Rc<RefCell<_>>`) because one source usually feeds
/// several shaders (the camera feeds nearly all of them).
pub trait UniformSource {
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()>;
}

/// Shared handle to a uniform source
pub type SharedUniformSource = Rc<RefCell<dyn UniformSource>>;

pub struct Shader {
    device: Rc<dyn GraphicsDevice>,
    program: ProgramId,
    name: String,
    locations: RefCell<FxHashMap<String, Option<UniformLocation>>>,
    uniform_sources: Vec<SharedUniformSource>,
    /// Drop the translation of "view" matrices (skybox rendering)
    strip_view_translation: bool,
}

impl Shader {
    /// Build a vertex + fragment program
    pub fn new(
        device: &Rc<dyn GraphicsDevice>,
        loader: &dyn ShaderSourceLoader,
        vertex: ShaderCode<'_>,
        fragment: ShaderCode<'_>,
    ) -> Result<Self> {
        let stages = vec![
            load_stage(loader, vertex, ShaderStage::Vertex)?,
            load_stage(loader, fragment, ShaderStage::Fragment)?,
        ];
        Self::from_stages(device, stages)
    }

    /// Build a vertex + fragment + geometry program
    pub fn with_geometry(
        device: &Rc<dyn GraphicsDevice>,
        loader: &dyn ShaderSourceLoader,
        vertex: ShaderCode<'_>,
        fragment: ShaderCode<'_>,
        geometry: ShaderCode<'_>,
    ) -> Result<Self> {
        let stages = vec![
            load_stage(loader, vertex, ShaderStage::Vertex)?,
            load_stage(loader, fragment, ShaderStage::Fragment)?,
            load_stage(loader, geometry, ShaderStage::Geometry)?,
        ];
        Self::from_stages(device, stages)
    }

    /// Link already preprocessed stages
    pub fn from_stages(device: &Rc<dyn GraphicsDevice>, stages: Vec<ShaderStageSource>) -> Result<Self> {
        let name = stages
            .iter()
            .map(|s| s.path.as_str())
            .collect::<Vec<_>>()
            .join(" + ");

        let program = device.create_program(&stages).map_err(|e| {
            crate::engine_err!(ShaderError, "fennec3d::Shader", "Failed to build shader '{}': {}", name, e)
        })?;

        crate::engine_debug!("fennec3d::Shader", "Linked shader '{}'", name);

        Ok(Self {
            device: Rc::clone(device),
            program,
            name,
            locations: RefCell::new(FxHashMap::default()),
            uniform_sources: Vec::new(),
            strip_view_translation: false,
        })
    }

    pub(crate) fn set_strip_view_translation(&mut self, strip: bool) {
        self.strip_view_translation = strip;
    }

    // ===== PROGRAM =====

    pub fn activate(&self) -> Result<()> {
        self.device.use_program(Some(self.program))
    }

    pub fn deactivate(&self) -> Result<()> {
        self.device.use_program(None)
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// Stage paths joined with " + " (diagnostics)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device(&self) -> &Rc<dyn GraphicsDevice> {
        &self.device
    }

    // ===== UNIFORM SOURCES =====

    pub fn add_uniform_source(&mut self, source: SharedUniformSource) {
        self.uniform_sources.push(source);
    }

    pub fn uniform_source_count(&self) -> usize {
        self.uniform_sources.len()
    }

    /// Push the engine time, then let every source write its uniforms in order
    pub fn update_uniforms(&self) -> Result<()> {
        self.set_float(TIME_UNIFORM, Engine::time());

        for source in &self.uniform_sources {
            let mut source = match source.try_borrow_mut() {
                Ok(source) => source,
                Err(_) => crate::engine_bail!(
                    InvalidState,
                    "fennec3d::Shader",
                    "Uniform source of shader '{}' is already borrowed",
                    self.name
                ),
            };
            source.update_uniforms(self)?;
        }
        Ok(())
    }

    // ===== UNIFORMS =====

    /// Cached location of `name`; `None` when the program has no such uniform
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        if let Some(cached) = self.locations.borrow().get(name) {
            return *cached;
        }
        let location = self.device.uniform_location(self.program, name);
        if location.is_none() {
            crate::engine_trace!("fennec3d::Shader", "Uniform '{}' not found in '{}'", name, self.name);
        }
        self.locations.borrow_mut().insert(name.to_string(), location);
        location
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform_location(name).is_some()
    }

    /// Write `value` to `name` if the program declares it
    pub fn set_uniform(&self, name: &str, value: UniformValue) {
        if let Some(location) = self.uniform_location(name) {
            self.device.set_uniform(self.program, location, value);
        }
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_uint(&self, name: &str, value: u32) {
        self.set_uniform(name, UniformValue::UInt(value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vec2(&self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    pub fn set_vec4(&self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    pub fn set_mat4(&self, name: &str, value: Mat4) {
        let value = if self.strip_view_translation && name == "view" {
            Mat4::from_mat3(Mat3::from_mat4(value))
        } else {
            value
        };
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    /// Bind a sampler uniform to a texture unit
    pub fn set_sampler(&self, name: &str, unit: u32) {
        self.set_int(name, unit as i32);
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.device.destroy_program(self.program);
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("name", &self.name)
            .field("uniform_sources", &self.uniform_sources.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
