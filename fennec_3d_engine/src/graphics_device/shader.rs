/// Shader stage sources and uniform values passed to the device

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

/// Preprocessed source text of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageSource {
    pub stage: ShaderStage,
    /// Logical path the source was loaded from (diagnostics only)
    pub path: String,
    pub source: String,
}

/// Backend location of a uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}
