/// Shader source loading
///
/// A `ShaderSourceLoader` only knows how to fetch raw text for a logical
/// path. `load_stage` layers the engine's preprocessing on top of it:
///
/// - `#pragma fnk_include "file.glsl"` resolves relative to the including file
/// - `#pragma fnk_include <file.glsl>` resolves from `SHADER_ROOT`
/// - `#pragma once` makes repeated includes expand to nothing
///
/// Circular includes and stage/extension mismatches are reported as
/// `Error::ShaderError` with the include traceback.

use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Result;
use crate::graphics_device::{ShaderStage, ShaderStageSource};

/// Directory `<...>` includes are resolved from
pub const SHADER_ROOT: &str = "content/shaders/";

/// Path reported for inline sources
pub const INLINE_SHADER_PATH: &str = "<inline>";

/// Provides raw (unprocessed) shader text for a logical path
pub trait ShaderSourceLoader {
    fn read(&self, path: &str) -> Result<String>;
}

/// Either a logical path handed to the loader, or literal GLSL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderCode<'a> {
    Path(&'a str),
    Inline(&'a str),
}

// ============================================================================
// Loaders
// ============================================================================

/// Loader serving sources registered in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryShaderLoader {
    sources: FxHashMap<String, String>,
}

impl InMemoryShaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(path.into(), source.into());
    }

    pub fn with_source(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ShaderSourceLoader for InMemoryShaderLoader {
    fn read(&self, path: &str) -> Result<String> {
        match self.sources.get(path) {
            Some(source) => Ok(source.clone()),
            None => Err(crate::engine_err!(
                InvalidResource,
                "fennec3d::ShaderLoader",
                "Unable to read shader '{}': not registered",
                path
            )),
        }
    }
}

/// Loader reading files below a root directory
#[derive(Debug, Clone)]
pub struct DirectoryShaderLoader {
    root: PathBuf,
}

impl DirectoryShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ShaderSourceLoader for DirectoryShaderLoader {
    fn read(&self, path: &str) -> Result<String> {
        let full_path = self.root.join(path);
        std::fs::read_to_string(&full_path).map_err(|e| {
            crate::engine_err!(
                InvalidResource,
                "fennec3d::ShaderLoader",
                "Unable to read shader '{}': {}",
                full_path.display(),
                e
            )
        })
    }
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Load and preprocess one stage
pub fn load_stage(
    loader: &dyn ShaderSourceLoader,
    code: ShaderCode<'_>,
    stage: ShaderStage,
) -> Result<ShaderStageSource> {
    let mut preprocessor = Preprocessor {
        loader,
        stage,
        include_chain: Vec::new(),
        once: FxHashSet::default(),
    };
    let (path, source) = match code {
        ShaderCode::Path(path) => (path.to_string(), preprocessor.load(path)?),
        ShaderCode::Inline(source) => (INLINE_SHADER_PATH.to_string(), preprocessor.preprocess(".", source)?),
    };
    Ok(ShaderStageSource { stage, path, source })
}

fn stage_extension(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => ".vert",
        ShaderStage::Fragment => ".frag",
        ShaderStage::Geometry => ".geom",
    }
}

enum Include<'a> {
    /// `<path>`, resolved from SHADER_ROOT
    Engine(&'a str),
    /// `"path"`, resolved next to the including file
    Relative(&'a str),
}

fn parse_include(line: &str) -> Option<Include<'_>> {
    let rest = line.trim_start().strip_prefix("#pragma")?;
    let rest = rest.trim_start().strip_prefix("fnk_include")?.trim();
    if let Some(inner) = rest.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        return Some(Include::Engine(inner.trim()));
    }
    if let Some(inner) = rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        return Some(Include::Relative(inner.trim()));
    }
    None
}

fn is_pragma_once(line: &str) -> bool {
    let mut words = line.split_whitespace();
    words.next() == Some("#pragma") && words.next() == Some("once") && words.next().is_none()
}

struct Preprocessor<'a> {
    loader: &'a dyn ShaderSourceLoader,
    stage: ShaderStage,
    include_chain: Vec<String>,
    once: FxHashSet<String>,
}

impl Preprocessor<'_> {
    fn traceback(&self) -> String {
        self.include_chain
            .iter()
            .map(|path| format!("  > {}\n", path))
            .collect()
    }

    fn load(&mut self, path: &str) -> Result<String> {
        let extension = stage_extension(self.stage);
        if !path.ends_with(".glsl") && !path.ends_with(extension) {
            crate::engine_bail!(
                ShaderError,
                "fennec3d::ShaderLoader",
                "{:?} shader '{}' must end in '{}'",
                self.stage,
                path,
                extension
            );
        }
        if self.once.contains(path) {
            return Ok(String::new());
        }
        if self.include_chain.iter().any(|p| p == path) {
            crate::engine_bail!(
                ShaderError,
                "fennec3d::ShaderLoader",
                "Circular include of '{}', traceback (most recent last):\n{}",
                path,
                self.traceback()
            );
        }

        let code = match self.loader.read(path) {
            Ok(code) => code,
            Err(e) if self.include_chain.is_empty() => return Err(e),
            Err(e) => crate::engine_bail!(
                ShaderError,
                "fennec3d::ShaderLoader",
                "{}, traceback (most recent last):\n{}",
                e,
                self.traceback()
            ),
        };
        self.preprocess(path, &code)
    }

    fn preprocess(&mut self, path: &str, code: &str) -> Result<String> {
        self.include_chain.push(path.to_string());
        if code.lines().any(is_pragma_once) {
            self.once.insert(path.to_string());
        }

        let directory = match path.rfind('/') {
            Some(index) => &path[..=index],
            None => "",
        };

        let mut output = String::with_capacity(code.len());
        for line in code.lines() {
            match parse_include(line) {
                Some(Include::Engine(include)) => {
                    let resolved = format!("{}{}", SHADER_ROOT, include);
                    output.push_str(&self.load(&resolved)?);
                }
                Some(Include::Relative(include)) => {
                    let resolved = format!("{}{}", directory, include);
                    output.push_str(&self.load(&resolved)?);
                }
                None => output.push_str(line),
            }
            output.push('\n');
        }

        self.include_chain.pop();
        Ok(output)
    }
}

#[cfg(test)]
#[path = "shader_loader_tests.rs"]
mod tests;
