/// Texture registry - sequential texture-unit allocation for one shading stage
///
/// Frame-invariant textures (G-buffer, shadow map, IBL maps...) are
/// registered once as `TextureSource`s. Each time a shader updates its
/// uniforms the registry is replayed from unit 0, every source binding its
/// textures at the running cursor. Per-draw textures are then taken past
/// that cursor inside a usage block, which puts the cursor back on exit:
///
/// ```ignore
/// shader.update_uniforms()?;              // registry replays its sources
/// let mut block = registry.usage_block();  // checkpoint
/// let unit = block.next_texture_unit();    // per-material texture
/// texture.bind(unit)?;
/// drop(block);                             // cursor restored
/// ```

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::error::Result;
use crate::shader::{Shader, UniformSource};

/// Something that binds one or more textures for a shader
pub trait TextureSource {
    /// Bind textures from `next_unit` on, set the matching sampler uniforms
    /// and return the first unit left unused
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32>;
}

impl<T: TextureSource + ?Sized> TextureSource for RefCell<T> {
    fn bind_texture(&self, next_unit: u32, shader: &Shader) -> Result<u32> {
        match self.try_borrow() {
            Ok(source) => source.bind_texture(next_unit, shader),
            Err(_) => crate::engine_bail!(
                InvalidState,
                "fennec3d::TextureRegistry",
                "Texture source is mutably borrowed while binding for '{}'",
                shader.name()
            ),
        }
    }
}

/// Shared handle to a texture source
pub type SharedTextureSource = Rc<dyn TextureSource>;

#[derive(Default)]
pub struct TextureRegistry {
    next_unit: u32,
    saved_units: Vec<u32>,
    sources: Vec<SharedTextureSource>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source; sources bind in registration order
    pub fn add_texture_source(&mut self, source: SharedTextureSource) {
        self.sources.push(source);
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Return the next free unit and advance the cursor
    pub fn next_texture_unit(&mut self) -> u32 {
        let unit = self.next_unit;
        self.next_unit += 1;
        unit
    }

    /// Next free unit, without consuming it
    pub fn current_unit(&self) -> u32 {
        self.next_unit
    }

    /// Number of open usage blocks
    pub fn usage_depth(&self) -> usize {
        self.saved_units.len()
    }

    /// Remember the cursor for a block of usage (such as one draw call)
    pub fn push_usage_block(&mut self) {
        self.saved_units.push(self.next_unit);
    }

    /// Restore the cursor saved by the matching `push_usage_block`
    pub fn pop_usage_block(&mut self) -> Result<()> {
        match self.saved_units.pop() {
            Some(unit) => {
                self.next_unit = unit;
                Ok(())
            }
            None => crate::engine_bail!(
                InvalidState,
                "fennec3d::TextureRegistry",
                "pop_usage_block without matching push_usage_block"
            ),
        }
    }

    /// Scoped usage block; the cursor is restored when the guard drops
    pub fn usage_block(&mut self) -> UsageBlock<'_> {
        let depth = self.saved_units.len();
        let saved_unit = self.next_unit;
        self.push_usage_block();
        UsageBlock { registry: self, depth, saved_unit }
    }
}

impl UniformSource for TextureRegistry {
    /// Rebind every source from unit 0
    fn update_uniforms(&mut self, shader: &Shader) -> Result<()> {
        self.next_unit = 0;
        self.saved_units.clear();
        for source in &self.sources {
            self.next_unit = source.bind_texture(self.next_unit, shader)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for TextureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureRegistry")
            .field("next_unit", &self.next_unit)
            .field("saved_units", &self.saved_units)
            .field("sources", &self.sources.len())
            .finish()
    }
}

// ============================================================================
// UsageBlock
// ============================================================================

/// Checkpoint over a registry's cursor
///
/// Derefs to the registry, so units are taken with `next_texture_unit()`.
/// Dropping the guard restores the cursor and discards any checkpoint
/// pushed inside the block.
pub struct UsageBlock<'a> {
    registry: &'a mut TextureRegistry,
    depth: usize,
    saved_unit: u32,
}

impl Deref for UsageBlock<'_> {
    type Target = TextureRegistry;

    fn deref(&self) -> &TextureRegistry {
        self.registry
    }
}

impl DerefMut for UsageBlock<'_> {
    fn deref_mut(&mut self) -> &mut TextureRegistry {
        self.registry
    }
}

impl Drop for UsageBlock<'_> {
    fn drop(&mut self) {
        self.registry.saved_units.truncate(self.depth);
        self.registry.next_unit = self.saved_unit;
    }
}

#[cfg(test)]
#[path = "texture_registry_tests.rs"]
mod tests;
