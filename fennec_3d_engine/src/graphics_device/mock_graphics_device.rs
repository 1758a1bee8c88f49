/// Mock graphics device for unit tests (no GPU required)
///
/// Every call is validated the way a strict driver would and recorded as a
/// short human-readable command string, so tests can assert pass order,
/// viewport, clear bits and blend state. Resources live in slotmaps, so
/// stale handles are rejected and leaks show up in `live_*` counters.

use std::cell::{Cell, RefCell};

use glam::Vec4;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    AttachmentPoint, BlendMode, BufferBits, BuiltinMesh, FramebufferId, FramebufferStatus,
    GraphicsDevice, ImageSize, ProgramId, RenderbufferDesc, RenderbufferId, ShaderStageSource,
    TextureDesc, TextureId, TextureKind, TextureParams, UniformLocation, UniformValue, Viewport,
    CUBEMAP_FACE_COUNT,
};

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockTexture {
    pub ordinal: u32,
    pub desc: TextureDesc,
    pub params: Option<TextureParams>,
    pub mip_range: Option<(u32, u32)>,
    pub bytes_written: usize,
    pub mips_generated: u32,
}

#[derive(Debug, Clone)]
pub struct MockRenderbuffer {
    pub ordinal: u32,
    pub desc: RenderbufferDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAttached {
    Texture { texture: TextureId, mip: u32, face: Option<u32> },
    Renderbuffer(RenderbufferId),
}

#[derive(Debug, Clone, Default)]
pub struct MockFramebuffer {
    pub ordinal: u32,
    pub attachments: FxHashMap<AttachmentPoint, MockAttached>,
    pub draw_buffers: u32,
}

#[derive(Debug, Clone, Default)]
pub struct MockProgram {
    pub ordinal: u32,
    pub paths: Vec<String>,
    pub locations: FxHashMap<String, UniformLocation>,
    pub values: FxHashMap<String, UniformValue>,
}

// ============================================================================
// Mock device
// ============================================================================

#[derive(Default)]
pub struct MockGraphicsDevice {
    commands: RefCell<Vec<String>>,
    next_ordinal: Cell<u32>,
    textures: RefCell<SlotMap<TextureId, MockTexture>>,
    renderbuffers: RefCell<SlotMap<RenderbufferId, MockRenderbuffer>>,
    framebuffers: RefCell<SlotMap<FramebufferId, MockFramebuffer>>,
    programs: RefCell<SlotMap<ProgramId, MockProgram>>,
    bound_framebuffer: Cell<Option<FramebufferId>>,
    current_program: Cell<Option<ProgramId>>,
    viewport: Cell<Option<Viewport>>,
    clear_color: Cell<Vec4>,
    blend_mode: Cell<Option<BlendMode>>,
    debug_depth: Cell<u32>,
    hidden_uniforms: RefCell<FxHashSet<String>>,
    fail_completeness: Cell<bool>,
    fail_compile: Cell<bool>,
    draws_before_failure: Cell<Option<u32>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== INSPECTION =====

    /// Every recorded command, in call order
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Commands starting with `prefix`
    pub fn commands_starting_with(&self, prefix: &str) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_commands(&self) {
        self.commands.borrow_mut().clear();
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport.get()
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color.get()
    }

    pub fn blend_mode(&self) -> Option<BlendMode> {
        self.blend_mode.get()
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.bound_framebuffer.get()
    }

    pub fn debug_depth(&self) -> u32 {
        self.debug_depth.get()
    }

    pub fn texture(&self, id: TextureId) -> Option<MockTexture> {
        self.textures.borrow().get(id).cloned()
    }

    pub fn framebuffer(&self, id: FramebufferId) -> Option<MockFramebuffer> {
        self.framebuffers.borrow().get(id).cloned()
    }

    pub fn renderbuffer(&self, id: RenderbufferId) -> Option<MockRenderbuffer> {
        self.renderbuffers.borrow().get(id).cloned()
    }

    /// Last value written to `name` in `program`
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.programs
            .borrow()
            .get(program)
            .and_then(|p| p.values.get(name).copied())
    }

    /// Last value written to `name` by any program
    pub fn any_uniform(&self, name: &str) -> Option<UniformValue> {
        self.programs
            .borrow()
            .values()
            .find_map(|p| p.values.get(name).copied())
    }

    pub fn program_paths(&self, program: ProgramId) -> Vec<String> {
        self.programs
            .borrow()
            .get(program)
            .map(|p| p.paths.clone())
            .unwrap_or_default()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn live_renderbuffers(&self) -> usize {
        self.renderbuffers.borrow().len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.borrow().len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.borrow().len()
    }

    // ===== BEHAVIOR KNOBS =====

    /// Pretend no program declares `name`
    pub fn hide_uniform(&self, name: &str) {
        self.hidden_uniforms.borrow_mut().insert(name.to_string());
    }

    /// Report every framebuffer as incomplete
    pub fn set_fail_completeness(&self, fail: bool) {
        self.fail_completeness.set(fail);
    }

    /// Fail every program link
    pub fn set_fail_compile(&self, fail: bool) {
        self.fail_compile.set(fail);
    }

    /// Let `draws` more builtin draws succeed, then fail every later one
    pub fn set_fail_draw_after(&self, draws: u32) {
        self.draws_before_failure.set(Some(draws));
    }

    // ===== INTERNALS =====

    fn record(&self, command: String) {
        self.commands.borrow_mut().push(command);
    }

    fn ordinal(&self) -> u32 {
        let next = self.next_ordinal.get() + 1;
        self.next_ordinal.set(next);
        next
    }

    fn texture_label(&self, id: TextureId) -> String {
        match self.textures.borrow().get(id) {
            Some(t) => format!("tex{}", t.ordinal),
            None => "tex?".to_string(),
        }
    }

    fn framebuffer_label(&self, id: Option<FramebufferId>) -> String {
        match id {
            None => "default".to_string(),
            Some(id) => match self.framebuffers.borrow().get(id) {
                Some(f) => format!("fb{}", f.ordinal),
                None => "fb?".to_string(),
            },
        }
    }

    fn stale(kind: &str) -> Error {
        Error::InvalidResource(format!("stale {} handle", kind))
    }
}

/// "color+depth" style rendering of buffer bits
pub fn bits_label(bits: BufferBits) -> String {
    let mut parts = Vec::new();
    if bits.contains(BufferBits::COLOR) {
        parts.push("color");
    }
    if bits.contains(BufferBits::DEPTH) {
        parts.push("depth");
    }
    if bits.contains(BufferBits::STENCIL) {
        parts.push("stencil");
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join("+")
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId> {
        if desc.width == 0 || desc.height == 0 || desc.mip_levels == 0 {
            return Err(Error::InvalidResource("zero-sized texture".to_string()));
        }
        if desc.kind == TextureKind::Cubemap && desc.width != desc.height {
            return Err(Error::InvalidResource("cubemap faces must be square".to_string()));
        }
        let ordinal = self.ordinal();
        let id = self.textures.borrow_mut().insert(MockTexture {
            ordinal,
            desc: *desc,
            params: None,
            mip_range: None,
            bytes_written: 0,
            mips_generated: 0,
        });
        self.record(format!(
            "create_texture tex{} {:?} {}x{} mips={} {:?}",
            ordinal, desc.kind, desc.width, desc.height, desc.mip_levels, desc.internal_format
        ));
        Ok(id)
    }

    fn write_texture(&self, texture: TextureId, data: &[u8]) -> Result<()> {
        let mut textures = self.textures.borrow_mut();
        let t = textures.get_mut(texture).ok_or_else(|| Self::stale("texture"))?;
        t.bytes_written += data.len();
        Ok(())
    }

    fn set_texture_params(&self, texture: TextureId, params: &TextureParams) -> Result<()> {
        let mut textures = self.textures.borrow_mut();
        let t = textures.get_mut(texture).ok_or_else(|| Self::stale("texture"))?;
        t.params = Some(*params);
        Ok(())
    }

    fn set_sampler_mip_range(&self, texture: TextureId, min: u32, max: u32) -> Result<()> {
        let label = self.texture_label(texture);
        {
            let mut textures = self.textures.borrow_mut();
            let t = textures.get_mut(texture).ok_or_else(|| Self::stale("texture"))?;
            t.mip_range = Some((min, max));
        }
        self.record(format!("sampler_mip_range {} {}..={}", label, min, max));
        Ok(())
    }

    fn generate_mips(&self, texture: TextureId, max_level: Option<u32>) -> Result<()> {
        let label = self.texture_label(texture);
        {
            let mut textures = self.textures.borrow_mut();
            let t = textures.get_mut(texture).ok_or_else(|| Self::stale("texture"))?;
            t.mips_generated += 1;
        }
        self.record(format!("generate_mips {} max={:?}", label, max_level));
        Ok(())
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) -> Result<()> {
        if !self.textures.borrow().contains_key(texture) {
            return Err(Self::stale("texture"));
        }
        self.record(format!("bind_texture unit={} {}", unit, self.texture_label(texture)));
        Ok(())
    }

    fn destroy_texture(&self, texture: TextureId) {
        let label = self.texture_label(texture);
        if self.textures.borrow_mut().remove(texture).is_some() {
            self.record(format!("destroy_texture {}", label));
        }
    }

    fn create_renderbuffer(&self, desc: &RenderbufferDesc) -> Result<RenderbufferId> {
        let ordinal = self.ordinal();
        let id = self
            .renderbuffers
            .borrow_mut()
            .insert(MockRenderbuffer { ordinal, desc: *desc });
        self.record(format!(
            "create_renderbuffer rb{} {}x{} {:?}",
            ordinal, desc.width, desc.height, desc.internal_format
        ));
        Ok(id)
    }

    fn destroy_renderbuffer(&self, renderbuffer: RenderbufferId) {
        if let Some(rb) = self.renderbuffers.borrow_mut().remove(renderbuffer) {
            self.record(format!("destroy_renderbuffer rb{}", rb.ordinal));
        }
    }

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        let ordinal = self.ordinal();
        let id = self.framebuffers.borrow_mut().insert(MockFramebuffer {
            ordinal,
            ..Default::default()
        });
        self.record(format!("create_framebuffer fb{}", ordinal));
        Ok(id)
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) -> Result<()> {
        if let Some(id) = framebuffer {
            if !self.framebuffers.borrow().contains_key(id) {
                return Err(Self::stale("framebuffer"));
            }
        }
        self.bound_framebuffer.set(framebuffer);
        self.record(format!("bind_framebuffer {}", self.framebuffer_label(framebuffer)));
        Ok(())
    }

    fn attach_texture(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        texture: TextureId,
        mip: u32,
        face: Option<u32>,
    ) -> Result<()> {
        let desc = self
            .textures
            .borrow()
            .get(texture)
            .map(|t| t.desc)
            .ok_or_else(|| Self::stale("texture"))?;
        if mip >= desc.mip_levels {
            return Err(Error::InvalidState(format!("mip {} not allocated", mip)));
        }
        match (desc.kind, face) {
            (TextureKind::Tex2D, Some(_)) => {
                return Err(Error::InvalidState("face given for a 2D texture".to_string()));
            }
            (TextureKind::Cubemap, Some(f)) if f >= CUBEMAP_FACE_COUNT => {
                return Err(Error::InvalidState(format!("face {} out of range", f)));
            }
            _ => {}
        }
        let tex_label = self.texture_label(texture);
        let fb_label = self.framebuffer_label(Some(framebuffer));
        {
            let mut framebuffers = self.framebuffers.borrow_mut();
            let fb = framebuffers.get_mut(framebuffer).ok_or_else(|| Self::stale("framebuffer"))?;
            fb.attachments.insert(point, MockAttached::Texture { texture, mip, face });
        }
        self.record(format!(
            "attach_texture {} {:?} {} mip={} face={:?}",
            fb_label, point, tex_label, mip, face
        ));
        Ok(())
    }

    fn attach_renderbuffer(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        renderbuffer: RenderbufferId,
    ) -> Result<()> {
        let ordinal = self
            .renderbuffers
            .borrow()
            .get(renderbuffer)
            .map(|rb| rb.ordinal)
            .ok_or_else(|| Self::stale("renderbuffer"))?;
        let fb_label = self.framebuffer_label(Some(framebuffer));
        {
            let mut framebuffers = self.framebuffers.borrow_mut();
            let fb = framebuffers.get_mut(framebuffer).ok_or_else(|| Self::stale("framebuffer"))?;
            fb.attachments.insert(point, MockAttached::Renderbuffer(renderbuffer));
        }
        self.record(format!("attach_renderbuffer {} {:?} rb{}", fb_label, point, ordinal));
        Ok(())
    }

    fn set_draw_buffers(&self, framebuffer: FramebufferId, color_count: u32) -> Result<()> {
        let mut framebuffers = self.framebuffers.borrow_mut();
        let fb = framebuffers.get_mut(framebuffer).ok_or_else(|| Self::stale("framebuffer"))?;
        fb.draw_buffers = color_count;
        Ok(())
    }

    fn check_framebuffer_status(&self, framebuffer: FramebufferId) -> Result<FramebufferStatus> {
        let framebuffers = self.framebuffers.borrow();
        let fb = framebuffers.get(framebuffer).ok_or_else(|| Self::stale("framebuffer"))?;
        if self.fail_completeness.get() {
            return Ok(FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_ATTACHMENT".to_string()));
        }
        if fb.attachments.is_empty() {
            return Ok(FramebufferStatus::Incomplete("FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT".to_string()));
        }
        Ok(FramebufferStatus::Complete)
    }

    fn blit_framebuffer(
        &self,
        source: Option<FramebufferId>,
        source_size: ImageSize,
        destination: Option<FramebufferId>,
        destination_size: ImageSize,
        bits: BufferBits,
    ) -> Result<()> {
        self.record(format!(
            "blit {} {}x{} -> {} {}x{} {}",
            self.framebuffer_label(source),
            source_size.width,
            source_size.height,
            self.framebuffer_label(destination),
            destination_size.width,
            destination_size.height,
            bits_label(bits)
        ));
        Ok(())
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferId) {
        if let Some(fb) = self.framebuffers.borrow_mut().remove(framebuffer) {
            self.record(format!("destroy_framebuffer fb{}", fb.ordinal));
        }
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(Some(viewport));
        self.record(format!(
            "viewport {} {} {} {}",
            viewport.x, viewport.y, viewport.width, viewport.height
        ));
    }

    fn set_clear_color(&self, color: Vec4) {
        self.clear_color.set(color);
    }

    fn clear(&self, bits: BufferBits) {
        self.record(format!("clear {}", bits_label(bits)));
    }

    fn set_blend_mode(&self, mode: BlendMode) {
        self.blend_mode.set(Some(mode));
        self.record(format!("blend {:?}", mode));
    }

    fn set_face_culling(&self, enabled: bool) {
        self.record(format!("face_culling {}", enabled));
    }

    fn set_wireframe(&self, enabled: bool) {
        self.record(format!("wireframe {}", enabled));
    }

    fn create_program(&self, stages: &[ShaderStageSource]) -> Result<ProgramId> {
        if stages.is_empty() {
            return Err(Error::ShaderError("program without stages".to_string()));
        }
        if self.fail_compile.get() {
            return Err(Error::ShaderError(format!("{}: mock link failure", stages[0].path)));
        }
        let ordinal = self.ordinal();
        let paths: Vec<String> = stages.iter().map(|s| s.path.clone()).collect();
        self.record(format!("create_program prog{} {}", ordinal, paths.join(" ")));
        Ok(self.programs.borrow_mut().insert(MockProgram {
            ordinal,
            paths,
            ..Default::default()
        }))
    }

    fn use_program(&self, program: Option<ProgramId>) -> Result<()> {
        let label = match program {
            None => "none".to_string(),
            Some(id) => {
                let programs = self.programs.borrow();
                let p = programs.get(id).ok_or_else(|| Self::stale("program"))?;
                format!("prog{}", p.ordinal)
            }
        };
        self.current_program.set(program);
        self.record(format!("use_program {}", label));
        Ok(())
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        if self.hidden_uniforms.borrow().contains(name) {
            return None;
        }
        let mut programs = self.programs.borrow_mut();
        let p = programs.get_mut(program)?;
        let next = p.locations.len() as u32;
        Some(*p.locations.entry(name.to_string()).or_insert(UniformLocation(next)))
    }

    fn set_uniform(&self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        let mut programs = self.programs.borrow_mut();
        if let Some(p) = programs.get_mut(program) {
            let name = p
                .locations
                .iter()
                .find(|(_, l)| **l == location)
                .map(|(n, _)| n.clone());
            if let Some(name) = name {
                p.values.insert(name, value);
            }
        }
    }

    fn destroy_program(&self, program: ProgramId) {
        if let Some(p) = self.programs.borrow_mut().remove(program) {
            self.record(format!("destroy_program prog{}", p.ordinal));
        }
    }

    fn draw_builtin(&self, mesh: BuiltinMesh) -> Result<()> {
        if self.current_program.get().is_none() {
            return Err(Error::InvalidState("draw without a program".to_string()));
        }
        match self.draws_before_failure.get() {
            Some(0) => return Err(Error::BackendError(format!("mock draw failure of {:?}", mesh))),
            Some(left) => self.draws_before_failure.set(Some(left - 1)),
            None => {}
        }
        self.record(format!("draw {:?}", mesh));
        Ok(())
    }

    fn push_debug_group(&self, label: &str) {
        self.debug_depth.set(self.debug_depth.get() + 1);
        self.record(format!("push_debug_group {}", label));
    }

    fn pop_debug_group(&self) {
        self.debug_depth.set(self.debug_depth.get().saturating_sub(1));
        self.record("pop_debug_group".to_string());
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
