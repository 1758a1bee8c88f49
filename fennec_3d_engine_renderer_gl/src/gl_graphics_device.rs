/// GlGraphicsDevice - OpenGL 4.x implementation of the GraphicsDevice trait
///
/// Owns a `glow::Context` and every GL object created through it. Objects
/// live in slot maps so the handles given to the engine are generation
/// checked: a stale handle is reported as `InvalidResource` instead of
/// reaching the driver.
///
/// The context must stay current on the thread driving the device.

use std::cell::{Cell, RefCell};

use fennec_3d_engine::fennec3d::device::{
    AttachmentPoint, BlendMode, BufferBits, BuiltinMesh, FramebufferId, FramebufferStatus, GraphicsDevice,
    ImageSize, ProgramId, RenderbufferDesc, RenderbufferId, ShaderStageSource, TextureDesc, TextureId, TextureKind,
    TextureParams, UniformLocation, UniformValue, Viewport, CUBEMAP_FACE_COUNT,
};
use fennec_3d_engine::fennec3d::{Error, Result};
use fennec_3d_engine::glam::Vec4;
use fennec_3d_engine::{engine_bail, engine_debug, engine_err, engine_info, engine_warn};
use glow::HasContext;
use slotmap::SlotMap;

use crate::debug::{self, GlDebugConfig};
use crate::gl_format;
use crate::gl_mesh::BuiltinMeshes;

struct GlTexture {
    raw: glow::Texture,
    target: u32,
    desc: TextureDesc,
}

struct GlRenderbuffer {
    raw: glow::Renderbuffer,
}

struct GlFramebuffer {
    raw: glow::Framebuffer,
}

struct GlProgram {
    raw: glow::Program,
    /// First stage path, used in log messages
    label: String,
}

pub struct GlGraphicsDevice {
    gl: glow::Context,
    textures: RefCell<SlotMap<TextureId, GlTexture>>,
    renderbuffers: RefCell<SlotMap<RenderbufferId, GlRenderbuffer>>,
    framebuffers: RefCell<SlotMap<FramebufferId, GlFramebuffer>>,
    programs: RefCell<SlotMap<ProgramId, GlProgram>>,
    bound_framebuffer: Cell<Option<FramebufferId>>,
    current_program: Cell<Option<ProgramId>>,
    meshes: BuiltinMeshes,
}

impl GlGraphicsDevice {
    /// Wrap a current context and set the global state the passes expect
    ///
    /// Depth testing uses `LEQUAL` so the skybox drawn at depth 1.0 survives
    /// the cleared depth buffer, and cubemap sampling is seamless.
    pub fn new(gl: glow::Context) -> Result<Self> {
        let meshes = unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);
            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.pixel_store_i32(glow::PACK_ALIGNMENT, 1);
            BuiltinMeshes::new(&gl)?
        };

        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        let renderer = unsafe { gl.get_parameter_string(glow::RENDERER) };
        engine_info!("fennec3d::GlDevice", "OpenGL {} on {}", version, renderer);

        Ok(Self {
            gl,
            textures: RefCell::new(SlotMap::with_key()),
            renderbuffers: RefCell::new(SlotMap::with_key()),
            framebuffers: RefCell::new(SlotMap::with_key()),
            programs: RefCell::new(SlotMap::with_key()),
            bound_framebuffer: Cell::new(None),
            current_program: Cell::new(None),
            meshes,
        })
    }

    /// Same as `new`, with KHR_debug output routed into the engine log
    pub fn with_debug_output(mut gl: glow::Context, config: GlDebugConfig) -> Result<Self> {
        if gl.supports_debug() {
            unsafe { debug::install_debug_callback(&mut gl, config) };
        } else {
            engine_warn!("fennec3d::GlDevice", "KHR_debug unavailable, GL debug output disabled");
        }
        Self::new(gl)
    }

    /// Raw context, for callers drawing their own geometry
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    // ===== LOOKUPS =====

    fn stale(kind: &str) -> Error {
        engine_err!(InvalidResource, "fennec3d::GlDevice", "Stale {} handle", kind)
    }

    fn texture(&self, id: TextureId) -> Result<(glow::Texture, u32, TextureDesc)> {
        self.textures
            .borrow()
            .get(id)
            .map(|t| (t.raw, t.target, t.desc))
            .ok_or_else(|| Self::stale("texture"))
    }

    fn renderbuffer(&self, id: RenderbufferId) -> Result<glow::Renderbuffer> {
        self.renderbuffers.borrow().get(id).map(|r| r.raw).ok_or_else(|| Self::stale("renderbuffer"))
    }

    fn framebuffer(&self, id: FramebufferId) -> Result<glow::Framebuffer> {
        self.framebuffers.borrow().get(id).map(|f| f.raw).ok_or_else(|| Self::stale("framebuffer"))
    }

    fn raw_framebuffer(&self, id: Option<FramebufferId>) -> Result<Option<glow::Framebuffer>> {
        id.map(|id| self.framebuffer(id)).transpose()
    }

    fn program(&self, id: ProgramId) -> Option<glow::Program> {
        self.programs.borrow().get(id).map(|p| p.raw)
    }

    /// Run `f` with `framebuffer` bound, then restore the draw target
    fn with_framebuffer<R>(&self, framebuffer: FramebufferId, f: impl FnOnce(&glow::Context) -> R) -> Result<R> {
        let raw = self.framebuffer(framebuffer)?;
        let previous = self.raw_framebuffer(self.bound_framebuffer.get()).unwrap_or(None);
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(raw));
            let result = f(&self.gl);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous);
            Ok(result)
        }
    }

    unsafe fn compile_stage(&self, stage: &ShaderStageSource) -> Result<glow::Shader> {
        let shader = self
            .gl
            .create_shader(gl_format::shader_stage(stage.stage))
            .map_err(|e| engine_err!(ShaderError, "fennec3d::GlDevice", "Cannot create shader '{}': {}", stage.path, e))?;
        self.gl.shader_source(shader, &stage.source);
        self.gl.compile_shader(shader);
        if !self.gl.get_shader_compile_status(shader) {
            let log = self.gl.get_shader_info_log(shader);
            self.gl.delete_shader(shader);
            engine_bail!(ShaderError, "fennec3d::GlDevice", "Compilation of '{}' failed:\n{}", stage.path, log);
        }
        Ok(shader)
    }
}

impl GraphicsDevice for GlGraphicsDevice {
    // ===== TEXTURES =====

    fn create_texture(&self, desc: &TextureDesc) -> Result<TextureId> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!(InvalidState, "fennec3d::GlDevice", "Texture size {}x{} is empty", desc.width, desc.height);
        }
        let target = gl_format::texture_target(desc.kind, desc.samples);
        let internal_format = gl_format::internal_format(desc.internal_format);

        let raw = unsafe {
            let raw = self
                .gl
                .create_texture()
                .map_err(|e| engine_err!("fennec3d::GlDevice", "Texture creation failed: {}", e))?;
            self.gl.bind_texture(target, Some(raw));
            if target == glow::TEXTURE_2D_MULTISAMPLE {
                self.gl.tex_storage_2d_multisample(
                    target,
                    desc.samples as i32,
                    internal_format,
                    desc.width as i32,
                    desc.height as i32,
                    true,
                );
            } else {
                self.gl.tex_storage_2d(
                    target,
                    desc.mip_levels.max(1) as i32,
                    internal_format,
                    desc.width as i32,
                    desc.height as i32,
                );
                self.gl.tex_parameter_i32(target, glow::TEXTURE_BASE_LEVEL, 0);
                self.gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, desc.mip_levels.max(1) as i32 - 1);
            }
            self.gl.bind_texture(target, None);
            raw
        };

        Ok(self.textures.borrow_mut().insert(GlTexture { raw, target, desc: *desc }))
    }

    fn write_texture(&self, texture: TextureId, data: &[u8]) -> Result<()> {
        let (raw, target, desc) = self.texture(texture)?;
        if target == glow::TEXTURE_2D_MULTISAMPLE {
            engine_bail!(InvalidState, "fennec3d::GlDevice", "Cannot upload pixels to a multisampled texture");
        }

        let face_bytes = desc.width as usize
            * desc.height as usize
            * desc.pixel_format.components()
            * gl_format::component_size(desc.data_type);
        let faces = match desc.kind {
            TextureKind::Tex2D => 1,
            TextureKind::Cubemap => CUBEMAP_FACE_COUNT as usize,
        };
        if data.len() != face_bytes * faces {
            engine_bail!(
                InvalidState,
                "fennec3d::GlDevice",
                "Expected {} bytes of pixel data, got {}",
                face_bytes * faces,
                data.len()
            );
        }

        let format = gl_format::pixel_format(desc.pixel_format);
        let ty = gl_format::data_type(desc.data_type);
        unsafe {
            self.gl.bind_texture(target, Some(raw));
            for (face, pixels) in data.chunks_exact(face_bytes).enumerate() {
                let image_target = match desc.kind {
                    TextureKind::Tex2D => target,
                    TextureKind::Cubemap => gl_format::cubemap_face_target(face as u32),
                };
                self.gl.tex_sub_image_2d(
                    image_target,
                    0,
                    0,
                    0,
                    desc.width as i32,
                    desc.height as i32,
                    format,
                    ty,
                    glow::PixelUnpackData::Slice(pixels),
                );
            }
            self.gl.bind_texture(target, None);
        }
        Ok(())
    }

    fn set_texture_params(&self, texture: TextureId, params: &TextureParams) -> Result<()> {
        let (raw, target, desc) = self.texture(texture)?;
        if target == glow::TEXTURE_2D_MULTISAMPLE {
            // Multisampled textures have no sampler state
            return Ok(());
        }

        let filter = gl_format::filter_state(params.filtering, desc.mip_levels);
        let (wrap, border) = gl_format::wrap_state(params.wrap);
        unsafe {
            self.gl.bind_texture(target, Some(raw));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, filter.min as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, filter.mag as i32);
            if let Some(level) = filter.anisotropy {
                self.gl.tex_parameter_f32(target, glow::TEXTURE_MAX_ANISOTROPY_EXT, level);
            }
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap as i32);
            if let Some(color) = border {
                self.gl.tex_parameter_f32_slice(target, glow::TEXTURE_BORDER_COLOR, &color);
            }
            self.gl.bind_texture(target, None);
        }
        Ok(())
    }

    fn set_sampler_mip_range(&self, texture: TextureId, min: u32, max: u32) -> Result<()> {
        let (raw, target, _) = self.texture(texture)?;
        // GL clamps the max level to the allocated chain
        if min > max {
            engine_bail!(InvalidState, "fennec3d::GlDevice", "Inverted mip range {}..={}", min, max);
        }
        unsafe {
            self.gl.bind_texture(target, Some(raw));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_BASE_LEVEL, min as i32);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, max as i32);
            self.gl.bind_texture(target, None);
        }
        Ok(())
    }

    fn generate_mips(&self, texture: TextureId, max_level: Option<u32>) -> Result<()> {
        let (raw, target, desc) = self.texture(texture)?;
        if target == glow::TEXTURE_2D_MULTISAMPLE {
            engine_bail!(InvalidState, "fennec3d::GlDevice", "Cannot generate mips of a multisampled texture");
        }
        let top = desc.mip_levels.max(1) - 1;
        let max_level = max_level.map_or(top, |level| level.min(top));
        unsafe {
            self.gl.bind_texture(target, Some(raw));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_BASE_LEVEL, 0);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, max_level as i32);
            self.gl.generate_mipmap(target);
            self.gl.bind_texture(target, None);
        }
        Ok(())
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) -> Result<()> {
        let (raw, target, _) = self.texture(texture)?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(target, Some(raw));
        }
        Ok(())
    }

    fn destroy_texture(&self, texture: TextureId) {
        if let Some(t) = self.textures.borrow_mut().remove(texture) {
            unsafe { self.gl.delete_texture(t.raw) };
        }
    }

    // ===== RENDERBUFFERS =====

    fn create_renderbuffer(&self, desc: &RenderbufferDesc) -> Result<RenderbufferId> {
        let internal_format = gl_format::internal_format(desc.internal_format);
        let raw = unsafe {
            let raw = self
                .gl
                .create_renderbuffer()
                .map_err(|e| engine_err!("fennec3d::GlDevice", "Renderbuffer creation failed: {}", e))?;
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, Some(raw));
            if desc.samples > 0 {
                self.gl.renderbuffer_storage_multisample(
                    glow::RENDERBUFFER,
                    desc.samples as i32,
                    internal_format,
                    desc.width as i32,
                    desc.height as i32,
                );
            } else {
                self.gl.renderbuffer_storage(glow::RENDERBUFFER, internal_format, desc.width as i32, desc.height as i32);
            }
            self.gl.bind_renderbuffer(glow::RENDERBUFFER, None);
            raw
        };
        Ok(self.renderbuffers.borrow_mut().insert(GlRenderbuffer { raw }))
    }

    fn destroy_renderbuffer(&self, renderbuffer: RenderbufferId) {
        if let Some(r) = self.renderbuffers.borrow_mut().remove(renderbuffer) {
            unsafe { self.gl.delete_renderbuffer(r.raw) };
        }
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(&self) -> Result<FramebufferId> {
        let raw = unsafe {
            self.gl
                .create_framebuffer()
                .map_err(|e| engine_err!("fennec3d::GlDevice", "Framebuffer creation failed: {}", e))?
        };
        Ok(self.framebuffers.borrow_mut().insert(GlFramebuffer { raw }))
    }

    fn bind_framebuffer(&self, framebuffer: Option<FramebufferId>) -> Result<()> {
        let raw = self.raw_framebuffer(framebuffer)?;
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, raw) };
        self.bound_framebuffer.set(framebuffer);
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
        let (raw, target, desc) = self.texture(texture)?;
        if mip >= desc.mip_levels.max(1) {
            engine_bail!(InvalidState, "fennec3d::GlDevice", "Mip {} not allocated", mip);
        }
        let image_target = match (desc.kind, face) {
            (TextureKind::Cubemap, Some(f)) if f < CUBEMAP_FACE_COUNT => gl_format::cubemap_face_target(f),
            (TextureKind::Cubemap, Some(f)) => {
                engine_bail!(InvalidState, "fennec3d::GlDevice", "Cubemap face {} out of range", f)
            }
            (TextureKind::Tex2D, Some(_)) => {
                engine_bail!(InvalidState, "fennec3d::GlDevice", "Face given for a 2D texture")
            }
            (_, None) => target,
        };

        self.with_framebuffer(framebuffer, |gl| unsafe {
            if image_target == glow::TEXTURE_CUBE_MAP {
                gl.framebuffer_texture(glow::FRAMEBUFFER, gl_format::attachment_point(point), Some(raw), mip as i32);
            } else {
                gl.framebuffer_texture_2d(
                    glow::FRAMEBUFFER,
                    gl_format::attachment_point(point),
                    image_target,
                    Some(raw),
                    mip as i32,
                );
            }
        })
    }

    fn attach_renderbuffer(
        &self,
        framebuffer: FramebufferId,
        point: AttachmentPoint,
        renderbuffer: RenderbufferId,
    ) -> Result<()> {
        let raw = self.renderbuffer(renderbuffer)?;
        self.with_framebuffer(framebuffer, |gl| unsafe {
            gl.framebuffer_renderbuffer(glow::FRAMEBUFFER, gl_format::attachment_point(point), glow::RENDERBUFFER, Some(raw));
        })
    }

    fn set_draw_buffers(&self, framebuffer: FramebufferId, color_count: u32) -> Result<()> {
        let buffers: Vec<u32> = if color_count == 0 {
            vec![glow::NONE]
        } else {
            (0..color_count).map(|i| gl_format::attachment_point(AttachmentPoint::Color(i))).collect()
        };
        self.with_framebuffer(framebuffer, |gl| unsafe {
            gl.draw_buffers(&buffers);
            if color_count == 0 {
                gl.read_buffer(glow::NONE);
            }
        })
    }

    fn check_framebuffer_status(&self, framebuffer: FramebufferId) -> Result<FramebufferStatus> {
        let status = self.with_framebuffer(framebuffer, |gl| unsafe { gl.check_framebuffer_status(glow::FRAMEBUFFER) })?;
        Ok(match gl_format::framebuffer_status_name(status) {
            None => FramebufferStatus::Complete,
            Some(name) => FramebufferStatus::Incomplete(name.to_string()),
        })
    }

    fn blit_framebuffer(
        &self,
        source: Option<FramebufferId>,
        source_size: ImageSize,
        destination: Option<FramebufferId>,
        destination_size: ImageSize,
        bits: BufferBits,
    ) -> Result<()> {
        let read = self.raw_framebuffer(source)?;
        let draw = self.raw_framebuffer(destination)?;
        let previous = self.raw_framebuffer(self.bound_framebuffer.get()).unwrap_or(None);
        unsafe {
            self.gl.bind_framebuffer(glow::READ_FRAMEBUFFER, read);
            self.gl.bind_framebuffer(glow::DRAW_FRAMEBUFFER, draw);
            self.gl.blit_framebuffer(
                0,
                0,
                source_size.width as i32,
                source_size.height as i32,
                0,
                0,
                destination_size.width as i32,
                destination_size.height as i32,
                gl_format::buffer_mask(bits),
                glow::NEAREST,
            );
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, previous);
        }
        Ok(())
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferId) {
        if let Some(f) = self.framebuffers.borrow_mut().remove(framebuffer) {
            if self.bound_framebuffer.get() == Some(framebuffer) {
                self.bound_framebuffer.set(None);
            }
            unsafe { self.gl.delete_framebuffer(f.raw) };
        }
    }

    // ===== FIXED-FUNCTION STATE =====

    fn set_viewport(&self, viewport: Viewport) {
        unsafe {
            self.gl.viewport(viewport.x, viewport.y, viewport.width as i32, viewport.height as i32);
        }
    }

    fn set_clear_color(&self, color: Vec4) {
        unsafe { self.gl.clear_color(color.x, color.y, color.z, color.w) };
    }

    fn clear(&self, bits: BufferBits) {
        unsafe { self.gl.clear(gl_format::buffer_mask(bits)) };
    }

    fn set_blend_mode(&self, mode: BlendMode) {
        unsafe {
            match gl_format::blend_factors(mode) {
                Some((src, dst)) => {
                    self.gl.enable(glow::BLEND);
                    self.gl.blend_func(src, dst);
                }
                None => self.gl.disable(glow::BLEND),
            }
        }
    }

    fn set_face_culling(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::CULL_FACE);
                self.gl.cull_face(glow::BACK);
            } else {
                self.gl.disable(glow::CULL_FACE);
            }
        }
    }

    fn set_wireframe(&self, enabled: bool) {
        let mode = if enabled { glow::LINE } else { glow::FILL };
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode) };
    }

    // ===== PROGRAMS =====

    fn create_program(&self, stages: &[ShaderStageSource]) -> Result<ProgramId> {
        if stages.is_empty() {
            engine_bail!(ShaderError, "fennec3d::GlDevice", "Program without stages");
        }
        let label = stages[0].path.clone();

        unsafe {
            let mut shaders = Vec::with_capacity(stages.len());
            for stage in stages {
                match self.compile_stage(stage) {
                    Ok(shader) => shaders.push(shader),
                    Err(err) => {
                        for shader in shaders {
                            self.gl.delete_shader(shader);
                        }
                        return Err(err);
                    }
                }
            }

            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(e) => {
                    for shader in shaders {
                        self.gl.delete_shader(shader);
                    }
                    engine_bail!(ShaderError, "fennec3d::GlDevice", "Cannot create program '{}': {}", label, e);
                }
            };
            for &shader in &shaders {
                self.gl.attach_shader(program, shader);
            }
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            for shader in shaders {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }
            if !linked {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                engine_bail!(ShaderError, "fennec3d::GlDevice", "Linking of '{}' failed:\n{}", label, log);
            }

            engine_debug!("fennec3d::GlDevice", "Linked program '{}' ({} stages)", label, stages.len());
            Ok(self.programs.borrow_mut().insert(GlProgram { raw: program, label }))
        }
    }

    fn use_program(&self, program: Option<ProgramId>) -> Result<()> {
        let raw = match program {
            Some(id) => Some(self.program(id).ok_or_else(|| Self::stale("program"))?),
            None => None,
        };
        unsafe { self.gl.use_program(raw) };
        self.current_program.set(program);
        Ok(())
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let raw = self.program(program)?;
        unsafe { self.gl.get_uniform_location(raw, name) }.map(|location| UniformLocation(location.0))
    }

    fn set_uniform(&self, program: ProgramId, location: UniformLocation, value: UniformValue) {
        let Some(raw) = self.program(program) else {
            return;
        };
        let current = self.current_program.get();
        let switch = current != Some(program);
        let location = glow::NativeUniformLocation(location.0);
        let location = Some(&location);

        unsafe {
            if switch {
                self.gl.use_program(Some(raw));
            }
            match value {
                UniformValue::Bool(v) => self.gl.uniform_1_i32(location, v as i32),
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::UInt(v) => self.gl.uniform_1_u32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(location, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array()),
            }
            if switch {
                let previous = current.and_then(|id| self.program(id));
                self.gl.use_program(previous);
            }
        }
    }

    fn destroy_program(&self, program: ProgramId) {
        if let Some(p) = self.programs.borrow_mut().remove(program) {
            if self.current_program.get() == Some(program) {
                self.current_program.set(None);
                unsafe { self.gl.use_program(None) };
            }
            engine_debug!("fennec3d::GlDevice", "Deleting program '{}'", p.label);
            unsafe { self.gl.delete_program(p.raw) };
        }
    }

    // ===== DRAWING =====

    fn draw_builtin(&self, mesh: BuiltinMesh) -> Result<()> {
        if self.current_program.get().is_none() {
            engine_bail!(InvalidState, "fennec3d::GlDevice", "Draw of {:?} without a program", mesh);
        }
        unsafe { self.meshes.draw(&self.gl, mesh) };
        Ok(())
    }

    // ===== DEBUG =====

    fn push_debug_group(&self, label: &str) {
        #[cfg(feature = "gl-debug-groups")]
        unsafe {
            self.gl.push_debug_group(glow::DEBUG_SOURCE_APPLICATION, 0, label);
        }
        #[cfg(not(feature = "gl-debug-groups"))]
        let _ = label;
    }

    fn pop_debug_group(&self) {
        #[cfg(feature = "gl-debug-groups")]
        unsafe {
            self.gl.pop_debug_group();
        }
    }
}

impl Drop for GlGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.gl.use_program(None);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);

            for (_, program) in self.programs.get_mut().drain() {
                self.gl.delete_program(program.raw);
            }
            for (_, framebuffer) in self.framebuffers.get_mut().drain() {
                self.gl.delete_framebuffer(framebuffer.raw);
            }
            for (_, renderbuffer) in self.renderbuffers.get_mut().drain() {
                self.gl.delete_renderbuffer(renderbuffer.raw);
            }
            for (_, texture) in self.textures.get_mut().drain() {
                self.gl.delete_texture(texture.raw);
            }
            self.meshes.destroy(&self.gl);
        }
    }
}
