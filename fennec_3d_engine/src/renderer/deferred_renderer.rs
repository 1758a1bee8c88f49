/// DeferredRenderer - the frame driver of the deferred pipeline
///
/// Owns every pass, its targets and the texture registries that wire them
/// together, and runs them each frame in a fixed dependency order:
///
/// 1. directional shadow map (optional)
/// 2. geometry pass into the G-buffer
/// 3. SSAO + blur (optional)
/// 4. deferred lighting into the main HDR framebuffer
/// 5. forward extras: normals, lamps, skybox
/// 6. bloom mip chain over the lit image (optional)
/// 7. tone mapping and gamma into the final framebuffer
/// 8. FXAA or a plain blit onto the screen
///
/// A G-buffer visualisation request stops the frame after step 2 and shows
/// the chosen attachment instead.
///
/// Passes that are both registry sources and resizable are shared as
/// `Rc<RefCell<_>>`; fixed-size sources are plain `Rc`.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::config::{GBufferVis, RenderOptions, RendererConfig};
use crate::error::Result;
use crate::framebuffer::{BufferType, Framebuffer};
use crate::graphics_device::{BufferBits, BuiltinMesh, GraphicsDevice, ImageSize, Viewport};
use crate::light::{LightRegistry, LightType, SharedViewSource};
use crate::pass::{
    draw_builtin, draw_screen_quad, BloomPass, CubemapIrradianceCalculator, DeferredGeometryPassShader,
    EquirectCubemapConverter, GBuffer, GGXBrdfIntegrationCalculator, GGXPrefilteredEnvMapCalculator, ShadowCamera,
    ShadowMap, SsaoBlurShader, SsaoBuffer, SsaoKernel, SsaoShader,
};
use crate::renderer::{DebugGroup, Drawable};
use crate::resource::Texture;
use crate::shader::{
    FxaaShader, LampShader, ScreenShader, Shader, ShaderCode, ShaderSourceLoader, SharedUniformSource,
    ShadowMapShader, SkyboxShader, MODEL_VERT,
};
use crate::texture_registry::{SharedTextureSource, TextureRegistry};

pub const GBUFFER_VIS_FRAG: &str = "content/shaders/gbuffer_vis.frag";
pub const LIGHTING_PASS_FRAG: &str = "content/shaders/lighting_pass.frag";
pub const POST_PROCESSING_FRAG: &str = "content/shaders/post_processing.frag";
pub const NORMAL_FRAG: &str = "content/shaders/normal.frag";
pub const MODEL_NORMALS_GEOM: &str = "content/shaders/model_normals.geom";

/// Sampler the skybox shader reads the environment cubemap from
pub const SKYBOX_SAMPLER: &str = "skybox";

/// Lamp gizmo scales
pub const POINT_LAMP_SCALE: f32 = 0.2;
pub const SPOT_LAMP_SCALE: f32 = 0.05;

/// The prefiltered map keeps its full mip chain
const PREFILTER_MAX_NUM_MIPS: u32 = u32::MAX;

pub struct DeferredRenderer {
    device: Rc<dyn GraphicsDevice>,
    size: ImageSize,
    camera: Rc<RefCell<Camera>>,
    lights: Rc<RefCell<LightRegistry>>,

    // ===== SCREEN-SIZED TARGETS =====
    g_buffer: Rc<RefCell<GBuffer>>,
    ssao_buffer: SsaoBuffer,
    ssao_blurred_buffer: Rc<RefCell<SsaoBuffer>>,
    bloom_pass: Rc<RefCell<BloomPass>>,
    main_fb: Framebuffer,
    final_fb: Framebuffer,

    // ===== FIXED-SIZE TARGETS =====
    shadow_map: Rc<ShadowMap>,
    shadow_camera: Rc<RefCell<ShadowCamera>>,
    ssao_kernel: Rc<RefCell<SsaoKernel>>,
    equirect_converter: EquirectCubemapConverter,
    irradiance: Rc<RefCell<CubemapIrradianceCalculator>>,
    prefiltered: Rc<RefCell<GGXPrefilteredEnvMapCalculator>>,
    brdf_lut: Rc<GGXBrdfIntegrationCalculator>,
    has_environment: bool,

    // ===== REGISTRIES =====
    lighting_registry: Rc<RefCell<TextureRegistry>>,
    postprocess_registry: Rc<RefCell<TextureRegistry>>,

    // ===== SHADERS =====
    geometry_shader: DeferredGeometryPassShader,
    g_buffer_vis_shader: ScreenShader,
    lighting_shader: ScreenShader,
    shadow_shader: ShadowMapShader,
    ssao_shader: SsaoShader,
    ssao_blur_shader: SsaoBlurShader,
    postprocess_shader: ScreenShader,
    fxaa_shader: FxaaShader,
    skybox_shader: SkyboxShader,
    normal_shader: Shader,
    lamp_shader: LampShader,
    lamp_mesh: Box<dyn Drawable>,
}

impl DeferredRenderer {
    /// Build every pass for a screen of `size`, wire the registries and
    /// compute the BRDF lookup texture
    ///
    /// The light registry reads its view transform from `camera`.
    pub fn new(
        device: &Rc<dyn GraphicsDevice>,
        loader: &dyn ShaderSourceLoader,
        config: &RendererConfig,
        camera: Rc<RefCell<Camera>>,
        size: ImageSize,
    ) -> Result<Self> {
        let camera_source: SharedUniformSource = camera.clone();

        let mut lights = LightRegistry::new();
        let view_source: SharedViewSource = camera.clone();
        lights.set_view_source(view_source);
        let lights = Rc::new(RefCell::new(lights));

        // Screen-sized targets
        let g_buffer = Rc::new(RefCell::new(GBuffer::new(device, size)?));
        let ssao_buffer = SsaoBuffer::new(device, size)?;
        let ssao_blurred_buffer = Rc::new(RefCell::new(SsaoBuffer::new(device, size)?));
        let bloom_pass = Rc::new(RefCell::new(BloomPass::new(device, loader, size)?));
        let main_fb = build_main_framebuffer(device, size)?;
        let final_fb = build_final_framebuffer(device, size)?;

        // Fixed-size targets
        let shadow_map = Rc::new(ShadowMap::new(
            device,
            ImageSize::new(config.shadow_map_size, config.shadow_map_size),
        )?);
        let shadow_camera = Rc::new(RefCell::new(ShadowCamera::new(Vec3::NEG_Y)));
        let ssao_kernel = Rc::new(RefCell::new(SsaoKernel::new(device, config)?));
        let equirect_converter = EquirectCubemapConverter::new(
            device,
            loader,
            ImageSize::new(config.cubemap_size, config.cubemap_size),
            true,
        )?;
        let irradiance = Rc::new(RefCell::new(CubemapIrradianceCalculator::new(
            device,
            loader,
            ImageSize::new(config.irradiance_map_size, config.irradiance_map_size),
        )?));
        let prefiltered = Rc::new(RefCell::new(GGXPrefilteredEnvMapCalculator::new(
            device,
            loader,
            ImageSize::new(config.prefiltered_env_map_size, config.prefiltered_env_map_size),
            PREFILTER_MAX_NUM_MIPS,
        )?));
        let brdf_lut = Rc::new(GGXBrdfIntegrationCalculator::new(
            device,
            loader,
            ImageSize::new(config.brdf_lut_size, config.brdf_lut_size),
        )?);
        {
            let _group = DebugGroup::new(&**device, "BRDF LUT calculation");
            brdf_lut.draw()?;
        }

        // Lighting inputs, in binding order
        let mut lighting_registry = TextureRegistry::new();
        let lighting_sources: [SharedTextureSource; 6] = [
            g_buffer.clone(),
            shadow_map.clone(),
            ssao_blurred_buffer.clone(),
            irradiance.clone(),
            prefiltered.clone(),
            brdf_lut.clone(),
        ];
        for source in lighting_sources {
            lighting_registry.add_texture_source(source);
        }
        let lighting_registry = Rc::new(RefCell::new(lighting_registry));

        let mut ssao_registry = TextureRegistry::new();
        ssao_registry.add_texture_source(g_buffer.clone());
        ssao_registry.add_texture_source(ssao_kernel.clone());
        let ssao_registry = Rc::new(RefCell::new(ssao_registry));

        let mut postprocess_registry = TextureRegistry::new();
        postprocess_registry.add_texture_source(bloom_pass.clone());
        let postprocess_registry = Rc::new(RefCell::new(postprocess_registry));

        // Shaders and their uniform sources
        let mut geometry_shader = DeferredGeometryPassShader::new(device, loader)?;
        geometry_shader.add_uniform_source(camera_source.clone());

        let g_buffer_vis_shader = ScreenShader::with_fragment(device, loader, ShaderCode::Path(GBUFFER_VIS_FRAG))?;

        let mut lighting_shader = ScreenShader::with_fragment(device, loader, ShaderCode::Path(LIGHTING_PASS_FRAG))?;
        lighting_shader.add_uniform_source(camera_source.clone());
        lighting_shader.add_uniform_source(lighting_registry.clone());
        lighting_shader.add_uniform_source(lights.clone());
        lighting_shader.add_uniform_source(shadow_camera.clone());
        lighting_shader.add_uniform_source(prefiltered.clone());

        let mut shadow_shader = ShadowMapShader::new(device, loader)?;
        shadow_shader.add_uniform_source(shadow_camera.clone());

        let mut ssao_shader = SsaoShader::new(device, loader)?;
        ssao_shader.add_uniform_source(camera_source.clone());
        ssao_shader.add_uniform_source(ssao_kernel.clone());
        ssao_shader.add_uniform_source(ssao_registry);

        let ssao_blur_shader = SsaoBlurShader::new(device, loader)?;

        let mut postprocess_shader =
            ScreenShader::with_fragment(device, loader, ShaderCode::Path(POST_PROCESSING_FRAG))?;
        postprocess_shader.add_uniform_source(postprocess_registry.clone());

        let fxaa_shader = FxaaShader::new(device, loader)?;

        let mut skybox_shader = SkyboxShader::new(device, loader)?;
        skybox_shader.add_uniform_source(camera_source.clone());

        let mut normal_shader = Shader::with_geometry(
            device,
            loader,
            ShaderCode::Path(MODEL_VERT),
            ShaderCode::Path(NORMAL_FRAG),
            ShaderCode::Path(MODEL_NORMALS_GEOM),
        )?;
        normal_shader.add_uniform_source(camera_source.clone());

        let mut lamp_shader = LampShader::new(device, loader)?;
        lamp_shader.add_uniform_source(camera_source);

        device.set_face_culling(true);

        crate::engine_info!(
            "fennec3d::DeferredRenderer",
            "Deferred renderer ready at {}x{}",
            size.width,
            size.height
        );

        Ok(Self {
            device: Rc::clone(device),
            size,
            camera,
            lights,
            g_buffer,
            ssao_buffer,
            ssao_blurred_buffer,
            bloom_pass,
            main_fb,
            final_fb,
            shadow_map,
            shadow_camera,
            ssao_kernel,
            equirect_converter,
            irradiance,
            prefiltered,
            brdf_lut,
            has_environment: false,
            lighting_registry,
            postprocess_registry,
            geometry_shader,
            g_buffer_vis_shader,
            lighting_shader,
            shadow_shader,
            ssao_shader,
            ssao_blur_shader,
            postprocess_shader,
            fxaa_shader,
            skybox_shader,
            normal_shader,
            lamp_shader,
            lamp_mesh: Box::new(BuiltinMesh::Room),
        })
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &Rc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn camera(&self) -> &Rc<RefCell<Camera>> {
        &self.camera
    }

    pub fn lights(&self) -> &Rc<RefCell<LightRegistry>> {
        &self.lights
    }

    pub fn g_buffer(&self) -> &Rc<RefCell<GBuffer>> {
        &self.g_buffer
    }

    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow_map
    }

    pub fn shadow_camera(&self) -> &Rc<RefCell<ShadowCamera>> {
        &self.shadow_camera
    }

    /// Blurred ambient occlusion, as sampled by the lighting pass
    pub fn ssao_buffer(&self) -> &Rc<RefCell<SsaoBuffer>> {
        &self.ssao_blurred_buffer
    }

    pub fn bloom_pass(&self) -> &Rc<RefCell<BloomPass>> {
        &self.bloom_pass
    }

    pub fn main_framebuffer(&self) -> &Framebuffer {
        &self.main_fb
    }

    pub fn final_framebuffer(&self) -> &Framebuffer {
        &self.final_fb
    }

    pub fn brdf_lut(&self) -> &GGXBrdfIntegrationCalculator {
        &self.brdf_lut
    }

    pub fn lighting_registry(&self) -> &Rc<RefCell<TextureRegistry>> {
        &self.lighting_registry
    }

    /// Whether a skybox has been loaded
    pub fn has_environment(&self) -> bool {
        self.has_environment
    }

    /// Mesh drawn at each point and spot light (unit cube by default)
    pub fn set_lamp_mesh(&mut self, mesh: Box<dyn Drawable>) {
        self.lamp_mesh = mesh;
    }

    // ===== LIFECYCLE =====

    /// Rebuild every screen-sized target for a new screen size
    ///
    /// A zero-sized screen (minimised window) keeps the current targets.
    pub fn resize(&mut self, size: ImageSize) -> Result<()> {
        if size == self.size {
            return Ok(());
        }
        if size.width == 0 || size.height == 0 {
            crate::engine_debug!(
                "fennec3d::DeferredRenderer",
                "Ignoring resize to {}x{}",
                size.width,
                size.height
            );
            return Ok(());
        }

        borrow_mut(&self.g_buffer, "G-buffer")?.resize(size)?;
        self.ssao_buffer.resize(size)?;
        borrow_mut(&self.ssao_blurred_buffer, "SSAO buffer")?.resize(size)?;
        borrow_mut(&self.bloom_pass, "Bloom pass")?.resize(size)?;
        self.main_fb = build_main_framebuffer(&self.device, size)?;
        self.final_fb = build_final_framebuffer(&self.device, size)?;
        self.size = size;

        crate::engine_debug!(
            "fennec3d::DeferredRenderer",
            "Resized screen targets to {}x{}",
            size.width,
            size.height
        );
        Ok(())
    }

    /// Convert an equirectangular environment map into the skybox cubemap
    /// and recompute the diffuse and specular IBL maps from it
    pub fn load_skybox(&mut self, equirect: &Texture) -> Result<()> {
        {
            let _group = DebugGroup::new(&*self.device, "Skybox IBL precompute");
            self.equirect_converter.multipass_draw(equirect)?;
            let cubemap = self.equirect_converter.cubemap()?;
            borrow(&self.irradiance, "Irradiance calculator")?.multipass_draw(cubemap)?;
            borrow(&self.prefiltered, "Prefiltered env map calculator")?.multipass_draw(cubemap)?;
        }
        self.has_environment = true;

        crate::engine_info!(
            "fennec3d::DeferredRenderer",
            "Loaded {}x{} skybox",
            equirect.width(),
            equirect.height()
        );
        Ok(())
    }

    // ===== FRAME =====

    /// Render one frame of `model` to the screen
    pub fn render_frame(&self, options: &RenderOptions, model: &dyn Drawable) -> Result<()> {
        self.apply_options(options)?;

        if options.shadow_mapping {
            self.shadow_pass(model)?;
        }
        self.geometry_pass(options, model)?;

        if options.g_buffer_vis != GBufferVis::Disabled {
            // Lights were not pushed, so their change flags stay set
            return self.g_buffer_vis_pass(options.g_buffer_vis);
        }

        if options.ssao {
            self.ssao_pass()?;
        }
        self.lighting_pass(options)?;
        self.forward_pass(options, model)?;
        if options.bloom {
            let _group = DebugGroup::new(&*self.device, "Bloom pass");
            borrow(&self.bloom_pass, "Bloom pass")?.multipass_draw(&self.main_fb)?;
        }
        self.tonemap_pass(options)?;
        self.present(options)?;

        borrow_mut(&self.lights, "Light registry")?.reset_change_detection();
        Ok(())
    }

    /// Copy per-frame tunables into the passes that own them
    fn apply_options(&self, options: &RenderOptions) -> Result<()> {
        let directional = borrow(&self.lights, "Light registry")?
            .lights()
            .find(|(_, light)| light.light_type() == LightType::Directional)
            .and_then(|(_, light)| light.direction());

        {
            let mut shadow_camera = borrow_mut(&self.shadow_camera, "Shadow camera")?;
            if let Some(direction) = directional {
                shadow_camera.set_light_direction(direction);
            }
            shadow_camera.set_cuboid_extents(options.shadow_camera_cuboid_extents);
            shadow_camera.set_near(options.shadow_camera_near);
            shadow_camera.set_far(options.shadow_camera_far);
            shadow_camera.set_distance_from_origin(options.shadow_camera_distance);
        }
        {
            let mut kernel = borrow_mut(&self.ssao_kernel, "SSAO kernel")?;
            kernel.set_radius(options.ssao_radius);
            kernel.set_bias(options.ssao_bias);
        }
        borrow_mut(&self.bloom_pass, "Bloom pass")?.set_filter_radius(options.bloom_filter_radius);
        Ok(())
    }

    fn shadow_pass(&self, model: &dyn Drawable) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "Directional shadow map");
        self.shadow_map.activate()?;
        self.shadow_map.clear();
        self.shadow_shader.update_uniforms()?;
        model.draw(&self.shadow_shader, None)?;
        self.shadow_map.deactivate()
    }

    fn geometry_pass(&self, options: &RenderOptions, model: &dyn Drawable) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "Geometry pass");
        let g_buffer = borrow(&self.g_buffer, "G-buffer")?;
        g_buffer.activate()?;
        g_buffer.clear();

        self.geometry_shader.update_uniforms()?;
        if options.wireframe {
            self.device.set_wireframe(true);
        }
        model.draw(&self.geometry_shader, None)?;
        if options.wireframe {
            self.device.set_wireframe(false);
        }

        g_buffer.deactivate()
    }

    fn g_buffer_vis_pass(&self, vis: GBufferVis) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "G-Buffer vis");
        let g_buffer = borrow(&self.g_buffer, "G-buffer")?;
        let texture = match vis {
            GBufferVis::Positions | GBufferVis::AmbientOcclusion => g_buffer.position_ao_texture()?,
            GBufferVis::Normals | GBufferVis::Roughness => g_buffer.normal_roughness_texture()?,
            GBufferVis::Albedo | GBufferVis::Metallic => g_buffer.albedo_metallic_texture()?,
            GBufferVis::Emission => g_buffer.emission_texture()?,
            GBufferVis::Disabled => return Ok(()),
        };

        self.set_screen_viewport();
        self.g_buffer_vis_shader.set_int("gBufferVis", vis.code());
        draw_screen_quad(&self.g_buffer_vis_shader, Some(texture), None)
    }

    fn ssao_pass(&self) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "SSAO pass");

        self.ssao_buffer.activate()?;
        self.ssao_buffer.clear();
        self.ssao_shader.update_uniforms()?;
        draw_screen_quad(&self.ssao_shader, None, None)?;
        self.ssao_buffer.deactivate()?;

        let blurred = borrow(&self.ssao_blurred_buffer, "SSAO buffer")?;
        blurred.activate()?;
        blurred.clear();
        let kernel = borrow(&self.ssao_kernel, "SSAO kernel")?;
        self.ssao_blur_shader.configure_with(&kernel, &self.ssao_buffer)?;
        draw_screen_quad(&self.ssao_blur_shader, None, None)?;
        blurred.deactivate()
    }

    fn lighting_pass(&self, options: &RenderOptions) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "Deferred lighting pass");
        self.main_fb.activate()?;
        self.main_fb.clear();

        let shader = &self.lighting_shader;
        shader.update_uniforms()?;
        shader.set_bool("shadowMapping", options.shadow_mapping);
        shader.set_float("shadowBiasMin", options.shadow_bias_min);
        shader.set_float("shadowBiasMax", options.shadow_bias_max);
        shader.set_bool("useIBL", options.use_ibl && self.has_environment);
        shader.set_bool("ssao", options.ssao);
        shader.set_int("lightingModel", options.lighting_model.code());
        shader.set_vec3("ambient", options.ambient_color);
        shader.set_float("shininess", options.shininess);
        shader.set_float("emissionIntensity", options.emission_intensity);
        shader.set_float("emissionAttenuation.constant", options.emission_attenuation.x);
        shader.set_float("emissionAttenuation.linear", options.emission_attenuation.y);
        shader.set_float("emissionAttenuation.quadratic", options.emission_attenuation.z);

        draw_screen_quad(shader, None, None)?;
        self.main_fb.deactivate()
    }

    fn forward_pass(&self, options: &RenderOptions, model: &dyn Drawable) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "Forward pass");

        // Forward geometry is depth tested against the deferred scene
        borrow(&self.g_buffer, "G-buffer")?.blit(&self.main_fb, BufferBits::DEPTH)?;
        self.main_fb.activate()?;

        if options.draw_normals {
            self.normal_shader.update_uniforms()?;
            model.draw(&self.normal_shader, None)?;
        }

        self.lamp_shader.update_uniforms()?;
        for (_, light) in borrow(&self.lights, "Light registry")?.lights() {
            let scale = match light.light_type() {
                LightType::Point => POINT_LAMP_SCALE,
                LightType::Spot => SPOT_LAMP_SCALE,
                LightType::Directional => continue,
            };
            let Some(position) = light.position() else {
                continue;
            };
            let transform = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale));
            self.lamp_shader.set_light_color(light.diffuse());
            self.lamp_mesh.draw_with_transform(transform, &self.lamp_shader, None)?;
        }

        if self.has_environment {
            self.skybox_shader.update_uniforms()?;
            self.equirect_converter.cubemap()?.bind(0)?;
            self.skybox_shader.set_sampler(SKYBOX_SAMPLER, 0);
            draw_builtin(&self.skybox_shader, BuiltinMesh::Room)?;
        }

        self.main_fb.deactivate()
    }

    fn tonemap_pass(&self, options: &RenderOptions) -> Result<()> {
        let _group = DebugGroup::new(&*self.device, "Tonemap & gamma");
        self.final_fb.activate()?;
        self.final_fb.clear();

        let shader = &self.postprocess_shader;
        shader.update_uniforms()?;
        shader.set_bool("bloom", options.bloom);
        shader.set_float("bloomMix", options.bloom_mix);
        shader.set_int("toneMapping", options.tone_mapping.code());
        shader.set_bool("gammaCorrect", options.gamma_correct);
        shader.set_float("gamma", options.gamma);

        let main_color = self.main_fb.texture(BufferType::ColorHdrAlpha)?;
        let mut registry = borrow_mut(&self.postprocess_registry, "Post-process registry")?;
        draw_screen_quad(shader, Some(main_color), Some(&mut *registry))?;

        self.final_fb.deactivate()
    }

    fn present(&self, options: &RenderOptions) -> Result<()> {
        self.set_screen_viewport();
        if options.fxaa {
            let _group = DebugGroup::new(&*self.device, "FXAA");
            let final_color = self.final_fb.texture(BufferType::ColorAlpha)?;
            draw_screen_quad(&self.fxaa_shader, Some(final_color), None)
        } else {
            self.final_fb.blit_to_default(BufferBits::COLOR)
        }
    }

    fn set_screen_viewport(&self) {
        self.device.set_viewport(Viewport::full(self.size.width, self.size.height));
    }
}

impl std::fmt::Debug for DeferredRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredRenderer")
            .field("size", &self.size)
            .field("main_fb", &self.main_fb)
            .field("final_fb", &self.final_fb)
            .field("has_environment", &self.has_environment)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// HDR color plus a depth-stencil renderbuffer for the forward pass
fn build_main_framebuffer(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Framebuffer> {
    let mut framebuffer = Framebuffer::new(device, size)?;
    framebuffer.attach_texture(BufferType::ColorHdrAlpha)?;
    framebuffer.attach_renderbuffer(BufferType::DepthAndStencil)?;
    Ok(framebuffer)
}

/// Tone-mapped LDR color, the FXAA input
fn build_final_framebuffer(device: &Rc<dyn GraphicsDevice>, size: ImageSize) -> Result<Framebuffer> {
    let mut framebuffer = Framebuffer::new(device, size)?;
    framebuffer.attach_texture(BufferType::ColorAlpha)?;
    Ok(framebuffer)
}

fn borrow<'a, T>(cell: &'a RefCell<T>, what: &str) -> Result<Ref<'a, T>> {
    cell.try_borrow().map_err(|_| {
        crate::engine_err!(InvalidState, "fennec3d::DeferredRenderer", "{} is mutably borrowed", what)
    })
}

fn borrow_mut<'a, T>(cell: &'a RefCell<T>, what: &str) -> Result<RefMut<'a, T>> {
    cell.try_borrow_mut().map_err(|_| {
        crate::engine_err!(InvalidState, "fennec3d::DeferredRenderer", "{} is already borrowed", what)
    })
}

#[cfg(test)]
#[path = "deferred_renderer_tests.rs"]
mod tests;
