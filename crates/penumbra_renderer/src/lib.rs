use std::sync::Arc;

use glam::{Mat4, Vec3};
use penumbra_core::{
    assets::{Assets, Handle},
    camera::Camera,
    config::{DebugView, RendererConfig},
    light::Light,
    time::FrameContext,
};
use winit::window::Window;

pub mod context;
pub mod dynamic_uniforms;
pub mod error;
pub mod frame;
pub mod gbuffer;
pub mod light_buffers;
pub mod material;
pub mod mesh;
pub mod passes;
pub mod programs;
pub mod screen_quad;
pub mod shadow_atlas;
pub mod shadow_plan;
pub mod texture;

pub use context::RenderContext;
pub use error::RenderError;
pub use frame::{FrameSequencer, Pass};
pub use material::Material;
pub use mesh::{MeshData, Model, Vertex};
pub use shadow_atlas::ShadowAtlas;
pub use texture::TextureData;

use crate::{
    gbuffer::GBuffer,
    material::GpuMaterial,
    mesh::GpuMesh,
    passes::{GeometryRenderer, LightingRenderer, ShadowRenderer, lighting::LightingSettings, resolve_items},
    programs::GpuProgramRenderContext,
    texture::GpuTexture,
};

/// One draw: world transform plus the shared model it instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderItem {
    pub transform: Mat4,
    pub model: Handle<Model>,
}

/// Deferred pipeline: geometry into the G-buffer, lights into the shadow
/// atlas, then one lighting resolve onto the surface.
pub struct DeferredRenderer {
    context: RenderContext,
    sequencer: FrameSequencer,
    gbuffer: GBuffer,
    atlas: ShadowAtlas,
    models: Assets<Model>,
    default_texture: GpuTexture,
    settings: LightingSettings,

    geometry: GeometryRenderer,
    shadows: ShadowRenderer,
    lighting: LightingRenderer,
}

impl DeferredRenderer {
    pub fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self, RenderError> {
        config
            .validate()
            .map_err(|e| RenderError::Config(e.to_string()))?;

        let context = RenderContext::new(window, config.window.vsync)?;
        let (width, height) = context.size();

        let atlas = ShadowAtlas::new(&context.device, &config.shadows)?;
        let gbuffer = GBuffer::new(&context.device, width, height);

        // --- CREATE DEFAULT TEXTURE (1x1 White Pixel) ---
        // Materials without a texture sample this
        let default_texture = GpuTexture::from_data(
            &context.device,
            &context.queue,
            &TextureData::white(),
            "Default White Texture",
        )?;

        let program_context = GpuProgramRenderContext {
            device: &context.device,
            queue: &context.queue,
            format: context.format(),
        };
        let geometry = GeometryRenderer::new(&program_context);
        let shadows = ShadowRenderer::new(&program_context);
        let lighting = LightingRenderer::new(&program_context, &gbuffer, &atlas)?;

        let lighting_config = &config.lighting;
        let settings = LightingSettings {
            ambient: Vec3::from(lighting_config.ambient),
            clear_colour: Vec3::from(lighting_config.clear_colour),
            debug_view: lighting_config.debug_view,
        };

        log::info!(">>> Penumbra Renderer: Pipelines Compiled ({width}x{height}) <<<");

        Ok(Self {
            context,
            sequencer: FrameSequencer::default(),
            gbuffer,
            atlas,
            models: Assets::default(),
            default_texture,
            settings,
            geometry,
            shadows,
            lighting,
        })
    }

    /// Uploads a mesh and its material and returns the handle render items use.
    pub fn create_model(&mut self, mesh: &MeshData, material: &Material) -> Result<Handle<Model>, RenderError> {
        mesh.validate()?;

        let device = &self.context.device;
        let texture = material
            .diffuse
            .as_ref()
            .map(|data| GpuTexture::from_data(device, &self.context.queue, data, "Material Diffuse"))
            .transpose()?;

        let model = Model {
            mesh: GpuMesh::new(device, mesh),
            material: GpuMaterial::new(
                device,
                self.geometry.material_layout(),
                material,
                texture,
                &self.default_texture,
            ),
        };

        let handle = self.models.add(model);
        log::debug!("Created model {} ({} indices)", handle.id, mesh.indices.len());
        Ok(handle)
    }

    /// The atlas lights take their tiles from.
    pub fn shadow_atlas_mut(&mut self) -> &mut ShadowAtlas {
        &mut self.atlas
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn frame_context(&self, delta_seconds: f32) -> FrameContext {
        let (width, height) = self.context.size();
        FrameContext {
            width,
            height,
            delta_seconds,
        }
    }

    pub fn debug_view(&self) -> DebugView {
        self.settings.debug_view
    }

    pub fn set_debug_view(&mut self, view: DebugView) {
        log::info!("Debug view: {view:?}");
        self.settings.debug_view = view;
    }

    pub fn geometry_pass(
        &mut self,
        items: &[RenderItem],
        camera: &Camera,
        frame: &FrameContext,
    ) -> Result<(), RenderError> {
        self.sequencer.begin(Pass::Geometry)?;

        let resolved = resolve_items(items, &self.models);
        self.geometry.render(
            &self.context.device,
            &self.context.queue,
            &self.gbuffer,
            &resolved,
            camera,
            frame,
        );
        Ok(())
    }

    pub fn shadow_pass(&mut self, items: &[RenderItem], lights: &[Light]) -> Result<(), RenderError> {
        self.sequencer.begin(Pass::Shadow)?;

        let resolved = resolve_items(items, &self.models);
        self.shadows.render(
            &self.context.device,
            &self.context.queue,
            &self.atlas,
            &resolved,
            lights,
        );
        Ok(())
    }

    pub fn lighting_pass(
        &mut self,
        target: &wgpu::TextureView,
        lights: &[Light],
        camera: &Camera,
    ) -> Result<(), RenderError> {
        self.sequencer.begin(Pass::Lighting)?;

        self.lighting.render(
            &self.context.device,
            &self.context.queue,
            target,
            lights,
            camera,
            &self.settings,
        );
        Ok(())
    }

    /// Acquires the next surface texture. Lost/outdated surfaces are
    /// reconfigured here; the caller skips the frame on any error.
    pub fn acquire_frame(&mut self) -> Result<wgpu::SurfaceTexture, RenderError> {
        match self.context.acquire() {
            Ok(frame) => Ok(frame),
            Err(RenderError::Surface(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated))) => {
                log::warn!("Surface {err:?}, reconfiguring");
                self.context.reconfigure();
                self.sequencer.abandon();
                Err(RenderError::Surface(err))
            }
            Err(err) => {
                self.sequencer.abandon();
                Err(err)
            }
        }
    }

    /// Drops a frame that will not reach the lighting pass.
    pub fn abandon_frame(&mut self) {
        self.sequencer.abandon();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.context.resize(width, height) {
            return;
        }
        self.gbuffer = GBuffer::new(&self.context.device, width, height);
        self.lighting
            .rebind(&self.context.device, &self.gbuffer, &self.atlas);
        log::info!("Resized to {width}x{height}");
    }

    pub fn completed_frames(&self) -> u64 {
        self.sequencer.completed_frames()
    }

    pub fn shutdown(self) {
        log::info!(
            ">>> Penumbra Renderer: Shutting down after {} frames, {} models <<<",
            self.sequencer.completed_frames(),
            self.models.len()
        );
    }
}
