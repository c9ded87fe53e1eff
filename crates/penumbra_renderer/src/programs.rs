pub mod geometry_program;
pub mod lighting_program;
pub mod shadow_program;

pub use geometry_program::GeometryProgram;
pub use lighting_program::LightingProgram;
pub use shadow_program::ShadowProgram;

use crate::mesh::Model;

/// Holds common WGPU references to simplify function signatures.
pub struct GpuProgramRenderContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub format: wgpu::TextureFormat, // The output format (Swapchain)
}

pub trait GpuProgram {
    /// Data required to initialize the pipeline (e.g., shared layouts)
    type InitData;

    /// Data required to draw a frame (e.g., bind groups, list of draws)
    type DrawData<'a>
    where
        Self: 'a;

    /// 1. INIT: Compiles shaders, creates pipeline layouts and the pipeline itself.
    fn new(ctx: &GpuProgramRenderContext, init_data: &Self::InitData) -> Self;

    /// 2. RECORD: Encodes commands into the RenderPass.
    fn record<'a>(&'a self, rpass: &mut wgpu::RenderPass<'_>, data: Self::DrawData<'a>);
}

/// A resolved render item: the model to draw and the dynamic offset of its
/// per-draw uniform.
#[derive(Clone, Copy)]
pub struct PreparedDraw<'a> {
    pub model: &'a Model,
    pub offset: u32,
}

impl PreparedDraw<'_> {
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        let mesh = &self.model.mesh;
        rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

/// Layout shared by every bind group that only holds one uniform buffer.
pub fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    dynamic: Option<u64>,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic.is_some(),
                min_binding_size: dynamic.and_then(wgpu::BufferSize::new),
            },
            count: None,
        }],
    })
}
