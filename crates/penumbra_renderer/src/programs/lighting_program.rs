use wgpu::RenderPipeline;

use crate::{
    programs::{GpuProgram, GpuProgramRenderContext},
    screen_quad::{QuadVertex, ScreenQuad},
};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingParams {
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub clear_colour: [f32; 4],
    /// x = debug view index
    pub options: [u32; 4],
}

pub struct LightingDrawData<'a> {
    pub textures: &'a wgpu::BindGroup, // Group 0: G-buffer + shadow atlas
    pub lights: &'a wgpu::BindGroup,   // Group 1: params + light buffers
    pub quad: &'a ScreenQuad,
}

/// Resolves the G-buffer into the final image with a full-screen quad.
pub struct LightingProgram {
    pipeline: RenderPipeline,
    pub texture_layout: wgpu::BindGroupLayout,
    pub light_layout: wgpu::BindGroupLayout,
}

fn gbuffer_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            // Read with textureLoad, never filtered.
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GpuProgram for LightingProgram {
    type InitData = ();
    type DrawData<'a> = LightingDrawData<'a>;

    fn new(ctx: &GpuProgramRenderContext, _: &Self::InitData) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::include_wgsl!("../shaders/lighting_pass.wgsl"));

        let texture_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Lighting Texture Layout"),
                    entries: &[
                        // --- BINDING 0-2: position, normal, albedo ---
                        gbuffer_entry(0),
                        gbuffer_entry(1),
                        gbuffer_entry(2),
                        // --- BINDING 3: Shadow atlas depth ---
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                multisampled: false,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                sample_type: wgpu::TextureSampleType::Depth,
                            },
                            count: None,
                        },
                        // --- BINDING 4: Comparison sampler ---
                        wgpu::BindGroupLayoutEntry {
                            binding: 4,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                            count: None,
                        },
                    ],
                });

        // params, point, spot, directional
        let light_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lighting Buffer Layout"),
                entries: &[
                    uniform_entry(0),
                    uniform_entry(1),
                    uniform_entry(2),
                    uniform_entry(3),
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Lighting Pipeline Layout"),
                bind_group_layouts: &[&texture_layout, &light_layout],
                push_constant_ranges: &[],
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                cache: None,
                label: Some("Lighting Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[QuadVertex::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                depth_stencil: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        Self {
            pipeline,
            texture_layout,
            light_layout,
        }
    }

    fn record<'a>(&'a self, rpass: &mut wgpu::RenderPass<'_>, data: Self::DrawData<'a>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, data.textures, &[]);
        rpass.set_bind_group(1, data.lights, &[]);
        data.quad.draw(rpass);
    }
}
