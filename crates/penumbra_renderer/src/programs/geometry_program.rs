use wgpu::RenderPipeline;

use crate::{
    gbuffer::GBUFFER_FORMAT,
    mesh::{ModelUniform, Vertex},
    programs::{GpuProgram, GpuProgramRenderContext, PreparedDraw, uniform_layout},
    texture::TextureHelper,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

pub struct GeometryDrawData<'a> {
    pub camera: &'a wgpu::BindGroup,     // Group 0
    pub models: &'a wgpu::BindGroup,     // Group 2, dynamic
    pub draws: &'a [PreparedDraw<'a>],   // Group 1 comes from each model
}

/// Writes world position, normal and albedo into the G-buffer.
pub struct GeometryProgram {
    pipeline: RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
    pub material_layout: wgpu::BindGroupLayout,
    pub model_layout: wgpu::BindGroupLayout,
}

impl GpuProgram for GeometryProgram {
    type InitData = ();
    type DrawData<'a> = GeometryDrawData<'a>;

    fn new(ctx: &GpuProgramRenderContext, _: &Self::InitData) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::include_wgsl!("../shaders/geometry_pass.wgsl"));

        let camera_layout = uniform_layout(
            ctx.device,
            "Geometry Camera Layout",
            wgpu::ShaderStages::VERTEX,
            None,
        );

        let material_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Material Bind Group Layout"),
                    entries: &[
                        // --- BINDING 0: Material Settings (Uniform Buffer) ---
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // --- BINDING 1: Diffuse Texture ---
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                multisampled: false,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            },
                            count: None,
                        },
                        // --- BINDING 2: Sampler ---
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        // --- Model + normal matrix, one slot per draw ---
        let model_layout = uniform_layout(
            ctx.device,
            "Geometry Model Layout",
            wgpu::ShaderStages::VERTEX,
            Some(size_of::<ModelUniform>() as u64),
        );

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Geometry Pipeline Layout"),
                bind_group_layouts: &[&camera_layout, &material_layout, &model_layout],
                push_constant_ranges: &[],
            });

        let target = Some(wgpu::ColorTargetState {
            format: GBUFFER_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                cache: None,
                label: Some("Geometry Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    // position, normal, albedo + specular
                    targets: &[target.clone(), target.clone(), target],
                }),
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: TextureHelper::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less, // Closer pixels win
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });

        Self {
            pipeline,
            camera_layout,
            material_layout,
            model_layout,
        }
    }

    fn record<'a>(&'a self, rpass: &mut wgpu::RenderPass<'_>, data: Self::DrawData<'a>) {
        // 1. Set Pipeline
        rpass.set_pipeline(&self.pipeline);

        // 2. Bind Shared Data (Group 0)
        rpass.set_bind_group(0, data.camera, &[]);

        // 3. Draw Loop
        for draw in data.draws {
            rpass.set_bind_group(1, &draw.model.material.bind_group, &[]);
            rpass.set_bind_group(2, data.models, &[draw.offset]);
            draw.draw(rpass);
        }
    }
}
