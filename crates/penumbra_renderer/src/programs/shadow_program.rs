use penumbra_core::light::Hemisphere;
use wgpu::RenderPipeline;

use crate::{
    mesh::{ModelUniform, Vertex},
    programs::{GpuProgram, GpuProgramRenderContext, PreparedDraw, uniform_layout},
    shadow_plan::{ShadowMode, ShadowView, ShadowViewUniform},
    texture::TextureHelper,
};

pub struct ShadowDrawData<'a> {
    pub views: &'a [ShadowView],
    /// Dynamic offset of each view's uniform, parallel to `views`.
    pub view_offsets: &'a [u32],
    pub view_bind_group: &'a wgpu::BindGroup,
    pub model_bind_group: &'a wgpu::BindGroup,
    pub draws: &'a [PreparedDraw<'a>],
}

/// Depth-only pipelines for every shadow view kind.
pub struct ShadowProgram {
    projected: RenderPipeline,
    paraboloid_front: RenderPipeline,
    paraboloid_back: RenderPipeline,
    pub view_layout: wgpu::BindGroupLayout,
    pub model_layout: wgpu::BindGroupLayout,
}

impl ShadowProgram {
    pub fn pipeline_for(&self, mode: ShadowMode) -> &RenderPipeline {
        match mode {
            ShadowMode::Projected => &self.projected,
            ShadowMode::Paraboloid(Hemisphere::Front) => &self.paraboloid_front,
            ShadowMode::Paraboloid(Hemisphere::Back) => &self.paraboloid_back,
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_entry: &str,
    fragment_entry: Option<&str>,
    cull_mode: wgpu::Face,
) -> RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vertex_entry),
            compilation_options: Default::default(),
            buffers: &[Vertex::desc()],
        },
        fragment: fragment_entry.map(|entry| wgpu::FragmentState {
            module: shader,
            entry_point: Some(entry),
            compilation_options: Default::default(),
            targets: &[],
        }),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: TextureHelper::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(cull_mode),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

impl GpuProgram for ShadowProgram {
    type InitData = ();
    type DrawData<'a> = ShadowDrawData<'a>;

    fn new(ctx: &GpuProgramRenderContext, _: &Self::InitData) -> Self {
        let shader = ctx
            .device
            .create_shader_module(wgpu::include_wgsl!("../shaders/shadow_pass.wgsl"));

        let view_layout = uniform_layout(
            ctx.device,
            "Shadow View Layout",
            wgpu::ShaderStages::VERTEX,
            Some(size_of::<ShadowViewUniform>() as u64),
        );
        let model_layout = uniform_layout(
            ctx.device,
            "Shadow Model Layout",
            wgpu::ShaderStages::VERTEX,
            Some(size_of::<ModelUniform>() as u64),
        );

        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&view_layout, &model_layout],
                push_constant_ranges: &[],
            });

        let projected = create_pipeline(
            ctx.device,
            "Shadow Projected Pipeline",
            &layout,
            &shader,
            "vs_projected",
            None,
            wgpu::Face::Back,
        );
        let paraboloid_front = create_pipeline(
            ctx.device,
            "Shadow Paraboloid Front Pipeline",
            &layout,
            &shader,
            "vs_paraboloid",
            Some("fs_paraboloid"),
            wgpu::Face::Back,
        );
        let paraboloid_back = create_pipeline(
            ctx.device,
            "Shadow Paraboloid Back Pipeline",
            &layout,
            &shader,
            "vs_paraboloid",
            Some("fs_paraboloid"),
            wgpu::Face::Front,
        );

        Self {
            projected,
            paraboloid_front,
            paraboloid_back,
            view_layout,
            model_layout,
        }
    }

    fn record<'a>(&'a self, rpass: &mut wgpu::RenderPass<'_>, data: Self::DrawData<'a>) {
        for (view, &offset) in data.views.iter().zip(data.view_offsets) {
            let vp = view.viewport;
            if vp.width == 0 || vp.height == 0 {
                continue;
            }

            // 1. Confine drawing to this light's tile
            rpass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.width as f32,
                vp.height as f32,
                0.0,
                1.0,
            );
            rpass.set_scissor_rect(vp.x, vp.y, vp.width, vp.height);

            // 2. Pipeline carries the cull face for this view
            rpass.set_pipeline(self.pipeline_for(view.mode));
            rpass.set_bind_group(0, data.view_bind_group, &[offset]);

            // 3. Every item casts into every view
            for draw in data.draws {
                rpass.set_bind_group(1, data.model_bind_group, &[draw.offset]);
                draw.draw(rpass);
            }
        }
    }
}
