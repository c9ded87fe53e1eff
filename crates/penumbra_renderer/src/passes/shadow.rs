use penumbra_core::light::Light;

use crate::{
    dynamic_uniforms::DynamicUniformBuffer,
    mesh::{Model, ModelUniform},
    programs::{
        GpuProgram, GpuProgramRenderContext, PreparedDraw, ShadowProgram,
        shadow_program::ShadowDrawData,
    },
    shadow_atlas::ShadowAtlas,
    shadow_plan::{ShadowViewUniform, plan_shadow_views},
};

/// Fills the shadow atlas: one render pass, one depth clear, one viewport per view.
pub struct ShadowRenderer {
    program: ShadowProgram,
    views: DynamicUniformBuffer<ShadowViewUniform>,
    models: DynamicUniformBuffer<ModelUniform>,
}

impl ShadowRenderer {
    pub fn new(ctx: &GpuProgramRenderContext) -> Self {
        let program = ShadowProgram::new(ctx, &());
        let views = DynamicUniformBuffer::new(ctx.device, &program.view_layout, "Shadow View Uniforms");
        let models = DynamicUniformBuffer::new(ctx.device, &program.model_layout, "Shadow Model Uniforms");

        log::info!("Shadow renderer ready");

        Self {
            program,
            views,
            models,
        }
    }

    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        atlas: &ShadowAtlas,
        items: &[(&Model, ModelUniform)],
        lights: &[Light],
    ) {
        // 1. Decide what gets drawn where
        let plan = plan_shadow_views(lights, atlas.atlas_size());

        self.views.clear();
        let view_offsets: Vec<u32> = plan.iter().map(|view| self.views.push(&view.uniform)).collect();
        self.views.upload(device, queue, &self.program.view_layout);

        self.models.clear();
        let draws: Vec<PreparedDraw> = items
            .iter()
            .map(|(model, uniform)| PreparedDraw {
                model: *model,
                offset: self.models.push(uniform),
            })
            .collect();
        self.models.upload(device, queue, &self.program.model_layout);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Shadow Encoder"),
        });

        // 2. Whole atlas cleared once; tiles without a view stay at 1.0 (lit)
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &atlas.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            self.program.record(
                &mut rpass,
                ShadowDrawData {
                    views: &plan,
                    view_offsets: &view_offsets,
                    view_bind_group: self.views.bind_group(),
                    model_bind_group: self.models.bind_group(),
                    draws: &draws,
                },
            );
        }

        // Viewport and scissor die with the pass; later passes start from the full target.
        queue.submit(std::iter::once(encoder.finish()));
        log::debug!("Shadow pass: {} views x {} draws", plan.len(), draws.len());
    }
}
