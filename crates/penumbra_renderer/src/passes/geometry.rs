use penumbra_core::{camera::Camera, time::FrameContext};
use wgpu::util::DeviceExt;

use crate::{
    dynamic_uniforms::DynamicUniformBuffer,
    gbuffer::GBuffer,
    mesh::{Model, ModelUniform},
    programs::{
        GeometryProgram, GpuProgram, GpuProgramRenderContext, PreparedDraw,
        geometry_program::{CameraUniform, GeometryDrawData},
    },
};

pub struct GeometryRenderer {
    program: GeometryProgram,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    models: DynamicUniformBuffer<ModelUniform>,
}

impl GeometryRenderer {
    pub fn new(ctx: &GpuProgramRenderContext) -> Self {
        let program = GeometryProgram::new(ctx, &());

        let camera_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Geometry Camera Buffer"),
                contents: bytemuck::bytes_of(&CameraUniform {
                    view: [[0.0; 4]; 4],
                    projection: [[0.0; 4]; 4],
                }),
                // COPY_DST allows us to write to it every frame
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Camera Bind Group"),
            layout: &program.camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let models = DynamicUniformBuffer::new(ctx.device, &program.model_layout, "Geometry Model Uniforms");

        log::info!("Geometry renderer ready");

        Self {
            program,
            camera_buffer,
            camera_bind_group,
            models,
        }
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.program.material_layout
    }

    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        gbuffer: &GBuffer,
        items: &[(&Model, ModelUniform)],
        camera: &Camera,
        frame: &FrameContext,
    ) {
        // 1. Camera once per pass
        let camera_uniform = CameraUniform {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix(frame.aspect_ratio()).to_cols_array_2d(),
        };
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

        // 2. One model slot per item
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
            label: Some("Geometry Encoder"),
        });

        {
            let [position, normal, albedo] = gbuffer.colour_views();

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Geometry Pass"),
                color_attachments: &[cleared(position), cleared(normal), cleared(albedo)],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gbuffer.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0), // Clear to "Far" (1.0)
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            self.program.record(
                &mut rpass,
                GeometryDrawData {
                    camera: &self.camera_bind_group,
                    models: self.models.bind_group(),
                    draws: &draws,
                },
            );
        }

        queue.submit(std::iter::once(encoder.finish()));
        log::debug!("Geometry pass: {} draws", draws.len());
    }
}

fn cleared(view: &wgpu::TextureView) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        depth_slice: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        },
    })
}
