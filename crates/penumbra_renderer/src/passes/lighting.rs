use glam::Vec3;
use penumbra_core::{camera::Camera, config::DebugView, light::Light};
use wgpu::util::DeviceExt;

use crate::{
    error::RenderError,
    gbuffer::GBuffer,
    light_buffers::{LightBuffers, PackedLights},
    programs::{
        GpuProgram, GpuProgramRenderContext, LightingProgram,
        lighting_program::{LightingDrawData, LightingParams},
    },
    screen_quad::ScreenQuad,
    shadow_atlas::ShadowAtlas,
};

/// Ambient term, clear colour and debug view applied by the lighting pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSettings {
    pub ambient: Vec3,
    pub clear_colour: Vec3,
    pub debug_view: DebugView,
}

impl LightingSettings {
    pub fn params(&self, camera: &Camera) -> LightingParams {
        LightingParams {
            camera_position: camera.position.extend(1.0).to_array(),
            ambient: self.ambient.extend(1.0).to_array(),
            clear_colour: self.clear_colour.extend(1.0).to_array(),
            options: [self.debug_view.shader_index(), 0, 0, 0],
        }
    }
}

pub struct LightingRenderer {
    program: LightingProgram,
    quad: ScreenQuad,
    params_buffer: wgpu::Buffer,
    light_buffers: LightBuffers,
    light_bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
}

impl LightingRenderer {
    pub fn new(
        ctx: &GpuProgramRenderContext,
        gbuffer: &GBuffer,
        atlas: &ShadowAtlas,
    ) -> Result<Self, RenderError> {
        let program = LightingProgram::new(ctx, &());
        let quad = ScreenQuad::new(ctx.device);
        let light_buffers = LightBuffers::new(ctx.device)?;

        let params_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Params Buffer"),
                contents: bytemuck::bytes_of(&LightingParams {
                    camera_position: [0.0; 4],
                    ambient: [0.0; 4],
                    clear_colour: [0.0; 4],
                    options: [0; 4],
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let light_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Buffer Bind Group"),
            layout: &program.light_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffers.point.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: light_buffers.spot.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: light_buffers.directional.as_entire_binding(),
                },
            ],
        });

        let texture_bind_group = create_texture_bind_group(ctx.device, &program, gbuffer, atlas);

        log::info!("Lighting renderer ready");

        Ok(Self {
            program,
            quad,
            params_buffer,
            light_buffers,
            light_bind_group,
            texture_bind_group,
        })
    }

    /// Rebinds the G-buffer after it was recreated.
    pub fn rebind(&mut self, device: &wgpu::Device, gbuffer: &GBuffer, atlas: &ShadowAtlas) {
        self.texture_bind_group = create_texture_bind_group(device, &self.program, gbuffer, atlas);
    }

    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        lights: &[Light],
        camera: &Camera,
        settings: &LightingSettings,
    ) {
        // 1. Snapshot the lights into their packed buffers
        let packed = PackedLights::pack(lights);
        self.light_buffers.write(queue, &packed);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&settings.params(camera)));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Lighting Encoder"),
        });

        // 2. Exactly one quad, even with no lights (ambient only)
        {
            let clear = settings.clear_colour;
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Lighting Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.x as f64,
                            g: clear.y as f64,
                            b: clear.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.program.record(
                &mut rpass,
                LightingDrawData {
                    textures: &self.texture_bind_group,
                    lights: &self.light_bind_group,
                    quad: &self.quad,
                },
            );
        }

        queue.submit(std::iter::once(encoder.finish()));

        let [point, spot, directional] = packed.counts();
        log::debug!("Lighting pass: {directional} directional, {point} point, {spot} spot");
    }
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    program: &LightingProgram,
    gbuffer: &GBuffer,
    atlas: &ShadowAtlas,
) -> wgpu::BindGroup {
    let [position, normal, albedo] = gbuffer.colour_views();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Lighting Texture Bind Group"),
        layout: &program.texture_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(position),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(normal),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(albedo),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&atlas.view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&atlas.sampler),
            },
        ],
    })
}
