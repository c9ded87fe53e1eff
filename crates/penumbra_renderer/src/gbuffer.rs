//! Geometry-pass render targets.

use crate::texture::TextureHelper;

pub const GBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub struct GBufferTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// World position, world normal and albedo + specular, plus the depth they
/// were tested against. Position alpha is 1 wherever geometry was written.
pub struct GBuffer {
    pub position: GBufferTarget,
    pub normal: GBufferTarget,
    pub albedo: GBufferTarget,
    pub depth: GBufferTarget,
    width: u32,
    height: u32,
}

impl GBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let target = |label: &str| {
            let (texture, view) =
                TextureHelper::create_render_target(device, width, height, GBUFFER_FORMAT, label);
            GBufferTarget { texture, view }
        };

        let position = target("GBuffer Position");
        let normal = target("GBuffer Normal");
        let albedo = target("GBuffer Albedo");
        let (texture, view) =
            TextureHelper::create_depth_texture(device, width, height, "GBuffer Depth");

        log::debug!("Created {width}x{height} G-buffer");

        Self {
            position,
            normal,
            albedo,
            depth: GBufferTarget { texture, view },
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The three colour targets in shader binding order.
    pub fn colour_views(&self) -> [&wgpu::TextureView; 3] {
        [&self.position.view, &self.normal.view, &self.albedo.view]
    }
}
