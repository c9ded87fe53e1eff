use wgpu::{Device, Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages};

use crate::error::RenderError;

/// Raw RGBA8 pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    pub fn white() -> Self {
        Self::solid([255, 255, 255, 255])
    }

    /// Two-colour checkerboard of `cells x cells` squares, `cell_size` texels each.
    pub fn checker(cells: u32, cell_size: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = cells * cell_size;
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let even = ((x / cell_size.max(1)) + (y / cell_size.max(1))) % 2 == 0;
                pixels.extend_from_slice(if even { &a } else { &b });
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let expected = self.width as usize * self.height as usize * 4;
        if self.width == 0 || self.height == 0 || self.pixels.len() != expected {
            return Err(RenderError::InvalidAsset(format!(
                "texture {}x{} needs {} bytes, got {}",
                self.width,
                self.height,
                expected,
                self.pixels.len()
            )));
        }
        Ok(())
    }
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    pub fn from_data(
        device: &Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> Result<Self, RenderError> {
        data.validate()?;

        let size = Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

pub struct TextureHelper;

impl TextureHelper {
    pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float; // Standard depth format

    pub fn create_depth_texture(
        device: &Device,
        width: u32,
        height: u32,
        label: &str,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        Self::create_render_target(device, width, height, Self::DEPTH_FORMAT, label)
    }

    /// A texture that can be rendered to and then sampled by a later pass.
    pub fn create_render_target(
        device: &Device,
        width: u32,
        height: u32,
        format: TextureFormat,
        label: &str,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let size = Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let desc = TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_alternates_cells() {
        let tex = TextureData::checker(2, 1, [0; 4], [255; 4]);
        assert_eq!((tex.width, tex.height), (2, 2));
        assert_eq!(&tex.pixels[0..4], &[0; 4]);
        assert_eq!(&tex.pixels[4..8], &[255; 4]);
        assert!(tex.validate().is_ok());
    }

    #[test]
    fn short_pixel_buffer_is_rejected() {
        let tex = TextureData {
            width: 2,
            height: 2,
            pixels: vec![0; 12],
        };
        assert!(matches!(tex.validate(), Err(RenderError::InvalidAsset(_))));
    }
}
