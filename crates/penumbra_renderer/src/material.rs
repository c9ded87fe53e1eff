use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::texture::{GpuTexture, TextureData};

/// CPU-side surface description. `diffuse: None` samples the default white texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse_colour: Vec4,
    /// Its luminance becomes the specular strength stored in the albedo target's alpha.
    pub specular_colour: Vec4,
    pub diffuse: Option<TextureData>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_colour: Vec4::ONE,
            specular_colour: Vec4::new(0.5, 0.5, 0.5, 1.0),
            diffuse: None,
        }
    }
}

impl Material {
    pub fn coloured(colour: Vec4, specular_colour: Vec4) -> Self {
        Self {
            diffuse_colour: colour,
            specular_colour,
            diffuse: None,
        }
    }

    pub fn textured(texture: TextureData, specular_colour: Vec4) -> Self {
        Self {
            specular_colour,
            diffuse: Some(texture),
            ..Default::default()
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuMaterialUniform {
    pub diffuse_colour: [f32; 4],  // 16 bytes
    pub specular_colour: [f32; 4], // 16 bytes (Total: 32 bytes, aligned to 16)
}

impl From<&Material> for GpuMaterialUniform {
    fn from(m: &Material) -> Self {
        Self {
            diffuse_colour: m.diffuse_colour.to_array(),
            specular_colour: m.specular_colour.to_array(),
        }
    }
}

pub struct GpuMaterial {
    pub bind_group: wgpu::BindGroup,
    // Owns the texture when the material brought its own.
    _texture: Option<GpuTexture>,
}

impl GpuMaterial {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        material: &Material,
        texture: Option<GpuTexture>,
        fallback: &GpuTexture,
    ) -> Self {
        // A. Create Uniform Buffer (Settings)
        let uniform = GpuMaterialUniform::from(material);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniforms"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // B. Own texture or the shared white pixel
        let diffuse = texture.as_ref().unwrap_or(fallback);

        // C. Create Bind Group
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
            ],
        });

        Self {
            bind_group,
            _texture: texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<GpuMaterialUniform>(), 32);
        assert_eq!(std::mem::offset_of!(GpuMaterialUniform, specular_colour), 16);
    }

    #[test]
    fn uniform_carries_specular_colour() {
        let material = Material::coloured(
            Vec4::new(0.8, 0.35, 0.2, 1.0),
            Vec4::new(0.9, 0.7, 0.1, 1.0),
        );
        let uniform = GpuMaterialUniform::from(&material);

        assert_eq!(uniform.diffuse_colour, [0.8, 0.35, 0.2, 1.0]);
        assert_eq!(uniform.specular_colour, [0.9, 0.7, 0.1, 1.0]);
    }

    #[test]
    fn default_specular_is_grey() {
        let uniform = GpuMaterialUniform::from(&Material::default());
        assert_eq!(uniform.specular_colour, [0.5, 0.5, 0.5, 1.0]);
    }
}
