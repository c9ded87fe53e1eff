//! Byte-exact light records shared with `lighting_pass.wgsl`.
//!
//! Each buffer is a 16-byte header holding the live count followed by
//! [`MAX_LIGHTS_PER_KIND`] fixed slots. Every field is a `vec4` (or a
//! column-major `mat4x4`) so the Rust and WGSL layouts agree without any
//! implicit padding. Slots past `count` are zeroed and never read.

use bytemuck::{Pod, Zeroable};
use penumbra_core::{
    atlas::ShadowRect,
    light::{Attenuation, Light, LightKind, light_direction},
};

use crate::error::RenderError;

pub const MAX_LIGHTS_PER_KIND: usize = 64;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LightsHeader {
    pub count: u32,
    pub _pad: [u32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 4],
    pub colour: [f32; 4],
    /// intensity, constant, linear, exponent
    pub params: [f32; 4],
    pub front_rect: [f32; 4],
    pub back_rect: [f32; 4],
    /// x = shadow far plane
    pub far: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuSpotLight {
    pub position: [f32; 4],
    pub colour: [f32; 4],
    pub params: [f32; 4],
    pub shadow_rect: [f32; 4],
    pub cone_direction: [f32; 4],
    pub view_projection: [[f32; 4]; 4],
    /// x = cosine of the half-angle
    pub cutoff: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    pub direction: [f32; 4],
    pub colour: [f32; 4],
    pub intensity: [f32; 4],
    pub shadow_rect: [f32; 4],
    pub view_projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct PointLightBuffer {
    pub header: LightsHeader,
    pub lights: [GpuPointLight; MAX_LIGHTS_PER_KIND],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct SpotLightBuffer {
    pub header: LightsHeader,
    pub lights: [GpuSpotLight; MAX_LIGHTS_PER_KIND],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct DirectionalLightBuffer {
    pub header: LightsHeader,
    pub lights: [GpuDirectionalLight; MAX_LIGHTS_PER_KIND],
}

const _: () = assert!(size_of::<LightsHeader>() == 16);
const _: () = assert!(size_of::<GpuPointLight>() == 96);
const _: () = assert!(size_of::<GpuSpotLight>() == 160);
const _: () = assert!(size_of::<GpuDirectionalLight>() == 128);
const _: () = assert!(size_of::<PointLightBuffer>() == 6160);
const _: () = assert!(size_of::<SpotLightBuffer>() == 10256);
const _: () = assert!(size_of::<DirectionalLightBuffer>() == 8208);

fn rect(rect: Option<ShadowRect>) -> [f32; 4] {
    rect.unwrap_or(ShadowRect::NONE).to_array()
}

fn params(intensity: f32, att: &Attenuation) -> [f32; 4] {
    [intensity, att.constant, att.linear, att.exponent]
}

/// All three buffers for one frame.
#[derive(Clone, Copy, Zeroable)]
pub struct PackedLights {
    pub point: PointLightBuffer,
    pub spot: SpotLightBuffer,
    pub directional: DirectionalLightBuffer,
}

impl PackedLights {
    /// Snapshots `lights` into their per-kind buffers, in slice order.
    /// Lights beyond a kind's slot count are dropped with a warning.
    pub fn pack(lights: &[Light]) -> Self {
        let mut packed = Self::zeroed();

        for light in lights {
            // w of position and colour is an unused lane, left at 0.
            let colour = light.colour.extend(0.0).to_array();
            let shadowed = light.casts_shadows;

            match &light.kind {
                LightKind::Point(point) => {
                    let Some(slot) = next_slot(&mut packed.point.header, "point") else {
                        continue;
                    };
                    let rects = point.shadow_rects().filter(|_| shadowed);
                    packed.point.lights[slot] = GpuPointLight {
                        position: point.position.extend(0.0).to_array(),
                        colour,
                        params: params(light.intensity, &point.attenuation),
                        front_rect: rect(rects.map(|r| r.front)),
                        back_rect: rect(rects.map(|r| r.back)),
                        far: [point.attenuation.shadow_far_plane(), 0.0, 0.0, 0.0],
                    };
                }
                LightKind::Spot(spot) => {
                    let Some(slot) = next_slot(&mut packed.spot.header, "spot") else {
                        continue;
                    };
                    packed.spot.lights[slot] = GpuSpotLight {
                        position: spot.position.extend(0.0).to_array(),
                        colour,
                        params: params(light.intensity, &spot.attenuation),
                        shadow_rect: rect(spot.shadow_rect().filter(|_| shadowed)),
                        cone_direction: light_direction(spot.cone_direction).extend(0.0).to_array(),
                        view_projection: spot.view_projection().to_cols_array_2d(),
                        cutoff: [spot.cutoff, 0.0, 0.0, 0.0],
                    };
                }
                LightKind::Directional(dir) => {
                    let Some(slot) = next_slot(&mut packed.directional.header, "directional") else {
                        continue;
                    };
                    packed.directional.lights[slot] = GpuDirectionalLight {
                        direction: light_direction(dir.direction).extend(0.0).to_array(),
                        colour,
                        intensity: [light.intensity, 0.0, 0.0, 0.0],
                        shadow_rect: rect(dir.shadow_rect().filter(|_| shadowed)),
                        view_projection: dir.view_projection().to_cols_array_2d(),
                    };
                }
            }
        }

        packed
    }

    pub fn counts(&self) -> [u32; 3] {
        [
            self.point.header.count,
            self.spot.header.count,
            self.directional.header.count,
        ]
    }
}

fn next_slot(header: &mut LightsHeader, kind: &str) -> Option<usize> {
    let slot = header.count as usize;
    if slot >= MAX_LIGHTS_PER_KIND {
        log::warn!("Dropping {kind} light: all {MAX_LIGHTS_PER_KIND} slots are packed");
        return None;
    }
    header.count += 1;
    Some(slot)
}

/// Rejects a buffer whose size breaks the 16-byte uniform stride.
pub fn validate_layout<T>(name: &'static str) -> Result<(), RenderError> {
    let size = size_of::<T>();
    if size == 0 || size % 16 != 0 {
        return Err(RenderError::BufferLayout { name, size });
    }
    Ok(())
}

/// The three uniform buffers the lighting pass reads.
pub struct LightBuffers {
    pub point: wgpu::Buffer,
    pub spot: wgpu::Buffer,
    pub directional: wgpu::Buffer,
}

impl LightBuffers {
    pub fn new(device: &wgpu::Device) -> Result<Self, RenderError> {
        validate_layout::<PointLightBuffer>("point lights")?;
        validate_layout::<SpotLightBuffer>("spot lights")?;
        validate_layout::<DirectionalLightBuffer>("directional lights")?;

        let buffer = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        Ok(Self {
            point: buffer("Point Light Buffer", size_of::<PointLightBuffer>()),
            spot: buffer("Spot Light Buffer", size_of::<SpotLightBuffer>()),
            directional: buffer("Directional Light Buffer", size_of::<DirectionalLightBuffer>()),
        })
    }

    pub fn write(&self, queue: &wgpu::Queue, packed: &PackedLights) {
        queue.write_buffer(&self.point, 0, bytemuck::bytes_of(&packed.point));
        queue.write_buffer(&self.spot, 0, bytemuck::bytes_of(&packed.spot));
        queue.write_buffer(&self.directional, 0, bytemuck::bytes_of(&packed.directional));
    }
}
