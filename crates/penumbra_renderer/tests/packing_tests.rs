//! Light Buffer Packing Tests
//!
//! Tests for:
//! - Byte layout of every record and buffer
//! - Header counts per kind
//! - Zero rects for lights without shadow tiles
//! - Unused lanes and degenerate directions

use std::mem::{offset_of, size_of};

use glam::{Mat4, Vec3};

use penumbra_core::atlas::{AtlasGrid, ShadowRect};
use penumbra_core::light::{Attenuation, Light, MAX_SHADOW_DISTANCE, SpotLight};
use penumbra_renderer::light_buffers::*;

fn point(x: f32) -> Light {
    Light::point(Vec3::ONE, Vec3::new(x, 1.0, 0.0), 2.0, Attenuation::default())
}

fn spot() -> Light {
    Light::spot(
        Vec3::new(1.0, 0.9, 0.8),
        3.0,
        SpotLight::with_half_angle(Vec3::new(0.0, 4.0, 0.0), Attenuation::default(), Vec3::NEG_Y, 30.0),
    )
}

#[test]
fn buffer_sizes_match_shader_layout() {
    assert_eq!(size_of::<PointLightBuffer>(), 6160);
    assert_eq!(size_of::<SpotLightBuffer>(), 10256);
    assert_eq!(size_of::<DirectionalLightBuffer>(), 8208);
    assert_eq!(size_of::<LightsHeader>(), 16);
}

#[test]
fn record_field_offsets() {
    assert_eq!(offset_of!(GpuPointLight, params), 32);
    assert_eq!(offset_of!(GpuPointLight, front_rect), 48);
    assert_eq!(offset_of!(GpuPointLight, back_rect), 64);
    assert_eq!(offset_of!(GpuPointLight, far), 80);

    assert_eq!(offset_of!(GpuSpotLight, cone_direction), 64);
    assert_eq!(offset_of!(GpuSpotLight, view_projection), 80);
    assert_eq!(offset_of!(GpuSpotLight, cutoff), 144);

    assert_eq!(offset_of!(GpuDirectionalLight, shadow_rect), 48);
    assert_eq!(offset_of!(GpuDirectionalLight, view_projection), 64);

    assert_eq!(offset_of!(PointLightBuffer, lights), 16);
    assert_eq!(offset_of!(SpotLightBuffer, lights), 16);
    assert_eq!(offset_of!(DirectionalLightBuffer, lights), 16);
}

#[test]
fn layouts_pass_validation() {
    assert!(validate_layout::<PointLightBuffer>("point").is_ok());
    assert!(validate_layout::<[u8; 20]>("odd").is_err());
}

#[test]
fn header_counts_each_kind() {
    for n in 0..5 {
        let lights: Vec<Light> = (0..n).map(|i| point(i as f32)).collect();
        let packed = PackedLights::pack(&lights);
        assert_eq!(packed.point.header.count, n);
        assert_eq!(packed.spot.header.count, 0);
        assert_eq!(packed.directional.header.count, 0);
    }
}

#[test]
fn empty_scene_packs_zero_counts() {
    let packed = PackedLights::pack(&[]);
    assert_eq!(packed.counts(), [0, 0, 0]);
    assert!(bytemuck::bytes_of(&packed.point).iter().all(|&b| b == 0));
}

#[test]
fn mixed_lights_keep_slice_order_per_kind() {
    let lights = vec![
        point(1.0),
        Light::directional(Vec3::ONE, Vec3::NEG_Y, 0.5),
        point(2.0),
        spot(),
    ];
    let packed = PackedLights::pack(&lights);

    assert_eq!(packed.counts(), [2, 1, 1]);
    assert_eq!(packed.point.lights[0].position[0], 1.0);
    assert_eq!(packed.point.lights[1].position[0], 2.0);
    assert_eq!(packed.directional.lights[0].direction, [0.0, -1.0, 0.0, 0.0]);
    assert_eq!(packed.spot.lights[0].params[0], 3.0);
    assert!((packed.spot.lights[0].cutoff[0] - 30f32.to_radians().cos()).abs() < 1e-6);
}

#[test]
fn unshadowed_lights_pack_zero_rects() {
    let packed = PackedLights::pack(&[point(0.0), spot().without_shadows()]);
    assert_eq!(packed.point.lights[0].front_rect, [0.0; 4]);
    assert_eq!(packed.point.lights[0].back_rect, [0.0; 4]);
    assert_eq!(packed.spot.lights[0].shadow_rect, [0.0; 4]);
}

#[test]
fn assigned_tiles_are_packed() {
    let mut grid = AtlasGrid::default();
    let mut light = point(0.0);
    light.assign_shadow_tiles(&mut grid).unwrap();

    let packed = PackedLights::pack(&[light]);
    let record = packed.point.lights[0];
    assert_eq!(record.front_rect, [0.0, 0.0, 0.25, 0.25]);
    assert_eq!(record.back_rect, [0.25, 0.0, 0.25, 0.25]);
    assert_ne!(record.front_rect, ShadowRect::NONE.to_array());
}

#[test]
fn infinite_range_packs_clamped_far_plane() {
    let light = Light::point(Vec3::ONE, Vec3::ZERO, 1.0, Attenuation::new(1.0, 0.0, 0.0));
    let packed = PackedLights::pack(&[light]);
    assert_eq!(packed.point.lights[0].far[0], MAX_SHADOW_DISTANCE);
}

#[test]
fn matrices_are_column_major() {
    let light = Light::directional(Vec3::ONE, Vec3::new(-1.0, -1.0, 0.0), 1.0);
    let expected = light.view_projection().unwrap();
    let packed = PackedLights::pack(&[light]);
    let vp = Mat4::from_cols_array_2d(&packed.directional.lights[0].view_projection);
    assert!(vp.abs_diff_eq(expected, 1e-6));
}

#[test]
fn overflow_is_dropped() {
    let lights: Vec<Light> = (0..MAX_LIGHTS_PER_KIND + 3).map(|i| point(i as f32)).collect();
    let packed = PackedLights::pack(&lights);
    assert_eq!(packed.point.header.count as usize, MAX_LIGHTS_PER_KIND);
}

#[test]
fn padding_lanes_are_zero() {
    let packed = PackedLights::pack(&[point(1.0), spot()]);
    assert_eq!(packed.point.lights[0].position, [1.0, 1.0, 0.0, 0.0]);
    assert_eq!(packed.point.lights[0].colour[3], 0.0);
    assert_eq!(packed.spot.lights[0].position[3], 0.0);
    assert_eq!(packed.spot.lights[0].colour, [1.0, 0.9, 0.8, 0.0]);
}

#[test]
fn zero_direction_packs_straight_down() {
    let packed = PackedLights::pack(&[Light::directional(Vec3::ONE, Vec3::ZERO, 1.0)]);
    let record = packed.directional.lights[0];
    assert_eq!(record.direction, [0.0, -1.0, 0.0, 0.0]);
    assert!(Mat4::from_cols_array_2d(&record.view_projection).is_finite());
}
