//! Shadow View Planning Tests
//!
//! Tests for:
//! - View order across mixed light kinds
//! - Cull face per hemisphere
//! - Viewports in atlas texels

use glam::Vec3;

use penumbra_core::atlas::{AtlasGrid, PixelRect};
use penumbra_core::light::{Attenuation, Hemisphere, Light, SHADOW_NEAR, SpotLight};
use penumbra_renderer::shadow_plan::*;

fn assigned(mut lights: Vec<Light>, grid: &mut AtlasGrid) -> Vec<Light> {
    for light in &mut lights {
        light.assign_shadow_tiles(grid).unwrap();
    }
    lights
}

fn demo_lights() -> Vec<Light> {
    vec![
        Light::directional(Vec3::ONE, Vec3::new(-0.5, -1.0, -0.3), 0.8),
        Light::directional(Vec3::new(0.3, 0.3, 0.5), Vec3::new(0.4, -1.0, 0.2), 0.2),
        Light::point(Vec3::ONE, Vec3::new(2.0, 3.0, 0.0), 1.0, Attenuation::default()),
        Light::point(Vec3::ONE, Vec3::new(-2.0, 3.0, 0.0), 1.0, Attenuation::default()),
        Light::spot(
            Vec3::ONE,
            1.0,
            SpotLight::with_half_angle(Vec3::new(0.0, 6.0, 0.0), Attenuation::default(), Vec3::NEG_Y, 35.0),
        ),
    ]
}

#[test]
fn seven_views_in_registration_order() {
    let mut grid = AtlasGrid::default();
    let lights = assigned(demo_lights(), &mut grid);
    let views = plan_shadow_views(&lights, grid.atlas_size());

    let modes: Vec<(usize, ShadowMode)> = views.iter().map(|v| (v.light_index, v.mode)).collect();
    assert_eq!(
        modes,
        vec![
            (0, ShadowMode::Projected),
            (1, ShadowMode::Projected),
            (2, ShadowMode::Paraboloid(Hemisphere::Front)),
            (2, ShadowMode::Paraboloid(Hemisphere::Back)),
            (3, ShadowMode::Paraboloid(Hemisphere::Front)),
            (3, ShadowMode::Paraboloid(Hemisphere::Back)),
            (4, ShadowMode::Projected),
        ]
    );
    assert_eq!(grid.allocated(), 7);
}

#[test]
fn views_follow_allocation_order() {
    let mut grid = AtlasGrid::default();
    let lights = assigned(demo_lights(), &mut grid);
    let views = plan_shadow_views(&lights, grid.atlas_size());

    for (i, view) in views.iter().enumerate() {
        assert_eq!(view.rect, grid.rect_of(i as u32), "view {i}");
    }
}

#[test]
fn back_hemisphere_culls_front_faces() {
    let mut grid = AtlasGrid::default();
    let lights = assigned(demo_lights(), &mut grid);
    let views = plan_shadow_views(&lights, grid.atlas_size());

    for view in &views {
        let expected = match view.mode {
            ShadowMode::Paraboloid(Hemisphere::Back) => wgpu::Face::Front,
            _ => wgpu::Face::Back,
        };
        assert_eq!(view.cull, expected);
    }
}

#[test]
fn paraboloid_uniform_carries_hemisphere() {
    let mut grid = AtlasGrid::default();
    let lights = assigned(demo_lights(), &mut grid);
    let views = plan_shadow_views(&lights, grid.atlas_size());

    let front = &views[2];
    let back = &views[3];
    assert_eq!(front.uniform.params[0], SHADOW_NEAR);
    assert_eq!(front.uniform.params[2], 1.0);
    assert_eq!(back.uniform.params[2], -1.0);
    assert_eq!(front.uniform.view_projection, back.uniform.view_projection);
    assert_ne!(front.rect, back.rect);
}

#[test]
fn viewports_are_whole_tiles() {
    let mut grid = AtlasGrid::default();
    let lights = assigned(demo_lights(), &mut grid);
    let views = plan_shadow_views(&lights, grid.atlas_size());

    assert_eq!(views[0].viewport, PixelRect { x: 0, y: 0, width: 1024, height: 1024 });
    assert_eq!(views[6].viewport, PixelRect { x: 2048, y: 1024, width: 1024, height: 1024 });
}

#[test]
fn lights_without_tiles_are_skipped() {
    let lights = demo_lights();
    assert!(plan_shadow_views(&lights, 4096).is_empty());

    let mut grid = AtlasGrid::default();
    let mut lights = assigned(demo_lights(), &mut grid);
    lights[0].casts_shadows = false;
    let views = plan_shadow_views(&lights, grid.atlas_size());
    assert_eq!(views.len(), 6);
    assert!(views.iter().all(|v| v.light_index != 0));
}
