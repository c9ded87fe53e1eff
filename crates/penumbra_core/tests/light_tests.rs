//! Light Math Tests
//!
//! Tests for:
//! - Attenuation far-plane solve and its degenerate cases
//! - Directional and spot view-projection construction
//! - Paraboloid hemisphere view

use glam::{Mat4, Vec3, Vec4Swizzles};

use penumbra_core::light::*;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[test]
fn constant_only_attenuation_is_infinite() {
    assert_eq!(Attenuation::new(1.0, 0.0, 0.0).far_plane(), f32::INFINITY);
}

#[test]
fn quadratic_far_plane_hits_threshold() {
    let att = Attenuation::new(1.0, 0.09, 0.032);
    let d = att.far_plane();
    let value = 1.0 / (att.constant + att.linear * d + att.exponent * d * d);
    assert!(approx(value, ATTENUATION_THRESHOLD), "attenuation at far = {value}");
}

#[test]
fn negative_discriminant_is_infinite() {
    // q < 0 with small l: the curve never reaches 50.
    assert!(Attenuation::new(1.0, 0.1, -1.0).far_plane().is_infinite());
}

#[test]
fn shadow_far_plane_clamps_both_ends() {
    assert_eq!(Attenuation::new(100.0, 30.0, 1.0).shadow_far_plane(), 1.0);
    assert_eq!(Attenuation::new(1.0, 0.001, 0.0).shadow_far_plane(), MAX_SHADOW_DISTANCE);
}

#[test]
fn straight_down_directional_is_invertible() {
    let light = Light::directional(Vec3::ONE, Vec3::new(0.0, -1.0, 0.0), 1.0);
    let vp = light.view_projection().unwrap();
    assert!(vp.determinant().abs() > 1e-6);
    assert!(!vp.is_nan());
}

#[test]
fn directional_box_maps_scene_centre_inside() {
    let light = Light::directional(Vec3::ONE, Vec3::new(-1.0, -1.0, -0.5), 1.0);
    let clip = light.view_projection().unwrap() * SCENE_CENTRE.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
    assert!((0.0..=1.0).contains(&ndc.z));
}

#[test]
fn spot_projects_cone_axis_to_centre() {
    let spot = SpotLight::with_half_angle(
        Vec3::new(0.0, 5.0, 0.0),
        Attenuation::default(),
        Vec3::NEG_Y,
        25.0,
    );
    let light = Light::spot(Vec3::ONE, 1.0, spot);
    let p = light.view_projection().unwrap().project_point3(Vec3::new(0.0, 1.0, 0.0));
    assert!(approx(p.x, 0.0) && approx(p.y, 0.0));
    assert!((0.0..=1.0).contains(&p.z));
}

#[test]
fn point_lights_have_no_single_view_projection() {
    let light = Light::point(Vec3::ONE, Vec3::ZERO, 1.0, Attenuation::default());
    assert!(light.view_projection().is_none());
}

#[test]
fn hemisphere_view_moves_light_to_origin() {
    let point = PointLight::new(Vec3::new(3.0, 2.0, -1.0), Attenuation::default());
    assert_eq!(point.hemisphere_view(), Mat4::from_translation(Vec3::new(-3.0, -2.0, 1.0)));
    assert_eq!(Hemisphere::Back.sign(), -1.0);
}

#[test]
fn setters_touch_only_matching_kinds() {
    let mut light = Light::directional(Vec3::ONE, Vec3::NEG_Y, 1.0);
    light.set_position(Vec3::ONE);
    assert!(light.position().is_none());
    light.set_direction(Vec3::NEG_X);
    let LightKind::Directional(dir) = &light.kind else {
        panic!("expected a directional light");
    };
    assert_eq!(dir.direction, Vec3::NEG_X);
}
