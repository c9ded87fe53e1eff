//! Turns the light list into the ordered list of views the shadow pass draws.
//!
//! Kept free of GPU types apart from `wgpu::Face` so ordering and culling can
//! be checked without a device.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use penumbra_core::{
    atlas::{PixelRect, ShadowRect},
    light::{Hemisphere, Light, LightKind, SHADOW_NEAR},
};

/// Which pipeline a view is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowMode {
    /// Orthographic or perspective projection (directional and spot lights).
    Projected,
    /// One half of a point light's dual paraboloid.
    Paraboloid(Hemisphere),
}

/// Per-view uniform read by `shadow_pass.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ShadowViewUniform {
    pub view_projection: [[f32; 4]; 4],
    /// near, far, hemisphere sign, unused
    pub params: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowView {
    /// Index into the light slice the plan was built from.
    pub light_index: usize,
    pub rect: ShadowRect,
    pub viewport: PixelRect,
    pub mode: ShadowMode,
    pub cull: wgpu::Face,
    pub uniform: ShadowViewUniform,
}

impl ShadowView {
    fn new(light_index: usize, rect: ShadowRect, atlas_size: u32, mode: ShadowMode, uniform: ShadowViewUniform) -> Self {
        // The back paraboloid negates z but keeps x and y, so screen-space winding inverts.
        let cull = match mode {
            ShadowMode::Paraboloid(Hemisphere::Back) => wgpu::Face::Front,
            ShadowMode::Projected | ShadowMode::Paraboloid(Hemisphere::Front) => wgpu::Face::Back,
        };

        Self {
            light_index,
            rect,
            viewport: rect.to_viewport(atlas_size),
            mode,
            cull,
            uniform,
        }
    }
}

fn projected_uniform(view_projection: Mat4) -> ShadowViewUniform {
    ShadowViewUniform {
        view_projection: view_projection.to_cols_array_2d(),
        params: [0.0, 1.0, 1.0, 0.0],
    }
}

/// Views in light order; a point light contributes front then back.
/// Lights without tiles, or with shadows turned off, are skipped.
pub fn plan_shadow_views(lights: &[Light], atlas_size: u32) -> Vec<ShadowView> {
    let mut views = Vec::new();

    for (index, light) in lights.iter().enumerate() {
        if !light.casts_shadows {
            continue;
        }

        match &light.kind {
            LightKind::Directional(dir) => {
                if let Some(rect) = dir.shadow_rect() {
                    let uniform = projected_uniform(dir.view_projection());
                    views.push(ShadowView::new(index, rect, atlas_size, ShadowMode::Projected, uniform));
                }
            }
            LightKind::Spot(spot) => {
                if let Some(rect) = spot.shadow_rect() {
                    let uniform = projected_uniform(spot.view_projection());
                    views.push(ShadowView::new(index, rect, atlas_size, ShadowMode::Projected, uniform));
                }
            }
            LightKind::Point(point) => {
                let Some(rects) = point.shadow_rects() else {
                    continue;
                };
                let far = point.attenuation.shadow_far_plane();
                let view = point.hemisphere_view().to_cols_array_2d();

                for hemisphere in Hemisphere::BOTH {
                    let rect = match hemisphere {
                        Hemisphere::Front => rects.front,
                        Hemisphere::Back => rects.back,
                    };
                    let uniform = ShadowViewUniform {
                        view_projection: view,
                        params: [SHADOW_NEAR, far, hemisphere.sign(), 0.0],
                    };
                    views.push(ShadowView::new(
                        index,
                        rect,
                        atlas_size,
                        ShadowMode::Paraboloid(hemisphere),
                        uniform,
                    ));
                }
            }
        }
    }

    views
}
