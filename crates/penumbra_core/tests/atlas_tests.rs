//! Shadow Atlas Allocation Tests
//!
//! Tests for:
//! - Raster-order, non-overlapping tile allocation
//! - Exhaustion once the grid is used up
//! - Point lights taking two distinct tiles

use glam::Vec3;

use penumbra_core::atlas::{AtlasError, AtlasGrid, ShadowRect, TileAllocator};
use penumbra_core::light::{Attenuation, Light, LightKind};

#[test]
fn allocations_are_distinct_and_in_raster_order() {
    for n in 1..=16u32 {
        let mut grid = AtlasGrid::default();
        let rects: Vec<ShadowRect> = (0..n).map(|_| grid.allocate_tile().unwrap()).collect();

        for (i, a) in rects.iter().enumerate() {
            let i = i as u32;
            assert_eq!(a.u, (i % 4) as f32 * 0.25, "tile {i} column");
            assert_eq!(a.v, (i / 4) as f32 * 0.25, "tile {i} row");
            for b in rects.iter().skip(i as usize + 1) {
                assert!(!a.overlaps(b), "tiles {a:?} and {b:?} overlap");
            }
        }
        assert_eq!(grid.remaining(), 16 - n);
    }
}

#[test]
fn seventeenth_tile_is_exhausted() {
    let mut grid = AtlasGrid::default();
    for _ in 0..16 {
        grid.allocate_tile().unwrap();
    }
    assert_eq!(grid.allocate_tile(), Err(AtlasError::Exhausted { capacity: 16 }));
    // Still exhausted, counter does not wrap.
    assert!(grid.allocate_tile().is_err());
    assert_eq!(grid.allocated(), 16);
}

#[test]
fn rects_stay_inside_unit_square() {
    let mut grid = AtlasGrid::new(2048, 8);
    while let Ok(rect) = grid.allocate_tile() {
        assert!(rect.u >= 0.0 && rect.u + rect.width <= 1.0 + 1e-6);
        assert!(rect.v >= 0.0 && rect.v + rect.height <= 1.0 + 1e-6);
    }
    assert_eq!(grid.allocated(), 64);
}

#[test]
fn point_light_front_and_back_differ() {
    let mut grid = AtlasGrid::default();
    let mut light = Light::point(Vec3::ONE, Vec3::new(0.0, 2.0, 0.0), 1.0, Attenuation::default());
    light.assign_shadow_tiles(&mut grid).unwrap();

    let LightKind::Point(point) = &light.kind else {
        panic!("expected a point light");
    };
    let rects = point.shadow_rects().unwrap();
    assert_ne!(rects.front, rects.back);
    assert!(!rects.front.overlaps(&rects.back));
    assert_eq!(grid.allocated(), 2);
}

#[test]
fn zero_rect_marks_no_shadow() {
    assert_eq!(ShadowRect::NONE.to_array(), [0.0; 4]);
    assert_eq!(ShadowRect::NONE.to_viewport(4096).width, 0);
}
