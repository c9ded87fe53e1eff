//! Tile bookkeeping for the shadow atlas.
//!
//! The atlas is one square depth surface cut into a fixed `N x N` grid. Tiles
//! are handed out in raster order and never given back; once the grid is used
//! up every further request fails with [`AtlasError::Exhausted`].

use thiserror::Error;

/// Default edge length of the atlas texture, in texels.
pub const DEFAULT_ATLAS_SIZE: u32 = 4096;
/// Default number of tiles along one edge (4 x 4 = 16 tiles).
pub const DEFAULT_TILES_PER_ROW: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AtlasError {
    #[error("shadow atlas is full (all {capacity} tiles handed out)")]
    Exhausted { capacity: u32 },
    #[error("light already owns its shadow tiles")]
    AlreadyAssigned,
}

/// A tile in normalised atlas space: origin at the top-left, `[0, 1]` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShadowRect {
    pub u: f32,
    pub v: f32,
    pub width: f32,
    pub height: f32,
}

/// A tile in atlas texels, ready for `set_viewport`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ShadowRect {
    /// The zero rect packed for lights without shadows.
    pub const NONE: ShadowRect = ShadowRect {
        u: 0.0,
        v: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn to_array(self) -> [f32; 4] {
        [self.u, self.v, self.width, self.height]
    }

    pub fn to_viewport(self, atlas_size: u32) -> PixelRect {
        let size = atlas_size as f32;
        PixelRect {
            x: (self.u * size).round() as u32,
            y: (self.v * size).round() as u32,
            width: (self.width * size).round() as u32,
            height: (self.height * size).round() as u32,
        }
    }

    pub fn overlaps(&self, other: &ShadowRect) -> bool {
        const EPS: f32 = 1e-6;
        self.u + EPS < other.u + other.width
            && other.u + EPS < self.u + self.width
            && self.v + EPS < other.v + other.height
            && other.v + EPS < self.v + self.height
    }
}

/// Anything that can grant atlas tiles. The GPU atlas implements this, and so
/// does the bare [`AtlasGrid`] so registration logic runs without a device.
pub trait TileAllocator {
    fn allocate_tile(&mut self) -> Result<ShadowRect, AtlasError>;

    /// Total number of tiles, handed out or not.
    fn capacity(&self) -> u32;

    /// Tiles still available.
    fn remaining(&self) -> u32;
}

/// Monotonic arena over a fixed grid of tiles.
#[derive(Debug, Clone)]
pub struct AtlasGrid {
    atlas_size: u32,
    tiles_per_row: u32,
    next_tile: u32,
}

impl Default for AtlasGrid {
    fn default() -> Self {
        Self::new(DEFAULT_ATLAS_SIZE, DEFAULT_TILES_PER_ROW)
    }
}

impl AtlasGrid {
    pub fn new(atlas_size: u32, tiles_per_row: u32) -> Self {
        Self {
            atlas_size,
            tiles_per_row: tiles_per_row.max(1),
            next_tile: 0,
        }
    }

    pub fn atlas_size(&self) -> u32 {
        self.atlas_size
    }

    pub fn tiles_per_row(&self) -> u32 {
        self.tiles_per_row
    }

    pub fn allocated(&self) -> u32 {
        self.next_tile
    }

    /// Edge length of one tile in texels.
    pub fn tile_size(&self) -> u32 {
        self.atlas_size / self.tiles_per_row
    }

    /// The rect of tile `index` in raster order, whether or not it is handed out.
    pub fn rect_of(&self, index: u32) -> ShadowRect {
        let x = index % self.tiles_per_row;
        let y = index / self.tiles_per_row;
        let tile = 1.0 / self.tiles_per_row as f32;

        ShadowRect {
            u: x as f32 * tile,
            v: y as f32 * tile,
            width: tile,
            height: tile,
        }
    }
}

impl TileAllocator for AtlasGrid {
    fn allocate_tile(&mut self) -> Result<ShadowRect, AtlasError> {
        if self.next_tile >= self.capacity() {
            return Err(AtlasError::Exhausted {
                capacity: self.capacity(),
            });
        }

        let rect = self.rect_of(self.next_tile);
        self.next_tile += 1;
        Ok(rect)
    }

    fn capacity(&self) -> u32 {
        self.tiles_per_row * self.tiles_per_row
    }

    fn remaining(&self) -> u32 {
        self.capacity() - self.next_tile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tile_is_top_left() {
        let mut grid = AtlasGrid::default();
        let rect = grid.allocate_tile().unwrap();
        assert_eq!(rect, ShadowRect { u: 0.0, v: 0.0, width: 0.25, height: 0.25 });
    }

    #[test]
    fn fifth_tile_starts_second_row() {
        let grid = AtlasGrid::default();
        let rect = grid.rect_of(4);
        assert_eq!((rect.u, rect.v), (0.0, 0.25));
    }

    #[test]
    fn viewport_is_in_texels() {
        let grid = AtlasGrid::default();
        let px = grid.rect_of(5).to_viewport(grid.atlas_size());
        assert_eq!(px, PixelRect { x: 1024, y: 1024, width: 1024, height: 1024 });
    }

    #[test]
    fn tile_size_matches_viewport() {
        let grid = AtlasGrid::default();
        assert_eq!(grid.tile_size(), 1024);
        assert_eq!(grid.rect_of(6).to_viewport(grid.atlas_size()).width, grid.tile_size());
    }

    #[test]
    fn zero_tiles_per_row_is_clamped() {
        let grid = AtlasGrid::new(1024, 0);
        assert_eq!(grid.capacity(), 1);
    }
}
