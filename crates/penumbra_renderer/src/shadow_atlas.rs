use penumbra_core::{
    atlas::{AtlasError, AtlasGrid, ShadowRect, TileAllocator},
    config::ShadowConfig,
};

use crate::{error::RenderError, texture::TextureHelper};

/// The single depth texture every shadow view renders into.
pub struct ShadowAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    grid: AtlasGrid,
}

impl ShadowAtlas {
    pub fn new(device: &wgpu::Device, config: &ShadowConfig) -> Result<Self, RenderError> {
        validate_atlas(config, device.limits().max_texture_dimension_2d)?;

        let (texture, view) = TextureHelper::create_depth_texture(
            device,
            config.atlas_size,
            config.atlas_size,
            "Shadow Atlas",
        );

        // LessEqual: a fragment is lit when its depth is not behind the stored one.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let grid = AtlasGrid::new(config.atlas_size, config.tiles_per_row);
        log::info!(
            "Shadow atlas: {0}x{0}, {1}x{1} tiles of {2}px",
            grid.atlas_size(),
            grid.tiles_per_row(),
            grid.tile_size()
        );

        Ok(Self {
            texture,
            view,
            sampler,
            grid,
        })
    }

    pub fn grid(&self) -> &AtlasGrid {
        &self.grid
    }

    pub fn atlas_size(&self) -> u32 {
        self.grid.atlas_size()
    }
}

impl TileAllocator for ShadowAtlas {
    fn allocate_tile(&mut self) -> Result<ShadowRect, AtlasError> {
        self.grid.allocate_tile()
    }

    fn capacity(&self) -> u32 {
        self.grid.capacity()
    }

    fn remaining(&self) -> u32 {
        self.grid.remaining()
    }
}

/// Checks the atlas fits the device and divides into whole tiles.
pub fn validate_atlas(config: &ShadowConfig, max_dimension: u32) -> Result<(), RenderError> {
    if config.atlas_size == 0 || config.tiles_per_row == 0 {
        return Err(RenderError::Config(
            "shadow atlas needs a non-zero size and tile count".to_string(),
        ));
    }
    if config.atlas_size % config.tiles_per_row != 0 {
        return Err(RenderError::Config(format!(
            "atlas size {} does not divide into {} tiles per row",
            config.atlas_size, config.tiles_per_row
        )));
    }
    if config.atlas_size > max_dimension {
        return Err(RenderError::Config(format!(
            "atlas size {} exceeds the device limit of {}",
            config.atlas_size, max_dimension
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_larger_than_device_is_rejected() {
        let config = ShadowConfig {
            atlas_size: 16384,
            tiles_per_row: 4,
        };
        assert!(matches!(
            validate_atlas(&config, 8192),
            Err(RenderError::Config(_))
        ));
        assert!(validate_atlas(&ShadowConfig::default(), 8192).is_ok());
    }

    #[test]
    fn uneven_grid_is_rejected() {
        let config = ShadowConfig {
            atlas_size: 4096,
            tiles_per_row: 3,
        };
        assert!(validate_atlas(&config, 8192).is_err());
    }
}
