//! Renderer settings loaded from TOML.
//!
//! Every section is optional; missing keys fall back to [`Default`]. A config
//! is only handed to the renderer after [`RendererConfig::validate`] passes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atlas::{DEFAULT_ATLAS_SIZE, DEFAULT_TILES_PER_ROW};

/// File looked up next to the binary when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "penumbra.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Penumbra".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShadowConfig {
    /// Edge length of the square atlas texture.
    pub atlas_size: u32,
    pub tiles_per_row: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            atlas_size: DEFAULT_ATLAS_SIZE,
            tiles_per_row: DEFAULT_TILES_PER_ROW,
        }
    }
}

/// What the lighting pass writes to the screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DebugView {
    #[default]
    Final,
    Position,
    Normal,
    Albedo,
    ShadowAtlas,
}

impl DebugView {
    pub const ALL: [DebugView; 5] = [
        DebugView::Final,
        DebugView::Position,
        DebugView::Normal,
        DebugView::Albedo,
        DebugView::ShadowAtlas,
    ];

    /// Value the lighting shader switches on.
    pub fn shader_index(self) -> u32 {
        match self {
            DebugView::Final => 0,
            DebugView::Position => 1,
            DebugView::Normal => 2,
            DebugView::Albedo => 3,
            DebugView::ShadowAtlas => 4,
        }
    }

    /// The view after this one, wrapping back to `Final`.
    pub fn next(self) -> Self {
        let index = self.shader_index() as usize;
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: [f32; 3],
    pub clear_colour: [f32; 3],
    pub debug_view: DebugView,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: [0.15; 3],
            clear_colour: [0.0; 3],
            debug_view: DebugView::Final,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct RendererConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub shadows: ShadowConfig,
    pub lighting: LightingConfig,
}

impl RendererConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RendererConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`. A missing file is not an error: defaults are used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        let shadows = &self.shadows;
        if shadows.atlas_size == 0 || shadows.tiles_per_row == 0 {
            return Err(ConfigError::Invalid(
                "shadow atlas size and tiles_per_row must be non-zero".to_string(),
            ));
        }
        if shadows.atlas_size % shadows.tiles_per_row != 0 {
            return Err(ConfigError::Invalid(format!(
                "atlas size {} is not divisible by {} tiles per row",
                shadows.atlas_size, shadows.tiles_per_row
            )));
        }

        let camera = &self.camera;
        if camera.near <= 0.0 || camera.near >= camera.far {
            return Err(ConfigError::Invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if camera.fov_degrees <= 0.0 || camera.fov_degrees >= 180.0 {
            return Err(ConfigError::Invalid(format!(
                "fov must be in (0, 180) degrees, got {}",
                camera.fov_degrees
            )));
        }

        Ok(())
    }
}
