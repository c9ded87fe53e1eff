use thiserror::Error;

use crate::frame::Pass;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid renderer config: {0}")]
    Config(String),
    #[error("GPU buffer `{name}` is {size} bytes, not a multiple of 16")]
    BufferLayout { name: &'static str, size: usize },
    #[error("invalid asset: {0}")]
    InvalidAsset(String),
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("{requested:?} pass called while the frame expects {expected:?}")]
    PassOrder { expected: Pass, requested: Pass },
}
