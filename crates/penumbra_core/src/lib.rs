pub mod assets;
pub mod atlas;
pub mod camera;
pub mod config;
pub mod light;
pub mod time;
pub mod transform;

pub use assets::{Assets, Handle};
pub use atlas::{AtlasError, AtlasGrid, PixelRect, ShadowRect, TileAllocator};
pub use camera::{Camera, Projection};
pub use config::{ConfigError, DebugView, RendererConfig};
pub use light::{
    Attenuation, DirectionalLight, Hemisphere, HemisphereRects, Light, LightKind, LightType,
    PointLight, SpotLight,
};
pub use time::{FpsCounter, FrameContext, Time};
pub use transform::Transform;
