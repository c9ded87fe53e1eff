pub mod geometry;
pub mod lighting;
pub mod shadow;

pub use geometry::GeometryRenderer;
pub use lighting::LightingRenderer;
pub use shadow::ShadowRenderer;

use penumbra_core::assets::Assets;

use crate::{
    RenderItem,
    mesh::{Model, ModelUniform},
};

/// Looks up every item's model. Unknown handles and empty meshes are caller
/// bugs: they trip a debug assertion and are skipped in release builds.
pub fn resolve_items<'a>(items: &[RenderItem], models: &'a Assets<Model>) -> Vec<(&'a Model, ModelUniform)> {
    let mut resolved = Vec::with_capacity(items.len());

    for item in items {
        let Some(model) = models.get(item.model) else {
            debug_assert!(false, "render item references unknown model {}", item.model.id);
            log::error!("Skipping draw: unknown model {}", item.model.id);
            continue;
        };
        if model.mesh.index_count == 0 {
            debug_assert!(false, "model {} has no indices", item.model.id);
            log::error!("Skipping draw: model {} has no indices", item.model.id);
            continue;
        }
        resolved.push((model, ModelUniform::from_matrix(item.transform)));
    }

    resolved
}
