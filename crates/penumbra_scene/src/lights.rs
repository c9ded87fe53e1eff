//! Capped light registry.
//!
//! The registry is the only place that hands atlas tiles to lights, so a light
//! either enters fully equipped or not at all.

use log::{debug, warn};
use penumbra_core::{
    atlas::TileAllocator,
    light::{DirectionalLight, Light, LightKind, LightType, PointLight, SpotLight},
};
use penumbra_renderer::light_buffers::MAX_LIGHTS_PER_KIND;

use crate::SceneError;

/// Stable index of a registered light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(usize);

impl LightId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct LightRegistry {
    lights: Vec<Light>,
    directional: usize,
    point: usize,
    spot: usize,
}

impl LightRegistry {
    pub fn count(&self, kind: LightType) -> usize {
        match kind {
            LightType::Directional => self.directional,
            LightType::Point => self.point,
            LightType::Spot => self.spot,
        }
    }

    fn counter_mut(&mut self, kind: LightType) -> &mut usize {
        match kind {
            LightType::Directional => &mut self.directional,
            LightType::Point => &mut self.point,
            LightType::Spot => &mut self.spot,
        }
    }

    pub fn add(
        &mut self,
        mut light: Light,
        allocator: &mut dyn TileAllocator,
    ) -> Result<LightId, SceneError> {
        let kind = light.light_type();
        if self.count(kind) >= MAX_LIGHTS_PER_KIND {
            warn!("Rejecting {kind} light: limit of {MAX_LIGHTS_PER_KIND} reached");
            return Err(SceneError::LightCapReached { kind });
        }

        light.assign_shadow_tiles(allocator).inspect_err(|e| {
            warn!("Rejecting {kind} light: {e}");
        })?;

        *self.counter_mut(kind) += 1;
        let id = LightId(self.lights.len());
        debug!(
            "Registered {kind} light #{} ({} atlas tiles left)",
            id.0,
            allocator.remaining()
        );
        self.lights.push(light);
        Ok(id)
    }

    pub fn all(&self) -> &[Light] {
        &self.lights
    }

    pub fn get(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    pub fn get_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0)
    }

    pub fn directional(&self) -> impl Iterator<Item = &DirectionalLight> {
        self.lights.iter().filter_map(|l| match &l.kind {
            LightKind::Directional(d) => Some(d),
            _ => None,
        })
    }

    pub fn point(&self) -> impl Iterator<Item = &PointLight> {
        self.lights.iter().filter_map(|l| match &l.kind {
            LightKind::Point(p) => Some(p),
            _ => None,
        })
    }

    pub fn spot(&self) -> impl Iterator<Item = &SpotLight> {
        self.lights.iter().filter_map(|l| match &l.kind {
            LightKind::Spot(s) => Some(s),
            _ => None,
        })
    }
}
