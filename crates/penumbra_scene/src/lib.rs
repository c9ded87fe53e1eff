use flecs_ecs::prelude::*;
use glam::Vec3;
use log::trace;
use penumbra_core::{
    assets::Handle,
    atlas::{AtlasError, TileAllocator},
    camera::Camera,
    light::{DirectionalLight, Light, LightKind, LightType, PointLight, SpotLight},
    transform::Transform,
};
use penumbra_renderer::{Model, RenderItem};
use thiserror::Error;

pub mod components;
pub mod lights;

pub use components::{Moveable, Renderable};
pub use lights::{LightId, LightRegistry};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("cannot add another {kind} light: limit reached")]
    LightCapReached { kind: LightType },
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error("no light with id {0}")]
    UnknownLight(usize),
}

/// Camera, lights and entities for one frame. Mutated between frames only;
/// the passes read it through [`Scene::render_queue`] and [`Scene::lights`].
pub struct Scene {
    world: World,
    camera: Camera,
    lights: LightRegistry,
    render_queue: Vec<RenderItem>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Camera::default())
    }
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            world: World::new(),
            camera,
            lights: LightRegistry::default(),
            render_queue: Vec::new(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Registers `light`, granting its shadow tiles first. Rejected lights
    /// leave both the registry and the atlas untouched.
    pub fn add_light(
        &mut self,
        light: Light,
        atlas: &mut dyn TileAllocator,
    ) -> Result<LightId, SceneError> {
        self.lights.add(light, atlas)
    }

    /// Every registered light in registration order.
    pub fn lights(&self) -> &[Light] {
        self.lights.all()
    }

    pub fn light_count(&self, kind: LightType) -> usize {
        self.lights.count(kind)
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id)
    }

    /// Between-frame edits. Kind and tiles are fixed at registration.
    pub fn light_mut(&mut self, id: LightId) -> Result<LightHandleMut<'_>, SceneError> {
        self.lights
            .get_mut(id)
            .map(|light| LightHandleMut { light })
            .ok_or(SceneError::UnknownLight(id.index()))
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = &DirectionalLight> {
        self.lights.directional()
    }

    pub fn point_lights(&self) -> impl Iterator<Item = &PointLight> {
        self.lights.point()
    }

    pub fn spot_lights(&self) -> impl Iterator<Item = &SpotLight> {
        self.lights.spot()
    }

    pub fn spawn(&mut self, transform: Transform, model: Handle<Model>) -> Entity {
        self.world
            .entity()
            .set(transform)
            .set(Renderable(model))
            .id()
    }

    pub fn spawn_moveable(
        &mut self,
        transform: Transform,
        model: Handle<Model>,
        moveable: Moveable,
    ) -> Entity {
        self.world
            .entity()
            .set(transform)
            .set(Renderable(model))
            .set(moveable)
            .id()
    }

    pub fn despawn(&mut self, entity: Entity) {
        self.world.entity_from_id(entity).destruct();
    }

    pub fn transform_of(&self, entity: Entity) -> Option<Transform> {
        self.world
            .entity_from_id(entity)
            .try_get::<&Transform>(|transform| *transform)
    }

    pub fn set_transform(&mut self, entity: Entity, transform: Transform) {
        self.world.entity_from_id(entity).set(transform);
    }

    /// Advances every [`Moveable`] by `dt` seconds, then rebuilds the queue.
    pub fn update(&mut self, dt: f32) {
        self.world
            .query::<(&mut Transform, &Moveable)>()
            .build()
            .each(|(transform, moveable)| moveable.integrate(transform, dt));

        self.rebuild_render_queue();
    }

    pub fn rebuild_render_queue(&mut self) {
        self.render_queue.clear();
        let queue = &mut self.render_queue;

        self.world
            .query::<(&Transform, &Renderable)>()
            .build()
            .each(|(transform, renderable)| {
                queue.push(RenderItem {
                    transform: transform.compute_matrix(),
                    model: renderable.0,
                });
            });

        trace!("Render queue holds {} items", self.render_queue.len());
    }

    /// Items as of the last [`Scene::update`].
    pub fn render_queue(&self) -> &[RenderItem] {
        &self.render_queue
    }
}

/// Mutable view of one registered light. Tile rects stay untouchable.
pub struct LightHandleMut<'a> {
    light: &'a mut Light,
}

impl LightHandleMut<'_> {
    pub fn set_colour(&mut self, colour: Vec3) -> &mut Self {
        self.light.colour = colour;
        self
    }

    pub fn set_intensity(&mut self, intensity: f32) -> &mut Self {
        self.light.intensity = intensity;
        self
    }

    /// Ignored for directional lights.
    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.light.set_position(position);
        self
    }

    /// Ignored for point lights.
    pub fn set_direction(&mut self, direction: Vec3) -> &mut Self {
        self.light.set_direction(direction);
        self
    }

    pub fn set_casts_shadows(&mut self, enabled: bool) -> &mut Self {
        // Only lights that got tiles at registration can draw shadows.
        self.light.casts_shadows = enabled && self.light.has_shadow_tiles();
        self
    }

    pub fn kind(&self) -> &LightKind {
        &self.light.kind
    }
}
