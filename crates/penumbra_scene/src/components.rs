use flecs_ecs::prelude::*;
use glam::Vec3;
use penumbra_core::{assets::Handle, transform::Transform};
use penumbra_renderer::Model;

// "Please draw this Model"
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Renderable(pub Handle<Model>);

/// Per-second rates integrated by [`crate::Scene::update`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Moveable {
    pub velocity: Vec3,
    /// Degrees per second around each axis.
    pub angular_velocity: Vec3,
    pub scale_velocity: f32,
}

impl Moveable {
    pub fn spinning(degrees_per_second: Vec3) -> Self {
        Self {
            angular_velocity: degrees_per_second,
            ..Default::default()
        }
    }

    pub fn integrate(&self, transform: &mut Transform, dt: f32) {
        transform.translation += self.velocity * dt;
        transform.rotation += self.angular_velocity * dt;
        transform.scale = (transform.scale + self.scale_velocity * dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_scales_by_dt() {
        let moveable = Moveable {
            velocity: Vec3::X,
            angular_velocity: Vec3::new(0.0, 90.0, 0.0),
            scale_velocity: -0.5,
        };
        let mut transform = Transform::default();
        moveable.integrate(&mut transform, 0.5);

        assert_eq!(transform.translation, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(transform.rotation, Vec3::new(0.0, 45.0, 0.0));
        assert_eq!(transform.scale, 0.75);
    }

    #[test]
    fn scale_never_goes_negative() {
        let moveable = Moveable {
            scale_velocity: -10.0,
            ..Default::default()
        };
        let mut transform = Transform::default();
        moveable.integrate(&mut transform, 1.0);
        assert_eq!(transform.scale, 0.0);
    }
}
