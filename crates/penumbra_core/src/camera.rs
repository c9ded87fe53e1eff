use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// Fly-camera state: position plus pitch/yaw/roll in degrees.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Vertical field of view in degrees. Also scales the orthographic box.
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            zoom: 60.0,
            near: 0.01,
            far: 1000.0,
            projection: Projection::Perspective,
        }
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            zoom: config.fov_degrees,
            near: config.near,
            far: config.far,
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    /// World -> View. Rotations first, then the inverse translation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_translation(-self.position)
    }

    /// Computes the "Projection Matrix" (View -> Clip)
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective => Mat4::perspective_rh(
                self.zoom.to_radians(),
                aspect_ratio,
                self.near,
                self.far,
            ),
            Projection::Orthographic => {
                let half_height = self.zoom / 60.0;
                let half_width = half_height * aspect_ratio;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let camera = Camera::default().with_position(Vec3::new(0.0, 7.5, 5.0));
        let origin = camera.view_matrix().transform_point3(camera.position);
        assert!(origin.length() < 1e-5);
    }

    #[test]
    fn orthographic_box_follows_zoom() {
        let camera = Camera {
            projection: Projection::Orthographic,
            ..Default::default()
        };
        let edge = camera
            .projection_matrix(1.0)
            .project_point3(Vec3::new(1.0, 1.0, -1.0));
        assert!((edge.x - 1.0).abs() < 1e-5);
        assert!((edge.y - 1.0).abs() < 1e-5);
    }
}
