use glam::{Mat4, Vec3};

use crate::atlas::{AtlasError, ShadowRect, TileAllocator};

/// Centre of the region a directional light's shadow box covers.
pub const SCENE_CENTRE: Vec3 = Vec3::ZERO;
/// Half-extent of the directional shadow box.
pub const SCENE_RADIUS: f32 = 10.0;

/// Attenuation factor at which a light is considered to have no effect.
pub const ATTENUATION_THRESHOLD: f32 = 0.02;
/// Near plane for spot and point shadow projections.
pub const SHADOW_NEAR: f32 = 0.01;
/// Upper bound on any shadow far plane; infinite ranges are clamped to this.
pub const MAX_SHADOW_DISTANCE: f32 = 50.0;
const MIN_SHADOW_DISTANCE: f32 = 1.0;

/// Up vector for a look-at along `direction`. Near-vertical directions would
/// make the cross product with +Y collapse, so they look along -Z instead.
pub fn up_vector_for(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::new(0.0, 0.0, -1.0)
    } else {
        Vec3::Y
    }
}

/// Unit direction a light faces. A zero vector points straight down.
pub fn light_direction(direction: Vec3) -> Vec3 {
    direction.normalize_or(Vec3::NEG_Y)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            exponent: 0.032,
        }
    }
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, exponent: f32) -> Self {
        Self {
            constant,
            linear,
            exponent,
        }
    }

    /// Distance at which `1 / (c + l*d + q*d^2)` drops to the threshold.
    ///
    /// Solves `q*d^2 + l*d + (c - 1/threshold) = 0` for the positive root.
    /// Returns `+inf` when the light never falls off that far (no distance
    /// terms, or a negative discriminant) and `0` when it starts out below it.
    pub fn far_plane(&self) -> f32 {
        let target = 1.0 / ATTENUATION_THRESHOLD;
        let a = self.exponent;
        let b = self.linear;
        let c = self.constant - target;

        if a.abs() <= f32::EPSILON {
            if b.abs() <= f32::EPSILON {
                return f32::INFINITY;
            }
            let d = -c / b;
            return if d > 0.0 { d } else { 0.0 };
        }

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return f32::INFINITY;
        }

        let root = (-b + discriminant.sqrt()) / (2.0 * a);
        if root > 0.0 { root } else { 0.0 }
    }

    /// Far plane used by the shadow projections, always finite.
    pub fn shadow_far_plane(&self) -> f32 {
        let far = self.far_plane();
        if far.is_finite() {
            far.clamp(MIN_SHADOW_DISTANCE, MAX_SHADOW_DISTANCE)
        } else {
            MAX_SHADOW_DISTANCE
        }
    }
}

/// Front and back paraboloid tiles of a point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereRects {
    pub front: ShadowRect,
    pub back: ShadowRect,
}

/// The two halves of a dual-paraboloid shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Front,
    Back,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Front, Hemisphere::Back];

    /// +1 for the front half, -1 for the back; the paraboloid shader flips z by it.
    pub fn sign(self) -> f32 {
        match self {
            Hemisphere::Front => 1.0,
            Hemisphere::Back => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    shadow_rect: Option<ShadowRect>,
}

impl DirectionalLight {
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction,
            shadow_rect: None,
        }
    }

    pub fn shadow_rect(&self) -> Option<ShadowRect> {
        self.shadow_rect
    }

    pub fn view_projection(&self) -> Mat4 {
        let direction = light_direction(self.direction);
        let eye = SCENE_CENTRE - direction * (SCENE_RADIUS * 2.0);
        let view = Mat4::look_at_rh(eye, SCENE_CENTRE, up_vector_for(direction));

        let projection = Mat4::orthographic_rh(
            -SCENE_RADIUS,
            SCENE_RADIUS,
            -SCENE_RADIUS,
            SCENE_RADIUS,
            1.0,
            SCENE_RADIUS * 4.0,
        );

        projection * view
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub attenuation: Attenuation,
    shadow_rects: Option<HemisphereRects>,
}

impl PointLight {
    pub fn new(position: Vec3, attenuation: Attenuation) -> Self {
        Self {
            position,
            attenuation,
            shadow_rects: None,
        }
    }

    pub fn shadow_rects(&self) -> Option<HemisphereRects> {
        self.shadow_rects
    }

    pub fn far_plane(&self) -> f32 {
        self.attenuation.far_plane()
    }

    /// Translation-only view for the paraboloid passes; the warp itself is done
    /// by the shadow vertex shader.
    pub fn hemisphere_view(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub attenuation: Attenuation,
    pub cone_direction: Vec3,
    /// Cosine of the cone's half-angle.
    pub cutoff: f32,
    shadow_rect: Option<ShadowRect>,
}

impl SpotLight {
    pub fn new(position: Vec3, attenuation: Attenuation, cone_direction: Vec3, cutoff: f32) -> Self {
        Self {
            position,
            attenuation,
            cone_direction,
            cutoff,
            shadow_rect: None,
        }
    }

    /// Builds a spot from a half-angle in degrees rather than its cosine.
    pub fn with_half_angle(
        position: Vec3,
        attenuation: Attenuation,
        cone_direction: Vec3,
        half_angle_degrees: f32,
    ) -> Self {
        Self::new(
            position,
            attenuation,
            cone_direction,
            half_angle_degrees.to_radians().cos(),
        )
    }

    pub fn shadow_rect(&self) -> Option<ShadowRect> {
        self.shadow_rect
    }

    pub fn fov(&self) -> f32 {
        2.0 * self.cutoff.clamp(-1.0, 1.0).acos()
    }

    pub fn view_projection(&self) -> Mat4 {
        let direction = light_direction(self.cone_direction);
        let view = Mat4::look_at_rh(
            self.position,
            self.position + direction,
            up_vector_for(direction),
        );

        // A zero or full cone has no usable frustum.
        let fov = self.fov().clamp(0.01, std::f32::consts::PI - 0.01);
        let projection =
            Mat4::perspective_rh(fov, 1.0, SHADOW_NEAR, self.attenuation.shadow_far_plane());

        projection * view
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// Discriminant of [`LightKind`], used for per-kind caps and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl std::fmt::Display for LightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LightType::Directional => "directional",
            LightType::Point => "point",
            LightType::Spot => "spot",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub colour: Vec3,
    pub intensity: f32,
    pub casts_shadows: bool,
    pub kind: LightKind,
}

impl Light {
    pub fn directional(colour: Vec3, direction: Vec3, intensity: f32) -> Self {
        Self {
            colour,
            intensity,
            casts_shadows: true,
            kind: LightKind::Directional(DirectionalLight::new(direction)),
        }
    }

    pub fn point(colour: Vec3, position: Vec3, intensity: f32, attenuation: Attenuation) -> Self {
        Self {
            colour,
            intensity,
            casts_shadows: true,
            kind: LightKind::Point(PointLight::new(position, attenuation)),
        }
    }

    pub fn spot(colour: Vec3, intensity: f32, spot: SpotLight) -> Self {
        Self {
            colour,
            intensity,
            casts_shadows: true,
            kind: LightKind::Spot(spot),
        }
    }

    pub fn without_shadows(mut self) -> Self {
        self.casts_shadows = false;
        self
    }

    pub fn light_type(&self) -> LightType {
        match self.kind {
            LightKind::Directional(_) => LightType::Directional,
            LightKind::Point(_) => LightType::Point,
            LightKind::Spot(_) => LightType::Spot,
        }
    }

    /// Atlas tiles this light needs: two for a point light, one otherwise.
    pub fn tiles_needed(&self) -> u32 {
        if !self.casts_shadows {
            return 0;
        }
        match self.kind {
            LightKind::Point(_) => 2,
            LightKind::Directional(_) | LightKind::Spot(_) => 1,
        }
    }

    /// World position for point and spot lights; directional lights have none.
    pub fn position(&self) -> Option<Vec3> {
        match &self.kind {
            LightKind::Point(l) => Some(l.position),
            LightKind::Spot(l) => Some(l.position),
            LightKind::Directional(_) => None,
        }
    }

    /// Moves a point or spot light. No-op for directional lights.
    pub fn set_position(&mut self, position: Vec3) {
        match &mut self.kind {
            LightKind::Point(l) => l.position = position,
            LightKind::Spot(l) => l.position = position,
            LightKind::Directional(_) => {}
        }
    }

    /// Re-aims a directional or spot light. No-op for point lights.
    pub fn set_direction(&mut self, direction: Vec3) {
        match &mut self.kind {
            LightKind::Directional(l) => l.direction = direction,
            LightKind::Spot(l) => l.cone_direction = direction,
            LightKind::Point(_) => {}
        }
    }

    pub fn has_shadow_tiles(&self) -> bool {
        match &self.kind {
            LightKind::Directional(l) => l.shadow_rect.is_some(),
            LightKind::Point(l) => l.shadow_rects.is_some(),
            LightKind::Spot(l) => l.shadow_rect.is_some(),
        }
    }

    /// Light-space transform for single-tile lights. Point lights have one per
    /// hemisphere instead, see [`PointLight::hemisphere_view`].
    pub fn view_projection(&self) -> Option<Mat4> {
        match &self.kind {
            LightKind::Directional(l) => Some(l.view_projection()),
            LightKind::Spot(l) => Some(l.view_projection()),
            LightKind::Point(_) => None,
        }
    }

    /// Takes this light's tiles from `allocator`. Either every tile is granted
    /// or none is; a light that already holds tiles is never re-assigned.
    pub fn assign_shadow_tiles(
        &mut self,
        allocator: &mut dyn TileAllocator,
    ) -> Result<(), AtlasError> {
        if !self.casts_shadows {
            return Ok(());
        }
        if self.has_shadow_tiles() {
            return Err(AtlasError::AlreadyAssigned);
        }

        let needed = self.tiles_needed();
        if allocator.remaining() < needed {
            return Err(AtlasError::Exhausted {
                capacity: allocator.capacity(),
            });
        }

        match &mut self.kind {
            LightKind::Directional(l) => l.shadow_rect = Some(allocator.allocate_tile()?),
            LightKind::Spot(l) => l.shadow_rect = Some(allocator.allocate_tile()?),
            LightKind::Point(l) => {
                let front = allocator.allocate_tile()?;
                let back = allocator.allocate_tile()?;
                l.shadow_rects = Some(HemisphereRects { front, back });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasGrid;

    #[test]
    fn up_vector_switches_near_vertical() {
        assert_eq!(up_vector_for(Vec3::NEG_Y), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(up_vector_for(Vec3::new(1.0, -1.0, 0.0).normalize()), Vec3::Y);
    }

    #[test]
    fn linear_only_attenuation_is_solved_directly() {
        let far = Attenuation::new(1.0, 1.0, 0.0).far_plane();
        assert!((far - 49.0).abs() < 1e-4);
    }

    #[test]
    fn bright_constant_never_reaches_threshold() {
        assert_eq!(Attenuation::new(100.0, 30.0, 1.0).far_plane(), 0.0);
    }

    #[test]
    fn shadow_far_plane_is_finite() {
        let a = Attenuation::new(1.0, 0.0, 0.0);
        assert!(a.far_plane().is_infinite());
        assert_eq!(a.shadow_far_plane(), MAX_SHADOW_DISTANCE);
    }

    #[test]
    fn zero_direction_looks_down() {
        let zero = DirectionalLight::new(Vec3::ZERO).view_projection();
        let down = DirectionalLight::new(Vec3::NEG_Y).view_projection();
        assert!(zero.is_finite());
        assert_eq!(zero, down);

        let mut spot = SpotLight::with_half_angle(Vec3::Y, Attenuation::default(), Vec3::NEG_Y, 30.0);
        let expected = spot.view_projection();
        spot.cone_direction = Vec3::ZERO;
        let matrix = spot.view_projection();
        assert!(matrix.is_finite());
        assert_eq!(matrix, expected);
    }

    #[test]
    fn spot_fov_from_cutoff() {
        let spot = SpotLight::with_half_angle(Vec3::ZERO, Attenuation::default(), Vec3::NEG_Y, 30.0);
        assert!((spot.fov() - 60f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn unshadowed_light_takes_no_tiles() {
        let mut grid = AtlasGrid::default();
        let mut light = Light::point(Vec3::ONE, Vec3::ZERO, 1.0, Attenuation::default()).without_shadows();
        light.assign_shadow_tiles(&mut grid).unwrap();
        assert_eq!(grid.allocated(), 0);
        assert!(!light.has_shadow_tiles());
    }

    #[test]
    fn second_assignment_is_rejected() {
        let mut grid = AtlasGrid::default();
        let mut light = Light::directional(Vec3::ONE, Vec3::NEG_Y, 1.0);
        light.assign_shadow_tiles(&mut grid).unwrap();
        assert_eq!(light.assign_shadow_tiles(&mut grid), Err(AtlasError::AlreadyAssigned));
        assert_eq!(grid.allocated(), 1);
    }

    #[test]
    fn point_light_needs_two_free_tiles() {
        let mut grid = AtlasGrid::new(1024, 1);
        let mut light = Light::point(Vec3::ONE, Vec3::ZERO, 1.0, Attenuation::default());
        assert!(matches!(
            light.assign_shadow_tiles(&mut grid),
            Err(AtlasError::Exhausted { .. })
        ));
        assert_eq!(grid.allocated(), 0);
    }
}
