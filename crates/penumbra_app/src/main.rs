use glam::{Vec3, Vec4};
use log::info;
use penumbra_core::{
    config::{DEFAULT_CONFIG_FILE, RendererConfig},
    light::{Attenuation, Light, SpotLight},
    time::Time,
    transform::Transform,
};
use penumbra_renderer::{DeferredRenderer, Material, MeshData, TextureData};
use penumbra_scene::{LightId, Moveable, Scene};
use penumbra_window::{SceneDriver, WindowError, run_penumbra_app};

const ORBIT_RADIUS: f32 = 4.0;
const ORBIT_SPEED: f32 = 0.6;

/// Ground plane, a ring of cubes and one light of each kind (two points).
#[derive(Default)]
struct DemoScene {
    orbiting: Option<LightId>,
}

impl SceneDriver for DemoScene {
    fn setup(&mut self, renderer: &mut DeferredRenderer, scene: &mut Scene) -> Result<(), WindowError> {
        // 1. Models
        let floor = renderer.create_model(
            &MeshData::plane(12.0, 6.0),
            &Material::textured(
                TextureData::checker(8, 32, [200, 200, 200, 255], [90, 90, 100, 255]),
                Vec4::splat(0.1),
            ),
        )?;
        let crate_model = renderer.create_model(
            &MeshData::cube(0.5),
            &Material::coloured(Vec4::new(0.8, 0.35, 0.2, 1.0), Vec4::splat(0.6)),
        )?;
        let pillar = renderer.create_model(
            &MeshData::cube(0.5),
            &Material::coloured(Vec4::new(0.3, 0.5, 0.85, 1.0), Vec4::splat(0.9)),
        )?;

        // 2. Entities
        scene.spawn(Transform::default(), floor);
        for i in 0..6 {
            let angle = (i as f32 * 60.0).to_radians();
            let position = Vec3::new(angle.cos() * 6.0, 0.5, angle.sin() * 6.0);
            scene.spawn(
                Transform::from_xyz(position.x, position.y, position.z)
                    .with_rotation(Vec3::new(0.0, i as f32 * 15.0, 0.0)),
                crate_model,
            );
        }
        scene.spawn(
            Transform::from_xyz(-2.5, 1.5, -2.0).with_scale(3.0),
            pillar,
        );
        scene.spawn_moveable(
            Transform::from_xyz(0.0, 1.2, 0.0).with_scale(1.5),
            crate_model,
            Moveable::spinning(Vec3::new(15.0, 45.0, 0.0)),
        );

        // 3. Lights
        let atlas = renderer.shadow_atlas_mut();
        scene.add_light(
            Light::directional(Vec3::new(1.0, 0.95, 0.85), Vec3::new(-0.4, -1.0, -0.3), 0.5),
            atlas,
        )?;
        let orbiting = scene.add_light(
            Light::point(
                Vec3::new(1.0, 0.6, 0.3),
                Vec3::new(ORBIT_RADIUS, 2.5, 0.0),
                1.5,
                Attenuation::default(),
            ),
            atlas,
        )?;
        scene.add_light(
            Light::point(
                Vec3::new(0.3, 0.6, 1.0),
                Vec3::new(3.0, 3.0, -4.0),
                1.2,
                Attenuation::new(1.0, 0.14, 0.07),
            ),
            atlas,
        )?;
        scene.add_light(
            Light::spot(
                Vec3::ONE,
                2.0,
                SpotLight::with_half_angle(
                    Vec3::new(-4.0, 7.0, 4.0),
                    Attenuation::new(1.0, 0.07, 0.017),
                    Vec3::new(0.5, -1.0, -0.5),
                    30.0,
                ),
            ),
            atlas,
        )?;
        self.orbiting = Some(orbiting);

        // 4. Camera
        let camera = scene.camera_mut();
        camera.position = Vec3::new(0.0, 6.0, 14.0);
        camera.rotation = Vec3::new(23.0, 0.0, 0.0);

        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, time: &Time) {
        let Some(id) = self.orbiting else {
            return;
        };
        let angle = time.elapsed_seconds() * ORBIT_SPEED;
        let position = Vec3::new(angle.cos() * ORBIT_RADIUS, 2.5, angle.sin() * ORBIT_RADIUS);
        if let Ok(mut light) = scene.light_mut(id) {
            light.set_position(position);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let config = match RendererConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    info!("Starting {} ({}x{})", config.window.title, config.window.width, config.window.height);
    if let Err(err) = run_penumbra_app(config, DemoScene::default()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
