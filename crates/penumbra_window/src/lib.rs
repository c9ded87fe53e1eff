use std::sync::Arc;

use log::{error, info, warn};
use penumbra_core::{
    camera::Camera,
    config::RendererConfig,
    time::{FpsCounter, Time},
};
use penumbra_renderer::{DeferredRenderer, RenderError};
use penumbra_scene::{Scene, SceneError};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// What the application plugs into the runner.
pub trait SceneDriver {
    /// Called once, after the renderer exists. Upload models and register
    /// lights here.
    fn setup(&mut self, renderer: &mut DeferredRenderer, scene: &mut Scene) -> Result<(), WindowError>;

    /// Called every frame before the scene integrates its moveables.
    fn update(&mut self, _scene: &mut Scene, _time: &Time) {}
}

/// Keys the runner reacts to on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    NextDebugView,
    Exit,
}

fn key_action(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::F1 | KeyCode::Tab => Some(KeyAction::NextDebugView),
        KeyCode::Escape => Some(KeyAction::Exit),
        _ => None,
    }
}

/// Whether a failed frame ends the run.
fn is_fatal(err: &RenderError) -> bool {
    match err {
        RenderError::Surface(wgpu::SurfaceError::OutOfMemory) => true,
        RenderError::Surface(_) => false,
        _ => true,
    }
}

struct Running {
    window: Arc<Window>,
    renderer: DeferredRenderer,
    scene: Scene,
}

impl Running {
    fn render_frame(&mut self, delta_seconds: f32) -> Result<(), RenderError> {
        let frame = self.renderer.frame_context(delta_seconds);
        let scene = &self.scene;

        self.renderer
            .geometry_pass(scene.render_queue(), scene.camera(), &frame)?;
        self.renderer
            .shadow_pass(scene.render_queue(), scene.lights())?;

        let output = self.renderer.acquire_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .lighting_pass(&view, scene.lights(), scene.camera())?;

        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

// Holds the config and driver while waiting for the OS to hand us a window
struct PenumbraRunner<D: SceneDriver> {
    config: RendererConfig,
    driver: D,
    running: Option<Running>,
    time: Time,
    fps: FpsCounter,
    failure: Option<WindowError>,
}

impl<D: SceneDriver> PenumbraRunner<D> {
    fn new(config: RendererConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            running: None,
            time: Time::default(),
            fps: FpsCounter::default(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, WindowError> {
        let window_config = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let mut renderer = DeferredRenderer::new(window.clone(), &self.config)?;
        let mut scene = Scene::new(Camera::from_config(&self.config.camera));
        self.driver.setup(&mut renderer, &mut scene)?;
        scene.rebuild_render_queue();

        info!(
            "Scene ready: {} lights, {} render items",
            scene.lights().len(),
            scene.render_queue().len()
        );
        Ok(Running {
            window,
            renderer,
            scene,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: WindowError) {
        error!("{err}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        // 1. Tick the Clock
        self.time.update();
        let dt = self.time.delta_seconds();
        if let Some(fps) = self.fps.tick(dt) {
            running
                .window
                .set_title(&format!("{} ({fps:.0} fps)", self.config.window.title));
        }

        // 2. Advance the scene
        self.driver.update(&mut running.scene, &self.time);
        running.scene.update(dt);

        // 3. Geometry, shadows, lighting
        if let Err(err) = running.render_frame(dt) {
            running.renderer.abandon_frame();
            if is_fatal(&err) {
                self.fail(event_loop, err.into());
                return;
            }
            warn!("Skipping frame: {err}");
        }

        running.window.request_redraw();
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match key_action(code) {
            Some(KeyAction::NextDebugView) => {
                if let Some(running) = self.running.as_mut() {
                    let next = running.renderer.debug_view().next();
                    running.renderer.set_debug_view(next);
                }
            }
            Some(KeyAction::Exit) => event_loop.exit(),
            None => {}
        }
    }

    fn finish(mut self) -> Result<(), WindowError> {
        if let Some(running) = self.running.take() {
            running.renderer.shutdown();
        }
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<D: SceneDriver> ApplicationHandler for PenumbraRunner<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.time = Time::default();
                self.running = Some(running);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = self.running.as_mut() {
                    running.renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.on_key(event_loop, code),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }
}

/// Opens the window and drives `driver` until the window closes.
pub fn run_penumbra_app<D: SceneDriver>(config: RendererConfig, driver: D) -> Result<(), WindowError> {
    let event_loop = EventLoop::new()?;

    // Poll keeps frames coming even without OS events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = PenumbraRunner::new(config, driver);
    event_loop.run_app(&mut runner)?;
    runner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_surface_skips_frame() {
        assert!(!is_fatal(&RenderError::Surface(wgpu::SurfaceError::Lost)));
        assert!(!is_fatal(&RenderError::Surface(wgpu::SurfaceError::Outdated)));
        assert!(!is_fatal(&RenderError::Surface(wgpu::SurfaceError::Timeout)));
    }

    #[test]
    fn out_of_memory_is_fatal() {
        assert!(is_fatal(&RenderError::Surface(wgpu::SurfaceError::OutOfMemory)));
    }

    #[test]
    fn pass_order_is_fatal() {
        use penumbra_renderer::Pass;
        assert!(is_fatal(&RenderError::PassOrder {
            expected: Pass::Geometry,
            requested: Pass::Lighting,
        }));
    }

    #[test]
    fn debug_keys() {
        assert_eq!(key_action(KeyCode::F1), Some(KeyAction::NextDebugView));
        assert_eq!(key_action(KeyCode::Tab), Some(KeyAction::NextDebugView));
        assert_eq!(key_action(KeyCode::Escape), Some(KeyAction::Exit));
        assert_eq!(key_action(KeyCode::KeyW), None);
    }
}
