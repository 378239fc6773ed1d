// app.rs
use std::collections::HashSet;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::asset::AssetPaths;
use crate::renderer::{GpuBackend, Renderer, RenderingMode, WgpuBackend};
use crate::scene::{CameraMovement, Scene};
use crate::settings::RenderSettings;
use crate::time::FrameClock;

/// Shared state handed to scene setup and the frame loop.
pub struct AppContext {
    pub settings: RenderSettings,
    pub assets: AssetPaths,
    pub clock: FrameClock,
}

impl AppContext {
    pub fn new(settings: RenderSettings, assets: AssetPaths) -> Self {
        Self {
            settings,
            assets,
            clock: FrameClock::new(),
        }
    }

    /// Reads `settings.json` and the asset manifest it names.
    pub fn load() -> Self {
        let settings = RenderSettings::load();
        let assets = AssetPaths::load_from_path(&settings.assets);
        Self::new(settings, assets)
    }
}

/// Builds the scene once the GPU is up. Receives the backend for shader and
/// texture creation and the window's aspect ratio.
pub type SceneBuilder = fn(&mut dyn GpuBackend, &AppContext, f32) -> Scene;

const MOVEMENT_KEYS: [(KeyCode, CameraMovement); 4] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
];

const SCROLL_SPEED_STEP: f32 = 5.0;

struct Running {
    window: Arc<Window>,
    renderer: Renderer<WgpuBackend>,
    scene: Scene,
}

#[derive(Default)]
struct InputState {
    held: HashSet<KeyCode>,
    looking: bool,
}

pub struct App {
    ctx: AppContext,
    build_scene: SceneBuilder,
    running: Option<Running>,
    input: InputState,
}

impl App {
    pub fn new(ctx: AppContext, build_scene: SceneBuilder) -> Self {
        Self {
            ctx,
            build_scene,
            running: None,
            input: InputState::default(),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) {
        let settings = &self.ctx.settings;
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(settings.title.clone())
                    .with_inner_size(PhysicalSize::new(
                        settings.resolution.width,
                        settings.resolution.height,
                    )),
            )
            .expect("create window");
        let window = Arc::new(window);

        let backend = match pollster::block_on(WgpuBackend::new(window.clone(), settings)) {
            Ok(backend) => backend,
            Err(err) => {
                log::error!("Failed to initialise GPU: {}", err);
                event_loop.exit();
                return;
            }
        };

        let mut renderer = Renderer::new(backend, settings.rendering_mode);
        let aspect = renderer.backend().aspect_ratio();
        let scene = (self.build_scene)(renderer.backend_mut(), &self.ctx, aspect);
        log::info!("Scene ready with {} objects", scene.len());

        window.request_redraw();
        self.running = Some(Running {
            window,
            renderer,
            scene,
        });
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let dt = self.ctx.clock.update();
        let camera = running.scene.camera_mut();
        for (key, movement) in MOVEMENT_KEYS {
            if self.input.held.contains(&key) {
                camera.process_movement_input(movement, dt);
            }
        }

        running.scene.process(dt);
        if let Err(err) = running.renderer.render(&mut running.scene) {
            log::error!("Fatal render error: {}", err);
            event_loop.exit();
            return;
        }

        running.window.request_redraw();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, state: ElementState) {
        if state == ElementState::Released {
            self.input.held.remove(&code);
            return;
        }
        self.input.held.insert(code);

        let mode = match code {
            KeyCode::Escape => {
                event_loop.exit();
                return;
            }
            KeyCode::F1 => RenderingMode::Default,
            KeyCode::F2 => RenderingMode::DebugLine,
            KeyCode::F3 => RenderingMode::DebugFill,
            _ => return,
        };
        if let Some(running) = self.running.as_mut() {
            running.renderer.configure_mode(mode);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_none() {
            self.start(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.running.as_ref().map(|r| r.window.id()) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(running) = self.running.as_mut() {
                    running.renderer.backend_mut().resize(size);
                    let aspect = running.renderer.backend().aspect_ratio();
                    running.scene.camera_mut().set_aspect_ratio(aspect);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code, state),
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.input.looking = state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                if let Some(running) = self.running.as_mut() {
                    running
                        .scene
                        .camera_mut()
                        .add_movement_speed(lines * SCROLL_SPEED_STEP);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let DeviceEvent::MouseMotion { delta: (dx, dy) } = event else {
            return;
        };
        if !self.input.looking {
            return;
        }
        if let Some(running) = self.running.as_mut() {
            // Screen y grows downwards.
            running
                .scene
                .camera_mut()
                .process_rotation_input(dx as f32, -dy as f32);
        }
    }
}
