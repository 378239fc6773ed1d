pub mod app;
pub mod asset;
pub mod error;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod time;

use app::{App, AppContext, SceneBuilder};
use winit::event_loop::EventLoop;

pub use error::{BackendError, ModelError, RenderError, TextureError};

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Opens a window and renders the scene produced by `build_scene` until the
/// window closes or a frame fails.
pub fn run(build_scene: SceneBuilder) -> Result<(), winit::error::EventLoopError> {
    init_logging();

    log::info!("Starting instanced renderer");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(AppContext::load(), build_scene);

    let result = event_loop.run_app(&mut app);

    if let Err(ref err) = result {
        log::error!("Application error: {}", err);
    }

    log::info!("Application shutdown complete");

    result
}
