//! Application runner and event loop.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::renderer::{Renderer, ShaderPaths};
use trigon_platform::{PlatformError, WindowConfig};

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Window title.
    pub title: String,
    /// Initial window width.
    pub width: u32,
    /// Initial window height.
    pub height: u32,
    /// Enable validation diagnostics (default: debug builds only).
    pub diagnostics: bool,
    /// Path to the compiled vertex shader.
    pub vertex_shader: PathBuf,
    /// Path to the compiled fragment shader.
    pub fragment_shader: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Trigon".to_string(),
            width: 800,
            height: 600,
            diagnostics: cfg!(debug_assertions),
            vertex_shader: PathBuf::from("shaders/triangle.vert.spv"),
            fragment_shader: PathBuf::from("shaders/triangle.frag.spv"),
        }
    }
}

impl AppConfig {
    /// Create a new config with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the window dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable validation diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Set the compiled shader locations.
    pub fn with_shaders(mut self, vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        self.vertex_shader = vertex.into();
        self.fragment_shader = fragment.into();
        self
    }

    fn window_config(&self) -> WindowConfig {
        WindowConfig {
            title: self.title.clone(),
            width: self.width,
            height: self.height,
            resizable: false,
        }
    }
}

/// Run the bootstrap chain with the given configuration.
///
/// Initializes logging, creates the window and the full rendering state,
/// then polls window events until close. Nothing is submitted to a queue in
/// this scope; the recorded command buffers are the end product.
pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("{} starting...", config.title);

    let event_loop =
        EventLoop::new().map_err(|e| PlatformError::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = AppRunner {
        config,
        state: None,
        init_error: None,
    };

    event_loop
        .run_app(&mut runner)
        .map_err(|e| PlatformError::EventLoop(e.to_string()))?;

    // A failed stage exits the loop; surface it as the run result so the
    // process reports a nonzero exit code.
    if let Some(e) = runner.init_error.take() {
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Internal application runner that implements winit's ApplicationHandler.
struct AppRunner {
    config: AppConfig,
    state: Option<AppState>,
    init_error: Option<anyhow::Error>,
}

/// Internal application state.
struct AppState {
    renderer: Renderer,
    // Declared after the renderer: the window (and its surface handles)
    // must outlive the renderer during teardown.
    #[allow(dead_code)]
    window: Arc<Window>,
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match self.create_state(event_loop) {
            Ok(state) => {
                info!(
                    "Renderer ready ({} swapchain images)",
                    state.renderer.image_count()
                );
                self.state = Some(state);
            }
            Err(e) => {
                error!("Failed to initialize renderer: {e}");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                // Tear the renderer down before the window goes away.
                self.state.take();
                event_loop.exit();
            }
            _ => {}
        }
    }
}

impl AppRunner {
    fn create_state(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let attrs = self.config.window_config().window_attributes();
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| PlatformError::WindowCreation(e.to_string()))?,
        );

        let shaders = ShaderPaths {
            vertex: self.config.vertex_shader.clone(),
            fragment: self.config.fragment_shader.clone(),
        };
        let renderer = Renderer::new(
            &window,
            &self.config.title,
            self.config.diagnostics,
            &shaders,
        )?;

        Ok(AppState { renderer, window })
    }
}
