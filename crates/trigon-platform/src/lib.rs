//! Platform abstraction for the Trigon renderer.
//!
//! Window configuration glue over winit; the GPU layer consumes the window
//! only through its raw handles.

use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowAttributes};

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Window creation failed: {0}")]
    WindowCreation(String),
    #[error("Event loop error: {0}")]
    EventLoop(String),
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Trigon".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

impl WindowConfig {
    /// Build winit window attributes from this configuration.
    pub fn window_attributes(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height))
            .with_resizable(self.resizable)
    }
}
