//! Application framework for the Trigon renderer.
//!
//! Wires the window, the GPU bootstrap chain, and the event loop together.

pub mod renderer;
pub mod runner;

pub use renderer::{Renderer, ShaderPaths};
pub use runner::{run_app, AppConfig};
