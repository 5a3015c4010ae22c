//! Trigon triangle demo.
//!
//! Brings up the full Vulkan bootstrap chain (instance, device, swapchain,
//! pipeline, framebuffers, recorded command buffers) against a window, then
//! polls events until the window closes. No frame is submitted or
//! presented; the initialized, recorded state is the end product.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p trigon-viewer
//! ```
//!
//! The pipeline reads compiled SPIR-V from `shaders/triangle.vert.spv` and
//! `shaders/triangle.frag.spv` relative to the working directory. Compile
//! the GLSL sources shipped next to this binary with:
//!
//! ```bash
//! glslangValidator -V shaders/triangle.vert -o shaders/triangle.vert.spv
//! glslangValidator -V shaders/triangle.frag -o shaders/triangle.frag.spv
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g. info, debug, trace)

use trigon_app::{run_app, AppConfig};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn main() -> anyhow::Result<()> {
    run_app(AppConfig::new("Trigon Triangle").with_size(WIDTH, HEIGHT))
}
