//! Vulkan bootstrap layer for the Trigon renderer.
//!
//! This crate provides:
//! - Vulkan instance and logical device management
//! - GPU suitability and queue-family negotiation
//! - Swapchain negotiation and per-image views
//! - Render pass, graphics pipeline, and framebuffers
//! - Per-image command recording

pub mod capabilities;
pub mod command;
pub mod context;
pub mod debug;
pub mod error;
pub mod framebuffer;
pub mod instance;
pub mod pipeline;
pub mod shader;
pub mod surface;
pub mod swapchain;

pub use capabilities::{QueueFamilyInfo, QueueFamilySelection};
pub use command::{CommandPool, FrameCommands};
pub use context::{GpuContext, GpuContextBuilder};
pub use error::{GpuError, Result};
pub use framebuffer::Framebuffers;
pub use pipeline::TrianglePipeline;
pub use shader::load_spirv;
pub use surface::{SurfaceContext, SurfaceSupport};
pub use swapchain::Swapchain;
