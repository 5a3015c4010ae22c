//! Renderer bootstrap: the full construction chain and ordered teardown.
//!
//! Construction runs strictly in dependency order: context (instance,
//! surface, device), then swapchain, then pipeline, then framebuffers,
//! then command buffers. Teardown is the exact reverse, enforced by `Drop`.

use std::path::PathBuf;

use tracing::info;
use trigon_gpu::{
    load_spirv, FrameCommands, Framebuffers, GpuContext, GpuContextBuilder, Result, Swapchain,
    TrianglePipeline,
};
use winit::window::Window;

/// Compiled shader locations for the pipeline.
#[derive(Debug, Clone)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

/// Fully-initialized rendering state.
pub struct Renderer {
    gpu: GpuContext,
    swapchain: Swapchain,
    pipeline: TrianglePipeline,
    framebuffers: Framebuffers,
    commands: FrameCommands,
}

impl Renderer {
    /// Run the full initialization chain against a window.
    ///
    /// A failure at any stage releases everything the earlier stages
    /// acquired, newest first, before the error returns.
    pub fn new(
        window: &Window,
        app_name: &str,
        diagnostics: bool,
        shaders: &ShaderPaths,
    ) -> Result<Self> {
        let gpu = GpuContextBuilder::new()
            .app_name(app_name)
            .diagnostics(diagnostics)
            .build(window)?;

        let size = window.inner_size();
        // SAFETY: The context was just created and is valid
        let swapchain = unsafe { Swapchain::new(&gpu, size.width.max(1), size.height.max(1)) }?;

        info!(
            "Swapchain created: {}x{} ({} images)",
            swapchain.extent.width,
            swapchain.extent.height,
            swapchain.image_count()
        );

        let frame_state = unsafe { Self::build_frame_state(&gpu, &swapchain, shaders) };
        let (pipeline, framebuffers, commands) = match frame_state {
            Ok(frame_state) => frame_state,
            Err(e) => {
                // SAFETY: Nothing depends on the swapchain yet
                unsafe { swapchain.destroy(&gpu) };
                return Err(e);
            }
        };

        info!("Recorded {} command buffers", commands.buffers().len());

        Ok(Self {
            gpu,
            swapchain,
            pipeline,
            framebuffers,
            commands,
        })
    }

    /// Build the swapchain-dependent stages.
    ///
    /// # Safety
    /// The context and swapchain must be valid.
    unsafe fn build_frame_state(
        gpu: &GpuContext,
        swapchain: &Swapchain,
        shaders: &ShaderPaths,
    ) -> Result<(TrianglePipeline, Framebuffers, FrameCommands)> {
        let vertex_spirv = load_spirv(&shaders.vertex)?;
        let fragment_spirv = load_spirv(&shaders.fragment)?;

        let device = gpu.device();
        // SAFETY: Caller guarantees the context and swapchain are valid
        let pipeline = unsafe {
            TrianglePipeline::new(
                device,
                swapchain.format,
                swapchain.extent,
                &vertex_spirv,
                &fragment_spirv,
            )?
        };

        // SAFETY: Device, render pass, and image views are valid
        let framebuffers = match unsafe {
            Framebuffers::new(
                device,
                pipeline.render_pass,
                &swapchain.image_views,
                swapchain.extent,
            )
        } {
            Ok(framebuffers) => framebuffers,
            Err(e) => {
                // SAFETY: The pipeline was just created and is not in use
                unsafe { pipeline.destroy(device) };
                return Err(e);
            }
        };

        // SAFETY: All handles are valid
        let commands = match unsafe {
            FrameCommands::record(
                device,
                gpu.graphics_family(),
                &pipeline,
                &framebuffers,
                swapchain.extent,
            )
        } {
            Ok(commands) => commands,
            Err(e) => {
                // SAFETY: Neither object is in use yet
                unsafe {
                    framebuffers.destroy(device);
                    pipeline.destroy(device);
                }
                return Err(e);
            }
        };

        Ok((pipeline, framebuffers, commands))
    }

    /// Number of swapchain image slots (and framebuffers and command
    /// buffers; the three counts always match).
    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Last acquired, first released. The context then destroys the
        // surface, device, and instance when it drops.
        let device = self.gpu.device();
        // SAFETY: The device is idle and no recorded work was ever submitted
        unsafe {
            let _ = self.gpu.wait_idle();
            self.commands.destroy(device);
            self.framebuffers.destroy(device);
            self.pipeline.destroy(device);
            self.swapchain.destroy(&self.gpu);
        }
    }
}
