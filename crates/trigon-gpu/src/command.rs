//! Command pool and per-image command recording.

use crate::error::{GpuError, Result};
use crate::framebuffer::Framebuffers;
use crate::pipeline::TrianglePipeline;
use ash::vk;

/// Clear color for the bootstrap pass: opaque black.
const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Command pool for allocating command buffers.
pub struct CommandPool {
    pool: vk::CommandPool,
    queue_family: u32,
}

impl CommandPool {
    /// Create a new command pool.
    ///
    /// # Safety
    /// The device must be valid and the queue family must exist.
    pub unsafe fn new(
        device: &ash::Device,
        queue_family: u32,
        flags: vk::CommandPoolCreateFlags,
    ) -> Result<Self> {
        let create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family)
            .flags(flags);

        let pool = device
            .create_command_pool(&create_info, None)
            .map_err(|e| GpuError::CommandRecording(e.to_string()))?;

        Ok(Self { pool, queue_family })
    }

    /// Get the raw pool handle.
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }

    /// Get the queue family index.
    pub fn queue_family(&self) -> u32 {
        self.queue_family
    }

    /// Allocate primary command buffers.
    ///
    /// # Safety
    /// The device must be valid.
    pub unsafe fn allocate_command_buffers(
        &self,
        device: &ash::Device,
        count: u32,
    ) -> Result<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        let buffers = device
            .allocate_command_buffers(&alloc_info)
            .map_err(|e| GpuError::CommandRecording(e.to_string()))?;

        Ok(buffers)
    }

    /// Destroy the command pool.
    ///
    /// # Safety
    /// The device must be valid and the pool's buffers must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_command_pool(self.pool, None);
    }
}

/// Pre-recorded drawing commands, one buffer per swapchain image.
///
/// Buffers are recorded once at setup time and stay read-only until the
/// pool is destroyed; nothing re-records per displayed frame.
pub struct FrameCommands {
    pool: CommandPool,
    buffers: Vec<vk::CommandBuffer>,
}

impl FrameCommands {
    /// Allocate and record one draw buffer per framebuffer.
    ///
    /// The pool is created against the graphics queue family. A recording
    /// failure destroys the pool (and with it the buffers) before returning.
    ///
    /// # Safety
    /// All handles must be valid.
    pub unsafe fn record(
        device: &ash::Device,
        graphics_family: u32,
        pipeline: &TrianglePipeline,
        framebuffers: &Framebuffers,
        extent: vk::Extent2D,
    ) -> Result<Self> {
        let pool = CommandPool::new(device, graphics_family, vk::CommandPoolCreateFlags::empty())?;

        let buffers = match pool.allocate_command_buffers(device, framebuffers.len() as u32) {
            Ok(buffers) => buffers,
            Err(e) => {
                pool.destroy(device);
                return Err(e);
            }
        };

        for (&cmd, &framebuffer) in buffers.iter().zip(&framebuffers.framebuffers) {
            if let Err(e) = record_draw(device, cmd, pipeline, framebuffer, extent) {
                pool.destroy(device);
                return Err(e);
            }
        }

        Ok(Self { pool, buffers })
    }

    /// Recorded command buffers, one per swapchain image.
    pub fn buffers(&self) -> &[vk::CommandBuffer] {
        &self.buffers
    }

    /// Free the buffers, then destroy the pool.
    ///
    /// # Safety
    /// The device must be valid and no buffer may be pending execution.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.free_command_buffers(self.pool.handle(), &self.buffers);
        self.pool.destroy(device);
    }
}

/// Record the fixed draw sequence: clear to black, bind the pipeline, draw
/// one instance of three vertices with no vertex buffers bound.
///
/// # Safety
/// All handles must be valid.
unsafe fn record_draw(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    pipeline: &TrianglePipeline,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
) -> Result<()> {
    let begin_info = vk::CommandBufferBeginInfo::default();
    device
        .begin_command_buffer(cmd, &begin_info)
        .map_err(|e| GpuError::CommandRecording(e.to_string()))?;

    let clear_value = vk::ClearValue {
        color: vk::ClearColorValue {
            float32: CLEAR_COLOR,
        },
    };

    let render_pass_begin = vk::RenderPassBeginInfo::default()
        .render_pass(pipeline.render_pass)
        .framebuffer(framebuffer)
        .render_area(vk::Rect2D::default().extent(extent))
        .clear_values(std::slice::from_ref(&clear_value));

    device.cmd_begin_render_pass(cmd, &render_pass_begin, vk::SubpassContents::INLINE);
    device.cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, pipeline.pipeline);
    device.cmd_draw(cmd, 3, 1, 0, 0);
    device.cmd_end_render_pass(cmd);

    device
        .end_command_buffer(cmd)
        .map_err(|e| GpuError::CommandRecording(e.to_string()))?;

    Ok(())
}
