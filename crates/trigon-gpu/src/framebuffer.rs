//! Framebuffers binding swapchain image views to the render pass.

use crate::error::{GpuError, Result};
use ash::vk;

/// One framebuffer per swapchain image slot.
///
/// Rebuilt together with the swapchain; never patched in place.
pub struct Framebuffers {
    pub framebuffers: Vec<vk::Framebuffer>,
}

impl Framebuffers {
    /// Create a framebuffer for every image view.
    ///
    /// # Safety
    /// The device, render pass, and image views must be valid.
    pub unsafe fn new(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        image_views: &[vk::ImageView],
        extent: vk::Extent2D,
    ) -> Result<Self> {
        let mut framebuffers = Vec::with_capacity(image_views.len());

        for &view in image_views {
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(render_pass)
                .attachments(std::slice::from_ref(&view))
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            match device.create_framebuffer(&create_info, None) {
                Ok(framebuffer) => framebuffers.push(framebuffer),
                Err(e) => {
                    for &framebuffer in &framebuffers {
                        device.destroy_framebuffer(framebuffer, None);
                    }
                    return Err(GpuError::from(e));
                }
            }
        }

        Ok(Self { framebuffers })
    }

    /// Number of framebuffers, equal to the swapchain image count.
    pub fn len(&self) -> usize {
        self.framebuffers.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.framebuffers.is_empty()
    }

    /// Destroy all framebuffers.
    ///
    /// # Safety
    /// The device must be valid and the framebuffers must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        for &framebuffer in &self.framebuffers {
            device.destroy_framebuffer(framebuffer, None);
        }
    }
}
