//! Swapchain negotiation and management.
//!
//! Format, present mode, extent, image count, and sharing mode are each
//! negotiated by a pure function over the queried surface snapshot, then
//! fixed for the lifetime of the chain. A change to any of them means
//! rebuilding the chain and everything that depends on it; there is no
//! partial-update path.

use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use ash::vk;

/// Swapchain wrapper owning the presentable images and their views.
pub struct Swapchain {
    pub swapchain: vk::SwapchainKHR,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
}

impl Swapchain {
    /// Negotiate and create a swapchain for the context's surface.
    ///
    /// `width`/`height` is the framebuffer pixel size, consulted only when
    /// the surface leaves the extent to the application.
    ///
    /// # Safety
    /// The context must be valid.
    pub unsafe fn new(gpu: &GpuContext, width: u32, height: u32) -> Result<Self> {
        let support = gpu.surface().support(gpu.physical_device())?;
        if support.formats.is_empty() || support.present_modes.is_empty() {
            return Err(GpuError::SwapchainCreation(
                "Surface reports no formats or present modes".to_string(),
            ));
        }

        let surface_format = select_surface_format(&support.formats);
        let present_mode = select_present_mode(&support.present_modes);
        let extent = calculate_extent(&support.capabilities, width, height);
        let image_count = select_image_count(&support.capabilities);
        let (sharing_mode, family_indices) =
            select_sharing_mode(gpu.graphics_family(), gpu.present_family());

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(gpu.surface().surface)
            .min_image_count(image_count)
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&family_indices)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);

        let swapchain = gpu
            .swapchain_loader()
            .create_swapchain(&create_info, None)
            .map_err(|e| GpuError::SwapchainCreation(e.to_string()))?;

        // Get swapchain images
        let images = match gpu.swapchain_loader().get_swapchain_images(swapchain) {
            Ok(images) => images,
            Err(e) => {
                gpu.swapchain_loader().destroy_swapchain(swapchain, None);
                return Err(GpuError::from(e));
            }
        };

        // One view per image; a mid-creation failure releases the views made
        // so far together with the swapchain.
        let mut image_views = Vec::with_capacity(images.len());
        for &image in &images {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(surface_format.format)
                .components(vk::ComponentMapping::default())
                .subresource_range(
                    vk::ImageSubresourceRange::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .base_mip_level(0)
                        .level_count(1)
                        .base_array_layer(0)
                        .layer_count(1),
                );

            match gpu.device().create_image_view(&view_info, None) {
                Ok(view) => image_views.push(view),
                Err(e) => {
                    for &view in &image_views {
                        gpu.device().destroy_image_view(view, None);
                    }
                    gpu.swapchain_loader().destroy_swapchain(swapchain, None);
                    return Err(GpuError::from(e));
                }
            }
        }

        Ok(Self {
            swapchain,
            images,
            image_views,
            format: surface_format.format,
            extent,
        })
    }

    /// Number of presentable image slots.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Destroy the swapchain and its image views.
    ///
    /// # Safety
    /// Dependent framebuffers and command buffers must already be gone.
    pub unsafe fn destroy(&self, gpu: &GpuContext) {
        for &view in &self.image_views {
            gpu.device().destroy_image_view(view, None);
        }
        gpu.swapchain_loader().destroy_swapchain(self.swapchain, None);
    }
}

/// Select the surface format: 8-bit BGRA with non-linear sRGB when
/// available, otherwise the first reported format.
pub fn select_surface_format(available: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    for format in available {
        if format.format == vk::Format::B8G8R8A8_SRGB
            && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        {
            return *format;
        }
    }

    // Fall back to first available
    available[0]
}

/// Select the present mode: low-latency mailbox when available, otherwise
/// the universally-supported FIFO.
pub fn select_present_mode(available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    for &mode in available {
        if mode == vk::PresentModeKHR::MAILBOX {
            return mode;
        }
    }

    vk::PresentModeKHR::FIFO
}

/// Calculate the swapchain extent.
///
/// A current extent width of `u32::MAX` means the surface takes its size
/// from the swapchain; clamp the framebuffer size elementwise into the
/// supported range. Any other value is used verbatim.
pub fn calculate_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    desired_width: u32,
    desired_height: u32,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: desired_width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: desired_height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }
    }
}

/// Determine the image count: one above the minimum for headroom, clamped
/// to the maximum when the surface advertises one (0 means unbounded).
pub fn select_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let mut image_count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && image_count > capabilities.max_image_count {
        image_count = capabilities.max_image_count;
    }
    image_count
}

/// Sharing across the graphics and present queues: concurrent with both
/// families listed when they differ, exclusive otherwise. Concurrent access
/// trades bandwidth for not needing an ownership-transfer barrier.
pub fn select_sharing_mode(graphics_family: u32, present_family: u32) -> (vk::SharingMode, Vec<u32>) {
    if graphics_family == present_family {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    } else {
        (
            vk::SharingMode::CONCURRENT,
            vec![graphics_family, present_family],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space,
        }
    }

    #[test]
    fn preferred_format_wins() {
        let available = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let selected = select_surface_format(&available);
        assert_eq!(selected.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(selected.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn falls_back_to_first_format() {
        let available = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let selected = select_surface_format(&available);
        assert_eq!(selected.format, vk::Format::R8G8B8A8_UNORM);
    }

    #[test]
    fn format_selection_is_idempotent() {
        let available = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let first = select_surface_format(&available);
        let second = select_surface_format(&available);
        assert_eq!(first.format, second.format);
        assert_eq!(first.color_space, second.color_space);
    }

    #[test]
    fn mailbox_preferred_when_available() {
        let available = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(select_present_mode(&available), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn fifo_fallback_without_mailbox() {
        let available = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO];
        assert_eq!(select_present_mode(&available), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn fixed_extent_is_used_verbatim() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1920,
                height: 1080,
            },
            ..Default::default()
        };
        let extent = calculate_extent(&capabilities, 640, 480);
        assert_eq!(extent.width, 1920);
        assert_eq!(extent.height, 1080);
    }

    #[test]
    fn window_extent_is_clamped_elementwise() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 200,
                height: 200,
            },
            max_image_extent: vk::Extent2D {
                width: 1000,
                height: 1000,
            },
            ..Default::default()
        };
        let extent = calculate_extent(&capabilities, 4000, 50);
        assert_eq!(extent.width, 1000);
        assert_eq!(extent.height, 200);
    }

    #[test]
    fn image_count_has_headroom_above_minimum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            ..Default::default()
        };
        assert_eq!(select_image_count(&capabilities), 3);
    }

    #[test]
    fn image_count_clamped_to_advertised_maximum() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(select_image_count(&capabilities), 3);
    }

    #[test]
    fn zero_maximum_means_unbounded() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            min_image_count: 4,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(select_image_count(&capabilities), 5);
    }

    #[test]
    fn same_family_shares_exclusively() {
        let (mode, families) = select_sharing_mode(2, 2);
        assert_eq!(mode, vk::SharingMode::EXCLUSIVE);
        assert!(families.is_empty());
    }

    #[test]
    fn split_families_share_concurrently() {
        let (mode, families) = select_sharing_mode(0, 1);
        assert_eq!(mode, vk::SharingMode::CONCURRENT);
        assert_eq!(families, vec![0, 1]);
    }
}
