//! Surface management for windowed rendering.
//!
//! Hides the raw-window-handle plumbing behind a small wrapper that owns
//! the surface handle and its extension loader.

use crate::error::{GpuError, Result};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// Owns the Vulkan surface and its extension loader.
pub struct SurfaceContext {
    /// The Vulkan surface handle.
    pub surface: vk::SurfaceKHR,
    /// Surface extension loader.
    pub surface_loader: ash::khr::surface::Instance,
}

impl SurfaceContext {
    /// Create a surface for a window.
    ///
    /// # Safety
    /// The instance must be valid and the window must outlive the surface.
    pub unsafe fn new<W>(entry: &ash::Entry, instance: &ash::Instance, window: &W) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let display = window
            .display_handle()
            .map_err(|e| GpuError::SurfaceCreation(format!("Failed to get display handle: {e}")))?;
        let window_handle = window
            .window_handle()
            .map_err(|e| GpuError::SurfaceCreation(format!("Failed to get window handle: {e}")))?;

        let surface = ash_window::create_surface(
            entry,
            instance,
            display.as_raw(),
            window_handle.as_raw(),
            None,
        )
        .map_err(|e| GpuError::SurfaceCreation(e.to_string()))?;

        let surface_loader = ash::khr::surface::Instance::new(entry, instance);

        Ok(Self {
            surface,
            surface_loader,
        })
    }

    /// Query the support snapshot for a physical device.
    ///
    /// # Safety
    /// The physical device must be valid.
    pub unsafe fn support(&self, physical_device: vk::PhysicalDevice) -> Result<SurfaceSupport> {
        let capabilities = self
            .surface_loader
            .get_physical_device_surface_capabilities(physical_device, self.surface)?;

        let formats = self
            .surface_loader
            .get_physical_device_surface_formats(physical_device, self.surface)?;

        let present_modes = self
            .surface_loader
            .get_physical_device_surface_present_modes(physical_device, self.surface)?;

        Ok(SurfaceSupport {
            capabilities,
            formats,
            present_modes,
        })
    }

    /// Destroy the surface.
    ///
    /// # Safety
    /// Every swapchain created against the surface must already be gone.
    pub unsafe fn destroy(&self) {
        self.surface_loader.destroy_surface(self.surface, None);
    }
}

/// Surface capability snapshot, immutable once queried.
pub struct SurfaceSupport {
    /// Raw surface capabilities.
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Supported surface formats.
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes.
    pub present_modes: Vec<vk::PresentModeKHR>,
}
