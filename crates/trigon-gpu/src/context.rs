//! GPU context management.

use crate::capabilities::{
    device_name, query_queue_families, required_device_extensions, select_physical_device,
    QueueFamilySelection,
};
use crate::debug::DebugMessenger;
use crate::error::{GpuError, Result};
use crate::instance::create_instance;
use crate::surface::SurfaceContext;
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::collections::HashSet;

/// Main GPU context holding the instance, surface, and logical device.
///
/// Dependent objects (swapchain, pipeline, command buffers) hold non-owning
/// references and must be destroyed before the context drops.
pub struct GpuContext {
    // Entry must be kept alive for the lifetime of the context
    #[allow(dead_code)]
    pub(crate) entry: ash::Entry,
    pub(crate) instance: ash::Instance,
    pub(crate) debug: Option<DebugMessenger>,
    pub(crate) surface: SurfaceContext,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) device: ash::Device,
    pub(crate) swapchain_loader: ash::khr::swapchain::Device,

    // Queue families and queues
    pub(crate) graphics_family: u32,
    pub(crate) present_family: u32,
    pub(crate) graphics_queue: vk::Queue,
    pub(crate) present_queue: vk::Queue,
}

impl GpuContext {
    /// Get the Vulkan device handle.
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    /// Get the Vulkan instance handle.
    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    /// Get the physical device handle.
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Get the surface context.
    pub fn surface(&self) -> &SurfaceContext {
        &self.surface
    }

    /// Get the swapchain extension loader.
    pub fn swapchain_loader(&self) -> &ash::khr::swapchain::Device {
        &self.swapchain_loader
    }

    /// Get the graphics queue family index.
    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    /// Get the present queue family index.
    pub fn present_family(&self) -> u32 {
        self.present_family
    }

    /// Get the graphics queue.
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Get the present queue. May be the same queue object as graphics when
    /// the families coincide.
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Wait for the device to be idle.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle()?;
        }
        Ok(())
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();

            // Dependents must already be gone. Surface before device,
            // device before instance.
            self.surface.destroy();
            self.device.destroy_device(None);
            if let Some(debug) = &self.debug {
                debug.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Builder for creating a GPU context.
pub struct GpuContextBuilder {
    app_name: String,
    diagnostics: bool,
}

impl Default for GpuContextBuilder {
    fn default() -> Self {
        Self {
            app_name: "Trigon".to_string(),
            diagnostics: cfg!(debug_assertions),
        }
    }
}

impl GpuContextBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Enable or disable validation diagnostics.
    pub fn diagnostics(mut self, enable: bool) -> Self {
        self.diagnostics = enable;
        self
    }

    /// Build the GPU context against a window.
    ///
    /// The surface is created before device selection because present
    /// support is queried per queue family against it. A failure at any
    /// stage releases everything acquired so far, newest first.
    pub fn build<W>(self, window: &W) -> Result<GpuContext>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        // Load Vulkan entry point
        let entry = unsafe { ash::Entry::load() }
            .map_err(|e| GpuError::Other(format!("Failed to load Vulkan: {e}")))?;

        let instance = unsafe { create_instance(&entry, &self.app_name, self.diagnostics) }?;

        let debug = if self.diagnostics {
            match unsafe { DebugMessenger::new(&entry, &instance) } {
                Ok(messenger) => Some(messenger),
                Err(e) => {
                    unsafe { release_partial(&instance, None, None) };
                    return Err(e);
                }
            }
        } else {
            None
        };

        let surface = match unsafe { SurfaceContext::new(&entry, &instance, window) } {
            Ok(surface) => surface,
            Err(e) => {
                unsafe { release_partial(&instance, debug.as_ref(), None) };
                return Err(e);
            }
        };

        let selected = unsafe {
            select_physical_device(&instance, &surface.surface_loader, surface.surface).and_then(
                |physical_device| {
                    let families = query_queue_families(
                        &instance,
                        physical_device,
                        &surface.surface_loader,
                        surface.surface,
                    )?;
                    let selection = QueueFamilySelection::scan(&families);
                    let graphics = selection.graphics.ok_or(GpuError::NoSuitableDevice)?;
                    let present = selection.present.ok_or(GpuError::NoSuitableDevice)?;
                    Ok((physical_device, graphics, present))
                },
            )
        };
        let (physical_device, graphics_family, present_family) = match selected {
            Ok(selected) => selected,
            Err(e) => {
                unsafe { release_partial(&instance, debug.as_ref(), Some(&surface)) };
                return Err(e);
            }
        };

        tracing::info!("Selected GPU: {}", unsafe {
            device_name(&instance, physical_device)
        });

        let device = match unsafe {
            create_device(&instance, physical_device, graphics_family, present_family)
        } {
            Ok(device) => device,
            Err(e) => {
                unsafe { release_partial(&instance, debug.as_ref(), Some(&surface)) };
                return Err(e);
            }
        };

        // Get queue handles
        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };

        let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

        Ok(GpuContext {
            entry,
            instance,
            debug,
            surface,
            physical_device,
            device,
            swapchain_loader,
            graphics_family,
            present_family,
            graphics_queue,
            present_queue,
        })
    }
}

/// Release partially-constructed instance-level state, newest first.
///
/// # Safety
/// The handles must be valid and unused.
unsafe fn release_partial(
    instance: &ash::Instance,
    debug: Option<&DebugMessenger>,
    surface: Option<&SurfaceContext>,
) {
    if let Some(surface) = surface {
        surface.destroy();
    }
    if let Some(debug) = debug {
        debug.destroy();
    }
    instance.destroy_instance(None);
}

/// Create the logical device.
///
/// One queue-create entry per unique family index, each requesting a single
/// queue at priority 1.0. Additional concurrency comes from additional
/// command buffers, not additional queues.
///
/// # Safety
/// The instance and physical device must be valid.
unsafe fn create_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    graphics_family: u32,
    present_family: u32,
) -> Result<ash::Device> {
    // Collect unique queue families
    let mut unique_families = HashSet::new();
    unique_families.insert(graphics_family);
    unique_families.insert(present_family);

    let queue_priority = 1.0_f32;
    let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = unique_families
        .iter()
        .map(|&family| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(family)
                .queue_priorities(std::slice::from_ref(&queue_priority))
        })
        .collect();

    let extensions = required_device_extensions();
    let extension_names: Vec<*const i8> = extensions.iter().map(|ext| ext.as_ptr()).collect();

    let features = vk::PhysicalDeviceFeatures::default();

    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&extension_names)
        .enabled_features(&features);

    let device = instance
        .create_device(physical_device, &device_create_info, None)
        .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

    Ok(device)
}
