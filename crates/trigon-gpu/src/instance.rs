//! Vulkan instance creation.

use crate::error::{GpuError, Result};
use ash::vk;
use std::ffi::{CStr, CString};

/// Required instance extensions for windowed rendering.
pub fn required_instance_extensions(enable_diagnostics: bool) -> Vec<&'static CStr> {
    let mut extensions = vec![
        ash::khr::surface::NAME,
        #[cfg(target_os = "windows")]
        ash::khr::win32_surface::NAME,
        #[cfg(target_os = "linux")]
        ash::khr::xlib_surface::NAME,
        #[cfg(target_os = "linux")]
        ash::khr::wayland_surface::NAME,
        #[cfg(target_os = "macos")]
        ash::ext::metal_surface::NAME,
        #[cfg(target_os = "macos")]
        ash::khr::portability_enumeration::NAME,
    ];

    if enable_diagnostics {
        extensions.push(ash::ext::debug_utils::NAME);
    }

    extensions
}

/// Validation layers enabled when diagnostics are requested.
pub fn validation_layers() -> Vec<&'static CStr> {
    vec![
        // Standard validation layer
        c"VK_LAYER_KHRONOS_validation",
    ]
}

/// Check that every requested layer is installed.
///
/// # Safety
/// The entry must be a valid Vulkan entry point.
unsafe fn check_layer_support(entry: &ash::Entry, layers: &[&CStr]) -> Result<()> {
    let available = entry.enumerate_instance_layer_properties()?;

    for layer in layers {
        let found = available
            .iter()
            .any(|props| CStr::from_ptr(props.layer_name.as_ptr()) == *layer);
        if !found {
            return Err(GpuError::ValidationUnavailable);
        }
    }

    Ok(())
}

/// Create a Vulkan instance.
///
/// Requested validation layers that are not installed are a hard error, not
/// a silent downgrade.
///
/// # Safety
/// The entry must be a valid Vulkan entry point.
pub unsafe fn create_instance(
    entry: &ash::Entry,
    app_name: &str,
    enable_diagnostics: bool,
) -> Result<ash::Instance> {
    let app_name = CString::new(app_name).unwrap();
    let engine_name = CString::new("Trigon").unwrap();

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 0, 1, 0))
        .engine_name(&engine_name)
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_0);

    // Collect layer names
    let layers = if enable_diagnostics {
        validation_layers()
    } else {
        vec![]
    };
    check_layer_support(entry, &layers)?;

    // Collect extension names
    let extension_names: Vec<*const i8> = required_instance_extensions(enable_diagnostics)
        .iter()
        .map(|ext| ext.as_ptr())
        .collect();

    let layer_names: Vec<*const i8> = layers.iter().map(|l| l.as_ptr()).collect();

    // Required for MoltenVK on macOS
    #[cfg(target_os = "macos")]
    let create_flags = vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
    #[cfg(not(target_os = "macos"))]
    let create_flags = vk::InstanceCreateFlags::empty();

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_extension_names(&extension_names)
        .enabled_layer_names(&layer_names)
        .flags(create_flags);

    let instance = entry.create_instance(&create_info, None)?;

    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_extension_is_always_required() {
        let extensions = required_instance_extensions(false);
        assert!(extensions.contains(&ash::khr::surface::NAME));
        assert!(!extensions.contains(&ash::ext::debug_utils::NAME));
    }

    #[test]
    fn diagnostics_add_debug_utils() {
        let extensions = required_instance_extensions(true);
        assert!(extensions.contains(&ash::ext::debug_utils::NAME));
    }

    #[test]
    #[ignore = "Requires a Vulkan runtime"]
    fn instance_creation() {
        let entry = unsafe { ash::Entry::load() }.unwrap();
        let instance = unsafe { create_instance(&entry, "trigon-test", false) }.unwrap();
        unsafe { instance.destroy_instance(None) };
    }
}
