//! GPU suitability and queue-family negotiation.

use crate::error::{GpuError, Result};
use ash::vk;
use std::collections::HashSet;
use std::ffi::CStr;

/// Per-family capability snapshot against a surface.
#[derive(Debug, Clone, Copy)]
pub struct QueueFamilyInfo {
    /// Family accepts graphics work.
    pub graphics: bool,
    /// Family can present to the queried surface.
    pub present: bool,
}

/// Selected queue families for graphics and presentation.
///
/// The two indices may alias the same family or differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilySelection {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
}

impl QueueFamilySelection {
    /// A selection is usable only when both roles are filled.
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some() && self.present.is_some()
    }

    /// Scan families in index order.
    ///
    /// The first family with the graphics bit wins graphics, the first
    /// family that can present wins present, and the scan stops as soon as
    /// both are filled. Later families are never reconsidered.
    pub fn scan(families: &[QueueFamilyInfo]) -> Self {
        let mut selection = Self::default();

        for (index, family) in families.iter().enumerate() {
            if family.graphics && selection.graphics.is_none() {
                selection.graphics = Some(index as u32);
            }
            if family.present && selection.present.is_none() {
                selection.present = Some(index as u32);
            }
            if selection.is_complete() {
                break;
            }
        }

        selection
    }
}

/// Query the per-family snapshot for a device against a surface.
///
/// # Safety
/// The instance, device, and surface must be valid.
pub unsafe fn query_queue_families(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<Vec<QueueFamilyInfo>> {
    let families = instance.get_physical_device_queue_family_properties(physical_device);

    let mut infos = Vec::with_capacity(families.len());
    for (index, family) in families.iter().enumerate() {
        let graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
        let present = surface_loader.get_physical_device_surface_support(
            physical_device,
            index as u32,
            surface,
        )?;
        infos.push(QueueFamilyInfo { graphics, present });
    }

    Ok(infos)
}

/// Required device extensions.
pub fn required_device_extensions() -> Vec<&'static CStr> {
    vec![ash::khr::swapchain::NAME]
}

/// Check that the device supports every required extension.
///
/// # Safety
/// The instance and physical device must be valid.
pub unsafe fn supports_required_extensions(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> bool {
    let extensions = instance
        .enumerate_device_extension_properties(physical_device)
        .unwrap_or_default();

    let available: HashSet<String> = extensions
        .iter()
        .filter_map(|ext| {
            CStr::from_ptr(ext.extension_name.as_ptr())
                .to_str()
                .ok()
                .map(String::from)
        })
        .collect();

    required_device_extensions()
        .iter()
        .all(|ext| ext.to_str().is_ok_and(|name| available.contains(name)))
}

/// Suitability: a complete queue-family selection, the required extensions,
/// and at least one surface format and present mode.
///
/// # Safety
/// The instance, device, and surface must be valid.
pub unsafe fn is_device_suitable(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<bool> {
    let families = query_queue_families(instance, physical_device, surface_loader, surface)?;
    if !QueueFamilySelection::scan(&families).is_complete() {
        return Ok(false);
    }

    if !supports_required_extensions(instance, physical_device) {
        return Ok(false);
    }

    let formats = surface_loader.get_physical_device_surface_formats(physical_device, surface)?;
    let present_modes =
        surface_loader.get_physical_device_surface_present_modes(physical_device, surface)?;

    Ok(!formats.is_empty() && !present_modes.is_empty())
}

/// Select a physical device that can render to the surface.
///
/// The first suitable device wins; candidates are not ranked against each
/// other.
///
/// # Safety
/// The instance and surface must be valid.
pub unsafe fn select_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<vk::PhysicalDevice> {
    let devices = instance.enumerate_physical_devices()?;

    for device in devices {
        if is_device_suitable(instance, device, surface_loader, surface)? {
            return Ok(device);
        }
    }

    Err(GpuError::NoSuitableDevice)
}

/// Human-readable device name for logging.
///
/// # Safety
/// The instance and physical device must be valid.
pub unsafe fn device_name(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> String {
    let properties = instance.get_physical_device_properties(physical_device);
    CStr::from_ptr(properties.device_name.as_ptr())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(graphics: bool, present: bool) -> QueueFamilyInfo {
        QueueFamilyInfo { graphics, present }
    }

    #[test]
    fn scan_picks_first_matching_families() {
        let selection = QueueFamilySelection::scan(&[family(true, false), family(false, true)]);
        assert_eq!(selection.graphics, Some(0));
        assert_eq!(selection.present, Some(1));
        assert!(selection.is_complete());
    }

    #[test]
    fn scan_may_alias_a_single_family() {
        let selection = QueueFamilySelection::scan(&[family(true, true)]);
        assert_eq!(selection.graphics, Some(0));
        assert_eq!(selection.present, Some(0));
        assert!(selection.is_complete());
    }

    #[test]
    fn scan_keeps_first_match_over_later_candidates() {
        // Family 2 would satisfy both roles on its own, but 0 and 1 came first.
        let selection = QueueFamilySelection::scan(&[
            family(true, false),
            family(false, true),
            family(true, true),
        ]);
        assert_eq!(selection.graphics, Some(0));
        assert_eq!(selection.present, Some(1));
    }

    #[test]
    fn scan_without_present_support_is_incomplete() {
        let selection = QueueFamilySelection::scan(&[family(true, false), family(true, false)]);
        assert_eq!(selection.graphics, Some(0));
        assert_eq!(selection.present, None);
        assert!(!selection.is_complete());
    }

    #[test]
    fn scan_of_empty_table_is_incomplete() {
        assert!(!QueueFamilySelection::scan(&[]).is_complete());
    }

    #[test]
    fn swapchain_extension_is_required() {
        assert!(required_device_extensions().contains(&ash::khr::swapchain::NAME));
    }
}
