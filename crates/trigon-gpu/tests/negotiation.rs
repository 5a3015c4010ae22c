//! End-to-end negotiation checks over the pure selection functions.
//!
//! These exercise the same decisions the live construction path makes,
//! against hand-built surface snapshots instead of a driver.

use ash::vk;
use trigon_gpu::capabilities::{QueueFamilyInfo, QueueFamilySelection};
use trigon_gpu::swapchain::{
    calculate_extent, select_image_count, select_present_mode, select_sharing_mode,
    select_surface_format,
};

#[test]
fn split_family_device_negotiates_a_concurrent_chain() {
    // A device with a graphics-only family 0 and a present-only family 1,
    // one sRGB format, FIFO only, min 2 / unbounded max, fixed 1920x1080.
    let families = [
        QueueFamilyInfo {
            graphics: true,
            present: false,
        },
        QueueFamilyInfo {
            graphics: false,
            present: true,
        },
    ];
    let selection = QueueFamilySelection::scan(&families);
    assert_eq!(selection.graphics, Some(0));
    assert_eq!(selection.present, Some(1));
    assert!(selection.is_complete());

    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let format = select_surface_format(&formats);
    assert_eq!(format.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(format.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);

    let present_mode = select_present_mode(&[vk::PresentModeKHR::FIFO]);
    assert_eq!(present_mode, vk::PresentModeKHR::FIFO);

    let capabilities = vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 0,
        current_extent: vk::Extent2D {
            width: 1920,
            height: 1080,
        },
        ..Default::default()
    };
    assert_eq!(select_image_count(&capabilities), 3);

    let extent = calculate_extent(&capabilities, 800, 600);
    assert_eq!(extent.width, 1920);
    assert_eq!(extent.height, 1080);

    let (mode, family_indices) = select_sharing_mode(0, 1);
    assert_eq!(mode, vk::SharingMode::CONCURRENT);
    assert_eq!(family_indices, vec![0, 1]);
}

#[test]
fn unified_family_device_negotiates_an_exclusive_chain() {
    // A single family that both draws and presents, preferred format plus
    // mailbox available, window-driven extent.
    let families = [QueueFamilyInfo {
        graphics: true,
        present: true,
    }];
    let selection = QueueFamilySelection::scan(&families);
    assert_eq!(selection.graphics, selection.present);
    assert!(selection.is_complete());

    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];
    assert_eq!(select_surface_format(&formats).format, vk::Format::B8G8R8A8_SRGB);

    let present_mode =
        select_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX]);
    assert_eq!(present_mode, vk::PresentModeKHR::MAILBOX);

    let capabilities = vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 4,
        current_extent: vk::Extent2D {
            width: u32::MAX,
            height: u32::MAX,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        ..Default::default()
    };
    assert_eq!(select_image_count(&capabilities), 3);

    let extent = calculate_extent(&capabilities, 800, 600);
    assert_eq!(extent.width, 800);
    assert_eq!(extent.height, 600);

    let (mode, family_indices) = select_sharing_mode(0, 0);
    assert_eq!(mode, vk::SharingMode::EXCLUSIVE);
    assert!(family_indices.is_empty());
}
