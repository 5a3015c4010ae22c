//! Validation diagnostics.
//!
//! Optional debug-utils messenger that forwards driver diagnostics to the
//! log stream. The callback never aborts the triggering call.

use crate::error::Result;
use ash::vk;
use std::ffi::{c_void, CStr};

/// Debug messenger attached to the instance.
pub struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    /// Attach a messenger to the instance.
    ///
    /// # Safety
    /// The instance must be valid and have the debug-utils extension enabled.
    pub unsafe fn new(entry: &ash::Entry, instance: &ash::Instance) -> Result<Self> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let messenger = loader.create_debug_utils_messenger(&create_info, None)?;

        Ok(Self { loader, messenger })
    }

    /// Destroy the messenger.
    ///
    /// # Safety
    /// The owning instance must still be alive.
    pub unsafe fn destroy(&self) {
        self.loader
            .destroy_debug_utils_messenger(self.messenger, None);
    }
}

/// Forward a driver message to the log, mapped by severity. Returns
/// `vk::FALSE` so the triggering call always proceeds.
unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    let message = if callback_data.is_null() || (*callback_data).p_message.is_null() {
        String::new()
    } else {
        CStr::from_ptr((*callback_data).p_message)
            .to_string_lossy()
            .into_owned()
    };

    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        tracing::error!("[{message_type:?}] {message}");
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        tracing::warn!("[{message_type:?}] {message}");
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        tracing::info!("[{message_type:?}] {message}");
    } else {
        tracing::trace!("[{message_type:?}] {message}");
    }

    vk::FALSE
}
