//! GPU error types.

use ash::vk;
use thiserror::Error;

/// GPU-related errors, one variant per failing setup stage.
///
/// Every stage fails fast: all failures stem from static capability
/// mismatches or driver rejections that will not change between retries.
#[derive(Error, Debug)]
pub enum GpuError {
    /// Vulkan error.
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),

    /// No GPU satisfied the suitability requirements.
    #[error("No suitable GPU found")]
    NoSuitableDevice,

    /// Validation layers were requested but are not installed.
    #[error("Requested validation layers are not available")]
    ValidationUnavailable,

    /// Surface creation failed.
    #[error("Surface creation failed: {0}")]
    SurfaceCreation(String),

    /// Logical device creation failed.
    #[error("Device creation failed: {0}")]
    DeviceCreation(String),

    /// Swapchain creation failed.
    #[error("Swapchain creation failed: {0}")]
    SwapchainCreation(String),

    /// Shader bytecode could not be read.
    #[error("Shader load failed: {0}")]
    ShaderLoad(String),

    /// Pipeline creation failed.
    #[error("Pipeline creation failed: {0}")]
    PipelineCreation(String),

    /// Command buffer recording failed.
    #[error("Command recording failed: {0}")]
    CommandRecording(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GpuError>;
