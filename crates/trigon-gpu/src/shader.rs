//! Shader bytecode loading.

use crate::error::{GpuError, Result};
use ash::vk;
use std::path::Path;

/// Read a compiled SPIR-V blob from disk and return aligned code words.
///
/// The contents are passed to the driver verbatim; no validation happens
/// here beyond the 4-byte word alignment SPIR-V requires.
pub fn load_spirv(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| GpuError::ShaderLoad(format!("{}: {e}", path.display())))?;

    bytes_to_spirv(&bytes).ok_or_else(|| {
        GpuError::ShaderLoad(format!(
            "{}: byte length {} is not a multiple of 4",
            path.display(),
            bytes.len()
        ))
    })
}

/// Convert a byte slice to u32 code words.
fn bytes_to_spirv(bytes: &[u8]) -> Option<Vec<u32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Create a shader module from code words.
///
/// # Safety
/// The device must be valid and the code must be valid SPIR-V.
pub unsafe fn create_shader_module(device: &ash::Device, code: &[u32]) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    let module = device
        .create_shader_module(&create_info, None)
        .map_err(|e| GpuError::PipelineCreation(e.to_string()))?;

    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_bytes_to_words() {
        let words = bytes_to_spirv(&[0x03, 0x02, 0x23, 0x07]).unwrap();
        assert_eq!(words, vec![0x0723_0203]);
    }

    #[test]
    fn empty_blob_converts_to_no_words() {
        assert_eq!(bytes_to_spirv(&[]), Some(Vec::new()));
    }

    #[test]
    fn rejects_misaligned_bytecode() {
        assert!(bytes_to_spirv(&[0x03, 0x02, 0x23]).is_none());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let result = load_spirv("does/not/exist.spv");
        assert!(matches!(result, Err(GpuError::ShaderLoad(_))));
    }
}
