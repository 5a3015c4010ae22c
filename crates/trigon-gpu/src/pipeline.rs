//! Render pass and graphics pipeline creation.

use crate::error::{GpuError, Result};
use crate::shader::create_shader_module;
use ash::vk;

/// Create the render pass: one color attachment, cleared at subpass start,
/// stored at subpass end, presentable on exit.
///
/// # Safety
/// The device must be valid.
pub unsafe fn create_render_pass(device: &ash::Device, format: vk::Format) -> Result<vk::RenderPass> {
    let color_attachment = vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

    let color_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(std::slice::from_ref(&color_ref));

    // The attachment transitions out of UNDEFINED when the subpass starts;
    // gate the write on the color-output stage so the transition cannot
    // race image acquisition.
    let dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(std::slice::from_ref(&color_attachment))
        .subpasses(std::slice::from_ref(&subpass))
        .dependencies(std::slice::from_ref(&dependency));

    let render_pass = device
        .create_render_pass(&create_info, None)
        .map_err(|e| GpuError::PipelineCreation(e.to_string()))?;

    Ok(render_pass)
}

/// Viewport covering the full extent.
pub fn full_viewport(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport::default()
        .x(0.0)
        .y(0.0)
        .width(extent.width as f32)
        .height(extent.height as f32)
        .min_depth(0.0)
        .max_depth(1.0)
}

/// Scissor rectangle covering the full extent.
pub fn full_scissor(extent: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D::default().extent(extent)
}

/// Fixed graphics pipeline for the bootstrap triangle.
///
/// Every structurally-variable value (viewport, scissor, winding, blend
/// state) is baked in at build time; an extent change requires a full
/// rebuild. The layout is empty: no descriptor sets, no push constants.
pub struct TrianglePipeline {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
    pub render_pass: vk::RenderPass,
}

impl TrianglePipeline {
    /// Build the pipeline against a swapchain format and extent.
    ///
    /// # Safety
    /// The device must be valid and the shader code must be valid SPIR-V.
    pub unsafe fn new(
        device: &ash::Device,
        format: vk::Format,
        extent: vk::Extent2D,
        vertex_spirv: &[u32],
        fragment_spirv: &[u32],
    ) -> Result<Self> {
        let render_pass = create_render_pass(device, format)?;

        let vert_module = match create_shader_module(device, vertex_spirv) {
            Ok(module) => module,
            Err(e) => {
                device.destroy_render_pass(render_pass, None);
                return Err(e);
            }
        };
        let frag_module = match create_shader_module(device, fragment_spirv) {
            Ok(module) => module,
            Err(e) => {
                device.destroy_shader_module(vert_module, None);
                device.destroy_render_pass(render_pass, None);
                return Err(e);
            }
        };

        let result = Self::create_pipeline(device, render_pass, extent, vert_module, frag_module);

        // Modules are only needed during pipeline creation.
        device.destroy_shader_module(frag_module, None);
        device.destroy_shader_module(vert_module, None);

        match result {
            Ok((pipeline, layout)) => Ok(Self {
                pipeline,
                layout,
                render_pass,
            }),
            Err(e) => {
                device.destroy_render_pass(render_pass, None);
                Err(e)
            }
        }
    }

    unsafe fn create_pipeline(
        device: &ash::Device,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        vert_module: vk::ShaderModule,
        frag_module: vk::ShaderModule,
    ) -> Result<(vk::Pipeline, vk::PipelineLayout)> {
        // Shader stages
        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vert_module)
                .name(c"main"),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(frag_module)
                .name(c"main"),
        ];

        // No vertex buffers: the vertex shader generates the triangle.
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();

        // Input assembly
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport and scissor are baked; no dynamic state anywhere.
        let viewport = full_viewport(extent);
        let scissor = full_scissor(extent);
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(std::slice::from_ref(&viewport))
            .scissors(std::slice::from_ref(&scissor));

        // Rasterization
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::CLOCKWISE)
            .depth_bias_enable(false)
            .line_width(1.0);

        // Multisampling
        let multisampling = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1)
            .sample_shading_enable(false);

        // Color blending: single attachment, blending disabled
        let color_blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(false)
            .color_write_mask(vk::ColorComponentFlags::RGBA);

        let color_blending = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(std::slice::from_ref(&color_blend_attachment));

        // Empty pipeline layout
        let layout_info = vk::PipelineLayoutCreateInfo::default();
        let layout = device
            .create_pipeline_layout(&layout_info, None)
            .map_err(|e| GpuError::PipelineCreation(e.to_string()))?;

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisampling)
            .color_blend_state(&color_blending)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        let pipelines = match device.create_graphics_pipelines(
            vk::PipelineCache::null(),
            &[pipeline_info],
            None,
        ) {
            Ok(pipelines) => pipelines,
            Err((_pipelines, e)) => {
                device.destroy_pipeline_layout(layout, None);
                return Err(GpuError::PipelineCreation(e.to_string()));
            }
        };

        Ok((pipelines[0], layout))
    }

    /// Destroy the pipeline, its layout, and the render pass, in that order.
    ///
    /// # Safety
    /// The device must be valid and the pipeline must not be in use.
    pub unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_pipeline(self.pipeline, None);
        device.destroy_pipeline_layout(self.layout, None);
        device.destroy_render_pass(self.render_pass, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_covers_extent_with_standard_depth() {
        let viewport = full_viewport(vk::Extent2D {
            width: 800,
            height: 600,
        });
        assert_eq!(viewport.x, 0.0);
        assert_eq!(viewport.y, 0.0);
        assert_eq!(viewport.width, 800.0);
        assert_eq!(viewport.height, 600.0);
        assert_eq!(viewport.min_depth, 0.0);
        assert_eq!(viewport.max_depth, 1.0);
    }

    #[test]
    fn scissor_starts_at_origin() {
        let scissor = full_scissor(vk::Extent2D {
            width: 800,
            height: 600,
        });
        assert_eq!(scissor.offset.x, 0);
        assert_eq!(scissor.offset.y, 0);
        assert_eq!(scissor.extent.width, 800);
        assert_eq!(scissor.extent.height, 600);
    }
}
