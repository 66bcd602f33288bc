//! Full-screen pixelation pass.
//!
//! Draws one triangle that covers the viewport and runs `pixelate.wgsl` on
//! every fragment, reading the output of the previous pass through a linear,
//! clamp-to-edge sampler. The input view and resolution change on resize; both
//! are swapped in place without rebuilding the pipeline.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{Filtering, create_clamped_sampler},
    pipelines::basic::mk_render_pipeline,
    pixelate::PixelateParams,
};

#[derive(Debug)]
pub struct PixelatePass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    params: PixelateParams,
}

impl PixelatePass {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        params: PixelateParams,
        input: &wgpu::TextureView,
    ) -> Self {
        let bind_group_layout = mk_bind_group_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pixelate Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Pixelate Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("pixelate.wgsl").into()),
        };
        let pipeline = mk_render_pipeline(
            device,
            &layout,
            output_format,
            Some(wgpu::BlendState::REPLACE),
            None,
            None,
            &[],
            shader,
        );
        let sampler = create_clamped_sampler(device, Filtering::Linear);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Pixelate Uniform Buffer"),
            contents: bytemuck::cast_slice(&[params.to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_bind_group(device, &bind_group_layout, input, &sampler, &uniform_buffer);

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            bind_group,
            params,
        }
    }

    pub fn params(&self) -> &PixelateParams {
        &self.params
    }

    /// Point the pass at a new input, e.g. after the render target was recreated.
    pub fn set_input(&mut self, device: &wgpu::Device, input: &wgpu::TextureView) {
        self.bind_group = mk_bind_group(
            device,
            &self.bind_group_layout,
            input,
            &self.sampler,
            &self.uniform_buffer,
        );
    }

    /// Update the resolution uniform. Returns `false` if nothing changed.
    pub fn set_resolution(&mut self, queue: &wgpu::Queue, width: u32, height: u32) -> bool {
        if !self.params.set_resolution(width, height) {
            return false;
        }
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.params.to_uniform()]),
        );
        true
    }

    /// Record the pass, writing every pixel of `output`.
    pub fn draw(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Pixelate Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }

    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
    }
}

fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("pixelate_bind_group_layout"),
    })
}

fn mk_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    input: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    uniform_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(input),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform_buffer.as_entire_binding(),
            },
        ],
        label: Some("pixelate_bind_group"),
    })
}
