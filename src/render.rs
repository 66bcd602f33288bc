//! Post-processing composition.
//!
//! [`Composer`] owns the only render target chain of the application. Every
//! frame it runs two passes in order:
//!
//! 1. the scene pass draws the [`Scene`] into an intermediate colour target
//!    with its own depth buffer
//! 2. the [`PixelatePass`] samples that target and writes the final image
//!
//! The pixelation pass never sees the scene directly, only the first pass's
//! output. Resizing recreates the targets and rebinds the second pass.

use std::iter;

use crate::{
    context::Context,
    data_structures::texture::Texture,
    pipelines::pixelate::PixelatePass,
    pixelate::PixelateParams,
    scene::Scene,
};

/// Colour and depth attachment the scene pass renders into.
#[derive(Debug)]
pub struct RenderTarget {
    pub colour: Texture,
    pub depth: Texture,
    size: [u32; 2],
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, size: [u32; 2], format: wgpu::TextureFormat) -> Self {
        Self {
            colour: Texture::create_render_target(device, size, format, "scene_target"),
            depth: Texture::create_depth_texture(device, size, "scene_depth"),
            size,
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    pub fn destroy(&self) {
        self.colour.destroy();
        self.depth.destroy();
    }
}

#[derive(Debug)]
pub struct Composer {
    target: RenderTarget,
    pixelate: PixelatePass,
    format: wgpu::TextureFormat,
}

impl Composer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        params: PixelateParams,
    ) -> Self {
        let target = RenderTarget::new(device, size, format);
        let mut pixelate = PixelatePass::new(device, format, params, &target.colour.view);
        pixelate.set_resolution(queue, size[0], size[1]);
        Self {
            target,
            pixelate,
            format,
        }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn pixelate(&self) -> &PixelatePass {
        &self.pixelate
    }

    /// Match the target chain to a new viewport size.
    ///
    /// Returns `false` when the size is unchanged, in which case nothing is
    /// reallocated or uploaded.
    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) -> bool {
        if self.target.size == [width, height] {
            return false;
        }
        self.target.destroy();
        self.target = RenderTarget::new(device, [width, height], self.format);
        self.pixelate.set_input(device, &self.target.colour.view);
        self.pixelate.set_resolution(queue, width, height);
        true
    }

    /// Record and submit both passes, writing the final image into `output`.
    pub fn render(&self, ctx: &Context, scene: &Scene, output: &wgpu::TextureView) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        self.record(ctx, scene, &mut encoder, output);
        ctx.queue.submit(iter::once(encoder.finish()));
    }

    pub fn record(
        &self,
        ctx: &Context,
        scene: &Scene,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
    ) {
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target.colour.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.background),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });
            scene.draw(ctx, &mut render_pass);
        }

        self.pixelate.draw(encoder, output);
    }

    pub fn destroy(&self) {
        self.target.destroy();
        self.pixelate.destroy();
    }
}
