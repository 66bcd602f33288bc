//! Scene assembly: the book, its transform and the pipeline that draws it.

use wgpu::util::DeviceExt;

use crate::{
    config::BookConfig,
    context::Context,
    data_structures::{
        instance::Instance,
        model::{BoxGeometry, DrawModel, Model},
    },
    pipelines::basic::mk_basic_pipeline,
    resources::{load_face_materials, texture::diffuse_colour_layout},
};

/// The book mesh and the GPU state needed to draw it.
#[derive(Debug)]
pub struct Book {
    pub model: Model,
    pub instance: Instance,
    pub instance_buffer: wgpu::Buffer,
}

impl Book {
    pub async fn new(
        ctx: &Context,
        config: &BookConfig,
        material_layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let [width, height, depth] = config.dimensions;
        let geometry = BoxGeometry::new(width, height, depth);
        let materials =
            load_face_materials(&config.faces, &ctx.device, &ctx.queue, material_layout).await?;
        let model = Model::new(&ctx.device, "book", &geometry, materials);

        let mut instance = Instance::new();
        instance.rotation = config.rotation.into();
        instance.scale = [config.scale; 3].into();

        let instance_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[instance.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            model,
            instance,
            instance_buffer,
        })
    }

    /// Upload the current transform.
    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[self.instance.to_raw()]),
        );
    }
}

/// Everything the scene pass draws.
#[derive(Debug)]
pub struct Scene {
    pub background: wgpu::Color,
    pub book: Book,
    pipeline: wgpu::RenderPipeline,
}

impl Scene {
    pub async fn assemble(ctx: &Context, config: &BookConfig) -> anyhow::Result<Self> {
        let material_layout = diffuse_colour_layout(&ctx.device);
        let book = Book::new(ctx, config, &material_layout).await?;
        let pipeline = mk_basic_pipeline(
            &ctx.device,
            ctx.config.format,
            &material_layout,
            &ctx.camera.bind_group_layout,
            &ctx.light.bind_group_layout,
        );
        log::info!("Scene assembled");
        Ok(Self {
            background: ctx.clear_colour,
            book,
            pipeline,
        })
    }

    pub fn draw<'a>(&'a self, ctx: &'a Context, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(1, self.book.instance_buffer.slice(..));
        render_pass.draw_model_instanced(
            &self.book.model,
            0..1,
            &ctx.camera.bind_group,
            &ctx.light.bind_group,
        );
    }

    pub fn destroy(&self) {
        self.book.instance_buffer.destroy();
        self.book.model.destroy();
    }
}
