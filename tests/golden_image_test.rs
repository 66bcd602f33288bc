#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
mod gpu {
    use crate::common::test_utils::{clear, headless_device, read_rgba8};
    use pixel_book::{
        data_structures::texture::{Filtering, Texture},
        pipelines::pixelate::PixelatePass,
        pixelate::PixelateParams,
        render::Composer,
    };

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn pixelate_into(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        input: &wgpu::TextureView,
        size: [u32; 2],
    ) -> Texture {
        let output = Texture::create_render_target(device, size, FORMAT, "test_output");
        let mut pass = PixelatePass::new(device, FORMAT, PixelateParams::default(), input);
        assert!(pass.set_resolution(queue, size[0], size[1]));
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
        pass.draw(&mut encoder, &output.view);
        queue.submit(std::iter::once(encoder.finish()));
        output
    }

    #[tokio::test]
    async fn solid_red_target_is_pixelated_to_solid_red() -> anyhow::Result<()> {
        let (device, queue) = headless_device().await?;
        let size = [800, 600];
        let input = Texture::create_render_target(&device, size, FORMAT, "test_input");
        clear(&device, &queue, &input.view, wgpu::Color::RED);

        let output = pixelate_into(&device, &queue, &input.view, size);
        let pixels = read_rgba8(&device, &queue, &output.texture).await?;
        for pixel in pixels.pixels() {
            assert_eq!(*pixel, image::Rgba([255, 0, 0, 255]));
        }
        Ok(())
    }

    #[tokio::test]
    async fn halves_aligned_to_blocks_stay_apart() -> anyhow::Result<()> {
        let (device, queue) = headless_device().await?;
        let red = image::Rgba([255, 0, 0, 255]);
        let blue = image::Rgba([0, 0, 255, 255]);
        let source = image::RgbaImage::from_fn(80, 40, |x, _| if x < 40 { red } else { blue });
        let input = Texture::from_image(
            &device,
            &queue,
            &image::DynamicImage::ImageRgba8(source),
            Some("halves"),
            Filtering::Nearest,
        );

        let output = pixelate_into(&device, &queue, &input.view, [80, 40]);
        let pixels = read_rgba8(&device, &queue, &output.texture).await?;
        for (x, _, pixel) in pixels.enumerate_pixels() {
            let expected = if x < 40 { red } else { blue };
            assert_eq!(*pixel, expected, "column {x}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn partial_block_row_is_drawn_along_the_top() -> anyhow::Result<()> {
        let (device, queue) = headless_device().await?;
        let red = image::Rgba([255, 0, 0, 255]);
        let blue = image::Rgba([0, 0, 255, 255]);
        // 50 rows: two full 20-pixel blocks from the bottom, 10 rows left on top.
        let source = image::RgbaImage::from_fn(40, 50, |_, y| if y < 10 { red } else { blue });
        let input = Texture::from_image(
            &device,
            &queue,
            &image::DynamicImage::ImageRgba8(source),
            Some("top_rows"),
            Filtering::Nearest,
        );

        let output = pixelate_into(&device, &queue, &input.view, [40, 50]);
        let pixels = read_rgba8(&device, &queue, &output.texture).await?;
        for (_, y, pixel) in pixels.enumerate_pixels() {
            let expected = if y < 10 { red } else { blue };
            assert_eq!(*pixel, expected, "row {y}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn composer_reads_the_target_it_was_resized_to() -> anyhow::Result<()> {
        let (device, queue) = headless_device().await?;
        let mut composer =
            Composer::new(&device, &queue, [64, 48], FORMAT, PixelateParams::default());
        assert_eq!(composer.target().size(), [64, 48]);
        assert_eq!(composer.pixelate().params().resolution, [64.0, 48.0]);
        clear(&device, &queue, &composer.target().colour.view, wgpu::Color::RED);

        assert!(composer.resize(&device, &queue, 80, 60));
        let resolution = composer.pixelate().params().resolution;
        assert!(!composer.resize(&device, &queue, 80, 60));
        assert_eq!(composer.pixelate().params().resolution, resolution);
        assert_eq!(resolution, [80.0, 60.0]);
        assert_eq!(composer.target().size(), [80, 60]);

        clear(&device, &queue, &composer.target().colour.view, wgpu::Color::GREEN);
        let output = Texture::create_render_target(&device, [80, 60], FORMAT, "composer_output");
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
        composer.pixelate().draw(&mut encoder, &output.view);
        queue.submit(std::iter::once(encoder.finish()));

        let pixels = read_rgba8(&device, &queue, &output.texture).await?;
        for pixel in pixels.pixels() {
            assert_eq!(*pixel, image::Rgba([0, 255, 0, 255]));
        }
        composer.destroy();
        Ok(())
    }
}
