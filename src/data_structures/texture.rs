//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU texture resources,
//! and helpers for the textures the book needs: depth buffers, colour render
//! targets for the post-processing chain, plain white fallbacks and images
//! loaded from the asset directory.

use anyhow::*;
use image::GenericImageView;

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

/// How a texture is filtered when sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filtering {
    /// Pick the closest texel. Keeps hard pixel edges.
    Nearest,
    /// Interpolate between neighbouring texels.
    Linear,
}

impl From<Filtering> for wgpu::FilterMode {
    fn from(filtering: Filtering) -> Self {
        match filtering {
            Filtering::Nearest => wgpu::FilterMode::Nearest,
            Filtering::Linear => wgpu::FilterMode::Linear,
        }
    }
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Create a colour texture that one pass renders into and the next samples.
    ///
    /// Carries no sampler; the pass that reads it binds its own.
    pub fn create_render_target(
        device: &wgpu::Device,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = None;

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 white texture, used by faces that only carry a flat colour.
    pub fn create_white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            1,
            1,
            image::Rgba([255, 255, 255, 255]),
        ));
        Self::from_image(device, queue, &img, Some("white texture"), Filtering::Nearest)
    }

    /// Load a texture from raw image file contents (PNG, JPEG).
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        filtering: Filtering,
    ) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .with_context(|| format!("could not decode image {label}"))?;
        Ok(Self::from_image(device, queue, &img, Some(label), filtering))
    }

    /// Upload an image as an sRGB texture without mipmaps.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        filtering: Filtering,
    ) -> Self {
        let dimensions = img.dimensions();
        let rgba = img.to_rgba8();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_clamped_sampler(device, filtering));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Release the GPU memory now instead of when the last handle drops.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

pub fn create_clamped_sampler(device: &wgpu::Device, filtering: Filtering) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("clamped sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filtering.into(),
        min_filter: filtering.into(),
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}
