//! Pixelation effect parameters and a CPU reference of the shader.
//!
//! The effect divides the viewport into square blocks of `pixel_size` device
//! pixels. Every fragment inside a block gets the same colour: the unweighted
//! mean of an N×N grid of samples spread evenly over the block. The grid starts
//! at the bottom-left corner of the viewport, so when the height is not a
//! multiple of the block size the partial row sits along the top. Because the
//! block size is stored in device pixels and converted to texture space with
//! the current resolution, blocks keep their on-screen size across resizes.
//!
//! [`pixelate_image`] runs the exact arithmetic of `pipelines/pixelate.wgsl`
//! over an [`image::Rgba32FImage`] with a bilinear, clamp-to-edge sampler, the
//! same sampler the GPU pass binds for its input.

use image::{Rgba, Rgba32FImage};

/// Parameters of the pixelation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelateParams {
    /// Edge length of a block in device pixels.
    pub pixel_size: f32,
    /// Samples per axis inside a block.
    pub samples: u32,
    /// Viewport size in device pixels.
    pub resolution: [f32; 2],
}

impl Default for PixelateParams {
    fn default() -> Self {
        Self {
            pixel_size: 20.0,
            samples: 4,
            resolution: [1.0, 1.0],
        }
    }
}

impl PixelateParams {
    /// Update the viewport resolution.
    ///
    /// Returns `false` when the resolution did not change, so callers can skip
    /// the uniform upload.
    pub fn set_resolution(&mut self, width: u32, height: u32) -> bool {
        let resolution = [width.max(1) as f32, height.max(1) as f32];
        if resolution == self.resolution {
            return false;
        }
        self.resolution = resolution;
        true
    }

    /// Block size in normalized texture coordinates.
    pub fn block_size(&self) -> [f32; 2] {
        [
            self.pixel_size / self.resolution[0],
            self.pixel_size / self.resolution[1],
        ]
    }

    /// Lower-left corner of the block that contains `uv`.
    ///
    /// Both `uv` and the result are measured from the bottom-left of the
    /// viewport.
    pub fn block_origin(&self, uv: [f32; 2]) -> [f32; 2] {
        let block = self.block_size();
        [
            block[0] * (uv[0] / block[0]).floor(),
            block[1] * (uv[1] / block[1]).floor(),
        ]
    }

    /// Texture coordinates of the N×N samples averaged for the fragment at
    /// texture coordinate `uv` (origin at the top-left).
    pub fn sample_positions(&self, uv: [f32; 2]) -> impl Iterator<Item = [f32; 2]> {
        let block = self.block_size();
        let origin = self.block_origin([uv[0], 1.0 - uv[1]]);
        let n = self.samples.max(1);
        let step = [block[0] / n as f32, block[1] / n as f32];
        (0..n).flat_map(move |x| {
            (0..n).map(move |y| {
                [
                    origin[0] + step[0] * (x as f32 + 0.5),
                    1.0 - (origin[1] + step[1] * (y as f32 + 0.5)),
                ]
            })
        })
    }

    pub fn to_uniform(&self) -> PixelateUniform {
        PixelateUniform {
            resolution: self.resolution,
            pixel_size: self.pixel_size,
            samples: self.samples.max(1) as f32,
        }
    }
}

/// GPU layout of [`PixelateParams`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PixelateUniform {
    pub resolution: [f32; 2],
    pub pixel_size: f32,
    pub samples: f32,
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sample `image` at `uv` with linear filtering and clamp-to-edge addressing.
pub fn sample_linear(image: &Rgba32FImage, uv: [f32; 2]) -> [f32; 4] {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return [0.0; 4];
    }
    let max_x = width as i64 - 1;
    let max_y = height as i64 - 1;
    let x = uv[0].clamp(0.0, 1.0) * width as f32 - 0.5;
    let y = uv[1].clamp(0.0, 1.0) * height as f32 - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;
    let texel = |px: i64, py: i64| -> [f32; 4] {
        let Rgba(c) = *image.get_pixel(px.clamp(0, max_x) as u32, py.clamp(0, max_y) as u32);
        c
    };
    let (x0, y0) = (x0 as i64, y0 as i64);
    let top_left = texel(x0, y0);
    let top_right = texel(x0 + 1, y0);
    let bottom_left = texel(x0, y0 + 1);
    let bottom_right = texel(x0 + 1, y0 + 1);

    let mut out = [0.0; 4];
    for c in 0..4 {
        let top = lerp(top_left[c], top_right[c], tx);
        let bottom = lerp(bottom_left[c], bottom_right[c], tx);
        out[c] = lerp(top, bottom, ty);
    }
    out
}

/// Colour the pixelation pass writes for the fragment at `uv`.
pub fn pixelate_at(source: &Rgba32FImage, params: &PixelateParams, uv: [f32; 2]) -> [f32; 4] {
    let mut accumulated = [0.0f32; 4];
    let mut count = 0u32;
    for position in params.sample_positions(uv) {
        let sample = sample_linear(source, position);
        for c in 0..4 {
            accumulated[c] += sample[c];
        }
        count += 1;
    }
    accumulated.map(|c| c / count as f32)
}

/// Run the pixelation pass over a whole image.
///
/// The output has the size of `params.resolution`; each output pixel is
/// evaluated at its centre, like a fragment.
pub fn pixelate_image(source: &Rgba32FImage, params: &PixelateParams) -> Rgba32FImage {
    let width = params.resolution[0].max(1.0) as u32;
    let height = params.resolution[1].max(1.0) as u32;
    Rgba32FImage::from_fn(width, height, |x, y| {
        let uv = [
            (x as f32 + 0.5) / width as f32,
            (y as f32 + 0.5) / height as f32,
        ];
        Rgba(pixelate_at(source, params, uv))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(width: u32, height: u32) -> PixelateParams {
        let mut p = PixelateParams::default();
        p.set_resolution(width, height);
        p
    }

    #[test]
    fn block_size_follows_resolution() {
        let p = params(800, 600);
        assert_eq!(p.block_size(), [20.0 / 800.0, 20.0 / 600.0]);
    }

    #[test]
    fn set_resolution_reports_changes_only() {
        let mut p = params(800, 600);
        assert!(!p.set_resolution(800, 600));
        assert!(p.set_resolution(1024, 768));
        assert_eq!(p.resolution, [1024.0, 768.0]);
    }

    #[test]
    fn zero_sized_viewport_is_clamped() {
        let p = params(0, 0);
        assert_eq!(p.resolution, [1.0, 1.0]);
    }

    #[test]
    fn samples_are_centred_in_sub_cells() {
        let mut p = params(100, 100);
        p.pixel_size = 10.0;
        p.samples = 2;
        let positions: Vec<[f32; 2]> = p.sample_positions([0.13, 0.07]).collect();
        assert_eq!(positions.len(), 4);
        let expected = [[0.125, 0.075], [0.125, 0.025], [0.175, 0.075], [0.175, 0.025]];
        for (got, want) in positions.iter().zip(expected) {
            assert!((got[0] - want[0]).abs() < 1e-6, "{got:?} != {want:?}");
            assert!((got[1] - want[1]).abs() < 1e-6, "{got:?} != {want:?}");
        }
    }

    #[test]
    fn every_fragment_in_a_block_shares_one_colour() {
        let source = Rgba32FImage::from_fn(40, 40, |x, y| {
            Rgba([x as f32 / 40.0, y as f32 / 40.0, 0.25, 1.0])
        });
        let mut p = params(40, 40);
        p.pixel_size = 10.0;
        let a = pixelate_at(&source, &p, [0.01, 0.01]);
        let b = pixelate_at(&source, &p, [0.24, 0.24]);
        let c = pixelate_at(&source, &p, [0.26, 0.01]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn partial_block_row_sits_at_the_top() {
        // 50 rows of 20-pixel blocks, counted from the bottom: rows 30..50,
        // 10..30 and a partial block over rows 0..10.
        let source = Rgba32FImage::from_fn(40, 50, |_, y| {
            let v = y as f32 / 50.0;
            Rgba([v, v, v, 1.0])
        });
        let output = pixelate_image(&source, &params(40, 50));
        let row = |y: u32| *output.get_pixel(0, y);
        assert_eq!(row(0), row(9));
        assert_ne!(row(9), row(10));
        assert_eq!(row(10), row(29));
        assert_ne!(row(29), row(30));
        assert_eq!(row(30), row(49));
    }

    #[test]
    fn linear_sampling_interpolates_between_texel_centres() {
        let source = Rgba32FImage::from_fn(2, 1, |x, _| {
            let v = x as f32;
            Rgba([v, v, v, 1.0])
        });
        let mid = sample_linear(&source, [0.5, 0.5]);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        // Clamped at the edges.
        assert_eq!(sample_linear(&source, [0.0, 0.5])[0], 0.0);
        assert_eq!(sample_linear(&source, [1.0, 0.5])[0], 1.0);
    }

    #[test]
    fn uniform_layout_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<PixelateUniform>(), 16);
        let u = params(800, 600).to_uniform();
        assert_eq!(u.samples, 4.0);
        assert_eq!(u.pixel_size, 20.0);
    }
}
