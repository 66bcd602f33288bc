//! Static configuration of the book scene.
//!
//! [`AppConfig::default`] carries every tunable constant of the program: camera
//! optics, mesh dimensions and appearance, the initial spin, the pixelation
//! block size and the orbit control damping. Callers that want a different
//! look construct the default and override single fields before passing it to
//! [`crate::flow::run_with`].

use crate::pixelate::PixelateParams;

/// A colour in sRGB space with components in `[0, 1]`.
///
/// Colours are authored the way a designer would write them (hex or HSL) and
/// converted to linear space only when they are handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a colour from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Build a colour from hue in degrees, saturation and lightness in percent.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);
        if s == 0.0 {
            return Self { r: l, g: l, b: l };
        }
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self {
            r: hue_to_channel(p, q, h + 1.0 / 3.0),
            g: hue_to_channel(p, q, h),
            b: hue_to_channel(p, q, h - 1.0 / 3.0),
        }
    }

    /// The colour in linear space, as the shaders expect it.
    pub fn to_linear(&self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    /// Linear clear colour for a render pass.
    pub fn to_wgpu(&self) -> wgpu::Color {
        let [r, g, b] = self.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Appearance of one face of the book.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceMaterial {
    /// A flat, unlit colour.
    Colour(Colour),
    /// An image loaded from the asset directory.
    Texture(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Id of the element the canvas is appended to (web only).
    pub container_id: String,
    pub background: Colour,
    pub ambient_colour: Colour,
    pub ambient_intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookConfig {
    /// Width, height and thickness of the book.
    pub dimensions: [f32; 3],
    /// Euler angles (XYZ order) in radians.
    pub rotation: [f32; 3],
    pub scale: f32,
    /// One entry per face: left, right, top, bottom, front, back.
    pub faces: [FaceMaterial; 6],
    /// Radians added to the rotation per idle frame (x, y).
    pub rotation_velocity: [f32; 2],
    /// Factor applied to the velocity after every idle frame.
    pub velocity_decay: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlsConfig {
    pub damping_factor: f32,
    pub rotate_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub book: BookConfig,
    pub pixelate: PixelateParams,
    pub controls: ControlsConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            container_id: "sceneContainer".to_string(),
            background: Colour::from_hex(0x9bb7df),
            ambient_colour: Colour::WHITE,
            ambient_intensity: 1.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        let page = Colour::from_hex(0xdddddd);
        Self {
            dimensions: [1.0, 1.4, 0.1],
            rotation: [0.3, 0.5, 0.0],
            scale: 1.5,
            faces: [
                FaceMaterial::Colour(page),
                FaceMaterial::Colour(Colour::from_hsl(190.0, 100.0, 34.0)),
                FaceMaterial::Colour(page),
                FaceMaterial::Colour(page),
                FaceMaterial::Texture("bookCover-color.png".to_string()),
                FaceMaterial::Colour(Colour::from_hsl(190.0, 100.0, 37.0)),
            ],
            rotation_velocity: [0.0, 0.005],
            velocity_decay: 0.999,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.1,
            rotate_speed: 1.0,
        }
    }
}
