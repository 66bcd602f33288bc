//! pixel-book
//!
//! Renders a single spinning book with a pixelated look, natively through
//! `winit` and in the browser through WebGL. The scene is drawn into an
//! intermediate target and a full-screen post-processing pass turns it into a
//! mosaic of fixed-size blocks.
//!
//! High-level modules
//! - `animation`: idle spin of the book and the drag gate that pauses it
//! - `camera`: camera, projection and the orbit controller
//! - `config`: every tunable constant, grouped in [`config::AppConfig`]
//! - `context`: window, surface, device and the shared uniforms
//! - `data_structures`: box geometry, materials, instances and textures
//! - `flow`: the event loop, per-frame tick and resize handling
//! - `pixelate`: block parameters and a CPU reference of the shader
//! - `pipelines`: the scene pipeline and the pixelation pass
//! - `render`: the two-pass render target chain
//! - `resources`: asset loading
//! - `scene`: assembly of the book and its pipeline
//!

pub mod animation;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod pixelate;
pub mod render;
pub mod resources;
pub mod scene;

pub use config::AppConfig;
pub use flow::{run, run_with};
pub use winit::dpi::PhysicalPosition;
pub use winit::event::WindowEvent;
