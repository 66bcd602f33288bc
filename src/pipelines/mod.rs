//! Render pipelines:
//!
//! - `basic` draws the textured book into the scene target
//! - `light` holds the ambient light uniform the basic shader reads
//! - `pixelate` is the full-screen post-processing pass

pub mod basic;
pub mod light;
pub mod pixelate;
