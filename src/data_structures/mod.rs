//! Data structures for the scene:
//!
//! - `model` contains the box geometry, materials and GPU buffers of the book
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds the per-instance transformation streamed to the shader

pub mod instance;
pub mod model;
pub mod texture;
