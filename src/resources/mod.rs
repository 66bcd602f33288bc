/**
 * This module contains all logic for loading textures from external files and
 * building the book's materials from them.
 */
pub mod texture;

use crate::{
    config::FaceMaterial,
    data_structures::{
        model::{BoxFace, Material},
        texture::{Filtering, Texture},
    },
    resources::texture::load_texture,
};

/// Build the six face materials of the book, in [`BoxFace::ALL`] order.
///
/// A face whose image cannot be loaded is logged and drawn plain white, so a
/// missing asset never stops the scene from coming up.
pub async fn load_face_materials(
    faces: &[FaceMaterial; 6],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Vec<Material>> {
    let mut materials = Vec::with_capacity(faces.len());
    for (face, appearance) in BoxFace::ALL.iter().zip(faces.iter()) {
        let name = format!("{face:?} face");
        let material = match appearance {
            FaceMaterial::Colour(colour) => Material::new(
                device,
                &name,
                Texture::create_white(device, queue),
                colour.to_linear(),
                layout,
            )?,
            FaceMaterial::Texture(file_name) => {
                let texture = match load_texture(file_name, Filtering::Nearest, device, queue).await
                {
                    Ok(texture) => {
                        log::info!("Loaded {file_name} for the {face:?} face");
                        texture
                    }
                    Err(e) => {
                        log::error!("Texture {file_name} could not be loaded, drawing the {face:?} face white: {e:#}");
                        Texture::create_white(device, queue)
                    }
                };
                Material::new(device, &name, texture, [1.0, 1.0, 1.0], layout)?
            }
        };
        materials.push(material);
    }
    Ok(materials)
}
