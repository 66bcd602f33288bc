//! Mesh and material definitions for the book.
//!
//! The book is a box whose six faces are drawn as separate geometry groups,
//! each with its own [`Material`]. [`BoxGeometry`] is the CPU description
//! (vertices, indices, groups); [`Model`] owns the GPU buffers built from it.

use std::ops::Range;

use cgmath::{ElementWise, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::texture;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// The faces of the box, in material order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoxFace {
    Left,
    Right,
    Top,
    Bottom,
    Front,
    Back,
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Left,
        BoxFace::Right,
        BoxFace::Top,
        BoxFace::Bottom,
        BoxFace::Front,
        BoxFace::Back,
    ];

    /// Outward normal, and the axes texture u and v run along.
    ///
    /// `u × v == normal`, so the quads built from them wind counter-clockwise
    /// when seen from outside.
    fn axes(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        let x = Vector3::unit_x();
        let y = Vector3::unit_y();
        let z = Vector3::unit_z();
        match self {
            BoxFace::Left => (-x, z, y),
            BoxFace::Right => (x, -z, y),
            BoxFace::Top => (y, x, -z),
            BoxFace::Bottom => (-y, x, z),
            BoxFace::Front => (z, x, y),
            BoxFace::Back => (-z, -x, y),
        }
    }

    pub fn normal(&self) -> Vector3<f32> {
        self.axes().0
    }
}

/// A contiguous index range drawn with one material.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceGroup {
    pub face: BoxFace,
    pub indices: Range<u32>,
    pub material: usize,
}

/// CPU-side box mesh: four vertices and two triangles per face.
#[derive(Clone, Debug)]
pub struct BoxGeometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u16>,
    pub groups: Vec<FaceGroup>,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        let dimensions = Vector3::new(width, height, depth);
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        let mut groups = Vec::with_capacity(6);

        for (material, face) in BoxFace::ALL.iter().enumerate() {
            let (normal, u, v) = face.axes();
            let base = vertices.len() as u16;
            // Corners in (s, t) order: bottom-left, bottom-right, top-right, top-left.
            for (s, t) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                let unit = normal * 0.5 + u * (s - 0.5) + v * (t - 0.5);
                let position = unit.mul_element_wise(dimensions);
                vertices.push(ModelVertex {
                    position: position.into(),
                    // Texture rows run top to bottom.
                    tex_coords: [s, 1.0 - t],
                });
            }
            let start = indices.len() as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            groups.push(FaceGroup {
                face: *face,
                indices: start..indices.len() as u32,
                material,
            });
        }

        Self {
            vertices,
            indices,
            groups,
        }
    }
}

/// Uniform block of a material: a linear RGBA tint.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub colour: [f32; 4],
}

/// An unlit material: a texture multiplied by a flat colour.
#[derive(Debug)]
pub struct Material {
    #[allow(unused)]
    pub name: String,
    pub diffuse_texture: texture::Texture,
    pub colour_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        diffuse_texture: texture::Texture,
        colour: [f32; 3],
        layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let sampler = diffuse_texture
            .sampler
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("material {name} needs a texture with a sampler"))?;
        let colour_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} colour buffer")),
            contents: bytemuck::cast_slice(&[MaterialUniform {
                colour: [colour[0], colour[1], colour[2], 1.0],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colour_buffer.as_entire_binding(),
                },
            ],
            label: Some(name),
        });

        Ok(Self {
            name: name.to_string(),
            diffuse_texture,
            colour_buffer,
            bind_group,
        })
    }
}

/// GPU buffers of a [`BoxGeometry`] together with one material per group.
#[derive(Debug)]
pub struct Model {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub groups: Vec<FaceGroup>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        geometry: &BoxGeometry,
        materials: Vec<Material>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            groups: geometry.groups.clone(),
            materials,
        }
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        for material in &self.materials {
            material.colour_buffer.destroy();
            material.diffuse_texture.destroy();
        }
    }
}

pub trait DrawModel<'a> {
    fn draw_model_instanced(
        &mut self,
        model: &'a Model,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_model_instanced(
        &mut self,
        model: &'b Model,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, model.vertex_buffer.slice(..));
        self.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        for group in &model.groups {
            let Some(material) = model.materials.get(group.material) else {
                log::warn!("face {:?} references missing material {}", group.face, group.material);
                continue;
            };
            self.set_bind_group(0, &material.bind_group, &[]);
            self.draw_indexed(group.indices.clone(), 0, instances.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn box_has_one_quad_per_face() {
        let geometry = BoxGeometry::new(1.0, 1.4, 0.1);
        assert_eq!(geometry.vertices.len(), 24);
        assert_eq!(geometry.indices.len(), 36);
        let faces: Vec<BoxFace> = geometry.groups.iter().map(|g| g.face).collect();
        assert_eq!(faces, BoxFace::ALL.to_vec());
        for (i, group) in geometry.groups.iter().enumerate() {
            assert_eq!(group.material, i);
            assert_eq!(group.indices, (i as u32 * 6)..(i as u32 * 6 + 6));
        }
    }

    #[test]
    fn vertices_span_the_dimensions() {
        let geometry = BoxGeometry::new(1.0, 1.4, 0.1);
        let max = |axis: usize| {
            geometry
                .vertices
                .iter()
                .map(|v| v.position[axis])
                .fold(f32::MIN, f32::max)
        };
        assert!((max(0) - 0.5).abs() < 1e-6);
        assert!((max(1) - 0.7).abs() < 1e-6);
        assert!((max(2) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn triangles_face_outward() {
        let geometry = BoxGeometry::new(1.0, 1.4, 0.1);
        for group in &geometry.groups {
            for tri in geometry.indices[group.indices.start as usize..group.indices.end as usize]
                .chunks(3)
            {
                let p = |i: u16| Vector3::from(geometry.vertices[i as usize].position);
                let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
                assert!(
                    n.normalize().dot(group.face.normal()) > 0.99,
                    "{:?} winds the wrong way",
                    group.face
                );
            }
        }
    }

    #[test]
    fn front_face_maps_the_full_texture_upright() {
        let geometry = BoxGeometry::new(1.0, 1.4, 0.1);
        let front = &geometry.vertices[16..20];
        // Top-left corner of the cover samples the first texel row.
        let top_left = front
            .iter()
            .find(|v| v.position[0] < 0.0 && v.position[1] > 0.0)
            .map(|v| v.tex_coords);
        assert_eq!(top_left, Some([0.0, 0.0]));
    }
}
