//! Instance transformation data for GPU rendering.
//!
//! The book's transform (position, Euler rotation, scale) is packed into an
//! [`InstanceRaw`] and streamed to the vertex shader through an instance
//! buffer that is rewritten every frame.

use cgmath::{Matrix4, Rad, Vector3};

use crate::data_structures::model;

/// Per-instance transformation with rotation stored as Euler angles.
///
/// The rotation is applied in XYZ order: `Rx * Ry * Rz`. Keeping the angles
/// (instead of a quaternion) lets the idle spin add to each axis directly.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    /// Euler angles in radians.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
}

/**
 * Stride layout here: the model matrix as four column vectors. A mat4 takes up
 * four vertex slots, one per vec4.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance, not once per vertex.
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Transform};

    use super::*;

    #[test]
    fn identity_instance_keeps_points() {
        let p = Instance::new().to_matrix().transform_point(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn scale_applies_before_rotation() {
        let mut instance = Instance::new();
        instance.scale = Vector3::new(1.5, 1.5, 1.5);
        instance.rotation.y = std::f32::consts::FRAC_PI_2;
        let p = instance.to_matrix().transform_point(Point3::new(1.0, 0.0, 0.0));
        // +x scaled to 1.5 then turned a quarter around y onto -z.
        assert!(p.x.abs() < 1e-6);
        assert!((p.z + 1.5).abs() < 1e-6);
    }

    #[test]
    fn x_rotation_is_outermost() {
        let mut instance = Instance::new();
        instance.rotation = Vector3::new(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0);
        // Ry takes +z to +x, then Rx leaves +x alone.
        let p = instance.to_matrix().transform_point(Point3::new(0.0, 0.0, 1.0));
        assert!((p.x - 1.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6 && p.z.abs() < 1e-6);
    }
}
