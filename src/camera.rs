//! Perspective camera, projection and the orbit controller.
//!
//! The camera always looks at a fixed target. [`OrbitController`] turns left
//! button drags into rotations around that target and keeps part of the motion
//! alive after release, decaying it by its damping factor on every
//! [`OrbitController::update`]. Zoom and pan are not supported.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, WindowEvent},
};

use crate::config::{CameraConfig, ControlsConfig};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

// Keeps the camera off the poles where the up vector degenerates.
const POLE_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

impl From<&CameraConfig> for Camera {
    fn from(config: &CameraConfig) -> Self {
        Self::new(config.position, config.target)
    }
}

#[derive(Debug, Clone)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Recompute the aspect ratio. Returns `false` if it did not change.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        if aspect == self.aspect {
            return false;
        }
        self.aspect = aspect;
        true
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera plus the controller that moves it.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Drag-to-orbit camera control with inertial damping.
#[derive(Debug, Clone)]
pub struct OrbitController {
    damping_factor: f32,
    rotate_speed: f32,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
    // Pending azimuth (theta) and polar (phi) rotation, consumed by `update`.
    theta_delta: f32,
    phi_delta: f32,
}

impl OrbitController {
    pub fn new(damping_factor: f32, rotate_speed: f32) -> Self {
        Self {
            damping_factor,
            rotate_speed,
            dragging: false,
            last_cursor: None,
            viewport_height: 1.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Height in device pixels that one full turn is mapped onto.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => match state {
                ElementState::Pressed => self.start_drag(),
                ElementState::Released => self.end_drag(),
            },
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(*position),
            WindowEvent::Focused(false) => self.end_drag(),
            _ => (),
        }
    }

    pub fn start_drag(&mut self) {
        self.dragging = true;
        self.last_cursor = None;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
        self.last_cursor = None;
    }

    pub fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if !self.dragging {
            return;
        }
        if let Some(last) = self.last_cursor {
            self.handle_drag((position.x - last.x) as f32, (position.y - last.y) as f32);
        }
        self.last_cursor = Some(position);
    }

    /// Queue a rotation for a pointer movement of `(dx, dy)` device pixels.
    pub fn handle_drag(&mut self, dx: f32, dy: f32) {
        let per_pixel = 2.0 * PI * self.rotate_speed / self.viewport_height;
        self.theta_delta -= dx * per_pixel;
        self.phi_delta -= dy * per_pixel;
    }

    /// Apply one damping step to `camera`.
    pub fn update(&mut self, camera: &mut Camera) {
        let offset = camera.position - camera.target;
        let radius = offset.magnitude();
        if radius == 0.0 {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.theta_delta * self.damping_factor;
        phi += self.phi_delta * self.damping_factor;
        phi = phi.clamp(POLE_EPSILON, PI - POLE_EPSILON);

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = camera.target + offset;

        self.theta_delta *= 1.0 - self.damping_factor;
        self.phi_delta *= 1.0 - self.damping_factor;
    }
}

impl From<&ControlsConfig> for OrbitController {
    fn from(config: &ControlsConfig) -> Self {
        Self::new(config.damping_factor, config.rotate_speed)
    }
}
