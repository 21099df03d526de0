//! Camera

use glam::{Mat3, Mat4, Vec3};

use crate::error::{ViewerError, ViewerResult};

/// Perspective camera looking at a view center
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub view_center: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            view_center: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, view_center: Vec3) -> Self {
        Self {
            position,
            view_center,
            ..Default::default()
        }
    }

    pub fn with_perspective(mut self, fov_y_degrees: f32, near: f32, far: f32) -> Self {
        self.fov_y = fov_y_degrees;
        self.near = near;
        self.far = far;
        self
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.view_center, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Inverse transpose of the upper 3x3 of `view * model`
    pub fn normal_matrix(&self, model: Mat4) -> Mat3 {
        Mat3::from_mat4(self.view_matrix() * model)
            .inverse()
            .transpose()
    }

    /// Get the forward direction
    pub fn forward(&self) -> Vec3 {
        (self.view_center - self.position).normalize()
    }

    /// Update aspect ratio from a viewport size
    pub fn set_aspect(&mut self, width: f32, height: f32) -> ViewerResult<()> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ViewerError::DegenerateRectangle { width, height });
        }
        self.aspect = width / height;
        Ok(())
    }
}
