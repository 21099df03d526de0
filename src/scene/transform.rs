//! Transform component and the sink interface controllers push into

use std::sync::Arc;

use glam::{Mat3, Mat4, Quat, Vec3};
use parking_lot::Mutex;

/// Anything that accepts a 4x4 model transform.
pub trait TransformSink {
    fn set_matrix(&mut self, matrix: Mat4);
}

impl<S: TransformSink + ?Sized> TransformSink for &mut S {
    fn set_matrix(&mut self, matrix: Mat4) {
        (**self).set_matrix(matrix);
    }
}

impl TransformSink for Mat4 {
    fn set_matrix(&mut self, matrix: Mat4) {
        *self = matrix;
    }
}

/// Transform for positioning an entity in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Decompose an affine matrix into position, rotation and scale.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Get the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Inverse transpose of the upper 3x3 of the model matrix
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.matrix()).inverse().transpose()
    }

    /// Map a local point into world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix().transform_point3(point)
    }
}

impl TransformSink for Transform {
    fn set_matrix(&mut self, matrix: Mat4) {
        *self = Transform::from_matrix(matrix);
    }
}

/// A transform shared between a scene entity and whatever drives it.
///
/// Clones refer to the same transform.
#[derive(Debug, Clone, Default)]
pub struct SharedTransform(Arc<Mutex<Transform>>);

impl SharedTransform {
    pub fn new(transform: Transform) -> Self {
        Self(Arc::new(Mutex::new(transform)))
    }

    /// Copy of the current transform.
    pub fn get(&self) -> Transform {
        *self.0.lock()
    }

    pub fn set(&self, transform: Transform) {
        *self.0.lock() = transform;
    }

    pub fn matrix(&self) -> Mat4 {
        self.0.lock().matrix()
    }

    /// True if both handles refer to the same transform.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl TransformSink for SharedTransform {
    fn set_matrix(&mut self, matrix: Mat4) {
        self.0.lock().set_matrix(matrix);
    }
}
