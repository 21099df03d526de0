//! Logical/device coordinate mapping.
//!
//! The logical frame is the square `[-1, 1] x [-1, 1]` with the origin at the
//! center and y up. Device space is pixels with the origin at the top-left
//! and y down. The forward map is built as
//! `translate(center) * scale(w / 2, -h / 2)`, in that order.

mod overlay;

pub use overlay::{
    CanvasOverlay, LineSegment, Marker, AXIS_COLOR, GRID_COLOR, GRID_DIVISIONS, POINT_COLOR,
    POINT_RADIUS,
};

use glam::{Affine2, Vec2};

use crate::error::{ViewerError, ViewerResult};

/// Device pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DeviceRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    fn check(&self) -> ViewerResult<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(ViewerError::DegenerateRectangle {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Logical-to-device transform for `rect`.
pub fn logical_transform(rect: &DeviceRect) -> Affine2 {
    Affine2::from_translation(rect.center())
        * Affine2::from_scale(Vec2::new(rect.width * 0.5, -rect.height * 0.5))
}

/// Invert an affine map, failing instead of dividing by zero.
pub fn invert(transform: &Affine2) -> ViewerResult<Affine2> {
    let determinant = transform.matrix2.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return Err(ViewerError::UninvertibleTransform { determinant });
    }
    Ok(transform.inverse())
}

/// True if `p` lies in `[-1, 1] x [-1, 1]`.
pub fn in_logical_square(p: Vec2) -> bool {
    (-1.0..=1.0).contains(&p.x) && (-1.0..=1.0).contains(&p.y)
}

/// Forward and inverse maps for one device rectangle.
///
/// Rebuild with [`LogicalFrame::resize`] whenever the rectangle changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalFrame {
    rect: DeviceRect,
    forward: Affine2,
    inverse: Affine2,
}

impl LogicalFrame {
    /// Fails with [`ViewerError::DegenerateRectangle`] unless width and
    /// height are positive and finite.
    pub fn new(rect: DeviceRect) -> ViewerResult<Self> {
        rect.check()?;
        let forward = logical_transform(&rect);
        let inverse = invert(&forward)?;
        Ok(Self {
            rect,
            forward,
            inverse,
        })
    }

    /// Replace the rectangle. On failure the previous frame is kept.
    pub fn resize(&mut self, rect: DeviceRect) -> ViewerResult<()> {
        *self = Self::new(rect)?;
        log::debug!("Logical frame resized to {}x{}", rect.width, rect.height);
        Ok(())
    }

    pub fn rect(&self) -> &DeviceRect {
        &self.rect
    }

    pub fn transform(&self) -> &Affine2 {
        &self.forward
    }

    pub fn inverse(&self) -> &Affine2 {
        &self.inverse
    }

    pub fn to_device(&self, logical: Vec2) -> Vec2 {
        self.forward.transform_point2(logical)
    }

    pub fn to_logical(&self, device: Vec2) -> Vec2 {
        self.inverse.transform_point2(device)
    }

    pub fn contains_logical(&self, logical: Vec2) -> bool {
        in_logical_square(logical)
    }

    /// Logical position of a device point, if it falls inside the canvas.
    pub fn device_hit(&self, device: Vec2) -> Option<Vec2> {
        let logical = self.to_logical(device);
        in_logical_square(logical).then_some(logical)
    }

    /// Device pixels per logical unit along each axis.
    pub fn scale(&self) -> Vec2 {
        Vec2::new(self.rect.width * 0.5, self.rect.height * 0.5)
    }
}
