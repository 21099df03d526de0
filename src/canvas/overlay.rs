//! 2D overlay primitives in device space.
//!
//! Content is defined in logical coordinates and mapped through a
//! [`LogicalFrame`]. Nothing is painted here; callers get line segments and
//! markers ready for whatever draws them.

use glam::Vec2;

use super::{in_logical_square, LogicalFrame};

/// Grid divisions per half axis.
pub const GRID_DIVISIONS: u32 = 5;
/// Point marker radius in logical units.
pub const POINT_RADIUS: f32 = 0.02;

/// RGBA colors of the overlay layers.
pub const GRID_COLOR: [u8; 4] = [64, 64, 64, 64];
pub const AXIS_COLOR: [u8; 4] = [50, 50, 50, 255];
pub const POINT_COLOR: [u8; 4] = [30, 144, 255, 220];

/// Line between two device points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Vec2,
    pub to: Vec2,
}

/// Ellipse marker in device space. Radii differ when the rect is not square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub center: Vec2,
    pub radii: Vec2,
}

/// Logical point set drawn over a grid and axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasOverlay {
    points: Vec<Vec2>,
}

impl CanvasOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the points (logical coordinates).
    pub fn set_points(&mut self, points: impl IntoIterator<Item = Vec2>) {
        self.points = points.into_iter().collect();
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Add the point under a device position if it lies on the canvas.
    pub fn add_device_point(&mut self, frame: &LogicalFrame, device: Vec2) -> bool {
        match frame.device_hit(device) {
            Some(logical) => {
                self.points.push(logical);
                true
            }
            None => false,
        }
    }

    /// Interior grid lines at `+-k/n` for `k` in `1..n`, both directions.
    pub fn grid_lines(&self, frame: &LogicalFrame, divisions: u32) -> Vec<LineSegment> {
        let mut lines = Vec::with_capacity(4 * divisions.saturating_sub(1) as usize);
        for i in 1..divisions {
            let k = i as f32 / divisions as f32;
            for offset in [k, -k] {
                lines.push(segment(frame, Vec2::new(offset, -1.0), Vec2::new(offset, 1.0)));
                lines.push(segment(frame, Vec2::new(-1.0, offset), Vec2::new(1.0, offset)));
            }
        }
        lines
    }

    /// The x axis then the y axis.
    pub fn axes(&self, frame: &LogicalFrame) -> [LineSegment; 2] {
        [
            segment(frame, Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)),
            segment(frame, Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)),
        ]
    }

    /// One marker per point inside the logical square.
    pub fn point_markers(&self, frame: &LogicalFrame, radius: f32) -> Vec<Marker> {
        let radii = frame.scale() * radius;
        self.points
            .iter()
            .filter(|p| in_logical_square(**p))
            .map(|&p| Marker {
                center: frame.to_device(p),
                radii,
            })
            .collect()
    }
}

fn segment(frame: &LogicalFrame, from: Vec2, to: Vec2) -> LineSegment {
    LineSegment {
        from: frame.to_device(from),
        to: frame.to_device(to),
    }
}
