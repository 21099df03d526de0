//! Light types for the scene

use glam::Vec3;

/// Ambient term of the flat verification shading.
pub const DEFAULT_AMBIENT: f32 = 0.6;

/// Ambient plus Lambert diffuse: `ambient + max(dot(n, -l), 0)`.
///
/// `light_dir` points from the light toward the surface. Neither vector needs
/// to be normalized.
pub fn lambert(normal: Vec3, light_dir: Vec3, ambient: f32) -> f32 {
    ambient
        + normal
            .normalize_or_zero()
            .dot(-light_dir.normalize_or_zero())
            .max(0.0)
}

/// Point light
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 10.0, 10.0),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }

    /// Direction from the light to `point`.
    pub fn direction_to(&self, point: Vec3) -> Vec3 {
        (point - self.position).normalize_or_zero()
    }

    /// Shade a surface point with this light.
    pub fn shade(&self, point: Vec3, normal: Vec3, ambient: f32) -> Vec3 {
        self.color * self.intensity * lambert(normal, self.direction_to(point), ambient)
    }
}

/// Directional light (like the sun)
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.5, -1.0, -0.5).normalize(),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
            intensity,
        }
    }

    pub fn shade(&self, normal: Vec3, ambient: f32) -> Vec3 {
        self.color * self.intensity * lambert(normal, self.direction, ambient)
    }
}
