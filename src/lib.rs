//! Mesh Viewer - procedural geometry, buffer layout and transforms for an
//! interactive 3D viewer
//!
//! The crate stops short of any GPU or window. It produces:
//! - Procedural meshes (cube, UV sphere, torus, subdivided and harmonic spheres)
//! - Validated buffer layouts with explicit element type, stride and offset
//! - Renderable geometry handles and an explicit upload context
//! - An orbit transform controller driven by an angle animation
//! - The logical/device mapping used by the 2D overlay canvas
//!
//! Generation is pure and may run on a [`worker::GenerationWorker`]; the
//! controller and mapper belong to the thread that presents frames.

pub mod canvas;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod mesh;
pub mod scene;
pub mod worker;

pub use canvas::{CanvasOverlay, DeviceRect, LogicalFrame};
pub use error::{ViewerError, ViewerResult};
pub use geometry::{Geometry, MemoryContext, PrimitiveTopology, SceneAttachment, UploadContext};
pub use layout::{BufferDescriptor, BufferLayout, IndexFormat, LayoutBuilder, LayoutPolicy};
pub use mesh::{IndexSequence, MeshData, Shape, VertexAttributeSet};
pub use scene::{AngleAnimation, Camera, OrbitController, PointLight, Scene, TransformSink};
pub use worker::GenerationWorker;

use glam::Vec4;

/// Background color `#101218`.
pub const DEFAULT_CLEAR_COLOR: Vec4 = Vec4::new(16.0 / 255.0, 18.0 / 255.0, 24.0 / 255.0, 1.0);

/// Configuration for building a viewer scene
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    pub clear_color: Vec4,
    pub camera: Camera,
    pub light: PointLight,
    /// Clock that drives the orbit angle
    pub animation: AngleAnimation,
    /// Orbit radius; 0 spins the mesh in place
    pub orbit_radius: f32,
    /// Mesh to generate
    pub shape: Shape,
    pub layout_policy: LayoutPolicy,
    pub index_format: IndexFormat,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Mesh Viewer".to_string(),
            width: 1024,
            height: 1024,
            clear_color: DEFAULT_CLEAR_COLOR,
            camera: Camera::default(),
            light: PointLight::default(),
            animation: AngleAnimation::default(),
            orbit_radius: scene::DEFAULT_ORBIT_RADIUS,
            shape: Shape::Cube { size: 2.0 },
            layout_policy: LayoutPolicy::Planar,
            index_format: IndexFormat::Uint32,
        }
    }
}

impl ViewerConfig {
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Layout builder for the configured policy and index format
    pub fn layout_builder(&self) -> LayoutBuilder {
        LayoutBuilder::new()
            .with_policy(self.layout_policy)
            .with_index_format(self.index_format)
            .with_label(self.shape.name())
    }

    /// The whole window as a device rectangle
    pub fn device_rect(&self) -> DeviceRect {
        DeviceRect::from_size(self.width as f32, self.height as f32)
    }
}
