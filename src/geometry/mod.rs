//! Renderable geometry handle.
//!
//! A [`Geometry`] owns a validated [`BufferLayout`] and a topology tag. It is
//! immutable once built and handed to a [`SceneAttachment`] by value.

mod upload;

pub use upload::{
    BufferHandle, BufferUpload, BufferUsage, MemoryContext, UploadContext, UploadedGeometry,
};

use crate::error::ViewerResult;
use crate::layout::{AttributeDescriptor, BufferLayout, IndexDescriptor, LayoutBuilder};
use crate::mesh::MeshData;

/// How indices group into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
}

impl PrimitiveTopology {
    /// Indices consumed per primitive.
    pub fn vertices_per_primitive(&self) -> u32 {
        match self {
            Self::TriangleList => 3,
        }
    }
}

/// Buffer descriptions plus topology for one mesh instance.
#[derive(Debug, PartialEq)]
pub struct Geometry {
    layout: BufferLayout,
    topology: PrimitiveTopology,
    label: Option<String>,
}

impl Geometry {
    pub fn from_layout(layout: BufferLayout) -> Self {
        Self {
            layout,
            topology: PrimitiveTopology::TriangleList,
            label: None,
        }
    }

    /// Lay out `mesh` with `builder`. Nothing is returned if validation fails.
    pub fn build(mesh: &MeshData, builder: &LayoutBuilder) -> ViewerResult<Self> {
        let layout = builder.build(&mesh.attributes, &mesh.indices)?;
        Ok(Self {
            layout,
            topology: PrimitiveTopology::TriangleList,
            label: mesh.label.clone(),
        })
    }

    /// Planar layout with 32-bit indices.
    pub fn from_mesh(mesh: &MeshData) -> ViewerResult<Self> {
        Self::build(mesh, &LayoutBuilder::new())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn attributes(&self) -> &[AttributeDescriptor] {
        self.layout.attributes()
    }

    pub fn index(&self) -> &IndexDescriptor {
        self.layout.index()
    }

    pub fn vertex_count(&self) -> u32 {
        self.layout.vertex_count()
    }

    pub fn index_count(&self) -> u32 {
        self.layout.index_count()
    }

    pub fn primitive_count(&self) -> u32 {
        self.index_count() / self.topology.vertices_per_primitive()
    }

    /// Upload every byte region through `ctx`.
    ///
    /// If any region is refused, regions already created are destroyed and
    /// the error is returned.
    pub fn upload<C>(&self, ctx: &mut C) -> ViewerResult<UploadedGeometry>
    where
        C: UploadContext + ?Sized,
    {
        let mut handles = Vec::with_capacity(self.layout.buffers().len());
        for buffer in self.layout.buffers() {
            let upload = BufferUpload {
                label: buffer.label.as_deref(),
                usage: BufferUsage::from(buffer.kind),
                contents: &buffer.data,
            };
            match ctx.create_buffer(&upload) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    log::warn!(
                        "Upload of {:?} failed after {} regions: {}",
                        self.label,
                        handles.len(),
                        err
                    );
                    for handle in handles {
                        ctx.destroy_buffer(handle);
                    }
                    return Err(err);
                }
            }
        }

        log::debug!(
            "Uploaded {:?}: {} regions, {} bytes",
            self.label,
            handles.len(),
            self.layout.total_bytes()
        );
        Ok(UploadedGeometry::new(
            handles,
            self.layout.attributes().to_vec(),
            *self.layout.index(),
            self.topology,
        ))
    }
}

/// An external entity system that accepts geometry with a material and a
/// transform component.
pub trait SceneAttachment {
    type Material;
    type Transform;
    type Handle;

    /// Attach `geometry`. The attachment owns it from here on.
    fn attach(
        &mut self,
        geometry: Geometry,
        material: Self::Material,
        transform: Self::Transform,
    ) -> Self::Handle;
}
