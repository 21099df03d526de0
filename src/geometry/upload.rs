//! Explicit upload context for geometry byte regions.
//!
//! Buffers are created through a context handed to each call. There is no
//! ambient "current" device.

use std::collections::HashMap;

use crate::error::{ViewerError, ViewerResult};
use crate::layout::{AttributeDescriptor, BufferKind, IndexDescriptor};
use crate::mesh::AttributeSemantic;

use super::PrimitiveTopology;

/// Handle to an uploaded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub(crate) u64);

impl BufferHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Buffer usage flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferUsage(u32);

impl BufferUsage {
    pub const COPY_DST: Self = Self(1 << 0);
    pub const INDEX: Self = Self(1 << 1);
    pub const VERTEX: Self = Self(1 << 2);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl std::ops::BitOr for BufferUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl From<BufferKind> for BufferUsage {
    fn from(kind: BufferKind) -> Self {
        match kind {
            BufferKind::Vertex => Self::VERTEX | Self::COPY_DST,
            BufferKind::Index => Self::INDEX | Self::COPY_DST,
        }
    }
}

/// One buffer creation request.
#[derive(Debug, Clone, Copy)]
pub struct BufferUpload<'a> {
    pub label: Option<&'a str>,
    pub usage: BufferUsage,
    pub contents: &'a [u8],
}

/// Destination for geometry byte regions.
pub trait UploadContext {
    /// Create a buffer initialised with `desc.contents`.
    fn create_buffer(&mut self, desc: &BufferUpload<'_>) -> ViewerResult<BufferHandle>;

    /// Release a buffer created by this context.
    fn destroy_buffer(&mut self, handle: BufferHandle);
}

/// Geometry whose regions live in an upload context.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedGeometry {
    buffers: Vec<BufferHandle>,
    attributes: Vec<AttributeDescriptor>,
    index: IndexDescriptor,
    topology: PrimitiveTopology,
}

impl UploadedGeometry {
    pub(crate) fn new(
        buffers: Vec<BufferHandle>,
        attributes: Vec<AttributeDescriptor>,
        index: IndexDescriptor,
        topology: PrimitiveTopology,
    ) -> Self {
        Self {
            buffers,
            attributes,
            index,
            topology,
        }
    }

    pub fn buffers(&self) -> &[BufferHandle] {
        &self.buffers
    }

    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn index(&self) -> &IndexDescriptor {
        &self.index
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Handle of the region backing `semantic`.
    pub fn attribute_buffer(&self, semantic: &AttributeSemantic) -> Option<BufferHandle> {
        let attribute = self.attributes.iter().find(|a| &a.semantic == semantic)?;
        self.buffers.get(attribute.buffer.buffer_index).copied()
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.buffers.get(self.index.buffer_index).copied()
    }
}

#[derive(Debug, Clone)]
struct StoredBuffer {
    label: Option<String>,
    usage: BufferUsage,
    data: Vec<u8>,
}

/// In-memory upload context that keeps every buffer for inspection.
#[derive(Debug, Default)]
pub struct MemoryContext {
    buffers: HashMap<BufferHandle, StoredBuffer>,
    next_id: u64,
    byte_limit: Option<usize>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse uploads once the total stored size would exceed `limit` bytes.
    pub fn with_byte_limit(mut self, limit: usize) -> Self {
        self.byte_limit = Some(limit);
        self
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.buffers.values().map(|b| b.data.len()).sum()
    }

    pub fn contents(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&handle).map(|b| b.data.as_slice())
    }

    pub fn usage(&self, handle: BufferHandle) -> Option<BufferUsage> {
        self.buffers.get(&handle).map(|b| b.usage)
    }

    pub fn label(&self, handle: BufferHandle) -> Option<&str> {
        self.buffers.get(&handle)?.label.as_deref()
    }
}

impl UploadContext for MemoryContext {
    fn create_buffer(&mut self, desc: &BufferUpload<'_>) -> ViewerResult<BufferHandle> {
        if let Some(limit) = self.byte_limit {
            let total = self.total_bytes() + desc.contents.len();
            if total > limit {
                return Err(ViewerError::UploadFailed(format!(
                    "{:?}: {} bytes would exceed the {} byte limit",
                    desc.label,
                    desc.contents.len(),
                    limit
                )));
            }
        }

        let handle = BufferHandle(self.next_id);
        self.next_id += 1;
        log::trace!(
            "MemoryContext: creating buffer {:?} (size: {})",
            desc.label,
            desc.contents.len()
        );
        self.buffers.insert(
            handle,
            StoredBuffer {
                label: desc.label.map(str::to_string),
                usage: desc.usage,
                data: desc.contents.to_vec(),
            },
        );
        Ok(handle)
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        log::trace!("MemoryContext: destroying buffer {:?}", handle);
        self.buffers.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_flags() {
        let usage = BufferUsage::from(BufferKind::Index);
        assert!(usage.contains(BufferUsage::INDEX));
        assert!(usage.contains(BufferUsage::COPY_DST));
        assert!(!usage.contains(BufferUsage::VERTEX));
    }

    #[test]
    fn test_memory_context_stores_buffers() {
        let mut ctx = MemoryContext::new();
        let handle = ctx
            .create_buffer(&BufferUpload {
                label: Some("bytes"),
                usage: BufferUsage::VERTEX,
                contents: &[1, 2, 3, 4],
            })
            .unwrap();

        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.contents(handle), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(ctx.label(handle), Some("bytes"));

        ctx.destroy_buffer(handle);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_memory_context_limit() {
        let mut ctx = MemoryContext::new().with_byte_limit(4);
        let upload = BufferUpload {
            label: None,
            usage: BufferUsage::VERTEX,
            contents: &[0; 3],
        };
        assert!(ctx.create_buffer(&upload).is_ok());
        assert!(matches!(
            ctx.create_buffer(&upload),
            Err(ViewerError::UploadFailed(_))
        ));
        assert_eq!(ctx.total_bytes(), 3);
    }
}
