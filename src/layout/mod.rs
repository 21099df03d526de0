//! Attribute and buffer layout.
//!
//! - [`LayoutBuilder`] - Validates CPU mesh data and packs it into byte regions
//! - [`BufferLayout`] - The packed regions plus descriptors
//! - [`BufferDescriptor`] - Element type, components, stride, offset and count

mod builder;
mod descriptor;

pub use builder::{
    AttributeSchema, BufferKind, BufferLayout, ByteBuffer, LayoutBuilder, LayoutPolicy,
};
pub use descriptor::{
    AttributeDescriptor, BufferDescriptor, ElementType, IndexDescriptor, IndexFormat,
};
