//! CPU-side mesh types and generators.
//!
//! - [`VertexAttributeSet`] - Named per-vertex channels that must agree on N
//! - [`IndexSequence`] - Triangle-list indices into the attribute set
//! - [`MeshData`] - Generator output handed to the layout builder
//! - Generators for common shapes (cube, UV sphere, torus, subdivided sphere)

mod data;
pub mod generators;
pub mod harmonics;

pub use data::{
    AttributeChannel, AttributeSemantic, IndexSequence, MeshData, VertexAttributeSet, MAX_COMPONENTS,
};
pub use generators::{cube, cuboid, subdivided_sphere, torus, uv_sphere, Shape};
pub use harmonics::harmonic_sphere;
