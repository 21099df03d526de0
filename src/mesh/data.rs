//! CPU-side vertex attribute channels and index sequences.
//!
//! This module provides:
//! - [`AttributeSemantic`] - Name of a per-vertex channel
//! - [`AttributeChannel`] - One dense channel of fixed-arity `f32` tuples
//! - [`VertexAttributeSet`] - Ordered set of channels describing N vertices
//! - [`IndexSequence`] - Triangle-list indices into a [`VertexAttributeSet`]
//! - [`MeshData`] - Attributes and indices produced by a generator or source
//!
//! Nothing here validates on construction. Ragged channels and bad indices
//! are representable so that external sources can hand over raw data; the
//! layout builder rejects them before any buffer is described.

use glam::{Vec2, Vec3};

use crate::error::{ViewerError, ViewerResult};

/// Widest accepted channel arity (a float4).
pub const MAX_COMPONENTS: u32 = 4;

/// Semantic meaning of an attribute channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    /// Vertex position (float3).
    Position,
    /// Vertex normal (float3).
    Normal,
    /// Texture coordinates (float2).
    TexCoord,
    /// Any other named channel.
    Custom(String),
}

impl AttributeSemantic {
    /// Channel name as used in attribute schemas.
    pub fn name(&self) -> &str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::TexCoord => "uv",
            Self::Custom(name) => name,
        }
    }
}

/// One named channel of per-vertex data.
///
/// Values are stored flat; element `i` occupies
/// `values[i * components..(i + 1) * components]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChannel {
    semantic: AttributeSemantic,
    components: u32,
    values: Vec<f32>,
}

impl AttributeChannel {
    /// Create a channel from flat values.
    pub fn new(semantic: AttributeSemantic, components: u32, values: Vec<f32>) -> Self {
        Self {
            semantic,
            components,
            values,
        }
    }

    /// Create a 3-component channel.
    pub fn from_vec3(semantic: AttributeSemantic, data: &[Vec3]) -> Self {
        Self::new(semantic, 3, bytemuck::cast_slice(data).to_vec())
    }

    /// Create a 2-component channel.
    pub fn from_vec2(semantic: AttributeSemantic, data: &[Vec2]) -> Self {
        Self::new(semantic, 2, bytemuck::cast_slice(data).to_vec())
    }

    pub fn semantic(&self) -> &AttributeSemantic {
        &self.semantic
    }

    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of whole elements in the channel.
    ///
    /// Fails if the flat value count is not a multiple of the arity.
    pub fn element_count(&self) -> ViewerResult<u32> {
        if self.components == 0 || self.components > MAX_COMPONENTS {
            return Err(ViewerError::MalformedAttributeSet(format!(
                "channel `{}` declares {} components, expected 1..={MAX_COMPONENTS}",
                self.semantic.name(),
                self.components
            )));
        }
        let len = self.values.len();
        if len % self.components as usize != 0 {
            return Err(ViewerError::MalformedAttributeSet(format!(
                "channel `{}` holds {} values, not a multiple of {} components",
                self.semantic.name(),
                len,
                self.components
            )));
        }
        u32::try_from(len / self.components as usize).map_err(|_| {
            ViewerError::MalformedAttributeSet(format!(
                "channel `{}` exceeds u32 element count",
                self.semantic.name()
            ))
        })
    }

    /// Element `index` as a slice of `components` values.
    pub fn element(&self, index: usize) -> Option<&[f32]> {
        let n = self.components as usize;
        let start = index.checked_mul(n)?;
        self.values.get(start..start.checked_add(n)?)
    }

    /// View a 3-component channel as `Vec3`s.
    pub fn as_vec3(&self) -> Option<&[Vec3]> {
        if self.components != 3 {
            return None;
        }
        bytemuck::try_cast_slice(&self.values).ok()
    }

    /// View a 2-component channel as `Vec2`s.
    pub fn as_vec2(&self) -> Option<&[Vec2]> {
        if self.components != 2 {
            return None;
        }
        bytemuck::try_cast_slice(&self.values).ok()
    }
}

/// Ordered collection of attribute channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexAttributeSet {
    channels: Vec<AttributeChannel>,
}

impl VertexAttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel.
    pub fn with_channel(mut self, channel: AttributeChannel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn push(&mut self, channel: AttributeChannel) {
        self.channels.push(channel);
    }

    pub fn channels(&self) -> &[AttributeChannel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Get a channel by semantic.
    pub fn get(&self, semantic: &AttributeSemantic) -> Option<&AttributeChannel> {
        self.channels.iter().find(|c| &c.semantic == semantic)
    }

    pub fn positions(&self) -> Option<&[Vec3]> {
        self.get(&AttributeSemantic::Position)?.as_vec3()
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.get(&AttributeSemantic::Normal)?.as_vec3()
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.get(&AttributeSemantic::TexCoord)?.as_vec2()
    }

    /// Validate the set and return its vertex count N.
    ///
    /// Every channel must hold whole elements, semantics must be unique and
    /// all channels must agree on N.
    pub fn vertex_count(&self) -> ViewerResult<u32> {
        let Some(first) = self.channels.first() else {
            return Err(ViewerError::MalformedAttributeSet(
                "attribute set has no channels".to_string(),
            ));
        };
        let expected = first.element_count()?;

        for (i, channel) in self.channels.iter().enumerate().skip(1) {
            if self.channels[..i]
                .iter()
                .any(|c| c.semantic == channel.semantic)
            {
                return Err(ViewerError::MalformedAttributeSet(format!(
                    "duplicate channel `{}`",
                    channel.semantic.name()
                )));
            }
            let count = channel.element_count()?;
            if count != expected {
                return Err(ViewerError::MalformedAttributeSet(format!(
                    "channel `{}` has {} elements but `{}` has {}",
                    channel.semantic.name(),
                    count,
                    first.semantic.name(),
                    expected
                )));
            }
        }

        Ok(expected)
    }
}

/// Triangle-list indices referencing vertices by zero-based offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSequence(Vec<u32>);

impl IndexSequence {
    pub fn new(indices: Vec<u32>) -> Self {
        Self(indices)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max(&self) -> Option<u32> {
        self.0.iter().copied().max()
    }

    /// Iterate whole triangles. A trailing partial triangle is skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.0.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Check the triangle-list length and that every index is `< vertex_count`.
    pub fn validate(&self, vertex_count: u32) -> ViewerResult<()> {
        if self.0.len() % 3 != 0 {
            return Err(ViewerError::MalformedIndexSequence { len: self.0.len() });
        }
        if let Some((position, &value)) = self
            .0
            .iter()
            .enumerate()
            .find(|&(_, &value)| value >= vertex_count)
        {
            return Err(ViewerError::IndexOutOfRange {
                position,
                value,
                vertex_count,
            });
        }
        Ok(())
    }
}

impl From<Vec<u32>> for IndexSequence {
    fn from(indices: Vec<u32>) -> Self {
        Self(indices)
    }
}

/// Vertex attributes plus triangle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub attributes: VertexAttributeSet,
    pub indices: IndexSequence,
    pub label: Option<String>,
}

impl MeshData {
    pub fn new(attributes: VertexAttributeSet, indices: IndexSequence) -> Self {
        Self {
            attributes,
            indices,
            label: None,
        }
    }

    /// Build from the raw position/normal/index arrays an external source returns.
    pub fn from_raw(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let attributes = VertexAttributeSet::new()
            .with_channel(AttributeChannel::new(
                AttributeSemantic::Position,
                3,
                positions.into_iter().flatten().collect(),
            ))
            .with_channel(AttributeChannel::new(
                AttributeSemantic::Normal,
                3,
                normals.into_iter().flatten().collect(),
            ));
        Self::new(attributes, IndexSequence::new(indices))
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn vertex_count(&self) -> ViewerResult<u32> {
        self.attributes.vertex_count()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Triangles as position triples. Indices outside the position channel are skipped.
    pub fn triangle_positions(&self) -> Vec<[Vec3; 3]> {
        let Some(positions) = self.attributes.positions() else {
            return Vec::new();
        };
        self.indices
            .triangles()
            .filter_map(|[a, b, c]| {
                Some([
                    *positions.get(a as usize)?,
                    *positions.get(b as usize)?,
                    *positions.get(c as usize)?,
                ])
            })
            .collect()
    }
}
