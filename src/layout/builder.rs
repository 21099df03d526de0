//! Turns a vertex attribute set and index sequence into byte regions plus
//! descriptors.

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::{AttributeChannel, AttributeSemantic, IndexSequence, VertexAttributeSet};

use super::descriptor::{
    AttributeDescriptor, BufferDescriptor, ElementType, IndexDescriptor, IndexFormat,
};

/// How attribute channels are packed into byte regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutPolicy {
    /// One tightly packed region per channel.
    #[default]
    Planar,
    /// All channels share one region, one vertex after another.
    Interleaved,
}

/// Declared shape of one attribute the caller expects the data to provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    pub semantic: AttributeSemantic,
    pub element_type: ElementType,
    pub components: u32,
}

impl AttributeSchema {
    pub fn new(semantic: AttributeSemantic, element_type: ElementType, components: u32) -> Self {
        Self {
            semantic,
            element_type,
            components,
        }
    }

    /// float3 position.
    pub fn position() -> Self {
        Self::new(AttributeSemantic::Position, ElementType::Float32, 3)
    }

    /// float3 normal.
    pub fn normal() -> Self {
        Self::new(AttributeSemantic::Normal, ElementType::Float32, 3)
    }

    /// float2 texture coordinates.
    pub fn tex_coord() -> Self {
        Self::new(AttributeSemantic::TexCoord, ElementType::Float32, 2)
    }

    fn check(&self, channel: &AttributeChannel) -> ViewerResult<()> {
        let mismatch = |reason: String| ViewerError::SchemaMismatch {
            attribute: self.semantic.name().to_string(),
            reason,
        };
        if self.element_type != ElementType::Float32 {
            return Err(mismatch(format!(
                "declared {:?} but channel data is Float32",
                self.element_type
            )));
        }
        if self.components != channel.components() {
            return Err(mismatch(format!(
                "declared {} components but channel has {}",
                self.components,
                channel.components()
            )));
        }
        Ok(())
    }
}

/// Usage of a byte region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// One contiguous byte region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    pub kind: BufferKind,
    pub data: Vec<u8>,
    pub label: Option<String>,
}

impl ByteBuffer {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Byte regions plus the descriptors that read them.
///
/// Only produced by [`LayoutBuilder::build`], so every descriptor has been
/// checked against its region.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferLayout {
    buffers: Vec<ByteBuffer>,
    attributes: Vec<AttributeDescriptor>,
    index: IndexDescriptor,
    vertex_count: u32,
    policy: LayoutPolicy,
}

impl BufferLayout {
    pub fn buffers(&self) -> &[ByteBuffer] {
        &self.buffers
    }

    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn attribute(&self, semantic: &AttributeSemantic) -> Option<&AttributeDescriptor> {
        self.attributes.iter().find(|a| &a.semantic == semantic)
    }

    pub fn index(&self) -> &IndexDescriptor {
        &self.index
    }

    pub fn index_buffer(&self) -> Option<&ByteBuffer> {
        self.buffers.get(self.index.buffer_index)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index.count
    }

    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    /// Total bytes across all regions.
    pub fn total_bytes(&self) -> usize {
        self.buffers.iter().map(ByteBuffer::len).sum()
    }

    /// Decode one attribute back into flat `f32` values.
    pub fn read_attribute(&self, semantic: &AttributeSemantic) -> Option<Vec<f32>> {
        let attribute = self.attribute(semantic)?;
        let region = &self.buffers.get(attribute.buffer.buffer_index)?.data;
        let mut values = Vec::with_capacity(
            attribute.buffer.count as usize * attribute.buffer.components as usize,
        );
        for i in 0..attribute.buffer.count {
            values.extend(attribute.buffer.read_f32(region, i)?);
        }
        Some(values)
    }

    /// Decode the index region back into `u32` values.
    pub fn read_indices(&self) -> Option<Vec<u32>> {
        let data = &self.index_buffer()?.data;
        let values = match self.index.format {
            IndexFormat::Uint16 => data
                .chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]) as u32)
                .collect(),
            IndexFormat::Uint32 => data
                .chunks_exact(4)
                .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };
        Some(values)
    }

    fn validate(&self) -> ViewerResult<()> {
        for attribute in &self.attributes {
            let name = attribute.semantic.name();
            let region = self.buffers.get(attribute.buffer.buffer_index).ok_or_else(|| {
                ViewerError::InvalidStride {
                    attribute: name.to_string(),
                    reason: format!("no region {}", attribute.buffer.buffer_index),
                }
            })?;
            attribute.buffer.validate_within(name, region.len())?;
        }
        let index_len = self.index_buffer().map_or(0, ByteBuffer::len);
        self.index.as_buffer().validate_within("index", index_len)
    }
}

/// Builder that turns CPU attribute data into a [`BufferLayout`].
///
/// Validation runs in a fixed order: channel agreement, index sequence length,
/// index range, index type width, declared schema, then the stride of every
/// produced descriptor.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    policy: LayoutPolicy,
    index_format: IndexFormat,
    schema: Option<Vec<AttributeSchema>>,
    label: Option<String>,
}

impl LayoutBuilder {
    /// Planar layout with 32-bit indices.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: LayoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_index_format(mut self, format: IndexFormat) -> Self {
        self.index_format = format;
        self
    }

    /// Restrict and order the emitted attributes. Every entry must match a
    /// channel in the data.
    pub fn with_schema(mut self, schema: Vec<AttributeSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    pub fn index_format(&self) -> IndexFormat {
        self.index_format
    }

    /// Build byte regions and descriptors.
    pub fn build(
        &self,
        attributes: &VertexAttributeSet,
        indices: &IndexSequence,
    ) -> ViewerResult<BufferLayout> {
        let vertex_count = attributes.vertex_count()?;
        indices.validate(vertex_count)?;
        let index_bytes = self.encode_indices(indices)?;
        let channels = self.select_channels(attributes)?;

        let (mut buffers, descriptors) = match self.policy {
            LayoutPolicy::Planar => self.planar(&channels, vertex_count),
            LayoutPolicy::Interleaved => self.interleaved(&channels, vertex_count)?,
        };

        let index = IndexDescriptor {
            format: self.index_format,
            count: indices.len() as u32,
            buffer_index: buffers.len(),
        };
        buffers.push(ByteBuffer {
            kind: BufferKind::Index,
            data: index_bytes,
            label: self.buffer_label("indices"),
        });

        let layout = BufferLayout {
            buffers,
            attributes: descriptors,
            index,
            vertex_count,
            policy: self.policy,
        };
        layout.validate()?;

        log::debug!(
            "Built {:?} layout: {} vertices, {} indices ({:?}), {} regions, {} bytes",
            self.policy,
            vertex_count,
            indices.len(),
            self.index_format,
            layout.buffers.len(),
            layout.total_bytes()
        );
        Ok(layout)
    }

    fn encode_indices(&self, indices: &IndexSequence) -> ViewerResult<Vec<u8>> {
        match self.index_format {
            IndexFormat::Uint32 => Ok(bytemuck::cast_slice(indices.as_slice()).to_vec()),
            IndexFormat::Uint16 => {
                let narrow = indices
                    .as_slice()
                    .iter()
                    .map(|&value| {
                        u16::try_from(value).map_err(|_| ViewerError::IndexTypeOverflow {
                            value,
                            format: IndexFormat::Uint16,
                            max: IndexFormat::Uint16.max_value(),
                        })
                    })
                    .collect::<ViewerResult<Vec<u16>>>()?;
                Ok(bytemuck::cast_slice(&narrow).to_vec())
            }
        }
    }

    fn select_channels<'a>(
        &self,
        attributes: &'a VertexAttributeSet,
    ) -> ViewerResult<Vec<&'a AttributeChannel>> {
        let Some(schema) = &self.schema else {
            return Ok(attributes.channels().iter().collect());
        };
        if schema.is_empty() {
            return Err(ViewerError::SchemaMismatch {
                attribute: "<none>".to_string(),
                reason: "schema names no attributes".to_string(),
            });
        }
        for (i, entry) in schema.iter().enumerate() {
            if schema[..i].iter().any(|e| e.semantic == entry.semantic) {
                return Err(ViewerError::SchemaMismatch {
                    attribute: entry.semantic.name().to_string(),
                    reason: "listed more than once".to_string(),
                });
            }
        }
        schema
            .iter()
            .map(|entry| {
                let channel =
                    attributes
                        .get(&entry.semantic)
                        .ok_or_else(|| ViewerError::SchemaMismatch {
                            attribute: entry.semantic.name().to_string(),
                            reason: "no such channel in the attribute set".to_string(),
                        })?;
                entry.check(channel)?;
                Ok(channel)
            })
            .collect()
    }

    fn planar(
        &self,
        channels: &[&AttributeChannel],
        vertex_count: u32,
    ) -> (Vec<ByteBuffer>, Vec<AttributeDescriptor>) {
        channels
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                let buffer = ByteBuffer {
                    kind: BufferKind::Vertex,
                    data: bytemuck::cast_slice(channel.values()).to_vec(),
                    label: self.buffer_label(channel.semantic().name()),
                };
                let descriptor = AttributeDescriptor {
                    semantic: channel.semantic().clone(),
                    buffer: BufferDescriptor::packed(
                        i,
                        ElementType::Float32,
                        channel.components(),
                        vertex_count,
                    ),
                };
                (buffer, descriptor)
            })
            .unzip()
    }

    fn interleaved(
        &self,
        channels: &[&AttributeChannel],
        vertex_count: u32,
    ) -> ViewerResult<(Vec<ByteBuffer>, Vec<AttributeDescriptor>)> {
        let overflow = |channel: &AttributeChannel| ViewerError::InvalidStride {
            attribute: channel.semantic().name().to_string(),
            reason: "interleaved element size overflows u32".to_string(),
        };
        let mut element_sizes = Vec::with_capacity(channels.len());
        let mut stride: u32 = 0;
        for &channel in channels {
            let size = channel
                .components()
                .checked_mul(ElementType::Float32.size())
                .ok_or_else(|| overflow(channel))?;
            stride = stride.checked_add(size).ok_or_else(|| overflow(channel))?;
            element_sizes.push(size);
        }

        let mut offset = 0;
        let descriptors = channels
            .iter()
            .zip(&element_sizes)
            .map(|(channel, size)| {
                let descriptor = AttributeDescriptor {
                    semantic: channel.semantic().clone(),
                    buffer: BufferDescriptor {
                        buffer_index: 0,
                        element_type: ElementType::Float32,
                        components: channel.components(),
                        stride,
                        offset,
                        count: vertex_count,
                    },
                };
                offset += size;
                descriptor
            })
            .collect();

        let mut data = Vec::with_capacity(stride as usize * vertex_count as usize);
        for vertex in 0..vertex_count as usize {
            for channel in channels {
                let n = channel.components() as usize;
                let values = &channel.values()[vertex * n..(vertex + 1) * n];
                data.extend_from_slice(bytemuck::cast_slice(values));
            }
        }

        let buffer = ByteBuffer {
            kind: BufferKind::Vertex,
            data,
            label: self.buffer_label("vertices"),
        };
        Ok((vec![buffer], descriptors))
    }

    fn buffer_label(&self, suffix: &str) -> Option<String> {
        self.label.as_ref().map(|label| format!("{label}.{suffix}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{cube, uv_sphere, AttributeChannel, MeshData};

    fn triangle() -> MeshData {
        MeshData::from_raw(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_planar_cube() {
        let mesh = cube(2.0).unwrap();
        let layout = LayoutBuilder::new()
            .build(&mesh.attributes, &mesh.indices)
            .unwrap();

        // position, normal, uv, indices
        assert_eq!(layout.buffers().len(), 4);
        assert_eq!(layout.vertex_count(), 24);
        assert_eq!(layout.index_count(), 36);

        let position = layout.attribute(&AttributeSemantic::Position).unwrap();
        assert_eq!(position.buffer.stride, 0);
        assert_eq!(position.buffer.offset, 0);
        assert_eq!(position.buffer.count, 24);
        assert_eq!(layout.buffers()[0].len(), 24 * 12);

        let uv = layout.attribute(&AttributeSemantic::TexCoord).unwrap();
        assert_eq!(uv.buffer.components, 2);
        assert_eq!(layout.buffers()[2].len(), 24 * 8);

        assert_eq!(layout.index().buffer_index, 3);
        assert_eq!(layout.index_buffer().unwrap().kind, BufferKind::Index);
        assert_eq!(layout.index_buffer().unwrap().len(), 36 * 4);
    }

    #[test]
    fn test_interleaved_position_normal() {
        let mesh = triangle();
        let layout = LayoutBuilder::new()
            .with_policy(LayoutPolicy::Interleaved)
            .with_index_format(IndexFormat::Uint16)
            .build(&mesh.attributes, &mesh.indices)
            .unwrap();

        assert_eq!(layout.buffers().len(), 2);
        let position = layout.attribute(&AttributeSemantic::Position).unwrap();
        let normal = layout.attribute(&AttributeSemantic::Normal).unwrap();
        assert_eq!((position.buffer.stride, position.buffer.offset), (24, 0));
        assert_eq!((normal.buffer.stride, normal.buffer.offset), (24, 12));
        assert_eq!(layout.buffers()[0].len(), 3 * 24);
        assert_eq!(layout.index_buffer().unwrap().len(), 6);
    }

    #[test]
    fn test_interleaved_round_trips_values() {
        let mesh = cube(1.0).unwrap();
        let layout = LayoutBuilder::new()
            .with_policy(LayoutPolicy::Interleaved)
            .build(&mesh.attributes, &mesh.indices)
            .unwrap();

        let stride = layout.attributes()[0].buffer.stride;
        assert_eq!(stride, 32);
        for channel in mesh.attributes.channels() {
            assert_eq!(
                layout.read_attribute(channel.semantic()).unwrap(),
                channel.values()
            );
        }
        assert_eq!(layout.read_indices().unwrap(), mesh.indices.as_slice());
    }

    #[test]
    fn test_schema_selects_and_orders() {
        let mesh = cube(1.0).unwrap();
        let layout = LayoutBuilder::new()
            .with_schema(vec![AttributeSchema::normal(), AttributeSchema::position()])
            .build(&mesh.attributes, &mesh.indices)
            .unwrap();

        assert_eq!(layout.attributes().len(), 2);
        assert_eq!(layout.attributes()[0].semantic, AttributeSemantic::Normal);
        assert_eq!(layout.attributes()[1].buffer.buffer_index, 1);
        assert!(layout.attribute(&AttributeSemantic::TexCoord).is_none());
    }

    #[test]
    fn test_schema_mismatch() {
        let mesh = triangle();
        let missing = LayoutBuilder::new()
            .with_schema(vec![AttributeSchema::tex_coord()])
            .build(&mesh.attributes, &mesh.indices);
        assert!(matches!(missing, Err(ViewerError::SchemaMismatch { .. })));

        let wrong_arity = LayoutBuilder::new()
            .with_schema(vec![AttributeSchema::new(
                AttributeSemantic::Position,
                ElementType::Float32,
                4,
            )])
            .build(&mesh.attributes, &mesh.indices);
        assert!(matches!(wrong_arity, Err(ViewerError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_schema_rejects_empty_and_duplicates() {
        let mesh = cube(1.0).unwrap();
        let empty = LayoutBuilder::new()
            .with_schema(vec![])
            .build(&mesh.attributes, &mesh.indices);
        assert!(matches!(empty, Err(ViewerError::SchemaMismatch { .. })));

        let duplicate = LayoutBuilder::new()
            .with_schema(vec![
                AttributeSchema::position(),
                AttributeSchema::normal(),
                AttributeSchema::position(),
            ])
            .build(&mesh.attributes, &mesh.indices);
        assert!(matches!(
            duplicate,
            Err(ViewerError::SchemaMismatch { attribute, .. }) if attribute == "position"
        ));
    }

    #[rstest::rstest]
    #[case::planar(LayoutPolicy::Planar)]
    #[case::interleaved(LayoutPolicy::Interleaved)]
    fn test_rejects_oversized_arity(#[case] policy: LayoutPolicy) {
        let attributes = VertexAttributeSet::new().with_channel(AttributeChannel::new(
            AttributeSemantic::Custom("wide".into()),
            1 << 30,
            Vec::new(),
        ));
        let result = LayoutBuilder::new()
            .with_policy(policy)
            .build(&attributes, &IndexSequence::default());
        assert!(matches!(
            result,
            Err(ViewerError::MalformedAttributeSet(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_channels() {
        let attributes = VertexAttributeSet::new()
            .with_channel(AttributeChannel::new(
                AttributeSemantic::Position,
                3,
                vec![0.0; 9],
            ))
            .with_channel(AttributeChannel::new(
                AttributeSemantic::Normal,
                3,
                vec![0.0; 6],
            ));
        let result = LayoutBuilder::new().build(&attributes, &IndexSequence::new(vec![0, 1, 2]));
        assert!(matches!(result, Err(ViewerError::MalformedAttributeSet(_))));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let mut mesh = cube(1.0).unwrap();
        mesh.indices = IndexSequence::new(vec![0, 1, 24]);
        let result = LayoutBuilder::new().build(&mesh.attributes, &mesh.indices);
        assert_eq!(
            result.unwrap_err(),
            ViewerError::IndexOutOfRange {
                position: 2,
                value: 24,
                vertex_count: 24,
            }
        );
    }

    #[test]
    fn test_rejects_u16_overflow() {
        // 257 * 257 = 66049 vertices
        let mesh = uv_sphere(256, 256, 1.0).unwrap();
        let result = LayoutBuilder::new()
            .with_index_format(IndexFormat::Uint16)
            .build(&mesh.attributes, &mesh.indices);
        assert!(matches!(
            result,
            Err(ViewerError::IndexTypeOverflow {
                format: IndexFormat::Uint16,
                max: 65_535,
                ..
            })
        ));

        assert!(LayoutBuilder::new()
            .build(&mesh.attributes, &mesh.indices)
            .is_ok());
    }

    #[test]
    fn test_range_checked_before_width() {
        let attributes = VertexAttributeSet::new().with_channel(AttributeChannel::new(
            AttributeSemantic::Position,
            3,
            vec![0.0; 9],
        ));
        let result = LayoutBuilder::new()
            .with_index_format(IndexFormat::Uint16)
            .build(&attributes, &IndexSequence::new(vec![0, 1, 70_000]));
        assert!(matches!(result, Err(ViewerError::IndexOutOfRange { .. })));
    }

    #[test]
    fn test_buffer_labels() {
        let mesh = triangle();
        let layout = LayoutBuilder::new()
            .with_label("tri")
            .build(&mesh.attributes, &mesh.indices)
            .unwrap();
        assert_eq!(layout.buffers()[0].label.as_deref(), Some("tri.position"));
        assert_eq!(
            layout.index_buffer().unwrap().label.as_deref(),
            Some("tri.indices")
        );
    }
}
