//! Buffer and index descriptors.
//!
//! Descriptors carry the element type, component count, byte stride, byte
//! offset and element count of one attribute's view into a byte region.
//! Several attributes may point at the same region (interleaved) or each own
//! one (planar); the descriptor records the same fields either way.

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::AttributeSemantic;

/// Base numeric type of one buffer component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// 32-bit IEEE float.
    Float32,
    /// 32-bit unsigned integer.
    Uint32,
    /// 16-bit unsigned integer.
    Uint16,
}

impl ElementType {
    /// Size in bytes of one component.
    pub fn size(&self) -> u32 {
        match self {
            Self::Float32 | Self::Uint32 => 4,
            Self::Uint16 => 2,
        }
    }
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65535).
    Uint16,
    /// 32-bit unsigned integers.
    #[default]
    Uint32,
}

impl IndexFormat {
    /// Size in bytes of each index.
    pub fn size(&self) -> u32 {
        self.element_type().size()
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Uint16 => ElementType::Uint16,
            Self::Uint32 => ElementType::Uint32,
        }
    }

    /// Largest index value the format can represent.
    pub fn max_value(&self) -> u32 {
        match self {
            Self::Uint16 => u16::MAX as u32,
            Self::Uint32 => u32::MAX,
        }
    }

    /// Smallest format able to hold `max_index`.
    pub fn smallest_for(max_index: u32) -> Self {
        if max_index <= u16::MAX as u32 {
            Self::Uint16
        } else {
            Self::Uint32
        }
    }
}

/// One attribute's view into a byte region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    /// Index of the byte region this view reads from.
    pub buffer_index: usize,
    /// Base type of each component.
    pub element_type: ElementType,
    /// Components per element.
    pub components: u32,
    /// Bytes between consecutive elements. 0 means tightly packed.
    pub stride: u32,
    /// Byte offset of the first element within the region.
    pub offset: u32,
    /// Number of elements.
    pub count: u32,
}

impl BufferDescriptor {
    /// Tightly packed descriptor at offset 0.
    pub fn packed(buffer_index: usize, element_type: ElementType, components: u32, count: u32) -> Self {
        Self {
            buffer_index,
            element_type,
            components,
            stride: 0,
            offset: 0,
            count,
        }
    }

    /// Size in bytes of one element.
    pub fn element_size(&self) -> u64 {
        self.components as u64 * self.element_type.size() as u64
    }

    /// Stride with the packed case resolved.
    pub fn effective_stride(&self) -> u64 {
        if self.stride == 0 {
            self.element_size()
        } else {
            self.stride as u64
        }
    }

    /// Bytes the view spans from the start of its region.
    pub fn byte_span(&self) -> u64 {
        if self.count == 0 {
            return self.offset as u64;
        }
        (self.count as u64 - 1)
            .saturating_mul(self.effective_stride())
            .saturating_add(self.offset as u64)
            .saturating_add(self.element_size())
    }

    /// Check the stride invariant: `stride == 0` or `stride >= element_size`.
    pub fn validate(&self, name: &str) -> ViewerResult<()> {
        if self.components == 0 {
            return Err(ViewerError::InvalidStride {
                attribute: name.to_string(),
                reason: "component count is zero".to_string(),
            });
        }
        if self.element_size() > u32::MAX as u64 {
            return Err(ViewerError::InvalidStride {
                attribute: name.to_string(),
                reason: format!("element size {} overflows u32", self.element_size()),
            });
        }
        if self.stride != 0 && (self.stride as u64) < self.element_size() {
            return Err(ViewerError::InvalidStride {
                attribute: name.to_string(),
                reason: format!(
                    "stride {} is smaller than element size {}",
                    self.stride,
                    self.element_size()
                ),
            });
        }
        Ok(())
    }

    /// Check that the view fits inside a region of `region_len` bytes.
    pub fn validate_within(&self, name: &str, region_len: usize) -> ViewerResult<()> {
        self.validate(name)?;
        if self.byte_span() > region_len as u64 {
            return Err(ViewerError::InvalidStride {
                attribute: name.to_string(),
                reason: format!(
                    "view spans {} bytes but region {} holds {}",
                    self.byte_span(),
                    self.buffer_index,
                    region_len
                ),
            });
        }
        Ok(())
    }

    fn byte_offset_of(&self, index: u32) -> Option<u64> {
        (index as u64)
            .checked_mul(self.effective_stride())?
            .checked_add(self.offset as u64)
    }

    /// Read element `index` as `f32` components from `region`.
    pub fn read_f32(&self, region: &[u8], index: u32) -> Option<Vec<f32>> {
        if self.element_type != ElementType::Float32 || index >= self.count {
            return None;
        }
        let start = usize::try_from(self.byte_offset_of(index)?).ok()?;
        let len = usize::try_from(self.element_size()).ok()?;
        let bytes = region.get(start..start.checked_add(len)?)?;
        Some(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }
}

/// A named attribute and where its data lives.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    pub semantic: AttributeSemantic,
    pub buffer: BufferDescriptor,
}

/// Index buffer description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexDescriptor {
    pub format: IndexFormat,
    pub count: u32,
    pub buffer_index: usize,
}

impl IndexDescriptor {
    /// Index data size in bytes.
    pub fn byte_len(&self) -> u64 {
        self.count as u64 * self.format.size() as u64
    }

    /// The index view as a packed buffer descriptor.
    pub fn as_buffer(&self) -> BufferDescriptor {
        BufferDescriptor::packed(self.buffer_index, self.format.element_type(), 1, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_sizes() {
        assert_eq!(ElementType::Float32.size(), 4);
        assert_eq!(ElementType::Uint32.size(), 4);
        assert_eq!(ElementType::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint32.size(), 4);
        assert_eq!(IndexFormat::default(), IndexFormat::Uint32);
    }

    #[test]
    fn test_index_format_range() {
        assert_eq!(IndexFormat::Uint16.max_value(), 65_535);
        assert_eq!(IndexFormat::smallest_for(65_535), IndexFormat::Uint16);
        assert_eq!(IndexFormat::smallest_for(65_536), IndexFormat::Uint32);
    }

    #[test]
    fn test_packed_descriptor() {
        let desc = BufferDescriptor::packed(0, ElementType::Float32, 3, 24);
        assert_eq!(desc.element_size(), 12);
        assert_eq!(desc.effective_stride(), 12);
        assert_eq!(desc.byte_span(), 288);
        assert!(desc.validate("position").is_ok());
        assert!(desc.validate_within("position", 288).is_ok());
        assert!(desc.validate_within("position", 287).is_err());
    }

    #[test]
    fn test_interleaved_span() {
        let desc = BufferDescriptor {
            buffer_index: 0,
            element_type: ElementType::Float32,
            components: 3,
            stride: 24,
            offset: 12,
            count: 4,
        };
        // last element starts at 12 + 3 * 24 = 84 and ends at 96
        assert_eq!(desc.byte_span(), 96);
    }

    #[test]
    fn test_stride_invariant() {
        let desc = BufferDescriptor {
            stride: 8,
            ..BufferDescriptor::packed(0, ElementType::Float32, 3, 1)
        };
        assert!(matches!(
            desc.validate("normal"),
            Err(ViewerError::InvalidStride { .. })
        ));

        let zero = BufferDescriptor::packed(0, ElementType::Float32, 0, 1);
        assert!(zero.validate("empty").is_err());
    }

    #[test]
    fn test_oversized_element_does_not_overflow() {
        let desc = BufferDescriptor {
            stride: 16,
            ..BufferDescriptor::packed(0, ElementType::Float32, u32::MAX, 2)
        };
        assert_eq!(desc.element_size(), u32::MAX as u64 * 4);
        assert!(matches!(
            desc.validate("wide"),
            Err(ViewerError::InvalidStride { .. })
        ));
        assert!(desc.validate_within("wide", 1024).is_err());
        assert_eq!(desc.read_f32(&[0; 64], 1), None);
    }

    #[test]
    fn test_read_f32() {
        let values: [f32; 6] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let desc = BufferDescriptor {
            stride: 12,
            offset: 4,
            ..BufferDescriptor::packed(0, ElementType::Float32, 2, 2)
        };
        assert_eq!(desc.read_f32(bytes, 0), Some(vec![2.0, 3.0]));
        assert_eq!(desc.read_f32(bytes, 1), Some(vec![5.0, 6.0]));
        assert_eq!(desc.read_f32(bytes, 2), None);
    }

    #[test]
    fn test_index_descriptor() {
        let desc = IndexDescriptor {
            format: IndexFormat::Uint16,
            count: 36,
            buffer_index: 3,
        };
        assert_eq!(desc.byte_len(), 72);
        assert_eq!(desc.as_buffer().element_type, ElementType::Uint16);
        assert_eq!(desc.as_buffer().byte_span(), 72);
    }
}
