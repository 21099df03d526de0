//! Error types for geometry construction, layout and transforms
//!
//! Every error is raised at the call that received the bad input. Nothing is
//! clamped or partially published on failure.

use thiserror::Error;

/// Errors produced by the viewer core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("Malformed attribute set: {0}")]
    MalformedAttributeSet(String),
    #[error("Malformed index sequence: length {len} is not a multiple of 3")]
    MalformedIndexSequence { len: usize },
    #[error("Index {value} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        value: u32,
        vertex_count: u32,
    },
    #[error("Index {value} does not fit in {format:?} (max {max})")]
    IndexTypeOverflow {
        value: u32,
        format: crate::layout::IndexFormat,
        max: u32,
    },
    #[error("Invalid shape parameter `{parameter}`: {reason}")]
    InvalidShapeParameter {
        parameter: &'static str,
        reason: String,
    },
    #[error("Invalid stride for `{attribute}`: {reason}")]
    InvalidStride { attribute: String, reason: String },
    #[error("Schema mismatch for `{attribute}`: {reason}")]
    SchemaMismatch { attribute: String, reason: String },
    #[error("Degenerate device rectangle {width}x{height}")]
    DegenerateRectangle { width: f32, height: f32 },
    #[error("Transform is not invertible (determinant {determinant})")]
    UninvertibleTransform { determinant: f32 },
    #[error("Invalid orbit parameter `{parameter}`: {value}")]
    InvalidOrbitParameter { parameter: &'static str, value: f32 },
    #[error("Invalid animation: {0}")]
    InvalidAnimation(String),
    #[error("Failed to upload buffer: {0}")]
    UploadFailed(String),
    #[error("Worker already running")]
    WorkerBusy,
    #[error("Worker job panicked")]
    WorkerPanicked,
    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawnFailed(String),
}

pub type ViewerResult<T> = Result<T, ViewerError>;

impl ViewerError {
    pub(crate) fn shape(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidShapeParameter {
            parameter,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::IndexFormat;

    #[test]
    fn test_error_display() {
        let err = ViewerError::IndexOutOfRange {
            position: 4,
            value: 24,
            vertex_count: 24,
        };
        assert_eq!(
            err.to_string(),
            "Index 24 at position 4 is out of range for 24 vertices"
        );

        let err = ViewerError::IndexTypeOverflow {
            value: 70_000,
            format: IndexFormat::Uint16,
            max: 65_535,
        };
        assert_eq!(
            err.to_string(),
            "Index 70000 does not fit in Uint16 (max 65535)"
        );

        assert_eq!(ViewerError::WorkerBusy.to_string(), "Worker already running");
    }

    #[test]
    fn test_shape_helper() {
        let err = ViewerError::shape("stacks", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid shape parameter `stacks`: must be at least 1"
        );
    }
}
