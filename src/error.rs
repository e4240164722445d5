//! Error types for tessella.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building or triangulating a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Two input points coincide in parameter space within tolerance.
    #[error("input points {first} and {second} coincide in parameter space")]
    DuplicatePoint {
        /// Index of the earlier point.
        first: usize,
        /// Index of the later, coincident point.
        second: usize,
    },

    /// A segment references a point index outside the input array.
    #[error("segment {segment} references invalid point index {index}")]
    SegmentOutOfRange {
        /// The segment index.
        segment: usize,
        /// The out-of-range point index.
        index: usize,
    },

    /// A segment joins a point to itself.
    #[error("segment {segment} joins point {index} to itself")]
    InvalidSegment {
        /// The segment index.
        segment: usize,
        /// The repeated point index.
        index: usize,
    },

    /// Two constraint segments cross in their interiors.
    #[error("constraint segments {first} and {second} cross")]
    CrossingSegments {
        /// Index of the first segment.
        first: usize,
        /// Index of the second segment.
        second: usize,
    },

    /// A point could not be located inside any live triangle.
    #[error("point ({u}, {v}) lies outside the triangulation domain")]
    PointOutsideDomain {
        /// Parametric u coordinate.
        u: f64,
        /// Parametric v coordinate.
        v: f64,
    },

    /// The frontal loop exceeded its insertion budget.
    ///
    /// The partial mesh is still valid and retrievable; this error is
    /// advisory.
    #[error("frontal refinement failed to converge after {insertions} insertions")]
    ConvergenceFailed {
        /// Number of points inserted before giving up.
        insertions: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a mesh from a file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
