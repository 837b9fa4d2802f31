//! Error types for the sky-classification engine.

use nimbus_series::SeriesError;

/// Errors from series validation and classification.
#[derive(Debug, thiserror::Error)]
pub enum SkyError {
    /// Returned when required input fields are absent. Names every missing field.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// Names of all absent fields.
        fields: Vec<String>,
    },

    /// Returned when a field's length differs from the timestamp vector's.
    #[error("field {field} has {got} samples, expected {expected}")]
    LengthMismatch {
        /// Name of the offending field.
        field: &'static str,
        /// Expected sample count (the timestamp vector's length).
        expected: usize,
        /// Actual sample count.
        got: usize,
    },

    /// Returned when the series has zero samples.
    #[error("series must contain at least one sample")]
    EmptySeries,

    /// Returned when timestamps are not strictly increasing.
    #[error("timestamps must be strictly increasing: violation at index {index}")]
    UnsortedTimes {
        /// Index of the first timestamp that does not increase.
        index: usize,
    },

    /// Returned when a configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the offending value.
        reason: String,
    },

    /// A segment was found to contain more than one sky type.
    ///
    /// This indicates a defect in segmentation construction, not a data
    /// problem — it must never occur for segmentations produced by
    /// [`segment`](crate::segment).
    #[error("internal consistency violation: segment {segment} contains more than one sky type")]
    MixedSegment {
        /// Identifier of the offending segment.
        segment: usize,
    },

    /// Wraps an error from the series-math primitives.
    #[error("series computation failed: {0}")]
    Series(#[from] SeriesError),
}
