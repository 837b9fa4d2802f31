//! Error types for series primitives.

/// Errors from rolling-window and interpolation primitives.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Returned when a rolling window length of zero is requested.
    #[error("rolling window length must be at least 1")]
    ZeroWindow,

    /// Returned when two parallel arrays have different lengths.
    #[error("parallel arrays differ in length: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first array.
        left: usize,
        /// Length of the second array.
        right: usize,
    },
}
