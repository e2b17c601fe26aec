//! Error types for cross-sectional operations.

/// Errors that can occur during cross-sectional operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Quantile target outside (0, 1).
    #[error("invalid quantile target: {0} (must be in (0, 1))")]
    InvalidQuantile(f64),

    /// Quantile targets not strictly increasing.
    #[error("quantile targets must be strictly increasing")]
    QuantilesNotIncreasing,

    /// Too few reference securities for the requested quantiles.
    #[error("insufficient data: need at least {required} securities, got {actual}")]
    InsufficientData {
        /// Required number of securities.
        required: usize,
        /// Actual number of securities.
        actual: usize,
    },

    /// Computed cutpoints collide; the cross-section cannot support the
    /// requested partition.
    #[error("degenerate cutpoints: reference values do not separate {n_buckets} buckets")]
    DegenerateCutpoints {
        /// Requested bucket count.
        n_buckets: usize,
    },

    /// Weight vector length differs from value vector length.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Negative or non-finite weight.
    #[error("invalid weight: {0}")]
    InvalidWeight(f64),

    /// Weight-mass quantiles requested without weights.
    #[error("weight-mass quantiles require a weight vector")]
    MissingWeights,

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,
}

impl MathError {
    /// Whether the error degrades a single period to unavailable rather
    /// than aborting the whole request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::DegenerateCutpoints { .. })
    }
}
