//! Error types for the computation cache.

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Parameter canonicalization failed.
    #[error("cache key serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A key resolved to a value of a different type than requested.
    #[error("cached value type mismatch for key {key}")]
    TypeMismatch {
        /// The offending key, rendered for diagnostics.
        key: String,
    },
}
