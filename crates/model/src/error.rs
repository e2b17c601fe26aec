//! Error types for portfolio construction.

use hanover_cache::CacheError;
use hanover_calendar::CalendarError;
use hanover_characs::CharacError;
use hanover_math::MathError;
use hanover_traits::{CharacteristicError, SourceError};

/// Errors that can occur during portfolio construction and factor
/// aggregation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Calendar configuration or coverage error.
    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Characteristic resolution error.
    #[error("characteristic error: {0}")]
    Characteristic(#[from] CharacError),

    /// Cross-sectional computation error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Data-access collaborator failure.
    #[error("data source error: {0}")]
    Source(#[from] SourceError),

    /// Computation cache error.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing required column in a materialized frame.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Characteristic name not present in the registry.
    #[error("unknown characteristic: {0}")]
    UnknownCharacteristic(String),

    /// Invalid request configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<CharacteristicError> for ModelError {
    fn from(err: CharacteristicError) -> Self {
        Self::Characteristic(CharacError::Characteristic(err))
    }
}

impl ModelError {
    /// Whether the error degrades a single period to unavailable rather
    /// than aborting the whole request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Math(err) if err.is_recoverable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        let err = ModelError::Math(MathError::InsufficientData { required: 2, actual: 1 });
        assert!(err.is_recoverable());

        let err = ModelError::Math(MathError::InvalidQuantile(0.0));
        assert!(!err.is_recoverable());

        let err = ModelError::UnknownCharacteristic("alpha".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn error_display() {
        let err = ModelError::MissingColumn("asset_returns".to_string());
        assert!(err.to_string().contains("asset_returns"));
    }
}
