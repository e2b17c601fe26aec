//! Error types for characteristic resolution.

use hanover_traits::CharacteristicError;

/// Errors that can occur while resolving characteristic cross-sections.
#[derive(Debug, thiserror::Error)]
pub enum CharacError {
    /// Characteristic computation error.
    #[error("characteristic error: {0}")]
    Characteristic(#[from] CharacteristicError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CharacError::Characteristic(CharacteristicError::MissingField(
            "shares_out".to_string(),
        ));
        assert!(err.to_string().contains("shares_out"));
    }
}
