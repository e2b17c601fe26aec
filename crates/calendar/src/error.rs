//! Error types for calendar operations.

use hanover_primitives::Date;

/// Errors that can occur during calendar construction and alignment.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// Negative reporting lag.
    #[error("invalid fiscal lag: {0} months (must be non-negative)")]
    InvalidLag(i32),

    /// Formation month outside 1..=12.
    #[error("invalid formation month: {0} (must be in 1..=12)")]
    InvalidFormationMonth(u32),

    /// Staleness bound below the reporting lag.
    #[error("invalid staleness bound: {staleness} months is below the {lag} month lag")]
    InvalidStaleness {
        /// Configured staleness bound.
        staleness: i32,
        /// Configured reporting lag.
        lag: i32,
    },

    /// No rebalancing period has formation data inside the requested range.
    #[error("no rebalancing periods cover {start}..{end}")]
    NoPeriods {
        /// Requested range start.
        start: Date,
        /// Requested range end.
        end: Date,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CalendarError::InvalidLag(-3);
        assert!(err.to_string().contains("-3"));

        let err = CalendarError::InvalidStaleness { staleness: 4, lag: 6 };
        assert!(err.to_string().contains('4') && err.to_string().contains('6'));
    }
}
