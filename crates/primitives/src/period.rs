//! Rebalancing period and date range types.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::Date;

/// Days between 0001-01-01 (CE) and the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a date to days since the Unix epoch (the physical
/// representation of a polars `Date` value).
#[must_use]
pub fn to_epoch_days(date: Date) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Convert days since the Unix epoch back to a date.
#[must_use]
pub fn from_epoch_days(days: i32) -> Date {
    Date::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE).unwrap_or_default()
}

/// Rebalancing frequency of a sorting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Frequency {
    /// Portfolios reformed at the end of every month.
    Monthly,
    /// Portfolios reformed once a year (end of June by convention).
    #[default]
    Annual,
}

impl Frequency {
    /// Number of rebalancing periods per calendar year.
    #[must_use]
    pub const fn periods_per_year(&self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Annual => 1,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Annual => write!(f, "annual"),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First date of the range.
    pub start: Date,
    /// Last date of the range.
    pub end: Date,
}

impl DateRange {
    /// Create a new range.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Whether the range contains `date`.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the range overlaps `[start, end]`.
    #[must_use]
    pub fn overlaps(&self, start: Date, end: Date) -> bool {
        self.start <= end && start <= self.end
    }
}

/// One rebalancing period of a sorting strategy.
///
/// Characteristics are measured at `formation`; the resulting portfolio
/// composition and weights are held fixed over the application window
/// `[window_start, window_end]`. Windows of consecutive periods partition
/// the return timeline without gaps or overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePeriod {
    /// Ordinal position within the generated schedule.
    pub index: usize,
    /// Date at which sorting characteristics are measured.
    pub formation: Date,
    /// First date of the application window.
    pub window_start: Date,
    /// Last date of the application window.
    pub window_end: Date,
    /// Calendar year in which usable fiscal years end.
    pub fiscal_year: i32,
}

impl RebalancePeriod {
    /// Whether `date` falls inside the application window.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.window_start <= date && date <= self.window_end
    }
}

impl std::fmt::Display for RebalancePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.window_start, self.window_end)
    }
}
