//! Rebalancing schedule generation.

use chrono::{Datelike, Duration};
use hanover_primitives::{Date, DateRange, Frequency, RebalancePeriod};
use serde::{Deserialize, Serialize};

use crate::{CalendarError, add_months, month_end};

/// Configuration for the rebalancing calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Rebalancing frequency.
    pub frequency: Frequency,
    /// Minimum months between a fiscal year end and its first use.
    pub fiscal_lag_months: i32,
    /// Month whose end is the annual formation date (6 = end of June).
    pub annual_formation_month: u32,
    /// Maximum months a fiscal year may lag behind formation.
    pub max_staleness_months: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            frequency: Frequency::Annual,
            fiscal_lag_months: 6,
            annual_formation_month: 6,
            max_staleness_months: 18,
        }
    }
}

/// Generates the ordered rebalancing periods covering a date range.
///
/// Application windows of consecutive periods partition the return
/// timeline: each window starts the day after the previous one ends.
#[derive(Debug, Clone)]
pub struct RebalanceCalendar {
    config: CalendarConfig,
}

impl RebalanceCalendar {
    /// Create a calendar, validating the configuration.
    ///
    /// # Errors
    /// Returns `CalendarError` if the lag is negative, the formation month
    /// is out of range, or the staleness bound is below the lag.
    pub fn new(config: CalendarConfig) -> Result<Self, CalendarError> {
        if config.fiscal_lag_months < 0 {
            return Err(CalendarError::InvalidLag(config.fiscal_lag_months));
        }
        if config.annual_formation_month < 1 || config.annual_formation_month > 12 {
            return Err(CalendarError::InvalidFormationMonth(config.annual_formation_month));
        }
        if config.max_staleness_months < config.fiscal_lag_months {
            return Err(CalendarError::InvalidStaleness {
                staleness: config.max_staleness_months,
                lag: config.fiscal_lag_months,
            });
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// The ordered periods whose application windows overlap `range`.
    ///
    /// # Errors
    /// Returns `CalendarError::NoPeriods` if the range is covered by no
    /// period.
    pub fn periods(&self, range: &DateRange) -> Result<Vec<RebalancePeriod>, CalendarError> {
        let mut periods = match self.config.frequency {
            Frequency::Annual => self.annual_periods(range),
            Frequency::Monthly => self.monthly_periods(range),
        };

        if periods.is_empty() {
            return Err(CalendarError::NoPeriods { start: range.start, end: range.end });
        }

        for (index, period) in periods.iter_mut().enumerate() {
            period.index = index;
        }
        Ok(periods)
    }

    fn annual_periods(&self, range: &DateRange) -> Vec<RebalancePeriod> {
        let month = self.config.annual_formation_month;
        let mut periods = Vec::new();

        for year in (range.start.year() - 1)..=range.end.year() {
            let formation = month_end(year, month);
            let window_start = formation + Duration::days(1);
            let window_end = month_end(year + 1, month);

            if range.overlaps(window_start, window_end) {
                periods.push(RebalancePeriod {
                    index: 0,
                    formation,
                    window_start,
                    window_end,
                    fiscal_year: self.fiscal_year_for(formation),
                });
            }
        }

        periods
    }

    fn monthly_periods(&self, range: &DateRange) -> Vec<RebalancePeriod> {
        let mut window_start = Date::from_ymd_opt(range.start.year(), range.start.month(), 1)
            .unwrap_or(range.start);
        let mut periods = Vec::new();

        while window_start <= range.end {
            let window_end = month_end(window_start.year(), window_start.month());
            let formation = window_start - Duration::days(1);

            if range.overlaps(window_start, window_end) {
                periods.push(RebalancePeriod {
                    index: 0,
                    formation,
                    window_start,
                    window_end,
                    fiscal_year: self.fiscal_year_for(formation),
                });
            }
            window_start = window_end + Duration::days(1);
        }

        periods
    }

    /// Calendar year whose fiscal year ends are usable at `formation`
    /// under the configured lag.
    fn fiscal_year_for(&self, formation: Date) -> i32 {
        add_months(formation, -self.config.fiscal_lag_months).year()
    }
}
