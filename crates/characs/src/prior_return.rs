//! Prior-return characteristics (momentum and reversals).

use chrono::Datelike;
use hanover_calendar::{add_months, month_end};
use hanover_primitives::RebalancePeriod;
use hanover_traits::{Characteristic, CharacteristicError, PanelView, date_lit};
use polars::prelude::*;

use crate::snapshot::month_first;

/// Configuration for a prior `(end_lag - start_lag)` return strategy.
///
/// With formation at the end of month `t-1`, the measurement window spans
/// months `t - start_lag` through `t - end_lag`. The classic momentum
/// strategy is prior (2-12); prior (1-1) and (13-60) reproduce the
/// short- and long-term reversal strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorReturnConfig {
    /// Months back the measurement window starts.
    pub start_lag_months: u32,
    /// Months back the measurement window ends.
    pub end_lag_months: u32,
    /// Minimum non-missing returns required inside the window.
    pub min_obs: usize,
}

impl PriorReturnConfig {
    /// Window covering prior months `start_lag` through `end_lag`, with
    /// full coverage required.
    #[must_use]
    pub const fn window(start_lag_months: u32, end_lag_months: u32) -> Self {
        Self {
            start_lag_months,
            end_lag_months,
            min_obs: (start_lag_months - end_lag_months + 1) as usize,
        }
    }
}

impl Default for PriorReturnConfig {
    fn default() -> Self {
        Self::window(12, 2)
    }
}

/// Compound return over a lagged monthly window.
#[derive(Debug, Clone)]
pub struct PriorReturn {
    config: PriorReturnConfig,
    name: String,
}

impl PriorReturn {
    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: PriorReturnConfig) -> Self {
        let name = format!("prior_{}_{}", config.end_lag_months, config.start_lag_months);
        Self { config, name }
    }

    /// Prior (2-12): the classic momentum strategy.
    #[must_use]
    pub fn momentum() -> Self {
        Self::with_config(PriorReturnConfig::default())
    }

    /// Prior (1-1): short-term reversal.
    #[must_use]
    pub fn short_term_reversal() -> Self {
        Self::with_config(PriorReturnConfig::window(1, 1))
    }

    /// Prior (13-60): long-term reversal.
    #[must_use]
    pub fn long_term_reversal() -> Self {
        Self::with_config(PriorReturnConfig::window(60, 13))
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PriorReturnConfig {
        &self.config
    }
}

impl Characteristic for PriorReturn {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_columns(&self) -> &[&str] {
        &["date", "symbol", "asset_returns"]
    }

    fn resolve(
        &self,
        view: &PanelView,
        period: &RebalancePeriod,
    ) -> Result<LazyFrame, CharacteristicError> {
        let (start_lag, end_lag) = (self.config.start_lag_months, self.config.end_lag_months);
        if end_lag == 0 || end_lag > start_lag {
            return Err(CharacteristicError::InvalidConfig(format!(
                "prior window ({end_lag}-{start_lag}) is not ordered"
            )));
        }

        // Formation sits at the end of month t-1: the window covers months
        // t - start_lag .. t - end_lag.
        let first_month = add_months(period.formation, -(self.config.start_lag_months as i32 - 1));
        let last_month = add_months(period.formation, -(self.config.end_lag_months as i32 - 1));
        let lower = month_first(first_month);
        let upper = month_end(last_month.year(), last_month.month());

        let windowed = view
            .prices()
            .filter(col("date").gt_eq(date_lit(lower)).and(col("date").lt_eq(date_lit(upper))))
            .sort(["date"], SortMultipleOptions::default())
            .group_by([col("symbol")])
            .agg([
                (col("asset_returns") + lit(1.0)).product().alias("gross"),
                col("asset_returns").count().alias("n_obs"),
            ]);

        Ok(windowed
            .with_column(
                when(col("n_obs").gt_eq(lit(self.config.min_obs as u32)))
                    .then(col("gross") - lit(1.0))
                    .otherwise(lit(NULL))
                    .alias("value"),
            )
            .select([col("symbol"), col("value")]))
    }
}
