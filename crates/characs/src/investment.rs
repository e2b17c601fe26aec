//! Asset growth (investment) characteristic.

use chrono::Datelike;
use hanover_calendar::{add_months, month_end};
use hanover_primitives::{Date, RebalancePeriod};
use hanover_traits::{Characteristic, CharacteristicError, PanelView, date_lit};
use polars::prelude::*;

/// Configuration for the asset growth characteristic.
#[derive(Debug, Clone, Copy)]
pub struct AssetGrowthConfig {
    /// Minimum months between fiscal year end and its first use.
    pub fiscal_lag_months: i32,
}

impl Default for AssetGrowthConfig {
    fn default() -> Self {
        Self { fiscal_lag_months: 6 }
    }
}

/// Asset growth: total assets of the labeled fiscal year over total assets
/// of the year before, minus one.
///
/// Follows the annual calendar-year convention and needs two consecutive
/// fiscal years; securities with a shorter history carry no value.
#[derive(Debug, Clone, Default)]
pub struct AssetGrowth {
    config: AssetGrowthConfig,
}

impl AssetGrowth {
    /// Create with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: AssetGrowthConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AssetGrowthConfig {
        &self.config
    }
}

/// Total assets of fiscal years ending in `year` and at or before
/// `cutoff`, one row per symbol.
fn assets_of_year(fundamentals: LazyFrame, year: i32, cutoff: Date, alias: &str) -> LazyFrame {
    let start = Date::from_ymd_opt(year, 1, 1).unwrap_or_default();
    let end = month_end(year, 12).min(cutoff);

    fundamentals
        .filter(
            col("fiscal_year_end")
                .gt_eq(date_lit(start))
                .and(col("fiscal_year_end").lt_eq(date_lit(end))),
        )
        .sort(["fiscal_year_end"], SortMultipleOptions::default())
        .group_by([col("symbol")])
        .agg([col("total_assets").last().alias(alias)])
}

impl Characteristic for AssetGrowth {
    fn name(&self) -> &str {
        "asset_growth"
    }

    fn required_columns(&self) -> &[&str] {
        &["symbol", "fiscal_year_end", "total_assets"]
    }

    fn min_history_years(&self) -> usize {
        2
    }

    fn resolve(
        &self,
        view: &PanelView,
        period: &RebalancePeriod,
    ) -> Result<LazyFrame, CharacteristicError> {
        if self.config.fiscal_lag_months < 0 {
            return Err(CharacteristicError::InvalidConfig(format!(
                "negative fiscal lag: {}",
                self.config.fiscal_lag_months
            )));
        }

        // Publication rule: a fiscal year is usable only once it is at
        // least the configured lag behind formation.
        let freshest = add_months(period.formation, -self.config.fiscal_lag_months);
        let cutoff = month_end(freshest.year(), freshest.month());

        let current =
            assets_of_year(view.fundamentals(), period.fiscal_year, cutoff, "assets_curr");
        let prior =
            assets_of_year(view.fundamentals(), period.fiscal_year - 1, cutoff, "assets_prev");

        let joined = current.join(
            prior,
            [col("symbol")],
            [col("symbol")],
            JoinArgs::new(JoinType::Inner),
        );

        Ok(joined
            .with_column(
                when(col("assets_prev").gt(lit(0.0)).and(col("assets_curr").gt(lit(0.0))))
                    .then(col("assets_curr") / col("assets_prev") - lit(1.0))
                    .otherwise(lit(NULL))
                    .alias("value"),
            )
            .select([col("symbol"), col("value")]))
    }
}
