//! Operating profitability characteristic.

use hanover_primitives::RebalancePeriod;
use hanover_traits::{Characteristic, CharacteristicError, PanelView};
use polars::prelude::*;

use crate::snapshot::{FiscalAlignment, FiscalWindow, aligned_fundamentals};

/// Configuration for the operating profitability characteristic.
#[derive(Debug, Clone, Copy)]
pub struct OperatingProfitabilityConfig {
    /// Fundamentals alignment convention.
    pub alignment: FiscalAlignment,
    /// Minimum months between fiscal year end and its first use.
    pub fiscal_lag_months: i32,
    /// Maximum months a fiscal year may lag behind formation.
    pub max_staleness_months: i32,
}

impl Default for OperatingProfitabilityConfig {
    fn default() -> Self {
        Self {
            alignment: FiscalAlignment::CalendarYear,
            fiscal_lag_months: 6,
            max_staleness_months: 18,
        }
    }
}

/// Operating profitability: revenue minus cost of goods, SG&A, and
/// interest expense, over book equity of the same fiscal year.
///
/// Requires non-missing revenue, at least one of the three cost items, and
/// positive book equity; missing cost items count as zero.
#[derive(Debug, Clone, Default)]
pub struct OperatingProfitability {
    config: OperatingProfitabilityConfig,
}

impl OperatingProfitability {
    /// Create with the standard annual convention.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: OperatingProfitabilityConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OperatingProfitabilityConfig {
        &self.config
    }
}

impl Characteristic for OperatingProfitability {
    fn name(&self) -> &str {
        "operating_profitability"
    }

    fn required_columns(&self) -> &[&str] {
        &[
            "symbol",
            "fiscal_year_end",
            "revenue",
            "cost_of_goods",
            "sga_expense",
            "interest_expense",
            "book_equity",
        ]
    }

    fn resolve(
        &self,
        view: &PanelView,
        period: &RebalancePeriod,
    ) -> Result<LazyFrame, CharacteristicError> {
        let window = FiscalWindow::for_period(
            period,
            self.config.fiscal_lag_months,
            self.config.max_staleness_months,
            self.config.alignment,
        );
        let fundamentals = aligned_fundamentals(
            view.fundamentals(),
            &["revenue", "cost_of_goods", "sga_expense", "interest_expense", "book_equity"],
            &window,
        );

        let cost_present = col("cost_of_goods")
            .is_not_null()
            .or(col("sga_expense").is_not_null())
            .or(col("interest_expense").is_not_null());

        let operating_profit = col("revenue")
            - col("cost_of_goods").fill_null(lit(0.0))
            - col("sga_expense").fill_null(lit(0.0))
            - col("interest_expense").fill_null(lit(0.0));

        Ok(fundamentals
            .with_column(
                when(
                    col("revenue")
                        .is_not_null()
                        .and(cost_present)
                        .and(col("book_equity").gt(lit(0.0))),
                )
                .then(operating_profit / col("book_equity"))
                .otherwise(lit(NULL))
                .alias("value"),
            )
            .select([col("symbol"), col("value")]))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use hanover_primitives::Date;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn period() -> RebalancePeriod {
        RebalancePeriod {
            index: 0,
            formation: d(1995, 6, 30),
            window_start: d(1995, 7, 1),
            window_end: d(1996, 6, 30),
            fiscal_year: 1994,
        }
    }

    fn view(fundamentals: DataFrame) -> PanelView {
        PanelView::new(DataFrame::empty(), fundamentals)
    }

    #[test]
    fn profitability_over_book_equity() {
        let fundamentals = df! {
            "symbol" => &["ACME"],
            "fiscal_year_end" => &[d(1994, 12, 31)],
            "revenue" => &[Some(1000.0)],
            "cost_of_goods" => &[Some(600.0)],
            "sga_expense" => &[Some(150.0)],
            "interest_expense" => &[Some(50.0)],
            "book_equity" => &[Some(500.0)],
        }
        .unwrap();

        let resolved = OperatingProfitability::new()
            .resolve(&view(fundamentals), &period())
            .unwrap()
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_relative_eq!(values[0].unwrap(), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn missing_cost_items_count_as_zero() {
        let fundamentals = df! {
            "symbol" => &["ACME"],
            "fiscal_year_end" => &[d(1994, 12, 31)],
            "revenue" => &[Some(1000.0)],
            "cost_of_goods" => &[Some(600.0)],
            "sga_expense" => &[None::<f64>],
            "interest_expense" => &[None::<f64>],
            "book_equity" => &[Some(500.0)],
        }
        .unwrap();

        let resolved = OperatingProfitability::new()
            .resolve(&view(fundamentals), &period())
            .unwrap()
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_relative_eq!(values[0].unwrap(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn all_costs_missing_is_null() {
        let fundamentals = df! {
            "symbol" => &["GHOST"],
            "fiscal_year_end" => &[d(1994, 12, 31)],
            "revenue" => &[Some(1000.0)],
            "cost_of_goods" => &[None::<f64>],
            "sga_expense" => &[None::<f64>],
            "interest_expense" => &[None::<f64>],
            "book_equity" => &[Some(500.0)],
        }
        .unwrap();

        let resolved = OperatingProfitability::new()
            .resolve(&view(fundamentals), &period())
            .unwrap()
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_eq!(values[0], None);
    }

    #[test]
    fn non_positive_book_equity_is_null() {
        let fundamentals = df! {
            "symbol" => &["REDINK"],
            "fiscal_year_end" => &[d(1994, 12, 31)],
            "revenue" => &[Some(1000.0)],
            "cost_of_goods" => &[Some(400.0)],
            "sga_expense" => &[Some(100.0)],
            "interest_expense" => &[Some(0.0)],
            "book_equity" => &[Some(-200.0)],
        }
        .unwrap();

        let resolved = OperatingProfitability::new()
            .resolve(&view(fundamentals), &period())
            .unwrap()
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_eq!(values[0], None);
    }
}
