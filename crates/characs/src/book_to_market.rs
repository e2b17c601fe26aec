//! Book-to-market characteristic.

use hanover_primitives::RebalancePeriod;
use hanover_traits::{Characteristic, CharacteristicError, PanelView};
use polars::prelude::*;

use crate::{
    market_equity::MarketEquity,
    snapshot::{FiscalAlignment, FiscalWindow, aligned_fundamentals, market_equity_at},
};

/// Configuration for the book-to-market characteristic.
#[derive(Debug, Clone, Copy)]
pub struct BookToMarketConfig {
    /// Fundamentals alignment convention.
    pub alignment: FiscalAlignment,
    /// Minimum months between fiscal year end and its first use.
    pub fiscal_lag_months: i32,
    /// Maximum months a fiscal year may lag behind formation.
    pub max_staleness_months: i32,
    /// Divide by formation-date market equity instead of the prior
    /// December value.
    pub me_at_formation: bool,
}

impl Default for BookToMarketConfig {
    fn default() -> Self {
        Self {
            alignment: FiscalAlignment::CalendarYear,
            fiscal_lag_months: 6,
            max_staleness_months: 18,
            me_at_formation: false,
        }
    }
}

/// Book-to-market: book equity of the aligned fiscal year over market
/// equity at the prior December.
///
/// Securities with non-positive book equity carry a null value and fall
/// out of the eligible universe.
#[derive(Debug, Clone, Default)]
pub struct BookToMarket {
    config: BookToMarketConfig,
}

impl BookToMarket {
    /// Create with the standard annual convention.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: BookToMarketConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &BookToMarketConfig {
        &self.config
    }
}

impl Characteristic for BookToMarket {
    fn name(&self) -> &str {
        "book_to_market"
    }

    fn required_columns(&self) -> &[&str] {
        &["date", "symbol", "price", "shares_out", "fiscal_year_end", "book_equity"]
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
        let book = aligned_fundamentals(view.fundamentals(), &["book_equity"], &window);

        let me_cutoff = if self.config.me_at_formation {
            period.formation
        } else {
            MarketEquity::prior_december(period.formation)
        };
        let market = market_equity_at(view.prices(), me_cutoff);

        let joined = book.join(
            market,
            [col("symbol")],
            [col("symbol")],
            JoinArgs::new(JoinType::Inner),
        );

        Ok(joined
            .with_column(
                when(col("book_equity").gt(lit(0.0)).and(col("me").gt(lit(0.0))))
                    .then(col("book_equity") / col("me"))
                    .otherwise(lit(NULL))
                    .alias("value"),
            )
            .select([col("symbol"), col("value")]))
    }
}

#[cfg(test)]
mod tests {
    use hanover_primitives::Date;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn period() -> RebalancePeriod {
        RebalancePeriod {
            index: 0,
            formation: d(1963, 6, 30),
            window_start: d(1963, 7, 1),
            window_end: d(1964, 6, 30),
            fiscal_year: 1962,
        }
    }

    fn view() -> PanelView {
        let prices = df! {
            "date" => &[d(1962, 12, 31), d(1962, 12, 31), d(1962, 12, 31), d(1963, 6, 30)],
            "symbol" => &["ACME", "BIG", "REDINK", "ACME"],
            "price" => &[10.0, 50.0, 5.0, 20.0],
            "shares_out" => &[1000.0, 2000.0, 400.0, 1000.0],
        }
        .unwrap();
        let fundamentals = df! {
            "symbol" => &["ACME", "BIG", "REDINK"],
            "fiscal_year_end" => &[d(1962, 12, 31), d(1962, 12, 31), d(1962, 12, 31)],
            "book_equity" => &[5000.0, 25_000.0, -300.0],
        }
        .unwrap();
        PanelView::new(prices, fundamentals)
    }

    #[test]
    fn ratio_uses_december_market_equity() {
        let resolved = BookToMarket::new()
            .resolve(&view(), &period())
            .unwrap()
            .sort(["symbol"], SortMultipleOptions::default())
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        // ACME: 5000 / (10 * 1000) using December, not June, prices.
        assert_eq!(values[0], Some(0.5));
        // BIG: 25000 / 100000.
        assert_eq!(values[1], Some(0.25));
    }

    #[test]
    fn negative_book_equity_is_null() {
        let resolved = BookToMarket::new()
            .resolve(&view(), &period())
            .unwrap()
            .sort(["symbol"], SortMultipleOptions::default())
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_eq!(values[2], None);
    }

    #[test]
    fn formation_me_basis_changes_denominator() {
        let config = BookToMarketConfig { me_at_formation: true, ..Default::default() };
        let resolved = BookToMarket::with_config(config)
            .resolve(&view(), &period())
            .unwrap()
            .sort(["symbol"], SortMultipleOptions::default())
            .collect()
            .unwrap();

        // Only ACME has a June 1963 listing; its denominator is 20 * 1000.
        assert_eq!(resolved.height(), 1);
        let values: Vec<Option<f64>> =
            resolved.column("value").unwrap().f64().unwrap().iter().collect();
        assert_eq!(values[0], Some(0.25));
    }
}
