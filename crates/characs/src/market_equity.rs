//! Market equity characteristic.

use chrono::Datelike;
use hanover_calendar::month_end;
use hanover_primitives::{Date, RebalancePeriod};
use hanover_traits::{Characteristic, CharacteristicError, PanelView};
use polars::prelude::*;

use crate::snapshot::market_equity_at;

/// Measurement date for market equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeBasis {
    /// At the period's formation date (size sorts).
    #[default]
    Formation,
    /// At the December preceding formation (book-to-market denominators).
    PriorDecember,
}

/// Configuration for the market equity characteristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketEquityConfig {
    /// Measurement date.
    pub basis: MeBasis,
}

/// Market equity: `|price| * shares_out` at the measurement date.
///
/// Price magnitudes are used as-is; a negative price marks a bid/ask
/// midpoint quote, not a negative value.
#[derive(Debug, Clone, Default)]
pub struct MarketEquity {
    config: MarketEquityConfig,
}

impl MarketEquity {
    /// Create with default configuration (formation-date measurement).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: MarketEquityConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MarketEquityConfig {
        &self.config
    }

    /// The December preceding (or ending at) `formation`.
    pub(crate) fn prior_december(formation: Date) -> Date {
        let year =
            if formation.month() == 12 { formation.year() } else { formation.year() - 1 };
        month_end(year, 12)
    }
}

impl Characteristic for MarketEquity {
    fn name(&self) -> &str {
        match self.config.basis {
            MeBasis::Formation => "market_equity",
            MeBasis::PriorDecember => "market_equity_dec",
        }
    }

    fn required_columns(&self) -> &[&str] {
        &["date", "symbol", "price", "shares_out"]
    }

    fn resolve(
        &self,
        view: &PanelView,
        period: &RebalancePeriod,
    ) -> Result<LazyFrame, CharacteristicError> {
        let cutoff = match self.config.basis {
            MeBasis::Formation => period.formation,
            MeBasis::PriorDecember => Self::prior_december(period.formation),
        };

        Ok(market_equity_at(view.prices(), cutoff)
            .select([col("symbol"), col("me").alias("value")]))
    }
}
