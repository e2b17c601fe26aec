//! Point-in-time characteristic trait definitions.

use std::sync::Arc;

use hanover_primitives::{Date, RebalancePeriod, to_epoch_days};
use polars::prelude::*;

/// Errors that can occur during characteristic resolution.
#[derive(Debug, thiserror::Error)]
pub enum CharacteristicError {
    /// A required raw field is absent from the supplied panel schema.
    ///
    /// This is a configuration/integration mismatch and aborts the whole
    /// request; it is never a per-security skip.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Invalid characteristic configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),
}

/// Read-only view over the raw panel tables a characteristic may consume.
///
/// Owned by the pipeline run; characteristics see it as immutable input.
#[derive(Debug, Clone)]
pub struct PanelView {
    prices: DataFrame,
    fundamentals: DataFrame,
}

impl PanelView {
    /// Create a view from collected price and fundamentals tables.
    #[must_use]
    pub const fn new(prices: DataFrame, fundamentals: DataFrame) -> Self {
        Self { prices, fundamentals }
    }

    /// Lazy handle over the price/return table.
    #[must_use]
    pub fn prices(&self) -> LazyFrame {
        self.prices.clone().lazy()
    }

    /// Lazy handle over the annual fundamentals table.
    #[must_use]
    pub fn fundamentals(&self) -> LazyFrame {
        self.fundamentals.clone().lazy()
    }

    /// The collected price/return table.
    #[must_use]
    pub const fn prices_frame(&self) -> &DataFrame {
        &self.prices
    }

    /// The collected fundamentals table.
    #[must_use]
    pub const fn fundamentals_frame(&self) -> &DataFrame {
        &self.fundamentals
    }

    /// Whether either table carries the named column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.prices.get_column_names().iter().any(|c| c.as_str() == name)
            || self.fundamentals.get_column_names().iter().any(|c| c.as_str() == name)
    }
}

/// A date literal expression in the panel's physical representation.
#[must_use]
pub fn date_lit(date: Date) -> Expr {
    lit(to_epoch_days(date)).cast(DataType::Date)
}

/// A point-in-time sorting characteristic.
///
/// Implementations are pure functions of the panel view: given a
/// rebalancing period they produce `| symbol | value |` rows measured at
/// the period's formation date, with `value` null for securities lacking
/// the required coverage. Eligibility filtering on top of the raw values
/// is the resolver's job.
pub trait Characteristic: Send + Sync + std::fmt::Debug {
    /// Unique snake_case identifier, stable across versions.
    fn name(&self) -> &str;

    /// Columns the implementation reads from the panel view.
    fn required_columns(&self) -> &[&str];

    /// Fiscal years of history a security needs before the value exists.
    fn min_history_years(&self) -> usize {
        1
    }

    /// Resolve per-security values as of the period's formation date.
    ///
    /// # Errors
    /// Returns `CharacteristicError` on schema or configuration failures.
    fn resolve(
        &self,
        view: &PanelView,
        period: &RebalancePeriod,
    ) -> Result<LazyFrame, CharacteristicError>;
}

/// Lookup of configured characteristics by name.
///
/// The pipeline consumes a registry through this abstraction so the
/// characteristic implementations stay replaceable.
pub trait CharacteristicProvider: Send + Sync {
    /// The characteristic registered under `name`, if any.
    fn get(&self, name: &str) -> Option<Arc<dyn Characteristic>>;

    /// Registered names in sorted order.
    fn names(&self) -> Vec<String>;
}
