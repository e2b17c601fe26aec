//! Portfolio return aggregation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use hanover_math::weighted_mean_available;
use hanover_primitives::{Date, SortKey, Weighting, from_epoch_days};
use ndarray::Array1;
use polars::prelude::*;

use crate::{AssignmentSet, ModelError};

/// One cell's returns over an application window.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSeries {
    /// Per-date returns aligned to the panel's dates; `None` marks a date
    /// with no available constituent.
    pub returns: Vec<Option<f64>>,
    /// Per-date count of constituents contributing a return.
    pub n_firms: Vec<usize>,
    /// Aggregate formation weight of the cell's constituents.
    pub total_weight: f64,
}

/// Per-cell per-date portfolio returns of one rebalancing period.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioPanel {
    /// Return dates inside the application window, ascending.
    pub dates: Vec<Date>,
    /// One series per cell of the sort grid, empty cells included.
    pub cells: BTreeMap<SortKey, CellSeries>,
}

impl PortfolioPanel {
    /// A panel whose every cell is unavailable on every date, used when a
    /// period's breakpoints cannot be computed.
    #[must_use]
    pub fn unavailable(dates: Vec<Date>, cells: Vec<SortKey>) -> Self {
        let n = dates.len();
        let series = CellSeries { returns: vec![None; n], n_firms: vec![0; n], total_weight: 0.0 };
        Self { dates, cells: cells.into_iter().map(|key| (key, series.clone())).collect() }
    }

    /// The series of one cell.
    #[must_use]
    pub fn cell(&self, key: &SortKey) -> Option<&CellSeries> {
        self.cells.get(key)
    }

    /// The return of one cell on one date, `None` when unavailable or
    /// outside the panel.
    #[must_use]
    pub fn return_on(&self, key: &SortKey, date: Date) -> Option<f64> {
        let idx = self.dates.binary_search(&date).ok()?;
        self.cells.get(key).and_then(|series| series.returns[idx])
    }

    /// Number of return dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the panel covers no dates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Aggregate one period's security returns into per-cell portfolio
/// returns.
///
/// The weight snapshot is the formation-date market value carried on the
/// assignments (or 1/n under equal weighting) and is held fixed through
/// the window. On each date the weights renormalize over the constituents
/// with an available return; a cell with none is unavailable that date,
/// never zero.
///
/// # Errors
/// Returns `ModelError::MissingColumn` if the window frame lacks the
/// date/symbol/return columns.
pub fn aggregate_period(
    window: &DataFrame,
    set: &AssignmentSet,
    weighting: Weighting,
) -> Result<PortfolioPanel, ModelError> {
    for required in ["date", "symbol", "asset_returns"] {
        if !window.get_column_names().iter().any(|c| c.as_str() == required) {
            return Err(ModelError::MissingColumn(required.to_string()));
        }
    }

    let date_column = window.column("date")?;
    let symbols = window.column("symbol")?.str()?;
    let returns = window.column("asset_returns")?.f64()?;

    let mut dates: BTreeSet<Date> = BTreeSet::new();
    let mut available: HashMap<(String, Date), f64> = HashMap::new();
    for idx in 0..window.height() {
        let AnyValue::Date(days) = date_column.get(idx)? else {
            continue;
        };
        let date = from_epoch_days(days);
        dates.insert(date);

        if let (Some(symbol), Some(ret)) = (symbols.get(idx), returns.get(idx)) {
            if ret.is_finite() {
                available.insert((symbol.to_string(), date), ret);
            }
        }
    }
    let dates: Vec<Date> = dates.into_iter().collect();

    let mut members: BTreeMap<SortKey, Vec<(String, f64)>> =
        set.cells().into_iter().map(|key| (key, Vec::new())).collect();
    for assignment in &set.assignments {
        let weight = match weighting {
            Weighting::Equal => 1.0,
            Weighting::Value => assignment.weight,
        };
        if let Some(cell) = members.get_mut(&assignment.key) {
            cell.push((assignment.symbol.as_str().to_string(), weight));
        }
    }

    let cells = members
        .into_iter()
        .map(|(key, constituents)| {
            let weights: Array1<f64> = constituents.iter().map(|(_, w)| *w).collect();
            let total_weight = weights.iter().filter(|w| **w > 0.0).sum();

            let mut cell_returns = Vec::with_capacity(dates.len());
            let mut n_firms = Vec::with_capacity(dates.len());
            for &date in &dates {
                let values: Vec<Option<f64>> = constituents
                    .iter()
                    .map(|(symbol, _)| available.get(&(symbol.clone(), date)).copied())
                    .collect();
                n_firms.push(values.iter().flatten().count());
                cell_returns.push(weighted_mean_available(&values, &weights));
            }

            (key, CellSeries { returns: cell_returns, n_firms, total_weight })
        })
        .collect();

    Ok(PortfolioPanel { dates, cells })
}
