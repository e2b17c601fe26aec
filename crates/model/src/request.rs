//! Factor request and sort specification types.

use hanover_calendar::CalendarConfig;
use hanover_primitives::{
    Date, DateRange, QuantileBasis, SortKey, SortMode, TieBreak, UniverseConfig, UniverseFilter,
    Weighting, cell_grid,
};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// One characteristic of a sort with its quantile targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicSort {
    /// Registered characteristic name.
    pub characteristic: String,
    /// Quantile cut targets, strictly increasing in (0, 1).
    pub quantiles: Vec<f64>,
}

impl CharacteristicSort {
    /// Create a sort on arbitrary quantile targets.
    #[must_use]
    pub fn new(characteristic: impl Into<String>, quantiles: Vec<f64>) -> Self {
        Self { characteristic: characteristic.into(), quantiles }
    }

    /// Two buckets split at the median.
    #[must_use]
    pub fn median(characteristic: impl Into<String>) -> Self {
        Self::new(characteristic, vec![0.5])
    }

    /// Three buckets split at the 30th and 70th percentiles.
    #[must_use]
    pub fn terciles_30_70(characteristic: impl Into<String>) -> Self {
        Self::new(characteristic, vec![0.3, 0.7])
    }

    /// Ten decile buckets.
    #[must_use]
    pub fn deciles(characteristic: impl Into<String>) -> Self {
        Self::new(characteristic, hanover_math::equal_quantiles(10))
    }

    /// Number of buckets the targets induce.
    #[must_use]
    pub fn n_buckets(&self) -> usize {
        self.quantiles.len() + 1
    }
}

/// An N-way sort specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Sort characteristics, outermost first.
    pub characteristics: Vec<CharacteristicSort>,
    /// Orthogonal or nested bucketing.
    pub mode: SortMode,
}

impl SortSpec {
    /// Create a sort specification.
    #[must_use]
    pub fn new(characteristics: Vec<CharacteristicSort>, mode: SortMode) -> Self {
        Self { characteristics, mode }
    }

    /// Per-characteristic bucket counts.
    #[must_use]
    pub fn bucket_counts(&self) -> Vec<usize> {
        self.characteristics.iter().map(CharacteristicSort::n_buckets).collect()
    }

    /// The full cell grid of the sort.
    #[must_use]
    pub fn cells(&self) -> Vec<SortKey> {
        cell_grid(&self.bucket_counts())
    }
}

/// Breakpoint computation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointConfig {
    /// Reference subset restriction, e.g. NYSE-listed securities. `None`
    /// computes breakpoints from the full eligible universe.
    pub reference: Option<UniverseFilter>,
    /// Security-count or weight-mass quantiles.
    pub basis: QuantileBasis,
    /// Tie-break direction at exact cutpoints.
    pub tie_break: TieBreak,
}

impl BreakpointConfig {
    /// NYSE-reference breakpoints with the standard conventions.
    #[must_use]
    pub fn nyse() -> Self {
        Self {
            reference: Some(UniverseFilter::exchanges(&["NYSE"])),
            basis: QuantileBasis::Count,
            tie_break: TieBreak::Lower,
        }
    }
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self { reference: None, basis: QuantileBasis::Count, tie_break: TieBreak::Lower }
    }
}

/// One leg of a factor combination: a coefficient applied to the simple
/// average of the named cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorLeg {
    /// Coefficient applied to the leg average.
    pub coefficient: f64,
    /// Cells averaged into the leg.
    pub cells: Vec<SortKey>,
}

impl FactorLeg {
    /// Create a leg.
    #[must_use]
    pub const fn new(coefficient: f64, cells: Vec<SortKey>) -> Self {
        Self { coefficient, cells }
    }
}

/// A linear combination of portfolio cells forming a factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorCombination {
    /// Combination legs.
    pub legs: Vec<FactorLeg>,
    /// Expected coefficient sum (0 for long-short), checked at request
    /// validation when set.
    pub target_exposure: Option<f64>,
}

impl FactorCombination {
    /// Create a combination without an exposure check.
    #[must_use]
    pub const fn new(legs: Vec<FactorLeg>) -> Self {
        Self { legs, target_exposure: None }
    }

    /// Create a long-short combination expected to net to zero.
    #[must_use]
    pub const fn long_short(legs: Vec<FactorLeg>) -> Self {
        Self { legs, target_exposure: Some(0.0) }
    }

    /// Sum of the leg coefficients.
    #[must_use]
    pub fn net_exposure(&self) -> f64 {
        self.legs.iter().map(|leg| leg.coefficient).sum()
    }
}

/// A complete factor construction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRequest {
    /// Factor name for the resulting series.
    pub name: String,
    /// Sort specification.
    pub sort: SortSpec,
    /// Cell combination forming the factor.
    pub combination: FactorCombination,
    /// Portfolio weighting scheme.
    pub weighting: Weighting,
    /// Breakpoint configuration.
    pub breakpoints: BreakpointConfig,
    /// Eligibility rules.
    pub universe: UniverseConfig,
    /// Rebalancing calendar configuration.
    pub calendar: CalendarConfig,
    /// Requested return range.
    pub range: DateRange,
    /// Freshness token: requests with distinct values never share cache
    /// entries.
    pub as_of: Option<Date>,
}

impl FactorRequest {
    /// Validate the request configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` for malformed sorts, quantiles,
    /// combinations, or reference filters. These abort the request; they
    /// are never degraded per period.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.sort.characteristics.is_empty() {
            return Err(ModelError::InvalidConfig("sort has no characteristics".to_string()));
        }
        for sort in &self.sort.characteristics {
            if sort.quantiles.is_empty() {
                return Err(ModelError::InvalidConfig(format!(
                    "characteristic {} has no quantile targets",
                    sort.characteristic
                )));
            }
            for &q in &sort.quantiles {
                if !(q > 0.0 && q < 1.0) {
                    return Err(ModelError::InvalidConfig(format!(
                        "quantile target {q} outside (0, 1)"
                    )));
                }
            }
            if !sort.quantiles.windows(2).all(|w| w[0] < w[1]) {
                return Err(ModelError::InvalidConfig(format!(
                    "quantile targets for {} are not strictly increasing",
                    sort.characteristic
                )));
            }
        }

        if self.combination.legs.is_empty() {
            return Err(ModelError::InvalidConfig("combination has no legs".to_string()));
        }
        let counts = self.sort.bucket_counts();
        for leg in &self.combination.legs {
            if leg.cells.is_empty() {
                return Err(ModelError::InvalidConfig("combination leg has no cells".to_string()));
            }
            for cell in &leg.cells {
                let fits = cell.dims() == counts.len()
                    && cell.0.iter().zip(&counts).all(|(i, n)| i < n);
                if !fits {
                    return Err(ModelError::InvalidConfig(format!(
                        "cell {cell} outside the {:?} sort grid",
                        counts
                    )));
                }
            }
        }
        if let Some(target) = self.combination.target_exposure {
            let net = self.combination.net_exposure();
            if (net - target).abs() > 1e-9 {
                return Err(ModelError::InvalidConfig(format!(
                    "combination nets to {net}, expected {target}"
                )));
            }
        }

        if let Some(reference) = &self.breakpoints.reference {
            if reference.column != "exchange" {
                return Err(ModelError::InvalidConfig(format!(
                    "reference filter must target the exchange column, got {}",
                    reference.column
                )));
            }
            if reference.allowed.is_empty() {
                return Err(ModelError::InvalidConfig(
                    "reference filter admits no exchanges".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hanover_primitives::Date;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn request() -> FactorRequest {
        FactorRequest {
            name: "smb".to_string(),
            sort: SortSpec::new(
                vec![CharacteristicSort::median("market_equity")],
                SortMode::Orthogonal,
            ),
            combination: FactorCombination::long_short(vec![
                FactorLeg::new(1.0, vec![SortKey::new(vec![0])]),
                FactorLeg::new(-1.0, vec![SortKey::new(vec![1])]),
            ]),
            weighting: Weighting::Equal,
            breakpoints: BreakpointConfig::default(),
            universe: UniverseConfig::default(),
            calendar: CalendarConfig::default(),
            range: DateRange::new(d(1963, 7, 1), d(1964, 6, 30)),
            as_of: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn empty_sort_rejected() {
        let mut req = request();
        req.sort.characteristics.clear();
        assert!(matches!(req.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn out_of_grid_cell_rejected() {
        let mut req = request();
        req.combination.legs[0].cells = vec![SortKey::new(vec![5])];
        assert!(matches!(req.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn exposure_target_checked() {
        let mut req = request();
        req.combination.legs[1].coefficient = -0.5;
        assert!(matches!(req.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn bad_quantiles_rejected() {
        let mut req = request();
        req.sort.characteristics[0].quantiles = vec![0.7, 0.3];
        assert!(matches!(req.validate(), Err(ModelError::InvalidConfig(_))));

        req.sort.characteristics[0].quantiles = vec![1.2];
        assert!(matches!(req.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn non_exchange_reference_rejected() {
        let mut req = request();
        req.breakpoints.reference = Some(UniverseFilter {
            column: "sector".to_string(),
            allowed: vec!["Utilities".to_string()],
        });
        assert!(matches!(req.validate(), Err(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn sort_grid_shape() {
        let sort = SortSpec::new(
            vec![
                CharacteristicSort::median("market_equity"),
                CharacteristicSort::terciles_30_70("book_to_market"),
            ],
            SortMode::Orthogonal,
        );
        assert_eq!(sort.bucket_counts(), vec![2, 3]);
        assert_eq!(sort.cells().len(), 6);
    }
}
