//! Configuration enums and universe rules shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Portfolio return weighting scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weighting {
    /// Each constituent contributes 1/n.
    Equal,
    /// Contribution proportional to formation-date market value.
    #[default]
    Value,
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Value => write!(f, "value"),
        }
    }
}

/// How a multi-way sort combines its characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Each characteristic bucketed against its own breakpoints.
    #[default]
    Orthogonal,
    /// Each subsequent characteristic bucketed within the bucket already
    /// assigned by the prior one.
    Nested,
}

/// Direction a security exactly at a cutpoint falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TieBreak {
    /// Ties go to the lower bucket.
    #[default]
    Lower,
    /// Ties go to the upper bucket.
    Upper,
}

/// Quantile convention for breakpoint computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuantileBasis {
    /// Order statistics over the reference securities.
    #[default]
    Count,
    /// Cumulative-weight quantiles (weight typically market value).
    WeightMass,
}

/// Restriction of breakpoint computation to a reference subset, e.g. one
/// exchange's securities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseFilter {
    /// Panel column holding the classification.
    pub column: String,
    /// Values admitted into the subset.
    pub allowed: Vec<String>,
}

impl UniverseFilter {
    /// Restrict to securities listed on the given exchanges.
    #[must_use]
    pub fn exchanges(codes: &[&str]) -> Self {
        Self {
            column: "exchange".to_string(),
            allowed: codes.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// A configured exclusion predicate: securities whose `column` value is in
/// `excluded` are ineligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// Panel column the rule inspects.
    pub column: String,
    /// Values that make a security ineligible.
    pub excluded: Vec<String>,
}

/// Eligibility rules applied by the characteristic resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Require a non-missing primary exchange listing at formation.
    pub require_exchange: bool,
    /// Configured exclusion predicates (e.g. certain share classes).
    pub exclusions: Vec<ExclusionRule>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self { require_exchange: true, exclusions: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_methodology() {
        assert_eq!(Weighting::default(), Weighting::Value);
        assert_eq!(SortMode::default(), SortMode::Orthogonal);
        assert_eq!(TieBreak::default(), TieBreak::Lower);
        assert_eq!(QuantileBasis::default(), QuantileBasis::Count);
        assert!(UniverseConfig::default().require_exchange);
    }

    #[test]
    fn exchange_filter_builder() {
        let filter = UniverseFilter::exchanges(&["NYSE"]);
        assert_eq!(filter.column, "exchange");
        assert_eq!(filter.allowed, vec!["NYSE".to_string()]);
    }

    #[test]
    fn weighting_display() {
        assert_eq!(Weighting::Equal.to_string(), "equal");
        assert_eq!(Weighting::Value.to_string(), "value");
    }
}
