//! Cache key construction.

use serde::Serialize;

use crate::CacheError;

/// Pipeline stage a cached result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resolved characteristic values for one period.
    Characteristics,
    /// Breakpoint sets for one period.
    Breakpoints,
    /// Portfolio assignments for one period.
    Assignments,
    /// Aggregated portfolio returns for one period.
    PortfolioReturns,
    /// A combined factor series.
    FactorSeries,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Characteristics => write!(f, "characteristics"),
            Self::Breakpoints => write!(f, "breakpoints"),
            Self::Assignments => write!(f, "assignments"),
            Self::PortfolioReturns => write!(f, "portfolio_returns"),
            Self::FactorSeries => write!(f, "factor_series"),
        }
    }
}

/// Key of one cached computation: the stage plus the canonical rendering
/// of its full parameter set.
///
/// Identical parameters always canonicalize identically (serde_json emits
/// struct fields in declaration order), so equal requests share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    stage: Stage,
    params: String,
}

impl CacheKey {
    /// Build a key from a stage and its serializable parameter set.
    ///
    /// # Errors
    /// Returns `CacheError::Serialization` if the parameters cannot be
    /// canonicalized.
    pub fn new<P: Serialize>(stage: Stage, params: &P) -> Result<Self, CacheError> {
        let params = serde_json::to_string(params)?;
        Ok(Self { stage, params })
    }

    /// The stage this key belongs to.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.stage, self.params)
    }
}
