//! Breakpoint set type.

use serde::{Deserialize, Serialize};

use crate::TieBreak;

/// Cross-sectional cutpoints partitioning a characteristic's value range
/// into buckets for one period.
///
/// Invariant: cutpoints are strictly increasing. Construction from data is
/// the breakpoint engine's job; it rejects degenerate cut sequences before
/// they get here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointSet {
    cutpoints: Vec<f64>,
}

impl BreakpointSet {
    /// Create a breakpoint set from strictly increasing cutpoints.
    #[must_use]
    pub fn new(cutpoints: Vec<f64>) -> Self {
        debug_assert!(Self::strictly_increasing(&cutpoints));
        Self { cutpoints }
    }

    /// Whether a cutpoint sequence is strictly increasing.
    #[must_use]
    pub fn strictly_increasing(cutpoints: &[f64]) -> bool {
        cutpoints.windows(2).all(|w| w[0] < w[1])
    }

    /// The cutpoints.
    #[must_use]
    pub fn cutpoints(&self) -> &[f64] {
        &self.cutpoints
    }

    /// Number of buckets the cutpoints induce.
    #[must_use]
    pub fn n_buckets(&self) -> usize {
        self.cutpoints.len() + 1
    }

    /// Bucket index for `value` under the given tie-break policy.
    ///
    /// With `TieBreak::Lower` a value exactly at a cutpoint falls into the
    /// bucket below it; with `TieBreak::Upper` into the bucket above.
    #[must_use]
    pub fn bucket_of(&self, value: f64, tie_break: TieBreak) -> usize {
        match tie_break {
            TieBreak::Lower => self.cutpoints.iter().filter(|&&c| value > c).count(),
            TieBreak::Upper => self.cutpoints.iter().filter(|&&c| value >= c).count(),
        }
    }
}
