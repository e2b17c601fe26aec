//! Portfolio assignment engine.

use hanover_math::breakpoints_with_basis;
use hanover_primitives::{
    BreakpointSet, QuantileBasis, RebalancePeriod, SortKey, SortMode, Symbol, TieBreak, cell_grid,
};
use ndarray::Array1;

use crate::ModelError;

/// One characteristic's inputs to the assignment engine, aligned to the
/// eligible security list.
#[derive(Debug, Clone)]
pub struct SortInput {
    /// Characteristic name (diagnostics only).
    pub name: String,
    /// Characteristic values, one per eligible security.
    pub values: Vec<f64>,
    /// Reference-subset membership, one per eligible security.
    pub reference: Vec<bool>,
    /// Quantile cut targets.
    pub quantiles: Vec<f64>,
}

/// One security's cell assignment with its formation weight snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Security.
    pub symbol: Symbol,
    /// Assigned cell.
    pub key: SortKey,
    /// Formation-date market value, held fixed through the window.
    pub weight: f64,
}

/// All assignments of one rebalancing period.
#[derive(Debug, Clone)]
pub struct AssignmentSet {
    /// The period the assignments belong to.
    pub period: RebalancePeriod,
    /// Per-characteristic bucket counts of the sort grid.
    pub bucket_counts: Vec<usize>,
    /// One entry per eligible security.
    pub assignments: Vec<Assignment>,
}

impl AssignmentSet {
    /// Every cell of the sort grid, occupied or not.
    #[must_use]
    pub fn cells(&self) -> Vec<SortKey> {
        cell_grid(&self.bucket_counts)
    }

    /// Number of assigned securities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Check if no securities were assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Assigns every eligible security to exactly one cell of the sort grid.
///
/// Orthogonal mode buckets each characteristic against its own reference
/// breakpoints; nested mode recomputes each subsequent characteristic's
/// breakpoints within the bucket assigned by the prior ones. Assignment is
/// pure and deterministic for given inputs.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine {
    mode: SortMode,
    tie_break: TieBreak,
    basis: QuantileBasis,
}

impl AssignmentEngine {
    /// Create an engine.
    #[must_use]
    pub const fn new(mode: SortMode, tie_break: TieBreak, basis: QuantileBasis) -> Self {
        Self { mode, tie_break, basis }
    }

    /// Breakpoints of one characteristic over its reference subset.
    ///
    /// # Errors
    /// Returns a recoverable `MathError` (wrapped) when the reference
    /// subset is too small or does not separate the buckets.
    pub fn breakpoints_for(
        &self,
        sort: &SortInput,
        weights: &[f64],
    ) -> Result<BreakpointSet, ModelError> {
        let reference_values: Array1<f64> = sort
            .values
            .iter()
            .zip(&sort.reference)
            .filter(|(_, in_ref)| **in_ref)
            .map(|(&v, _)| v)
            .collect();
        let reference_weights: Array1<f64> = weights
            .iter()
            .zip(&sort.reference)
            .filter(|(_, in_ref)| **in_ref)
            .map(|(&w, _)| w)
            .collect();

        breakpoints_with_basis(
            &reference_values,
            Some(&reference_weights),
            &sort.quantiles,
            self.basis,
        )
        .map_err(Into::into)
    }

    /// Assign every security to a cell.
    ///
    /// `precomputed` supplies cached orthogonal breakpoints; nested sorts
    /// only use it for the outermost characteristic.
    ///
    /// # Errors
    /// `ModelError::InvalidConfig` for misaligned inputs; recoverable
    /// math errors when a reference subset cannot support the partition.
    pub fn assign(
        &self,
        period: RebalancePeriod,
        symbols: &[String],
        weights: &[f64],
        sorts: &[SortInput],
        precomputed: Option<&[BreakpointSet]>,
    ) -> Result<AssignmentSet, ModelError> {
        if sorts.is_empty() {
            return Err(ModelError::InvalidConfig("no sort characteristics".to_string()));
        }
        let n = symbols.len();
        if weights.len() != n {
            return Err(ModelError::InvalidConfig(format!(
                "weights length {} does not match {n} securities",
                weights.len()
            )));
        }
        for sort in sorts {
            if sort.values.len() != n || sort.reference.len() != n {
                return Err(ModelError::InvalidConfig(format!(
                    "sort {} inputs do not match {n} securities",
                    sort.name
                )));
            }
            debug_assert!(sort.values.iter().all(|v| v.is_finite()));
        }
        if let Some(pre) = precomputed {
            if pre.len() != sorts.len() && self.mode == SortMode::Orthogonal {
                return Err(ModelError::InvalidConfig(format!(
                    "{} precomputed breakpoint sets for {} characteristics",
                    pre.len(),
                    sorts.len()
                )));
            }
        }

        let buckets = match self.mode {
            SortMode::Orthogonal => self.orthogonal_buckets(weights, sorts, precomputed)?,
            SortMode::Nested => self.nested_buckets(weights, sorts, precomputed)?,
        };

        let assignments = symbols
            .iter()
            .enumerate()
            .map(|(j, symbol)| Assignment {
                symbol: Symbol::new(symbol.clone()),
                key: SortKey::new(buckets.iter().map(|b| b[j]).collect()),
                weight: weights[j],
            })
            .collect();

        Ok(AssignmentSet {
            period,
            bucket_counts: sorts.iter().map(|s| s.quantiles.len() + 1).collect(),
            assignments,
        })
    }

    fn orthogonal_buckets(
        &self,
        weights: &[f64],
        sorts: &[SortInput],
        precomputed: Option<&[BreakpointSet]>,
    ) -> Result<Vec<Vec<usize>>, ModelError> {
        let mut buckets = Vec::with_capacity(sorts.len());
        for (i, sort) in sorts.iter().enumerate() {
            let cuts = match precomputed {
                Some(pre) => pre[i].clone(),
                None => self.breakpoints_for(sort, weights)?,
            };
            buckets
                .push(sort.values.iter().map(|&v| cuts.bucket_of(v, self.tie_break)).collect());
        }
        Ok(buckets)
    }

    fn nested_buckets(
        &self,
        weights: &[f64],
        sorts: &[SortInput],
        precomputed: Option<&[BreakpointSet]>,
    ) -> Result<Vec<Vec<usize>>, ModelError> {
        let n = sorts[0].values.len();
        let outer_cuts = match precomputed.and_then(|pre| pre.first()) {
            Some(cuts) => cuts.clone(),
            None => self.breakpoints_for(&sorts[0], weights)?,
        };
        let mut buckets: Vec<Vec<usize>> =
            vec![sorts[0].values.iter().map(|&v| outer_cuts.bucket_of(v, self.tie_break)).collect()];

        for (dim, sort) in sorts.iter().enumerate().skip(1) {
            let mut assigned = vec![0usize; n];

            // Group securities by the buckets of all prior dimensions.
            let mut groups: std::collections::BTreeMap<Vec<usize>, Vec<usize>> =
                std::collections::BTreeMap::new();
            for j in 0..n {
                let prefix: Vec<usize> = buckets[..dim].iter().map(|b| b[j]).collect();
                groups.entry(prefix).or_default().push(j);
            }

            for members in groups.values() {
                let group_sort = SortInput {
                    name: sort.name.clone(),
                    values: members.iter().map(|&j| sort.values[j]).collect(),
                    reference: members.iter().map(|&j| sort.reference[j]).collect(),
                    quantiles: sort.quantiles.clone(),
                };
                let group_weights: Vec<f64> = members.iter().map(|&j| weights[j]).collect();
                let cuts = self.breakpoints_for(&group_sort, &group_weights)?;
                for (&j, &value) in members.iter().zip(&group_sort.values) {
                    assigned[j] = cuts.bucket_of(value, self.tie_break);
                }
            }

            buckets.push(assigned);
        }

        Ok(buckets)
    }
}
