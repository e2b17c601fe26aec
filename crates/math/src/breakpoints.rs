//! Breakpoint computation.

use hanover_primitives::{BreakpointSet, QuantileBasis};
use ndarray::Array1;

use crate::MathError;

/// Equally spaced quantile targets inducing `n_buckets` buckets
/// (2 buckets -> `[0.5]`, 10 buckets -> the nine decile cuts).
#[must_use]
pub fn equal_quantiles(n_buckets: usize) -> Vec<f64> {
    if n_buckets < 2 {
        return Vec::new();
    }
    (1..n_buckets).map(|i| i as f64 / n_buckets as f64).collect()
}

fn validate_targets(targets: &[f64]) -> Result<(), MathError> {
    for &q in targets {
        if !(q > 0.0 && q < 1.0) {
            return Err(MathError::InvalidQuantile(q));
        }
    }
    if !targets.windows(2).all(|w| w[0] < w[1]) {
        return Err(MathError::QuantilesNotIncreasing);
    }
    Ok(())
}

fn check_cutpoints(cutpoints: Vec<f64>) -> Result<BreakpointSet, MathError> {
    if !BreakpointSet::strictly_increasing(&cutpoints) {
        return Err(MathError::DegenerateCutpoints { n_buckets: cutpoints.len() + 1 });
    }
    Ok(BreakpointSet::new(cutpoints))
}

/// Compute order-statistic breakpoints over a reference cross-section.
///
/// Cutpoints are linearly interpolated quantiles of the finite values.
///
/// # Errors
/// Returns `MathError::InsufficientData` if the reference subset has fewer
/// members than quantile count + 1, `DegenerateCutpoints` if the values do
/// not separate the requested buckets, or a validation error for malformed
/// quantile targets.
pub fn breakpoints(values: &Array1<f64>, targets: &[f64]) -> Result<BreakpointSet, MathError> {
    validate_targets(targets)?;

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = sorted.len();
    if n < targets.len() + 1 {
        return Err(MathError::InsufficientData { required: targets.len() + 1, actual: n });
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let cutpoints = targets
        .iter()
        .map(|&q| {
            let pos = q * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] * (1.0 - frac) + sorted[upper.min(n - 1)] * frac
        })
        .collect();

    check_cutpoints(cutpoints)
}

/// Compute cumulative weight-mass breakpoints over a reference
/// cross-section.
///
/// The cutpoint for target `q` is the smallest reference value at which
/// the cumulative weight reaches `q` of the total; weight is typically
/// market value.
///
/// # Errors
/// Returns `MathError::DimensionMismatch` if the vectors differ in length,
/// `InvalidWeight` for negative or non-finite weights, and the same
/// insufficiency/degeneracy errors as [`breakpoints`].
pub fn weighted_breakpoints(
    values: &Array1<f64>,
    weights: &Array1<f64>,
    targets: &[f64],
) -> Result<BreakpointSet, MathError> {
    validate_targets(targets)?;

    if weights.len() != values.len() {
        return Err(MathError::DimensionMismatch {
            expected: values.len(),
            actual: weights.len(),
        });
    }
    if let Some(&w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(MathError::InvalidWeight(w));
    }

    let mut pairs: Vec<(f64, f64)> = values
        .iter()
        .zip(weights.iter())
        .filter(|(v, w)| v.is_finite() && **w > 0.0)
        .map(|(&v, &w)| (v, w))
        .collect();
    let n = pairs.len();
    if n < targets.len() + 1 {
        return Err(MathError::InsufficientData { required: targets.len() + 1, actual: n });
    }
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    let mut cutpoints = Vec::with_capacity(targets.len());
    for &q in targets {
        let threshold = q * total;
        let mut cumulative = 0.0;
        let mut cut = pairs[n - 1].0;
        for &(value, weight) in &pairs {
            cumulative += weight;
            if cumulative >= threshold {
                cut = value;
                break;
            }
        }
        cutpoints.push(cut);
    }

    check_cutpoints(cutpoints)
}

/// Dispatch on the configured quantile basis.
///
/// # Errors
/// `MathError::MissingWeights` when `WeightMass` is requested without a
/// weight vector; otherwise as [`breakpoints`] / [`weighted_breakpoints`].
pub fn breakpoints_with_basis(
    values: &Array1<f64>,
    weights: Option<&Array1<f64>>,
    targets: &[f64],
    basis: QuantileBasis,
) -> Result<BreakpointSet, MathError> {
    match basis {
        QuantileBasis::Count => breakpoints(values, targets),
        QuantileBasis::WeightMass => {
            let weights = weights.ok_or(MathError::MissingWeights)?;
            weighted_breakpoints(values, weights, targets)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn equal_quantiles_deciles() {
        let targets = equal_quantiles(10);
        assert_eq!(targets.len(), 9);
        assert_relative_eq!(targets[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(targets[8], 0.9, epsilon = 1e-12);
        assert!(equal_quantiles(1).is_empty());
    }

    #[test]
    fn median_of_odd_count() {
        let values = array![3.0, 1.0, 2.0];
        let set = breakpoints(&values, &[0.5]).unwrap();
        assert_relative_eq!(set.cutpoints()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn median_interpolates_even_count() {
        let values = array![1.0, 2.0, 3.0, 4.0];
        let set = breakpoints(&values, &[0.5]).unwrap();
        assert_relative_eq!(set.cutpoints()[0], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn tercile_cutpoints_increase() {
        let values = Array1::from_iter((1..=30).map(f64::from));
        let set = breakpoints(&values, &[0.3, 0.7]).unwrap();
        assert_eq!(set.n_buckets(), 3);
        assert!(set.cutpoints()[0] < set.cutpoints()[1]);
    }

    #[test]
    fn single_member_reference_is_insufficient() {
        let values = array![42.0];
        let err = breakpoints(&values, &[0.5]).unwrap_err();
        assert!(matches!(err, MathError::InsufficientData { required: 2, actual: 1 }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn non_finite_values_ignored() {
        let values = array![f64::NAN, 1.0, 2.0, f64::INFINITY, 3.0];
        let set = breakpoints(&values, &[0.5]).unwrap();
        assert_relative_eq!(set.cutpoints()[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_values_degenerate() {
        let values = array![5.0, 5.0, 5.0, 5.0];
        let err = breakpoints(&values, &[0.3, 0.7]).unwrap_err();
        assert!(matches!(err, MathError::DegenerateCutpoints { n_buckets: 3 }));
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.2)]
    #[case(1.7)]
    fn out_of_range_targets_rejected(#[case] q: f64) {
        let values = array![1.0, 2.0, 3.0];
        assert!(matches!(breakpoints(&values, &[q]), Err(MathError::InvalidQuantile(_))));
    }

    #[test]
    fn unordered_targets_rejected() {
        let values = array![1.0, 2.0, 3.0];
        assert!(matches!(
            breakpoints(&values, &[0.7, 0.3]),
            Err(MathError::QuantilesNotIncreasing)
        ));
    }

    #[test]
    fn weight_mass_median_leans_to_heavy_names() {
        let values = array![1.0, 2.0, 3.0, 4.0];
        let weights = array![1.0, 1.0, 1.0, 7.0];
        let set = weighted_breakpoints(&values, &weights, &[0.5]).unwrap();
        // Half the weight mass is only reached at the heaviest value.
        assert_relative_eq!(set.cutpoints()[0], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn weight_mass_uniform_weights_match_interior_order_statistics() {
        let values = array![10.0, 20.0, 30.0, 40.0, 50.0];
        let weights = array![1.0, 1.0, 1.0, 1.0, 1.0];
        let set = weighted_breakpoints(&values, &weights, &[0.4, 0.8]).unwrap();
        assert_relative_eq!(set.cutpoints()[0], 20.0, epsilon = 1e-12);
        assert_relative_eq!(set.cutpoints()[1], 40.0, epsilon = 1e-12);
    }

    #[test]
    fn weighted_rejects_bad_inputs() {
        let values = array![1.0, 2.0];
        assert!(matches!(
            weighted_breakpoints(&values, &array![1.0], &[0.5]),
            Err(MathError::DimensionMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            weighted_breakpoints(&values, &array![1.0, -1.0], &[0.5]),
            Err(MathError::InvalidWeight(_))
        ));
    }

    #[test]
    fn basis_dispatch() {
        let values = array![1.0, 2.0, 3.0];
        assert!(breakpoints_with_basis(&values, None, &[0.5], QuantileBasis::Count).is_ok());
        assert!(matches!(
            breakpoints_with_basis(&values, None, &[0.5], QuantileBasis::WeightMass),
            Err(MathError::MissingWeights)
        ));
    }
}
