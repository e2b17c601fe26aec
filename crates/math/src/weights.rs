//! Portfolio weight kernels.

use ndarray::Array1;

/// Normalize raw size measures into weights summing to one.
///
/// Negative and non-finite entries contribute zero weight. A
/// cross-section with no positive mass yields all-zero weights.
#[must_use]
pub fn proportional_weights(raw: &Array1<f64>) -> Array1<f64> {
    let clamped = raw.mapv(|x| if x.is_finite() && x > 0.0 { x } else { 0.0 });
    let total: f64 = clamped.sum();
    if total > 0.0 { clamped / total } else { clamped }
}

/// Weighted average over the available values, renormalizing the weights
/// over the constituents present.
///
/// Constituents with a missing value drop out and the remaining weights
/// are rescaled, so mid-window delistings shrink the divisor instead of
/// contributing zeros. Returns `None` when no constituent is available or
/// the surviving weight mass is zero.
#[must_use]
pub fn weighted_mean_available(values: &[Option<f64>], weights: &Array1<f64>) -> Option<f64> {
    debug_assert_eq!(values.len(), weights.len());

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (value, &weight) in values.iter().zip(weights.iter()) {
        if let Some(v) = value {
            if v.is_finite() && weight > 0.0 {
                weighted_sum += v * weight;
                total_weight += weight;
            }
        }
    }

    (total_weight > 0.0).then(|| weighted_sum / total_weight)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn proportional_weights_sum_to_one() {
        let weights = proportional_weights(&array![10.0, 30.0, 60.0]);
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights[2], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn proportional_weights_clamp_negatives() {
        let weights = proportional_weights(&array![-5.0, 5.0, f64::NAN]);
        assert_relative_eq!(weights[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(weights[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn proportional_weights_zero_mass() {
        let weights = proportional_weights(&array![0.0, -1.0]);
        assert!(weights.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn weighted_mean_basic() {
        let values = vec![Some(0.05), Some(-0.03)];
        let weights = array![0.5, 0.5];
        assert_relative_eq!(
            weighted_mean_available(&values, &weights).unwrap(),
            0.01,
            epsilon = 1e-12
        );
    }

    #[test]
    fn missing_values_renormalize_not_zero_fill() {
        // A delisted constituent drops out: the survivor carries the full
        // weight instead of the missing return counting as zero.
        let values = vec![Some(0.04), None];
        let weights = array![0.25, 0.75];
        assert_relative_eq!(
            weighted_mean_available(&values, &weights).unwrap(),
            0.04,
            epsilon = 1e-12
        );
    }

    #[test]
    fn all_missing_is_unavailable() {
        let values: Vec<Option<f64>> = vec![None, None];
        let weights = array![0.5, 0.5];
        assert_eq!(weighted_mean_available(&values, &weights), None);
    }

    #[test]
    fn zero_surviving_weight_is_unavailable() {
        let values = vec![None, Some(0.02)];
        let weights = array![1.0, 0.0];
        assert_eq!(weighted_mean_available(&values, &weights), None);
    }
}
