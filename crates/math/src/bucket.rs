//! Bucket assignment against breakpoints.

use hanover_primitives::{BreakpointSet, TieBreak};
use ndarray::Array1;

/// Assign each value to a bucket index against the given cutpoints.
///
/// Non-finite values yield `None`; every finite value maps to exactly one
/// bucket. Values exactly at a cutpoint follow the tie-break policy.
#[must_use]
pub fn assign_buckets(
    values: &Array1<f64>,
    cuts: &BreakpointSet,
    tie_break: TieBreak,
) -> Vec<Option<usize>> {
    values
        .iter()
        .map(|&v| v.is_finite().then(|| cuts.bucket_of(v, tie_break)))
        .collect()
}

/// Occupancy of each bucket.
#[must_use]
pub fn bucket_counts(buckets: &[Option<usize>], n_buckets: usize) -> Vec<usize> {
    let mut counts = vec![0; n_buckets];
    for bucket in buckets.iter().flatten() {
        if let Some(count) = counts.get_mut(*bucket) {
            *count += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rstest::rstest;

    use super::*;
    use crate::{breakpoints, equal_quantiles};

    #[test]
    fn every_finite_value_gets_one_bucket() {
        let cuts = BreakpointSet::new(vec![2.0, 4.0]);
        let values = array![1.0, 3.0, 5.0, f64::NAN];
        let buckets = assign_buckets(&values, &cuts, TieBreak::Lower);

        assert_eq!(buckets, vec![Some(0), Some(1), Some(2), None]);
    }

    #[test]
    fn tie_break_at_cutpoint() {
        let cuts = BreakpointSet::new(vec![2.0]);
        let values = array![2.0];

        assert_eq!(assign_buckets(&values, &cuts, TieBreak::Lower), vec![Some(0)]);
        assert_eq!(assign_buckets(&values, &cuts, TieBreak::Upper), vec![Some(1)]);
    }

    #[rstest]
    #[case(2)]
    #[case(5)]
    #[case(10)]
    fn equal_quantile_buckets_nearly_balanced(#[case] n_buckets: usize) {
        // 100 distinct values across n equal quantile targets: bucket
        // occupancy on the reference subset differs by at most one.
        let values = Array1::from_iter((0..100).map(f64::from));
        let cuts = breakpoints(&values, &equal_quantiles(n_buckets)).unwrap();
        let buckets = assign_buckets(&values, &cuts, TieBreak::Lower);
        let counts = bucket_counts(&buckets, n_buckets);

        assert_eq!(counts.iter().sum::<usize>(), 100);
        let max = counts.iter().max().unwrap();
        let min = counts.iter().min().unwrap();
        assert!(max - min <= 1, "counts {counts:?} unbalanced");
    }

    #[test]
    fn counts_skip_missing() {
        let buckets = vec![Some(0), None, Some(1), Some(1)];
        assert_eq!(bucket_counts(&buckets, 2), vec![1, 2]);
    }
}
