//! Sort key and cell grid types.

use serde::{Deserialize, Serialize};

/// Bucket indices of one portfolio cell, one index per sort
/// characteristic.
///
/// A 2x3 size/value sort yields keys `(0..2, 0..3)`; the full cell set is
/// the Cartesian product of the per-characteristic bucket counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortKey(pub Vec<usize>);

impl SortKey {
    /// Create a new key from bucket indices.
    #[must_use]
    pub const fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Number of sort dimensions.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    /// Bucket index along dimension `dim`.
    #[must_use]
    pub fn bucket(&self, dim: usize) -> Option<usize> {
        self.0.get(dim).copied()
    }
}

impl From<Vec<usize>> for SortKey {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| (i + 1).to_string()).collect();
        write!(f, "P{}", parts.join("-"))
    }
}

/// Enumerate every cell of an N-way sort grid in row-major order.
#[must_use]
pub fn cell_grid(bucket_counts: &[usize]) -> Vec<SortKey> {
    if bucket_counts.is_empty() || bucket_counts.contains(&0) {
        return Vec::new();
    }

    let total: usize = bucket_counts.iter().product();
    let mut cells = Vec::with_capacity(total);

    for mut flat in 0..total {
        let mut indices = vec![0; bucket_counts.len()];
        for dim in (0..bucket_counts.len()).rev() {
            indices[dim] = flat % bucket_counts[dim];
            flat /= bucket_counts[dim];
        }
        cells.push(SortKey(indices));
    }

    cells
}
