//! A sparse vector of `f64` values with a fixed logical size.

use serde::{Deserialize, Serialize};

/// A vector of logical length `size` that stores only a subset of its
/// positions. Unlisted positions are implicitly zero.
///
/// The stored indices are strictly increasing and each lies in `[0, size)`.
/// `indices` and `values` are parallel arrays of equal length. Non-finite
/// values are stored as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// The logical length of the vector.
    size: usize,
    /// The positions of the stored entries, strictly increasing.
    indices: Vec<usize>,
    /// The values of the stored entries, parallel to `indices`.
    values: Vec<f64>,
}

impl SparseVector {
    /// Creates a new sparse vector from parallel index and value arrays.
    ///
    /// # Arguments
    ///
    /// * `size`: The logical length of the vector.
    /// * `indices`: The positions of the stored entries.
    /// * `values`: The values at those positions.
    ///
    /// # Errors
    ///
    /// * If `indices` and `values` have different lengths.
    /// * If `indices` is not strictly increasing.
    /// * If any index is not less than `size`.
    pub fn new(size: usize, indices: Vec<usize>, values: Vec<f64>) -> Result<Self, String> {
        if indices.len() != values.len() {
            return Err(format!(
                "Indices and values must have the same length. Got {} and {}.",
                indices.len(),
                values.len()
            ));
        }

        if let Some(w) = indices.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "Indices must be strictly increasing. Found {} followed by {}.",
                w[0], w[1]
            ));
        }

        if let Some(&last) = indices.last() {
            if last >= size {
                return Err(format!("Index {last} is out of bounds for a vector of size {size}."));
            }
        }

        Ok(Self { size, indices, values })
    }

    /// Builds a vector from `(index, value)` entries that are already in
    /// strictly increasing index order.
    pub(crate) fn from_ascending_entries(size: usize, entries: Vec<(usize, f64)>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "entries must be strictly increasing"
        );
        debug_assert!(entries.last().map_or(true, |&(i, _)| i < size));

        let (indices, values) = entries.into_iter().unzip();
        Self { size, indices, values }
    }

    /// The logical length of the vector.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The number of explicitly stored entries.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// The positions of the stored entries.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The values of the stored entries.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the value at position `i`, zero if it is not stored.
    ///
    /// # Panics
    ///
    /// * If `i` is not less than the size of the vector.
    #[must_use]
    pub fn get(&self, i: usize) -> f64 {
        assert!(i < self.size, "Index {i} is out of bounds for a vector of size {}.", self.size);
        self.indices.binary_search(&i).map_or(0.0, |k| self.values[k])
    }

    /// Iterates over the stored `(index, value)` entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Expands the vector into a dense `Vec` of length `size`.
    #[must_use]
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.size];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}
