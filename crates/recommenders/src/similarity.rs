//! Vector math and ranking helpers shared by the strategies.
//!
//! Cosine similarity is defined as 0 whenever either side has zero
//! length, so no caller ever sees NaN.

use data_loader::MovieId;

/// Cosine similarity from precomputed parts
///
/// `dot / sqrt(|a|² * |b|²)`. Taking one square root of the product
/// (instead of multiplying two roots) makes `cosine(v, v)` exactly 1.0.
pub fn cosine_from_parts(dot: f64, norm_sq_a: f64, norm_sq_b: f64) -> f64 {
    if norm_sq_a <= 0.0 || norm_sq_b <= 0.0 {
        return 0.0;
    }
    let denom = (norm_sq_a * norm_sq_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    dot / denom
}

/// Sparse vector with entries sorted by dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from `(dimension, value)` pairs in any order
    ///
    /// Repeated dimensions are summed; zeros are dropped.
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|&(dim, _)| dim);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (dim, value) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == dim => last.1 += value,
                _ => merged.push((dim, value)),
            }
        }
        merged.retain(|&(_, value)| value != 0.0);

        Self { entries: merged }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm_sq(&self) -> f64 {
        self.entries.iter().map(|&(_, v)| v * v).sum()
    }

    /// Scale to unit length; the zero vector stays zero
    pub fn normalized(&self) -> Self {
        let norm = self.norm_sq().sqrt();
        if norm == 0.0 {
            return Self::default();
        }
        Self {
            entries: self.entries.iter().map(|&(d, v)| (d, v / norm)).collect(),
        }
    }

    /// Merge-join dot product
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (da, va) = self.entries[i];
            let (db, vb) = other.entries[j];
            match da.cmp(&db) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += va * vb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity of two sparse vectors
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    cosine_from_parts(a.dot(b), a.norm_sq(), b.norm_sq())
}

/// Sort by score descending, ties by movie id ascending
pub fn rank_by_score(scored: &mut [(MovieId, f64)]) {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// Min-max scaling to 0..=1
///
/// A constant input (including a single value) maps to all 1.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range.is_nan() || range <= 0.0 {
        return vec![1.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}
