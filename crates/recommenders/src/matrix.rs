//! User x movie rating matrix for collaborative filtering.
//!
//! Rows are ordered maps so similarity sums always visit movies in the
//! same order, which keeps floating point results reproducible.

use crate::similarity::cosine_from_parts;
use data_loader::{DataIndex, MovieId, Rating, UserId};
use std::collections::BTreeMap;

/// Sparse rating matrix, one row per user
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    rows: BTreeMap<UserId, BTreeMap<MovieId, f64>>,
}

impl RatingMatrix {
    /// Build from raw ratings
    ///
    /// Repeated `(user, movie)` pairs collapse to their mean.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let mut sums: BTreeMap<UserId, BTreeMap<MovieId, (f64, u32)>> = BTreeMap::new();
        for r in ratings {
            let cell = sums
                .entry(r.user_id)
                .or_default()
                .entry(r.movie_id)
                .or_insert((0.0, 0));
            cell.0 += r.rating as f64;
            cell.1 += 1;
        }

        let rows = sums
            .into_iter()
            .map(|(user_id, movies)| {
                let row = movies
                    .into_iter()
                    .map(|(movie_id, (sum, count))| (movie_id, sum / count as f64))
                    .collect();
                (user_id, row)
            })
            .collect();

        Self { rows }
    }

    pub fn from_index(index: &DataIndex) -> Self {
        Self::from_ratings(index.ratings())
    }

    pub fn user_count(&self) -> usize {
        self.rows.len()
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.rows.contains_key(&user_id)
    }

    /// One user's ratings keyed by movie
    pub fn row(&self, user_id: UserId) -> Option<&BTreeMap<MovieId, f64>> {
        self.rows.get(&user_id)
    }

    /// Every row in ascending user id order
    pub fn rows(&self) -> impl Iterator<Item = (UserId, &BTreeMap<MovieId, f64>)> {
        self.rows.iter().map(|(&user_id, row)| (user_id, row))
    }

    /// Cosine similarity restricted to co-rated movies
    ///
    /// Users sharing no movie, or unknown users, score 0.
    pub fn user_similarity(&self, a: UserId, b: UserId) -> f64 {
        match (self.rows.get(&a), self.rows.get(&b)) {
            (Some(row_a), Some(row_b)) => co_rated_cosine(row_a, row_b),
            _ => 0.0,
        }
    }
}

/// Cosine over the intersection of two rows, iterating `a` in movie order
pub(crate) fn co_rated_cosine(a: &BTreeMap<MovieId, f64>, b: &BTreeMap<MovieId, f64>) -> f64 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (movie_id, &ra) in a {
        if let Some(&rb) = b.get(movie_id) {
            dot += ra * rb;
            norm_a += ra * ra;
            norm_b += rb * rb;
        }
    }
    cosine_from_parts(dot, norm_a, norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    #[test]
    fn test_duplicate_ratings_are_averaged() {
        let matrix = RatingMatrix::from_ratings(&[
            rating(1, 10, 4.0),
            rating(1, 10, 3.0),
            rating(1, 20, 5.0),
        ]);

        let row = matrix.row(1).unwrap();
        assert_eq!(row[&10], 3.5);
        assert_eq!(row[&20], 5.0);
        assert_eq!(matrix.user_count(), 1);
    }

    #[test]
    fn test_similarity_uses_only_co_rated_movies() {
        let matrix = RatingMatrix::from_ratings(&[
            rating(1, 1, 5.0),
            rating(1, 2, 3.0),
            rating(2, 1, 5.0),
            rating(2, 2, 3.0),
            rating(2, 3, 4.0),
        ]);

        // Movie 3 is only rated by user 2, so the vectors compared are equal
        assert_eq!(matrix.user_similarity(1, 2), 1.0);
        assert_eq!(matrix.user_similarity(2, 1), 1.0);
    }

    #[test]
    fn test_no_overlap_is_zero() {
        let matrix = RatingMatrix::from_ratings(&[rating(1, 1, 5.0), rating(2, 2, 4.0)]);

        assert_eq!(matrix.user_similarity(1, 2), 0.0);
        assert_eq!(matrix.user_similarity(1, 99), 0.0);
        assert!(!matrix.contains_user(99));
    }

    #[test]
    fn test_partial_similarity() {
        let matrix = RatingMatrix::from_ratings(&[
            rating(1, 1, 5.0),
            rating(1, 2, 3.0),
            rating(3, 1, 1.0),
            rating(3, 2, 5.0),
        ]);

        // (5*1 + 3*5) / sqrt(34 * 26)
        let expected = 20.0 / (34.0f64 * 26.0).sqrt();
        assert!((matrix.user_similarity(1, 3) - expected).abs() < 1e-12);
    }
}
