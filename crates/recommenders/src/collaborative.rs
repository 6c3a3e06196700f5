//! Collaborative Recommender - User-Based Nearest Neighbours
//!
//! "Users who rate like you also rated these movies."
//!
//! ## Algorithm
//! 1. Cosine similarity between the target user and every other user,
//!    over the movies both have rated
//! 2. Keep the `k` most similar users (ties by user id)
//! 3. For each movie the target hasn't rated, predict
//!    `Σ(sim × rating) / Σ(sim)` over neighbours who rated it
//! 4. Drop movies no neighbour rated, or whose weight sum is not positive
//! 5. Rank by prediction, ties by movie id, and return the top `n`

use crate::config::DEFAULT_K_NEIGHBORS;
use crate::error::{RecommendError, Result};
use crate::matrix::{co_rated_cosine, RatingMatrix};
use crate::similarity::rank_by_score;
use crate::traits::Recommender;
use crate::types::{CollaborativeParams, RankedTable, Strategy};
use data_loader::{DataIndex, MovieId, UserId};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct CollaborativeRecommender {
    data_index: Arc<DataIndex>,
    matrix: RatingMatrix,
    /// Neighbour count when a request doesn't set one
    default_k: usize,
}

impl CollaborativeRecommender {
    /// Build the rating matrix from the index
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        let matrix = RatingMatrix::from_index(&data_index);
        debug!("Built rating matrix for {} users", matrix.user_count());
        Self {
            data_index,
            matrix,
            default_k: DEFAULT_K_NEIGHBORS,
        }
    }

    /// Configure the default neighbour count (default: 100)
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.default_k = k;
        self
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    fn target_row(&self, user_id: UserId) -> Result<&BTreeMap<MovieId, f64>> {
        self.matrix
            .row(user_id)
            .ok_or(RecommendError::UserNotFound { user_id })
    }

    /// The `k` users most similar to `user_id`
    ///
    /// Sorted by similarity descending, ties by user id ascending.
    /// Users with zero similarity still fill the set when fewer than `k`
    /// users overlap with the target.
    #[instrument(skip(self))]
    pub fn similar_users(&self, user_id: UserId, k: usize) -> Result<Vec<(UserId, f64)>> {
        let target = self.target_row(user_id)?;

        let others: Vec<(UserId, &BTreeMap<MovieId, f64>)> = self
            .matrix
            .rows()
            .filter(|&(other, _)| other != user_id)
            .collect();

        let mut neighbours: Vec<(UserId, f64)> = others
            .par_iter()
            .map(|&(other, row)| (other, co_rated_cosine(target, row)))
            .collect();

        neighbours.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        neighbours.truncate(k);

        debug!("Selected {} neighbours", neighbours.len());
        Ok(neighbours)
    }

    /// Predicted ratings for every movie the user hasn't rated
    ///
    /// Only movies present in the movies table and rated by at least one
    /// neighbour are returned, best prediction first.
    #[instrument(skip(self))]
    pub fn predict_unrated(&self, user_id: UserId, k: usize) -> Result<Vec<(MovieId, f64)>> {
        let target = self.target_row(user_id)?;
        let neighbours = self.similar_users(user_id, k)?;

        // movie -> (Σ sim × rating, Σ sim)
        let mut sums: BTreeMap<MovieId, (f64, f64)> = BTreeMap::new();
        for &(neighbour, similarity) in &neighbours {
            let Some(row) = self.matrix.row(neighbour) else {
                continue;
            };
            for (&movie_id, &rating) in row {
                if target.contains_key(&movie_id) || self.data_index.get_movie(movie_id).is_none() {
                    continue;
                }
                let entry = sums.entry(movie_id).or_insert((0.0, 0.0));
                entry.0 += similarity * rating;
                entry.1 += similarity;
            }
        }

        let mut predictions: Vec<(MovieId, f64)> = sums
            .into_iter()
            .filter(|&(_, (_, weight))| weight > 0.0)
            .map(|(movie_id, (weighted, weight))| (movie_id, weighted / weight))
            .collect();

        rank_by_score(&mut predictions);
        debug!("Predicted {} unrated movies", predictions.len());
        Ok(predictions)
    }
}

impl Recommender for CollaborativeRecommender {
    type Params = CollaborativeParams;

    fn name(&self) -> &str {
        "CollaborativeRecommender"
    }

    fn strategy(&self) -> Strategy {
        Strategy::Collaborative
    }

    #[instrument(skip(self, params), fields(user_id = params.user_id, n = params.n, k = ?params.k))]
    fn recommend(&self, params: &CollaborativeParams) -> Result<RankedTable> {
        if params.n == 0 {
            return Ok(RankedTable::empty(Strategy::Collaborative));
        }

        let k = params.k.unwrap_or(self.default_k);
        let mut predictions = self.predict_unrated(params.user_id, k)?;
        predictions.truncate(params.n);

        Ok(RankedTable::assemble(
            Strategy::Collaborative,
            &self.data_index,
            predictions.into_iter().map(|(id, score)| (id, Some(score))),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, Rating};

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    /// u1 and u2 agree perfectly on movies 1-2; u3 disagrees; u4 shares nothing
    fn create_test_recommender() -> CollaborativeRecommender {
        let movies = (1..=5)
            .map(|id| Movie {
                id,
                title: format!("Movie {} (2000)", id),
                name: format!("Movie {}", id),
                year: Some(2000),
                genres: vec!["Drama".to_string()],
            })
            .collect();
        let ratings = vec![
            rating(1, 1, 5.0),
            rating(1, 2, 3.0),
            rating(2, 1, 5.0),
            rating(2, 2, 3.0),
            rating(2, 3, 4.0),
            rating(3, 1, 1.0),
            rating(3, 2, 5.0),
            rating(3, 4, 5.0),
            rating(4, 5, 5.0),
        ];
        let index = DataIndex::from_records(movies, ratings).unwrap();
        CollaborativeRecommender::new(Arc::new(index))
    }

    fn params(user_id: UserId, n: usize, k: Option<usize>) -> CollaborativeParams {
        CollaborativeParams { user_id, n, k }
    }

    #[test]
    fn test_similar_users_order() {
        let recommender = create_test_recommender();
        let neighbours = recommender.similar_users(1, 10).unwrap();

        let ids: Vec<UserId> = neighbours.iter().map(|&(u, _)| u).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(neighbours[0].1, 1.0);
        assert_eq!(neighbours[2].1, 0.0);
    }

    #[test]
    fn test_predictions_exclude_rated_and_unreachable() {
        let recommender = create_test_recommender();
        let table = recommender.recommend(&params(1, 10, Some(3))).unwrap();

        // Movie 4 is only rated by u3 (5.0); movie 3 only by u2 (4.0);
        // movie 5 only by u4 whose weight is 0
        assert_eq!(table.strategy, Strategy::Collaborative);
        assert_eq!(table.movie_ids(), vec![4, 3]);
        assert!((table.rows[0].score.unwrap() - 5.0).abs() < 1e-12);
        assert!((table.rows[1].score.unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_limits_neighbours() {
        let recommender = create_test_recommender();
        let table = recommender.recommend(&params(1, 10, Some(1))).unwrap();
        assert_eq!(table.movie_ids(), vec![3]);

        assert!(recommender.recommend(&params(1, 10, Some(0))).unwrap().is_empty());
    }

    #[test]
    fn test_default_k_is_used() {
        let recommender = create_test_recommender().with_k_neighbors(1);
        assert_eq!(recommender.default_k(), 1);

        let table = recommender.recommend(&params(1, 10, None)).unwrap();
        assert_eq!(table.movie_ids(), vec![3]);
    }

    #[test]
    fn test_unknown_user() {
        let recommender = create_test_recommender();
        let err = recommender.recommend(&params(42, 5, None)).unwrap_err();
        assert_eq!(err, RecommendError::UserNotFound { user_id: 42 });

        // n = 0 is answered before the lookup
        assert!(recommender.recommend(&params(42, 0, None)).unwrap().is_empty());
    }

    #[test]
    fn test_user_with_no_overlap_gets_nothing() {
        let recommender = create_test_recommender();
        let table = recommender.recommend(&params(4, 10, None)).unwrap();
        assert!(table.is_empty());
    }
}
