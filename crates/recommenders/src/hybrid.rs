//! Hybrid Recommender - Collaborative Predictions Blended with Popularity
//!
//! ## Algorithm
//! 1. Candidate pool: every movie with a collaborative prediction for the
//!    user, using the full neighbour pool rather than a top-`n` cut
//! 2. Popularity score: the candidate's average rating
//! 3. Min-max normalise both scores over the pool
//! 4. `final = w_collab × collab + w_pop × pop`
//! 5. Rank by final score and return the top `n`
//!
//! Final-score ties follow the component that produced them. While the
//! popularity weight is positive they go to the movie with more ratings,
//! as in `PopularityRecommender`; the movie id decides the rest. With
//! weights `{1, 0}` the order is the collaborative order and with `{0, 1}`
//! it is the popularity order over the same candidates.

use crate::collaborative::CollaborativeRecommender;
use crate::config::DEFAULT_K_NEIGHBORS;
use crate::error::Result;
use crate::similarity::min_max_normalize;
use crate::traits::Recommender;
use crate::types::{HybridParams, RankedTable, Strategy};
use data_loader::{DataIndex, MovieId, MovieStats};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct HybridRecommender {
    data_index: Arc<DataIndex>,
    collaborative: Arc<CollaborativeRecommender>,
    /// Neighbour pool the candidates are drawn from
    k_neighbors: usize,
}

impl HybridRecommender {
    pub fn new(data_index: Arc<DataIndex>, collaborative: Arc<CollaborativeRecommender>) -> Self {
        Self {
            data_index,
            collaborative,
            k_neighbors: DEFAULT_K_NEIGHBORS,
        }
    }

    /// Configure the neighbour pool size (default: 100)
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k;
        self
    }
}

impl Recommender for HybridRecommender {
    type Params = HybridParams;

    fn name(&self) -> &str {
        "HybridRecommender"
    }

    fn strategy(&self) -> Strategy {
        Strategy::Hybrid
    }

    #[instrument(skip(self, params), fields(user_id = params.user_id, n = params.n))]
    fn recommend(&self, params: &HybridParams) -> Result<RankedTable> {
        if params.n == 0 {
            return Ok(RankedTable::empty(Strategy::Hybrid));
        }
        params.weights.validate()?;

        let candidates = self
            .collaborative
            .predict_unrated(params.user_id, self.k_neighbors)?;
        debug!("Blending {} candidates", candidates.len());

        let stats: Vec<MovieStats> = candidates
            .iter()
            .map(|&(id, _)| self.data_index.movie_stats_or_default(id))
            .collect();

        let collab_raw: Vec<f64> = candidates.iter().map(|&(_, p)| p).collect();
        let pop_raw: Vec<f64> = stats.iter().map(|s| s.avg_rating.unwrap_or(0.0)).collect();

        let collab = min_max_normalize(&collab_raw);
        let pop = min_max_normalize(&pop_raw);

        let weights = params.weights;
        let mut blended: Vec<(MovieId, f64, u32)> = candidates
            .iter()
            .zip(&stats)
            .zip(collab.iter().zip(&pop))
            .map(|((&(id, _), s), (&c, &p))| {
                let score = weights.collaborative * c + weights.popularity * p;
                (id, score, s.num_ratings)
            })
            .collect();

        let count_breaks_ties = weights.popularity > 0.0;
        blended.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| {
                    if count_breaks_ties {
                        b.2.cmp(&a.2)
                    } else {
                        Ordering::Equal
                    }
                })
                .then_with(|| a.0.cmp(&b.0))
        });
        blended.truncate(params.n);

        Ok(RankedTable::assemble(
            Strategy::Hybrid,
            &self.data_index,
            blended.into_iter().map(|(id, score, _)| (id, Some(score))),
        ))
    }
}
