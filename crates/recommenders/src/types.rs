//! Shared request and result types.
//!
//! Every strategy answers with the same `RankedTable`, built by
//! `RankedTable::assemble`, so rows always carry the same fields.

use crate::error::{RecommendError, Result};
use data_loader::{DataIndex, MovieId, UserId};
use serde::{Deserialize, Serialize};

/// Which strategy produced a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Popularity,
    ContentBased,
    Collaborative,
    Hybrid,
}

/// One ranked row of a recommendation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    /// 1-based position
    pub rank: usize,
    pub movie_id: MovieId,
    pub name: String,
    pub year: Option<u16>,
    pub genres: Vec<String>,
    pub avg_rating: Option<f64>,
    pub num_ratings: u32,
    /// Strategy-specific score: similarity, predicted rating or blended
    /// score. Popularity leaves it empty since `avg_rating` is its key.
    pub score: Option<f64>,
}

/// Ordered result of one recommendation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTable {
    pub strategy: Strategy,
    pub rows: Vec<RecommendationRow>,
}

impl RankedTable {
    pub fn empty(strategy: Strategy) -> Self {
        Self {
            strategy,
            rows: Vec::new(),
        }
    }

    /// Build rows from already-ranked `(movie_id, score)` pairs
    ///
    /// Ids missing from the movies table are skipped; ranks are assigned
    /// after skipping so they stay contiguous.
    pub(crate) fn assemble<I>(strategy: Strategy, index: &DataIndex, ranked: I) -> Self
    where
        I: IntoIterator<Item = (MovieId, Option<f64>)>,
    {
        let rows = ranked
            .into_iter()
            .filter_map(|(movie_id, score)| {
                let movie = index.get_movie(movie_id)?;
                let stats = index.movie_stats_or_default(movie_id);
                Some((movie, stats, score))
            })
            .enumerate()
            .map(|(i, (movie, stats, score))| RecommendationRow {
                rank: i + 1,
                movie_id: movie.id,
                name: movie.name.clone(),
                year: movie.year,
                genres: movie.genres.clone(),
                avg_rating: stats.avg_rating,
                num_ratings: stats.num_ratings,
                score,
            })
            .collect();

        Self { strategy, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Movie ids in rank order
    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.rows.iter().map(|row| row.movie_id).collect()
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Parameters for the popularity strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularityParams {
    /// Exact, case-sensitive genre tag; `None` ranks every genre
    pub genre: Option<String>,
    /// Minimum number of ratings; zero or negative means no floor
    pub min_reviews: i64,
    pub n: usize,
}

/// Parameters for the content-based strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentParams {
    /// Clean name or full title with "(YYYY)"
    pub title: String,
    pub n: usize,
}

/// Parameters for the collaborative filtering strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborativeParams {
    pub user_id: UserId,
    pub n: usize,
    /// Neighbour count; falls back to the recommender's default (100)
    pub k: Option<usize>,
}

/// Parameters for the hybrid strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridParams {
    pub user_id: UserId,
    pub n: usize,
    pub weights: HybridWeights,
}

/// Blend weights for the hybrid strategy
///
/// They do not have to sum to 1; only their ratio matters for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    pub collaborative: f64,
    pub popularity: f64,
}

impl HybridWeights {
    pub fn new(collaborative: f64, popularity: f64) -> Self {
        Self {
            collaborative,
            popularity,
        }
    }

    /// Reject negative or non-finite weights
    pub fn validate(&self) -> Result<()> {
        for (component, value) in [
            ("collaborative", self.collaborative),
            ("popularity", self.popularity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RecommendError::InvalidWeight { component, value });
            }
        }
        Ok(())
    }
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            collaborative: 0.6,
            popularity: 0.4,
        }
    }
}
