//! # Recommendation Engine
//!
//! One entry point over the four strategies. The popularity ranker is
//! ready immediately. The TF-IDF model and the rating matrix are built
//! on first use and then shared read-only by every caller.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use data_loader::DataIndex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collaborative::CollaborativeRecommender;
use crate::config::EngineConfig;
use crate::content::ContentRecommender;
use crate::error::Result;
use crate::hybrid::HybridRecommender;
use crate::popularity::PopularityRecommender;
use crate::traits::Recommender;
use crate::types::{
    CollaborativeParams, ContentParams, HybridParams, PopularityParams, RankedTable,
};

/// A request for one of the four strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecommendRequest {
    Popularity(PopularityParams),
    Content(ContentParams),
    Collaborative(CollaborativeParams),
    Hybrid(HybridParams),
}

/// Owns the strategies and routes requests to them
pub struct RecommendationEngine {
    data_index: Arc<DataIndex>,
    config: EngineConfig,
    popularity: PopularityRecommender,
    content: OnceLock<ContentRecommender>,
    collaborative: OnceLock<Arc<CollaborativeRecommender>>,
    hybrid: OnceLock<HybridRecommender>,
}

impl RecommendationEngine {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self::with_config(data_index, EngineConfig::default())
    }

    pub fn with_config(data_index: Arc<DataIndex>, config: EngineConfig) -> Self {
        Self {
            popularity: PopularityRecommender::new(Arc::clone(&data_index)),
            data_index,
            config,
            content: OnceLock::new(),
            collaborative: OnceLock::new(),
            hybrid: OnceLock::new(),
        }
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn popularity(&self) -> &PopularityRecommender {
        &self.popularity
    }

    /// Content recommender, fitting the TF-IDF model on first call
    pub fn content(&self) -> &ContentRecommender {
        self.content.get_or_init(|| {
            let start = Instant::now();
            let recommender = ContentRecommender::new(Arc::clone(&self.data_index));
            info!("Content model ready in {:?}", start.elapsed());
            recommender
        })
    }

    /// Collaborative recommender, building the rating matrix on first call
    pub fn collaborative(&self) -> &Arc<CollaborativeRecommender> {
        self.collaborative.get_or_init(|| {
            let start = Instant::now();
            let recommender = CollaborativeRecommender::new(Arc::clone(&self.data_index))
                .with_k_neighbors(self.config.k_neighbors);
            info!("Rating matrix ready in {:?}", start.elapsed());
            Arc::new(recommender)
        })
    }

    pub fn hybrid(&self) -> &HybridRecommender {
        self.hybrid.get_or_init(|| {
            HybridRecommender::new(
                Arc::clone(&self.data_index),
                Arc::clone(self.collaborative()),
            )
            .with_k_neighbors(self.config.k_neighbors)
        })
    }

    /// Route a request to its strategy
    pub fn recommend(&self, request: &RecommendRequest) -> Result<RankedTable> {
        match request {
            RecommendRequest::Popularity(params) => self.popularity.recommend(params),
            RecommendRequest::Content(params) => self.content().recommend(params),
            RecommendRequest::Collaborative(params) => self.collaborative().recommend(params),
            RecommendRequest::Hybrid(params) => self.hybrid().recommend(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HybridWeights, Strategy};
    use data_loader::{Movie, Rating};

    fn create_test_engine(config: EngineConfig) -> RecommendationEngine {
        let movies = vec![
            Movie {
                id: 1,
                title: "Toy Story (1995)".to_string(),
                name: "Toy Story".to_string(),
                year: Some(1995),
                genres: vec!["Animation".to_string(), "Comedy".to_string()],
            },
            Movie {
                id: 2,
                title: "Jumanji (1995)".to_string(),
                name: "Jumanji".to_string(),
                year: Some(1995),
                genres: vec!["Adventure".to_string(), "Comedy".to_string()],
            },
        ];
        let ratings = vec![
            Rating { user_id: 1, movie_id: 1, rating: 4.0, timestamp: 0 },
            Rating { user_id: 2, movie_id: 1, rating: 4.0, timestamp: 0 },
            Rating { user_id: 2, movie_id: 2, rating: 3.0, timestamp: 0 },
        ];
        let index = DataIndex::from_records(movies, ratings).unwrap();
        RecommendationEngine::with_config(Arc::new(index), config)
    }

    #[test]
    fn test_dispatch_tags_each_strategy() {
        let engine = create_test_engine(EngineConfig::default());

        let requests = [
            RecommendRequest::Popularity(PopularityParams {
                genre: None,
                min_reviews: 0,
                n: 5,
            }),
            RecommendRequest::Content(ContentParams {
                title: "Toy Story".to_string(),
                n: 5,
            }),
            RecommendRequest::Collaborative(CollaborativeParams {
                user_id: 1,
                n: 5,
                k: None,
            }),
            RecommendRequest::Hybrid(HybridParams {
                user_id: 1,
                n: 5,
                weights: HybridWeights::default(),
            }),
        ];
        let strategies: Vec<Strategy> = requests
            .iter()
            .map(|r| engine.recommend(r).unwrap().strategy)
            .collect();

        assert_eq!(
            strategies,
            vec![
                Strategy::Popularity,
                Strategy::ContentBased,
                Strategy::Collaborative,
                Strategy::Hybrid
            ]
        );
    }

    #[test]
    fn test_models_are_built_once() {
        let engine = create_test_engine(EngineConfig::default().with_k_neighbors(7));

        let first = Arc::as_ptr(engine.collaborative());
        let second = Arc::as_ptr(engine.collaborative());
        assert_eq!(first, second);
        assert_eq!(engine.collaborative().default_k(), 7);

        let content_a: *const ContentRecommender = engine.content();
        let content_b: *const ContentRecommender = engine.content();
        assert_eq!(content_a, content_b);
    }

    #[test]
    fn test_collaborative_through_engine() {
        let engine = create_test_engine(EngineConfig::default());
        let table = engine
            .recommend(&RecommendRequest::Collaborative(CollaborativeParams {
                user_id: 1,
                n: 5,
                k: None,
            }))
            .unwrap();

        assert_eq!(table.movie_ids(), vec![2]);
        assert_eq!(table.rows[0].score, Some(3.0));
    }
}
