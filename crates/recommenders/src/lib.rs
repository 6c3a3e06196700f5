//! Recommendation strategies over a prepared `DataIndex`.
//!
//! This crate provides:
//! - `PopularityRecommender`: best average rating within a genre
//! - `ContentRecommender`: TF-IDF genre vectors and cosine similarity
//! - `CollaborativeRecommender`: user-based nearest neighbours
//! - `HybridRecommender`: min-max blend of collaborative and popularity scores
//! - `RecommendationEngine`: lazy model building and request dispatch
//!
//! Every strategy returns a `RankedTable` whose order is fully
//! deterministic: scores descending, ties broken by id.
//!
//! ## Example Usage
//! ```ignore
//! use recommenders::{RecommendationEngine, RecommendRequest, PopularityParams};
//!
//! let engine = RecommendationEngine::new(index.clone());
//! let table = engine.recommend(&RecommendRequest::Popularity(PopularityParams {
//!     genre: Some("Comedy".to_string()),
//!     min_reviews: 50,
//!     n: 10,
//! }))?;
//! ```

pub mod collaborative;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod hybrid;
pub mod matrix;
pub mod popularity;
pub mod similarity;
pub mod tfidf;
pub mod traits;
pub mod types;

// Re-export main types
pub use collaborative::CollaborativeRecommender;
pub use config::{EngineConfig, DEFAULT_K_NEIGHBORS};
pub use content::ContentRecommender;
pub use engine::{RecommendRequest, RecommendationEngine};
pub use error::{RecommendError, Result};
pub use hybrid::HybridRecommender;
pub use matrix::RatingMatrix;
pub use popularity::PopularityRecommender;
pub use tfidf::GenreTfIdf;
pub use traits::Recommender;
pub use types::{
    CollaborativeParams, ContentParams, HybridParams, HybridWeights, PopularityParams,
    RankedTable, RecommendationRow, Strategy,
};
