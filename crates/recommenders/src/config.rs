//! Engine-wide tuning knobs.

use crate::types::HybridWeights;

/// Neighbour count used when a collaborative call doesn't set one
pub const DEFAULT_K_NEIGHBORS: usize = 100;

/// Configuration shared by the strategies behind `RecommendationEngine`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Default neighbour set size for collaborative filtering, and the
    /// neighbour pool the hybrid strategy draws candidates from
    pub k_neighbors: usize,
    /// Weights used by callers that don't pass their own
    pub hybrid_weights: HybridWeights,
}

impl EngineConfig {
    /// Configure the neighbour count (default: 100)
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k;
        self
    }

    /// Configure the default hybrid weights (default: 0.6 / 0.4)
    pub fn with_hybrid_weights(mut self, weights: HybridWeights) -> Self {
        self.hybrid_weights = weights;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
            hybrid_weights: HybridWeights::default(),
        }
    }
}
