//! Errors returned by the recommendation strategies.
//!
//! All three are recoverable: the caller re-prompts for a different
//! title, user or weight. Empty or short result tables are not errors.

use data_loader::UserId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Content-based lookup found no movie for the given title
    #[error("Movie '{query}' not found")]
    MovieNotFound { query: String },

    /// The user has no ratings, so there is nothing to compare against
    #[error("User {user_id} not found")]
    UserNotFound { user_id: UserId },

    /// Hybrid weights must be finite and non-negative
    #[error("Invalid {component} weight {value}: weights must be finite and non-negative")]
    InvalidWeight { component: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
