//! The capability every recommendation strategy implements.

use crate::error::Result;
use crate::types::{RankedTable, Strategy};

/// Core trait for recommendation strategies.
///
/// ## Design Note
/// - `Send + Sync` so one instance can serve concurrent callers
/// - `recommend` takes `&self`: a call never mutates the prepared tables
/// - Each strategy declares its own parameter type
pub trait Recommender: Send + Sync {
    type Params;

    /// Returns the name of this recommender (for logging/debugging)
    fn name(&self) -> &str;

    /// Which `Strategy` tag this recommender stamps on its tables
    fn strategy(&self) -> Strategy;

    /// Produce a ranked table of at most `n` rows.
    ///
    /// # Returns
    /// * `Ok(RankedTable)` - possibly empty, never longer than requested
    /// * `Err` - only for lookup misses and invalid weights
    fn recommend(&self, params: &Self::Params) -> Result<RankedTable>;
}
