//! # Data Loader Crate
//!
//! Loads a MovieLens-style CSV pair (movies.csv, ratings.csv) and prepares
//! the tables every recommender reads from.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, MovieStats, DataIndex)
//! - **parser**: Parse the CSV files and split titles into name/year
//! - **index**: Build indices, per-movie statistics and the dataset summary
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_dir(Path::new("data/raw"))?;
//!
//! let movie = index.get_movie(1).unwrap();
//! let stats = index.movie_stats_or_default(1);
//! println!("{} ({:?}) avg {:?}", movie.name, movie.year, stats.avg_rating);
//! ```
//!
//! The prepared index is immutable once built. Share it with `Arc` and
//! read from as many threads as needed.

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::split_title_year;
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    DataIndex,
    DataSummary,
    Movie,
    MovieStats,
    Rating,
    // Bounds
    MAX_RATING,
    MIN_RATING,
};
