//! Core domain types for the movies/ratings tables.
//!
//! Key points:
//! - Type aliases keep user IDs and movie IDs apart at the call site
//! - `Movie` carries the title already split into `name` and `year`
//! - `DataIndex` owns everything; callers borrow from it
//! - Movies live in a `BTreeMap`, so iteration is always in `movie_id` order

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// Lowest rating value accepted by validation
pub const MIN_RATING: f32 = 0.5;

/// Highest rating value accepted by validation
pub const MAX_RATING: f32 = 5.0;

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Raw title exactly as read, e.g. "Toy Story (1995)"
    pub title: String,
    /// Title without the trailing year suffix, e.g. "Toy Story"
    pub name: String,
    /// Year extracted from a trailing "(YYYY)", if there was one
    pub year: Option<u16>,
    /// Ordered, de-duplicated genre tags
    ///
    /// Empty when the source row says "(no genres listed)".
    pub genres: Vec<String>,
}

impl Movie {
    /// Exact, case-sensitive tag match
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// Represents a single rating from a user for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0
    pub rating: f32,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Per-movie rating statistics
///
/// Computed once when the index is built. A movie nobody rated has
/// `avg_rating: None` and `num_ratings: 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieStats {
    pub avg_rating: Option<f64>,
    pub num_ratings: u32,
    /// Sample standard deviation, `None` below two ratings
    pub rating_std: Option<f64>,
}

/// Dataset-wide numbers shown by the `summary` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_movies: usize,
    pub total_users: usize,
    pub total_ratings: usize,
    pub average_rating: Option<f64>,
    pub min_rating: Option<f32>,
    pub max_rating: Option<f32>,
    pub unique_genres: usize,
    /// ratings / (movies * users) * 100
    pub sparsity_percent: f64,
}

// =============================================================================
// DataIndex - The Prepared Tables
// =============================================================================

/// Main data structure that holds all data and indices.
///
/// Built once per process run and treated as read-only afterwards. The
/// recommenders share it behind an `Arc` and never mutate it.
#[derive(Debug)]
pub struct DataIndex {
    // Primary data stores
    pub(crate) movies: BTreeMap<MovieId, Movie>,
    pub(crate) ratings: Vec<Rating>,

    // Rating indices for fast lookups
    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    // Secondary indices
    /// Movies grouped by genre tag (one movie can appear in multiple lists)
    pub(crate) genre_index: BTreeMap<String, Vec<MovieId>>,
    /// Movies grouped by release year
    pub(crate) year_index: BTreeMap<u16, Vec<MovieId>>,

    // Precomputed statistics
    pub(crate) movie_stats: HashMap<MovieId, MovieStats>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self {
            movies: BTreeMap::new(),
            ratings: Vec::new(),
            user_ratings: HashMap::new(),
            movie_ratings: HashMap::new(),
            genre_index: BTreeMap::new(),
            year_index: BTreeMap::new(),
            movie_stats: HashMap::new(),
        }
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All movies in ascending `movie_id` order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// Every rating in file order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if the user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct user IDs in ascending order
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get all movies tagged with a genre, in `movie_id` order
    pub fn get_movies_by_genre(&self, genre: &str) -> &[MovieId] {
        self.genre_index
            .get(genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all movies released in a specific year
    pub fn get_movies_by_year(&self, year: u16) -> &[MovieId] {
        self.year_index
            .get(&year)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Sorted list of distinct genre tags
    pub fn genres(&self) -> Vec<&str> {
        self.genre_index.keys().map(|g| g.as_str()).collect()
    }

    /// Get precomputed statistics for a movie
    pub fn get_movie_stats(&self, movie_id: MovieId) -> Option<&MovieStats> {
        self.movie_stats.get(&movie_id)
    }

    /// Statistics for a movie, zeroed when it has none
    pub fn movie_stats_or_default(&self, movie_id: MovieId) -> MovieStats {
        self.movie_stats
            .get(&movie_id)
            .copied()
            .unwrap_or_default()
    }

    /// Insert a movie into the index
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating and update indices
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);

        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);

        self.movie_ratings
            .entry(rating.movie_id)
            .or_default()
            .push(rating);
    }

    /// Get (users, movies, ratings) counts
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.user_ratings.len(), self.movies.len(), self.ratings.len())
    }
}

impl Default for DataIndex {
    fn default() -> Self {
        Self::new()
    }
}
