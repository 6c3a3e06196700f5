//! DataIndex building and indexing logic.
//!
//! Turns parsed rows into the prepared tables:
//! - primary indices (movies, ratings by user, ratings by movie)
//! - secondary indices (genre, year)
//! - per-movie statistics (mean, count, sample std)

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

impl DataIndex {
    /// Load the dataset from a directory containing movies.csv and ratings.csv
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        Self::load_from_files(&data_dir.join("movies.csv"), &data_dir.join("ratings.csv"))
    }

    /// Load the dataset from explicit file paths
    ///
    /// Steps:
    /// 1. Parse both files (in parallel)
    /// 2. Build primary and secondary indices
    /// 3. Compute movie statistics
    /// 4. Validate data integrity
    pub fn load_from_files(movies_path: &Path, ratings_path: &Path) -> Result<Self> {
        info!(
            "Loading movies from {:?} and ratings from {:?}",
            movies_path, ratings_path
        );

        let (movies, ratings) = parser::load(movies_path, ratings_path)?;
        info!("Loaded {} movies, {} ratings", movies.len(), ratings.len());

        let index = Self::from_records(movies, ratings)?;

        let (users, movies, ratings) = index.counts();
        info!(
            "DataIndex built: {} users, {} movies, {} ratings",
            users, movies, ratings
        );
        Ok(index)
    }

    /// Build a fully prepared index from already-parsed rows
    ///
    /// A row repeating an earlier `movieId` is dropped (first one wins) and
    /// ratings outside 0.5..=5.0 are skipped. Both are reported with a
    /// count, the rest of the data is loaded.
    pub fn from_records(movies: Vec<Movie>, ratings: Vec<Rating>) -> Result<Self> {
        let mut index = DataIndex::new();

        let mut duplicate_ids = 0usize;
        for movie in movies {
            if index.movies.contains_key(&movie.id) {
                duplicate_ids += 1;
                continue;
            }
            index.insert_movie(movie);
        }
        if duplicate_ids > 0 {
            warn!(
                "{} movie rows repeat an earlier movieId and were dropped",
                duplicate_ids
            );
        }

        let mut out_of_range = 0usize;
        for rating in ratings {
            if !(MIN_RATING..=MAX_RATING).contains(&rating.rating) {
                out_of_range += 1;
                continue;
            }
            index.insert_rating(rating);
        }
        if out_of_range > 0 {
            warn!(
                "{} ratings outside {}..={} were skipped",
                out_of_range, MIN_RATING, MAX_RATING
            );
        }

        index.build_secondary_indices();
        index.compute_movie_stats();
        index.validate()?;
        Ok(index)
    }

    /// Build secondary indices after primary data is loaded
    ///
    /// Movies are visited in id order, so every list in the genre and
    /// year indices is sorted by `movie_id`.
    pub fn build_secondary_indices(&mut self) {
        self.genre_index.clear();
        self.year_index.clear();

        for (movie_id, movie) in &self.movies {
            for genre in &movie.genres {
                self.genre_index
                    .entry(genre.clone())
                    .or_default()
                    .push(*movie_id);
            }

            if let Some(year) = movie.year {
                self.year_index.entry(year).or_default().push(*movie_id);
            }
        }
    }

    /// Compute aggregate statistics for all movies
    ///
    /// Every movie gets an entry. Movies with no ratings keep
    /// `avg_rating: None` so rankers can push them below rated ones.
    /// Ratings for ids missing from the movies table are aggregated too.
    pub fn compute_movie_stats(&mut self) {
        let mut stats: HashMap<MovieId, MovieStats> = self
            .movie_ratings
            .par_iter()
            .map(|(&movie_id, ratings)| (movie_id, summarize(ratings)))
            .collect();

        for &movie_id in self.movies.keys() {
            stats.entry(movie_id).or_default();
        }
        self.movie_stats = stats;
    }

    /// Validate data integrity
    ///
    /// Ratings outside 0.5..=5.0 are an error; `from_records` never lets
    /// one through, so this only fires for indices filled by hand with
    /// `insert_rating`. Ratings that point at unknown movies are only
    /// reported, the rest of the data is usable.
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self
            .ratings
            .iter()
            .find(|r| !(MIN_RATING..=MAX_RATING).contains(&r.rating))
        {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: bad.rating.to_string(),
            });
        }

        let dangling = self
            .ratings
            .iter()
            .filter(|r| !self.movies.contains_key(&r.movie_id))
            .count();
        if dangling > 0 {
            warn!(
                "{} ratings reference movie ids missing from the movies table",
                dangling
            );
        }
        Ok(())
    }

    /// Dataset-wide summary numbers
    pub fn summary(&self) -> DataSummary {
        let (total_users, total_movies, total_ratings) = self.counts();

        let average_rating = if total_ratings > 0 {
            let total: f64 = self.ratings.iter().map(|r| f64::from(r.rating)).sum();
            Some(total / total_ratings as f64)
        } else {
            None
        };
        let min_rating = self.ratings.iter().map(|r| r.rating).reduce(f32::min);
        let max_rating = self.ratings.iter().map(|r| r.rating).reduce(f32::max);

        let cells = total_movies * total_users;
        let sparsity_percent = if cells > 0 {
            total_ratings as f64 / cells as f64 * 100.0
        } else {
            0.0
        };

        DataSummary {
            total_movies,
            total_users,
            total_ratings,
            average_rating,
            min_rating,
            max_rating,
            unique_genres: self.genre_index.len(),
            sparsity_percent,
        }
    }

    /// Case-insensitive title search
    ///
    /// Exact name matches come first, then substring matches on the raw
    /// title; each group is in `movie_id` order.
    pub fn search_titles(&self, query: &str) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        let mut seen = HashSet::new();
        for movie in self.movies.values() {
            if movie.name.to_lowercase() == needle {
                exact.push(movie);
                seen.insert(movie.id);
            }
        }
        for movie in self.movies.values() {
            if !seen.contains(&movie.id) && movie.title.to_lowercase().contains(&needle) {
                partial.push(movie);
            }
        }
        exact.extend(partial);
        exact
    }
}

/// Mean, count and sample standard deviation of one movie's ratings
fn summarize(ratings: &[Rating]) -> MovieStats {
    let num_ratings = ratings.len() as u32;
    if ratings.is_empty() {
        return MovieStats::default();
    }

    let n = ratings.len() as f64;
    let mean = ratings.iter().map(|r| f64::from(r.rating)).sum::<f64>() / n;
    let rating_std = if ratings.len() > 1 {
        let sq: f64 = ratings
            .iter()
            .map(|r| (f64::from(r.rating) - mean).powi(2))
            .sum();
        Some((sq / (n - 1.0)).sqrt())
    } else {
        None
    };

    MovieStats {
        avg_rating: Some(mean),
        num_ratings,
        rating_std,
    }
}
