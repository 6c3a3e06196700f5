//! Content-Based Recommender - Movies with Similar Genres
//!
//! ## Algorithm
//! 1. Resolve the query title to one movie (exact name, then substring)
//! 2. Take its TF-IDF genre vector
//! 3. Cosine similarity against every other movie
//! 4. Rank by similarity, ties by movie id, and return the top `n`

use crate::error::{RecommendError, Result};
use crate::similarity::rank_by_score;
use crate::tfidf::GenreTfIdf;
use crate::traits::Recommender;
use crate::types::{ContentParams, RankedTable, Strategy};
use data_loader::{split_title_year, DataIndex, Movie, MovieId};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct ContentRecommender {
    data_index: Arc<DataIndex>,
    model: GenreTfIdf,
}

impl ContentRecommender {
    /// Fit the genre model over every movie in the index
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        let model = GenreTfIdf::fit(data_index.movies());
        debug!("Fitted genre TF-IDF with {} tags", model.vocabulary_len());
        Self { data_index, model }
    }

    pub fn model(&self) -> &GenreTfIdf {
        &self.model
    }

    /// Resolve a user-supplied title to a movie
    ///
    /// A trailing "(YYYY)" is dropped before matching. An exact
    /// case-insensitive name match wins over a substring match; within
    /// either group the lowest movie id wins.
    pub fn find_movie(&self, title: &str) -> Result<&Movie> {
        let (name, _) = split_title_year(title.trim());
        let needle = name.trim().to_lowercase();
        let not_found = || RecommendError::MovieNotFound {
            query: title.to_string(),
        };
        if needle.is_empty() {
            return Err(not_found());
        }

        let exact = self
            .data_index
            .movies()
            .find(|m| m.name.to_lowercase() == needle);
        exact
            .or_else(|| {
                self.data_index
                    .movies()
                    .find(|m| m.name.to_lowercase().contains(&needle))
            })
            .ok_or_else(not_found)
    }
}

impl Recommender for ContentRecommender {
    type Params = ContentParams;

    fn name(&self) -> &str {
        "ContentRecommender"
    }

    fn strategy(&self) -> Strategy {
        Strategy::ContentBased
    }

    #[instrument(skip(self, params), fields(title = %params.title, n = params.n))]
    fn recommend(&self, params: &ContentParams) -> Result<RankedTable> {
        if params.n == 0 {
            return Ok(RankedTable::empty(Strategy::ContentBased));
        }

        let query = self.find_movie(&params.title)?;
        debug!("Resolved '{}' to movie {}", params.title, query.id);

        let mut scored: Vec<(MovieId, f64)> = match self.model.vector(query.id) {
            Some(vector) => self
                .model
                .similarities(vector)
                .into_iter()
                .filter(|&(id, _)| id != query.id)
                .collect(),
            None => Vec::new(),
        };

        rank_by_score(&mut scored);
        scored.truncate(params.n);

        Ok(RankedTable::assemble(
            Strategy::ContentBased,
            &self.data_index,
            scored.into_iter().map(|(id, score)| (id, Some(score))),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, title: &str, genres: &[&str]) -> Movie {
        let (name, year) = split_title_year(title);
        Movie {
            id,
            title: title.to_string(),
            name,
            year,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn create_test_recommender() -> ContentRecommender {
        let movies = vec![
            movie(1, "Toy Story (1995)", &["Adventure", "Animation", "Children", "Comedy", "Fantasy"]),
            movie(2, "Jumanji (1995)", &["Adventure", "Children", "Fantasy"]),
            movie(3, "Heat (1995)", &["Action", "Crime", "Thriller"]),
            movie(4, "Toy Story 2 (1999)", &["Adventure", "Animation", "Children", "Comedy", "Fantasy"]),
            movie(5, "Empty (2001)", &[]),
            movie(6, "Antz (1998)", &["Adventure", "Animation", "Children", "Comedy", "Fantasy"]),
        ];
        let index = DataIndex::from_records(movies, Vec::new()).unwrap();
        ContentRecommender::new(Arc::new(index))
    }

    fn params(title: &str, n: usize) -> ContentParams {
        ContentParams {
            title: title.to_string(),
            n,
        }
    }

    #[test]
    fn test_find_movie_exact_before_substring() {
        let recommender = create_test_recommender();

        assert_eq!(recommender.find_movie("toy story").unwrap().id, 1);
        assert_eq!(recommender.find_movie("Toy Story 2 (1999)").unwrap().id, 4);
        assert_eq!(recommender.find_movie("  JUMANJI (1995) ").unwrap().id, 2);
        // Substring: first by movie id
        assert_eq!(recommender.find_movie("toy").unwrap().id, 1);
        assert_eq!(recommender.find_movie("story 2").unwrap().id, 4);
    }

    #[test]
    fn test_find_movie_not_found() {
        let recommender = create_test_recommender();

        let err = recommender.find_movie("Casablanca").unwrap_err();
        assert_eq!(
            err,
            RecommendError::MovieNotFound {
                query: "Casablanca".to_string()
            }
        );
        assert!(recommender.find_movie("   ").is_err());
        assert!(recommender.find_movie("(1995)").is_err());
    }

    #[test]
    fn test_identical_genres_score_exactly_one() {
        let recommender = create_test_recommender();
        let table = recommender.recommend(&params("Toy Story", 10)).unwrap();

        assert_eq!(table.strategy, Strategy::ContentBased);
        assert!(!table.movie_ids().contains(&1));
        assert_eq!(table.movie_ids()[..3], [4, 6, 2]);
        assert_eq!(table.rows[0].score, Some(1.0));
        assert_eq!(table.rows[1].score, Some(1.0));
        assert!(table.rows[2].score.unwrap() < 1.0);
    }

    #[test]
    fn test_zero_vectors_score_zero() {
        let recommender = create_test_recommender();
        let table = recommender.recommend(&params("Empty", 10)).unwrap();

        assert_eq!(table.movie_ids(), vec![1, 2, 3, 4, 6]);
        assert!(table.rows.iter().all(|r| r.score == Some(0.0)));
    }

    #[test]
    fn test_n_limits_and_zero() {
        let recommender = create_test_recommender();

        assert_eq!(recommender.recommend(&params("Heat", 2)).unwrap().len(), 2);
        assert!(recommender.recommend(&params("Heat", 0)).unwrap().is_empty());
        // n = 0 never reaches the lookup
        assert!(recommender.recommend(&params("Casablanca", 0)).unwrap().is_empty());
    }
}
