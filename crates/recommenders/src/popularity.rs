//! Popularity Recommender - Best-Rated Movies in a Genre
//!
//! ## Algorithm
//! 1. Candidate movies: the genre's index list, or every movie when no
//!    genre is given
//! 2. Keep movies with at least `min_reviews` ratings
//! 3. Sort by average rating, then rating count, then movie id
//! 4. Return the top `n`
//!
//! Movies without ratings have no average and sort after every rated
//! movie. They only survive the filter when `min_reviews <= 0`.

use crate::error::Result;
use crate::traits::Recommender;
use crate::types::{PopularityParams, RankedTable, Strategy};
use data_loader::{DataIndex, MovieId, MovieStats};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct PopularityRecommender {
    data_index: Arc<DataIndex>,
}

impl PopularityRecommender {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self { data_index }
    }

    fn candidate_ids(&self, genre: Option<&str>) -> Vec<MovieId> {
        match genre {
            Some(genre) => self.data_index.get_movies_by_genre(genre).to_vec(),
            None => self.data_index.movies().map(|m| m.id).collect(),
        }
    }
}

/// Average rating descending (unrated last), count descending, id ascending
fn popularity_order(a: &(MovieId, MovieStats), b: &(MovieId, MovieStats)) -> Ordering {
    let by_avg = match (a.1.avg_rating, b.1.avg_rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_avg
        .then_with(|| b.1.num_ratings.cmp(&a.1.num_ratings))
        .then_with(|| a.0.cmp(&b.0))
}

impl Recommender for PopularityRecommender {
    type Params = PopularityParams;

    fn name(&self) -> &str {
        "PopularityRecommender"
    }

    fn strategy(&self) -> Strategy {
        Strategy::Popularity
    }

    #[instrument(skip(self, params), fields(genre = ?params.genre, min_reviews = params.min_reviews, n = params.n))]
    fn recommend(&self, params: &PopularityParams) -> Result<RankedTable> {
        if params.n == 0 {
            return Ok(RankedTable::empty(Strategy::Popularity));
        }

        let mut ranked: Vec<(MovieId, MovieStats)> = self
            .candidate_ids(params.genre.as_deref())
            .into_iter()
            .map(|id| (id, self.data_index.movie_stats_or_default(id)))
            .filter(|(_, stats)| i64::from(stats.num_ratings) >= params.min_reviews)
            .collect();

        debug!("{} movies pass the genre and review filters", ranked.len());

        ranked.sort_by(popularity_order);
        ranked.truncate(params.n);

        Ok(RankedTable::assemble(
            Strategy::Popularity,
            &self.data_index,
            ranked.into_iter().map(|(id, _)| (id, None)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Movie, Rating};

    fn movie(id: MovieId, title: &str, genres: &[&str]) -> Movie {
        let (name, year) = data_loader::split_title_year(title);
        Movie {
            id,
            title: title.to_string(),
            name,
            year,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn rating(user_id: u32, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }

    fn create_test_index() -> DataIndex {
        let movies = vec![
            movie(1, "Toy Story (1995)", &["Animation", "Comedy"]),
            movie(2, "Jumanji (1995)", &["Adventure", "Comedy"]),
            movie(3, "Heat (1995)", &["Action", "Crime"]),
            movie(4, "Sabrina (1995)", &["Comedy", "Romance"]),
            movie(5, "Balto (1995)", &["Animation"]),
        ];
        let ratings = vec![
            rating(1, 1, 3.5),
            rating(2, 1, 4.5),
            rating(1, 2, 3.0),
            rating(2, 2, 3.0),
            rating(3, 3, 4.5),
            // Same average as Toy Story, fewer ratings
            rating(3, 5, 4.0),
        ];
        DataIndex::from_records(movies, ratings).unwrap()
    }

    fn recommend(genre: Option<&str>, min_reviews: i64, n: usize) -> RankedTable {
        let recommender = PopularityRecommender::new(Arc::new(create_test_index()));
        recommender
            .recommend(&PopularityParams {
                genre: genre.map(str::to_string),
                min_reviews,
                n,
            })
            .unwrap()
    }

    #[test]
    fn test_genre_and_min_reviews_filter() {
        let table = recommend(Some("Comedy"), 2, 5);

        assert_eq!(table.strategy, Strategy::Popularity);
        assert_eq!(table.movie_ids(), vec![1, 2]);
        assert_eq!(table.rows[0].name, "Toy Story");
        assert_eq!(table.rows[0].year, Some(1995));
        assert_eq!(table.rows[0].avg_rating, Some(4.0));
        assert_eq!(table.rows[0].num_ratings, 2);
        assert_eq!(table.rows[1].avg_rating, Some(3.0));
        assert!(table.rows.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_unrated_movies_sort_last() {
        let table = recommend(Some("Comedy"), 0, 10);
        assert_eq!(table.movie_ids(), vec![1, 2, 4]);
        assert_eq!(table.rows[2].avg_rating, None);
        assert_eq!(table.rows[2].rank, 3);
    }

    #[test]
    fn test_ties_break_on_count_then_id() {
        // Toy Story and Balto both average 4.0; Toy Story has more ratings
        let table = recommend(Some("Animation"), 1, 10);
        assert_eq!(table.movie_ids(), vec![1, 5]);
    }

    #[test]
    fn test_no_genre_ranks_everything() {
        let table = recommend(None, 1, 10);
        assert_eq!(table.movie_ids(), vec![3, 1, 5, 2]);
    }

    #[test]
    fn test_unknown_genre_and_zero_n_are_empty() {
        assert!(recommend(Some("comedy"), 0, 5).is_empty());
        assert!(recommend(Some("Western"), 0, 5).is_empty());
        assert!(recommend(Some("Comedy"), 0, 0).is_empty());
    }

    #[test]
    fn test_truncates_to_n() {
        let table = recommend(None, -3, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].rank, 2);
    }
}
