//! TF-IDF vectors over genre tags.
//!
//! Each movie is a document whose tokens are its genre tags. Weights use
//! the smoothed idf `ln((1 + N) / (1 + df)) + 1` and every vector is
//! scaled to unit length.

use crate::similarity::{cosine, SparseVector};
use data_loader::{Movie, MovieId};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Fitted genre TF-IDF model
#[derive(Debug, Clone)]
pub struct GenreTfIdf {
    /// Tag -> dimension, in sorted tag order
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per dimension
    idf: Vec<f64>,
    /// Unit-length vector per movie
    vectors: BTreeMap<MovieId, SparseVector>,
}

impl GenreTfIdf {
    /// Fit the model over a movie corpus
    pub fn fit<'a, I>(movies: I) -> Self
    where
        I: IntoIterator<Item = &'a Movie>,
    {
        let movies: Vec<&Movie> = movies.into_iter().collect();

        let mut vocabulary: BTreeMap<String, usize> = movies
            .iter()
            .flat_map(|m| m.genres.iter())
            .map(|g| (g.clone(), 0))
            .collect();
        for (dim, slot) in vocabulary.values_mut().enumerate() {
            *slot = dim;
        }

        // Document frequency: each tag counted once per movie
        let mut doc_freq = vec![0usize; vocabulary.len()];
        for movie in &movies {
            let mut dims: Vec<usize> = movie.genres.iter().map(|g| vocabulary[g]).collect();
            dims.sort_unstable();
            dims.dedup();
            for dim in dims {
                doc_freq[dim] += 1;
            }
        }

        let n = movies.len() as f64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectors = movies
            .iter()
            .map(|movie| {
                let raw = SparseVector::from_entries(
                    movie
                        .genres
                        .iter()
                        .map(|g| {
                            let dim = vocabulary[g];
                            (dim, idf[dim])
                        })
                        .collect(),
                );
                (movie.id, raw.normalized())
            })
            .collect();

        Self {
            vocabulary,
            idf,
            vectors,
        }
    }

    /// Number of distinct genre tags
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Idf weight of one tag, if it occurs anywhere
    pub fn idf(&self, tag: &str) -> Option<f64> {
        self.vocabulary.get(tag).map(|&dim| self.idf[dim])
    }

    /// Unit-length vector of a movie
    pub fn vector(&self, movie_id: MovieId) -> Option<&SparseVector> {
        self.vectors.get(&movie_id)
    }

    /// Cosine similarity of `query` against every movie, in movie id order
    pub fn similarities(&self, query: &SparseVector) -> Vec<(MovieId, f64)> {
        let vectors: Vec<(&MovieId, &SparseVector)> = self.vectors.iter().collect();
        vectors
            .par_iter()
            .map(|&(&movie_id, vector)| (movie_id, cosine(query, vector)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, genres: &[&str]) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            name: format!("Movie {}", id),
            year: None,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn test_idf_weights_rare_tags_higher() {
        let movies = vec![
            movie(1, &["Comedy", "Romance"]),
            movie(2, &["Comedy"]),
            movie(3, &["Comedy", "Drama"]),
        ];
        let model = GenreTfIdf::fit(&movies);

        assert_eq!(model.vocabulary_len(), 3);
        // df(Comedy) = 3 -> ln(4/4) + 1 = 1
        assert!((model.idf("Comedy").unwrap() - 1.0).abs() < 1e-12);
        // df(Romance) = 1 -> ln(4/2) + 1
        assert!((model.idf("Romance").unwrap() - (2.0f64.ln() + 1.0)).abs() < 1e-12);
        assert!(model.idf("Horror").is_none());
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let movies = vec![movie(1, &["Action", "Crime"]), movie(2, &["Action"])];
        let model = GenreTfIdf::fit(&movies);

        for id in [1, 2] {
            let v = model.vector(id).unwrap();
            assert!((v.norm_sq() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_empty_genres_give_zero_vector() {
        let movies = vec![movie(1, &["Action"]), movie(2, &[])];
        let model = GenreTfIdf::fit(&movies);

        let empty = model.vector(2).unwrap();
        assert!(empty.is_zero());

        let sims = model.similarities(empty);
        assert_eq!(sims, vec![(1, 0.0), (2, 0.0)]);
    }

    #[test]
    fn test_similarities_self_is_one() {
        let movies = vec![
            movie(1, &["Animation", "Children", "Comedy"]),
            movie(2, &["Adventure", "Children", "Fantasy"]),
            movie(3, &["Action", "Crime", "Thriller"]),
        ];
        let model = GenreTfIdf::fit(&movies);

        let sims = model.similarities(model.vector(1).unwrap());
        assert_eq!(sims[0], (1, 1.0));
        assert!(sims[1].1 > 0.0 && sims[1].1 < 1.0);
        assert_eq!(sims[2].1, 0.0);
    }
}
