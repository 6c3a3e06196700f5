//! Parser for the MovieLens-style CSV files.
//!
//! - movies.csv: movieId,title,genres
//! - ratings.csv: userId,movieId,rating,timestamp
//!
//! Columns are located by header name, so their order is free and extra
//! columns are ignored. Titles are split into name/year here and nowhere
//! else.

use crate::error::{DataLoadError, Result};
use crate::types::{Movie, MovieId, Rating, UserId};
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// MovieLens sentinel for a movie without genre tags
const NO_GENRES: &str = "(no genres listed)";

const MOVIE_COLUMNS: [&str; 3] = ["movieId", "title", "genres"];
const RATING_COLUMNS: [&str; 4] = ["userId", "movieId", "rating", "timestamp"];

/// Open a data file, mapping any failure to `DataNotFound`
fn open_data_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DataLoadError::DataNotFound {
        path: path.display().to_string(),
        source,
    })
}

/// Short name used in error messages ("movies.csv" rather than a full path)
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Header cells sometimes carry whitespace, a BOM or stray quotes
fn clean_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
}

/// Find the position of every required column in the header row
fn locate_columns(headers: &csv::StringRecord, required: &[&str], file: &str) -> Result<Vec<usize>> {
    required
        .iter()
        .map(|&column| {
            headers
                .iter()
                .position(|header| clean_header(header) == column)
                .ok_or_else(|| DataLoadError::Schema {
                    file: file.to_string(),
                    column: column.to_string(),
                })
        })
        .collect()
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Parse one numeric field, reporting file/line/column on failure
fn parse_field<T>(record: &csv::StringRecord, idx: usize, column: &str, file: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = record.get(idx).unwrap_or_default().trim();
    raw.parse().map_err(|e| DataLoadError::Parse {
        file: file.to_string(),
        line: line_of(record),
        reason: format!("Invalid {} '{}': {}", column, raw, e),
    })
}

/// Split a raw title into (name, year)
///
/// Example: "Toy Story (1995)" -> ("Toy Story", Some(1995))
///          "Fargo"            -> ("Fargo", None)
///
/// Only a trailing "(YYYY)" with exactly four digits counts. A title
/// without that suffix comes back untouched.
pub fn split_title_year(title: &str) -> (String, Option<u16>) {
    match year_suffix(title) {
        Some((name, year)) => (name.to_string(), Some(year)),
        None => (title.to_string(), None),
    }
}

fn year_suffix(title: &str) -> Option<(&str, u16)> {
    let body = title.trim_end().strip_suffix(')')?;
    let open = body.len().checked_sub(5)?;
    let digits = body.get(open..)?.strip_prefix('(')?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = digits.parse().ok()?;
    Some((body.get(..open)?.trim_end(), year))
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> ["Action", "Adventure", "Sci-Fi"]
///
/// Duplicates are dropped (first occurrence wins) and the
/// "(no genres listed)" sentinel yields an empty list.
pub fn parse_genres(raw: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for tag in raw.split('|').map(str::trim) {
        if tag.is_empty() || tag == NO_GENRES || genres.iter().any(|g| g == tag) {
            continue;
        }
        genres.push(tag.to_string());
    }
    genres
}

/// Parse the movies table from any reader
pub fn read_movies<R: Read>(reader: R, file: &str) -> Result<Vec<Movie>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let cols = locate_columns(&headers, &MOVIE_COLUMNS, file)?;

    let mut movies = Vec::new();
    for result in reader.records() {
        let record = result?;

        let id: MovieId = parse_field(&record, cols[0], "movieId", file)?;
        let title = record.get(cols[1]).unwrap_or_default();
        let (name, year) = split_title_year(title);
        let genres = parse_genres(record.get(cols[2]).unwrap_or_default());

        movies.push(Movie {
            id,
            title: title.to_string(),
            name,
            year,
            genres,
        });
    }
    Ok(movies)
}

/// Parse the ratings table from any reader
pub fn read_ratings<R: Read>(reader: R, file: &str) -> Result<Vec<Rating>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let cols = locate_columns(&headers, &RATING_COLUMNS, file)?;

    let mut ratings = Vec::new();
    for result in reader.records() {
        let record = result?;

        let user_id: UserId = parse_field(&record, cols[0], "userId", file)?;
        let movie_id: MovieId = parse_field(&record, cols[1], "movieId", file)?;
        let rating: f32 = parse_field(&record, cols[2], "rating", file)?;
        let timestamp: i64 = parse_field(&record, cols[3], "timestamp", file)?;

        ratings.push(Rating {
            user_id,
            movie_id,
            rating,
            timestamp,
        });
    }
    Ok(ratings)
}

/// Parse the movies.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = open_data_file(path)?;
    read_movies(file, &source_name(path))
}

/// Parse the ratings.csv file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = open_data_file(path)?;
    read_ratings(file, &source_name(path))
}

/// Parse both tables in parallel
pub fn load(movies_path: &Path, ratings_path: &Path) -> Result<(Vec<Movie>, Vec<Rating>)> {
    let (movies, ratings) = rayon::join(
        || parse_movies(movies_path),
        || parse_ratings(ratings_path),
    );
    Ok((movies?, ratings?))
}
