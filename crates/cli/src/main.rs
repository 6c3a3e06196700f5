use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, UserId};
use rand::seq::IndexedRandom;
use recommenders::{
    CollaborativeParams, ContentParams, EngineConfig, HybridParams, HybridWeights,
    PopularityParams, RankedTable, RecommendRequest, RecommendationEngine, Strategy,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// NextMovie - Movie Recommendation Demo
#[derive(Parser)]
#[command(name = "next-movie")]
#[command(about = "Popularity, content, collaborative and hybrid movie recommendations", long_about = None)]
struct Cli {
    /// Directory holding movies.csv and ratings.csv
    #[arg(short, long, default_value = "data/raw")]
    data_dir: PathBuf,

    /// Movies file (overrides <data-dir>/movies.csv)
    #[arg(long)]
    movies: Option<PathBuf>,

    /// Ratings file (overrides <data-dir>/ratings.csv)
    #[arg(long)]
    ratings: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Best-rated movies, optionally within one genre
    Popularity {
        /// Exact genre tag, e.g. "Comedy" (all genres when omitted)
        #[arg(long)]
        genre: Option<String>,

        /// Minimum number of ratings a movie needs
        #[arg(long, default_value = "50", allow_negative_numbers = true)]
        min_reviews: i64,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Movies whose genres are most similar to a given movie
    Similar {
        /// Movie title, with or without the "(YYYY)" suffix
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Predictions from users with similar taste
    Collaborative {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "10")]
        limit: usize,

        /// Number of neighbours to use (default: 100)
        #[arg(long)]
        neighbors: Option<usize>,
    },

    /// Collaborative predictions blended with average rating
    Hybrid {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "10")]
        limit: usize,

        /// Weight of the collaborative score (default: 0.6)
        #[arg(long, allow_negative_numbers = true)]
        collaborative_weight: Option<f64>,

        /// Weight of the average-rating score (default: 0.4)
        #[arg(long, allow_negative_numbers = true)]
        popularity_weight: Option<f64>,
    },

    /// Dataset summary statistics
    Summary,

    /// List every genre tag
    Genres,

    /// Search for movies by title
    Search {
        /// Case-insensitive title or name fragment
        #[arg(long)]
        title: String,
    },

    /// Fire concurrent collaborative requests for random users
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let movies_path = cli
        .movies
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("movies.csv"));
    let ratings_path = cli
        .ratings
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("ratings.csv"));

    // Load data index
    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_files(&movies_path, &ratings_path).with_context(|| {
            format!(
                "Failed to load dataset from {} and {}",
                movies_path.display(),
                ratings_path.display()
            )
        })?,
    );
    if !cli.json {
        println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    }

    let engine = Arc::new(RecommendationEngine::with_config(
        data_index.clone(),
        EngineConfig::default(),
    ));

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Popularity {
            genre,
            min_reviews,
            limit,
        } => {
            let request = RecommendRequest::Popularity(PopularityParams {
                genre,
                min_reviews,
                n: limit,
            });
            handle_recommend(&engine, &request, cli.json)?
        }
        Commands::Similar { title, limit } => {
            let request = RecommendRequest::Content(ContentParams { title, n: limit });
            handle_recommend(&engine, &request, cli.json)?
        }
        Commands::Collaborative {
            user_id,
            limit,
            neighbors,
        } => {
            let request = RecommendRequest::Collaborative(CollaborativeParams {
                user_id,
                n: limit,
                k: neighbors,
            });
            handle_recommend(&engine, &request, cli.json)?
        }
        Commands::Hybrid {
            user_id,
            limit,
            collaborative_weight,
            popularity_weight,
        } => {
            let defaults = engine.config().hybrid_weights;
            let weights = HybridWeights::new(
                collaborative_weight.unwrap_or(defaults.collaborative),
                popularity_weight.unwrap_or(defaults.popularity),
            );
            let request = RecommendRequest::Hybrid(HybridParams {
                user_id,
                n: limit,
                weights,
            });
            handle_recommend(&engine, &request, cli.json)?
        }
        Commands::Summary => handle_summary(&data_index, cli.json)?,
        Commands::Genres => handle_genres(&data_index, cli.json)?,
        Commands::Search { title } => handle_search(&data_index, &title, cli.json)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(engine, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the four recommendation commands
fn handle_recommend(
    engine: &RecommendationEngine,
    request: &RecommendRequest,
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let table = engine.recommend(request)?;
    info!(
        "{:?} returned {} rows in {:?}",
        table.strategy,
        table.len(),
        start.elapsed()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print_table(&table);
    }
    Ok(())
}

/// Handle the 'summary' command
fn handle_summary(data_index: &DataIndex, json: bool) -> Result<()> {
    let summary = data_index.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let fmt_opt = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.2}", v));

    println!("{}", "Dataset Summary".bold().blue());
    println!("{}Movies: {}", "• ".green(), summary.total_movies);
    println!("{}Users: {}", "• ".green(), summary.total_users);
    println!("{}Ratings: {}", "• ".green(), summary.total_ratings);
    println!("{}Genres: {}", "• ".green(), summary.unique_genres);
    println!(
        "{}Average rating: {}",
        "• ".cyan(),
        fmt_opt(summary.average_rating)
    );
    println!(
        "{}Rating range: {} - {}",
        "• ".cyan(),
        fmt_opt(summary.min_rating.map(f64::from)),
        fmt_opt(summary.max_rating.map(f64::from))
    );
    println!(
        "{}Sparsity: {:.3}%",
        "• ".cyan(),
        summary.sparsity_percent
    );
    Ok(())
}

/// Handle the 'genres' command
fn handle_genres(data_index: &DataIndex, json: bool) -> Result<()> {
    let genres = data_index.genres();
    if json {
        println!("{}", serde_json::to_string_pretty(&genres)?);
        return Ok(());
    }

    println!("{}", "Genres:".bold().blue());
    for genre in genres {
        println!(
            "  {} ({} movies)",
            genre,
            data_index.get_movies_by_genre(genre).len()
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(data_index: &DataIndex, title: &str, json: bool) -> Result<()> {
    let matches = data_index.search_titles(title);
    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  {}", "No movies found".yellow());
    }
    for movie in matches.iter().take(20) {
        let stats = data_index.movie_stats_or_default(movie.id);
        println!(
            "{}: {} [{}] avg {} ({} ratings)",
            movie.id.to_string().green(),
            movie.title,
            movie.genres.join(", "),
            stats.avg_rating.map_or("-".to_string(), |a| format!("{:.2}", a)),
            stats.num_ratings
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    engine: Arc<RecommendationEngine>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let candidates = engine.data_index().user_ids();
    if candidates.is_empty() {
        bail!("Dataset has no ratings, nothing to benchmark");
    }

    let user_ids: Vec<UserId> = {
        let mut rng = rand::rng();
        (0..requests)
            .filter_map(|_| candidates.choose(&mut rng).copied())
            .collect()
    };

    // Build the rating matrix up front so it isn't charged to one request
    let warmup = Instant::now();
    {
        let engine = engine.clone();
        tokio::task::spawn_blocking(move || {
            engine.collaborative();
        })
        .await?;
    }
    info!("Engine warm-up took {:?}", warmup.elapsed());

    let limiter = Arc::new(Semaphore::new(concurrent.max(1)));
    let started = Instant::now();

    let mut handles = vec![];
    for user_id in user_ids {
        let engine = engine.clone();
        let permit = limiter.clone().acquire_owned().await?;
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let start = Instant::now();
            let request = RecommendRequest::Collaborative(CollaborativeParams {
                user_id,
                n: 20,
                k: None,
            });
            engine.recommend(&request).map(|_| start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    let mut errors = 0usize;
    for handle in handles {
        match handle.await? {
            Ok(elapsed) => timings.push(elapsed),
            Err(e) => {
                warn!("Request failed: {}", e);
                errors += 1;
            }
        }
    }
    let wall_time = started.elapsed();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} failed)", requests, errors);
    println!("Concurrency: {}", concurrent.max(1));
    println!("Total time: {:?}", wall_time);

    if timings.is_empty() {
        println!("{}", "No successful requests".yellow());
        return Ok(());
    }

    timings.sort();
    let total: Duration = timings.iter().sum();
    println!("Average latency: {:?}", total / timings.len() as u32);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!(
        "Throughput: {:.2} requests/second",
        timings.len() as f64 / wall_time.as_secs_f64()
    );

    Ok(())
}

/// Nearest-rank percentile of a sorted, non-empty slice
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let idx = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Helper function to format and print a ranked table
fn print_table(table: &RankedTable) {
    let title = match table.strategy {
        Strategy::Popularity => "Most Popular Movies",
        Strategy::ContentBased => "Similar Movies",
        Strategy::Collaborative => "Recommended For You",
        Strategy::Hybrid => "Hybrid Recommendations",
    };
    println!("{}", title.bold().blue());

    if table.is_empty() {
        println!("  {}", "No recommendations".yellow());
        return;
    }

    for row in &table.rows {
        let year = row.year.map_or("----".to_string(), |y| y.to_string());
        let avg = row
            .avg_rating
            .map_or("-".to_string(), |a| format!("{:.2}", a));
        let score = row
            .score
            .map(|s| format!(" - Score: {:.3}", s))
            .unwrap_or_default();
        println!(
            "{:>3}. {} ({}) [{}] avg {} ({} ratings){}",
            row.rank.to_string().green(),
            row.name.bold(),
            year,
            row.genres.join(", "),
            avg,
            row.num_ratings,
            score
        );
    }
}
