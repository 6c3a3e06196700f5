use anyhow::Context;
use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let data_dir = Path::new("data/raw");

    println!("Loading movies.csv / ratings.csv...\n");

    let start = Instant::now();
    let index = DataIndex::load_from_dir(data_dir)
        .with_context(|| format!("Failed to load dataset from {}", data_dir.display()))?;
    let elapsed = start.elapsed();

    let (users, movies, ratings) = index.counts();
    let summary = index.summary();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Movies: {}", movies);
    println!("Ratings: {}", ratings);
    println!("Genres: {}", summary.unique_genres);
    println!("Sparsity: {:.3}%", summary.sparsity_percent);
    println!("\nPerformance: {:.0} ratings/second",
             ratings as f64 / elapsed.as_secs_f64());
    Ok(())
}
