use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::Level;
use treemetry_core::{run, RunOptions, RunParameters};
use treemetry_imagery::{EarthEngineClient, ImageryConfig, DEFAULT_CREDENTIALS_PATH};

/// Retrieve satellite-derived tree metrics for a CSV of GPS coordinates.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// CSV file with the tree GPS coordinates.
    #[arg(long, default_value = "data/input/gps_example.csv")]
    input: PathBuf,

    /// Where to write the enriched CSV.
    #[arg(long, default_value = "data/output/tree_metrics.csv")]
    output: PathBuf,

    /// Plantation date of the trees (ISO date).
    #[arg(long, default_value = "2023-09-15")]
    plantation_date: NaiveDate,

    /// Height of the trees at plantation, meters.
    #[arg(long, default_value_t = 2.0)]
    initial_height: f64,

    /// Project developer name, copied into every output row.
    #[arg(long, default_value = "EcoTree Solution")]
    project_developer: String,

    /// Species of the trees.
    #[arg(long, default_value = "Paulownia")]
    species: String,

    /// Coordinates per imagery service request.
    #[arg(long, default_value_t = 1000)]
    batch_size: usize,

    /// How far back to search for usable imagery, in days.
    #[arg(long, default_value_t = 365)]
    window_days: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let project = std::env::var("TREEMETRY_EE_PROJECT")
        .context("TREEMETRY_EE_PROJECT not set; it names the imagery service project")?;
    let credentials_path = match std::env::var("TREEMETRY_CREDENTIALS") {
        Ok(path) => PathBuf::from(path),
        Err(_) => {
            let home = std::env::var("HOME").context("neither TREEMETRY_CREDENTIALS nor HOME is set")?;
            PathBuf::from(home).join(DEFAULT_CREDENTIALS_PATH)
        }
    };

    let mut config = ImageryConfig {
        project,
        credentials_path,
        ..ImageryConfig::default()
    };
    if let Ok(endpoint) = std::env::var("TREEMETRY_EE_ENDPOINT") {
        config.endpoint = endpoint;
    }

    let client = EarthEngineClient::new(config)?;

    let params = RunParameters {
        plantation_date: cli.plantation_date,
        initial_height_m: cli.initial_height,
        project_developer: cli.project_developer,
        species: cli.species,
    };
    let options = RunOptions {
        batch_size: cli.batch_size,
        window_days: cli.window_days,
        reference_date: Utc::now().date_naive(),
    };

    println!(
        "Retrieving tree metrics for {} -> {}",
        cli.input.display(),
        cli.output.display()
    );
    let summary = run(&client, &params, &cli.input, &cli.output, &options).await?;

    println!("\n--- Run Summary ---");
    println!("  Total records:        {}", summary.total);
    println!("  ✅ Enriched:          {}", summary.enriched);
    println!("  ⚠️  No imagery:        {}", summary.no_imagery);
    println!("  ⚠️  Failed lookups:    {}", summary.failed);

    Ok(())
}
