//! Heatmap CLI
//!
//! Command-line interface for loading, caching and filtering heatmap point data.

mod config;
mod notifier;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heatmap_cache::{FileStore, MemoryStore, TtlCache};
use heatmap_core::notify::Notification;
use heatmap_core::traits::{KeyValueStore, Notifier};
use heatmap_core::{FeatureCollection, HeatmapError};
use heatmap_data::{DataConfig, DataService, LocationSource};
use heatmap_filter::{apply_filters, FilterDimension, FilterState, FilterSummary};

use config::{setup_hint, AppConfig};
use notifier::ConsoleNotifier;

/// Heatmap - load, cache and filter geotagged point data
#[derive(Parser)]
#[command(name = "heatmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a data source and report the number of locations
    Load {
        /// URL or path of a CSV or GeoJSON source (defaults to HEATMAP_DATA_URL)
        source: Option<String>,
        /// Cache key (defaults to the source)
        #[arg(long)]
        cache_key: Option<String>,
        /// Maximum age of cached data, in seconds
        #[arg(long)]
        stale_secs: Option<u64>,
        /// Bypass the cache entirely
        #[arg(long)]
        no_cache: bool,
    },

    /// Filter a data source and write the matching locations as GeoJSON
    Filter {
        /// URL or path of a CSV or GeoJSON source (defaults to HEATMAP_DATA_URL)
        source: Option<String>,
        /// Required intensity category
        #[arg(long)]
        intensity: Option<String>,
        /// Required district
        #[arg(long)]
        district: Option<String>,
        /// Required frequency
        #[arg(long)]
        frequency: Option<String>,
        /// Required time period
        #[arg(long)]
        time_period: Option<String>,
        /// Required weather
        #[arg(long)]
        weather: Option<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the distinct values of a property
    Values {
        /// URL or path of a CSV or GeoJSON source (defaults to HEATMAP_DATA_URL)
        source: Option<String>,
        /// Property name, e.g. district
        property: String,
    },

    /// Inspect or clear the local cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove every cached entry
    Clear,
    /// Count fresh and stale entries
    Stats {
        /// Maximum age of cached data, in seconds
        #[arg(long)]
        stale_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let debug = cli.verbose || config.as_ref().is_ok_and(|c| c.debug);

    // Initialize logging
    let filter = if debug { "heatmap=debug,info" } else { "heatmap=info,warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e @ HeatmapError::MissingEnvironment(_)) => {
            let environment = std::env::var("ENV").unwrap_or_else(|_| "development".into());
            Err(anyhow::Error::new(e).context(setup_hint(&environment)))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Invalid configuration")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            if debug {
                eprintln!("\n{}\n{:?}", "Debug details:".dimmed(), err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Load {
            source,
            cache_key,
            stale_secs,
            no_cache,
        } => {
            let source = resolve_source(source, &config)?;
            let data_config = DataConfig {
                cache_key: cache_key.unwrap_or_else(|| source.clone()),
                stale_time: stale_secs.map_or(config.stale_time, Duration::from_secs),
                use_cache: !no_cache,
            };
            cmd_load(&source, data_config, &config).await
        }
        Commands::Filter {
            source,
            intensity,
            district,
            frequency,
            time_period,
            weather,
            output,
        } => {
            let source = resolve_source(source, &config)?;
            let state = FilterState::new()
                .with(FilterDimension::Intensity, intensity)
                .with(FilterDimension::District, district)
                .with(FilterDimension::Frequency, frequency)
                .with(FilterDimension::TimePeriod, time_period)
                .with(FilterDimension::Weather, weather);
            cmd_filter(&source, &state, output.as_deref(), &config).await
        }
        Commands::Values { source, property } => {
            let source = resolve_source(source, &config)?;
            cmd_values(&source, &property, &config).await
        }
        Commands::Cache { command } => match command {
            CacheCommands::Clear => cmd_cache_clear(&config),
            CacheCommands::Stats { stale_secs } => {
                let stale_time = stale_secs.map_or(config.stale_time, Duration::from_secs);
                cmd_cache_stats(&config, stale_time)
            }
        },
    }
}

fn resolve_source(source: Option<String>, config: &AppConfig) -> Result<String> {
    match source.or_else(|| config.data_url.clone()) {
        Some(source) => Ok(source),
        None => bail!("No data source given; pass SOURCE or set HEATMAP_DATA_URL"),
    }
}

/// Opens the cache file, falling back to an in-memory store if it is unreadable.
fn open_store(path: &Path) -> Arc<dyn KeyValueStore> {
    match FileStore::open(path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Cache file unusable, continuing without persistence");
            Arc::new(MemoryStore::new())
        }
    }
}

fn spinner(message: String) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

async fn load_collection(source: &str, data_config: DataConfig, config: &AppConfig) -> Result<FeatureCollection> {
    let cache = TtlCache::new(open_store(&config.cache_file));
    let service = DataService::new(LocationSource::new(), cache)
        .with_config(data_config)
        .with_notifier(Arc::new(ConsoleNotifier));

    let pb = spinner(format!("Loading {source}..."))?;
    let result = service.load(source).await;
    pb.finish_and_clear();

    result.with_context(|| format!("Could not load {source}"))
}

fn default_data_config(source: &str, config: &AppConfig) -> DataConfig {
    DataConfig {
        cache_key: source.to_string(),
        stale_time: config.stale_time,
        use_cache: true,
    }
}

/// Load a source and report its size
async fn cmd_load(source: &str, data_config: DataConfig, config: &AppConfig) -> Result<()> {
    println!("{} {}", "📥 Loading:".cyan().bold(), source);

    let collection = load_collection(source, data_config, config).await?;

    ConsoleNotifier.notify(Notification::success(format!("Loaded {} locations", collection.len())));
    if config.debug {
        let token_prefix: String = config.mapbox_token.chars().take(6).collect();
        println!("   {} {}", "Environment:".dimmed(), config.environment);
        println!("   {} {}...", "Map token:".dimmed(), token_prefix);
    }
    Ok(())
}

/// Filter a source and write the result
async fn cmd_filter(source: &str, state: &FilterState, output: Option<&Path>, config: &AppConfig) -> Result<()> {
    let collection = load_collection(source, default_data_config(source, config), config).await?;

    let outcome = apply_filters(&collection, state);
    let summary = FilterSummary::new(outcome.count, state);
    ConsoleNotifier.notify(Notification::info(summary.notification_text()));

    let json = serde_json::to_string_pretty(&outcome.collection)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} {}", "✅ Saved to:".green(), path.display());
        }
        None => println!("{json}"),
    }

    eprintln!("   {}", summary.to_string().dimmed());
    Ok(())
}

/// List distinct property values
async fn cmd_values(source: &str, property: &str, config: &AppConfig) -> Result<()> {
    let collection = load_collection(source, default_data_config(source, config), config).await?;

    let values = collection.unique_property_values(property);
    if values.is_empty() {
        println!("{} {}", "⚠️  No text values found for property:".yellow(), property);
        return Ok(());
    }

    println!("{} {} ({})", "📋 Values of".cyan().bold(), property, values.len());
    for value in &values {
        println!("   {value}");
    }
    Ok(())
}

/// Remove every cached entry
fn cmd_cache_clear(config: &AppConfig) -> Result<()> {
    let path = &config.cache_file;
    match FileStore::open(path) {
        Ok(store) => {
            let removed = TtlCache::new(store).clear();
            println!("{} {} entr{}", "🧹 Removed".green(), removed, if removed == 1 { "y" } else { "ies" });
        }
        Err(e) => {
            // Unreadable file: nothing in it can be served anyway.
            warn!(error = %e, "Removing unreadable cache file");
            std::fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
            println!("{} {}", "🧹 Removed unreadable cache file:".green(), path.display());
        }
    }
    Ok(())
}

/// Count fresh and stale entries
fn cmd_cache_stats(config: &AppConfig, stale_time: Duration) -> Result<()> {
    let store = FileStore::open(&config.cache_file).context("Failed to open cache file")?;
    let stats = TtlCache::new(store).stats(stale_time);

    println!("{} {}", "📦 Cache:".cyan().bold(), config.cache_file.display());
    println!("   {} {}", "Entries:".dimmed(), stats.total_entries);
    println!("   {} {}", "Fresh:".dimmed(), stats.valid_entries.to_string().green());
    println!("   {} {}", "Stale:".dimmed(), stats.expired_entries.to_string().yellow());
    println!("   {} {}s", "Stale after:".dimmed(), stale_time.as_secs());
    Ok(())
}
