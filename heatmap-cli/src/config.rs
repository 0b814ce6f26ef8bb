//! Startup configuration from `.env` and the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use heatmap_core::constants::DEFAULT_STALE_TIME;
use heatmap_core::error::{HeatmapError, Result};

/// Variables that must be present and non-empty.
pub const REQUIRED_VARS: &[&str] = &["MAPBOX_TOKEN"];

const DEFAULT_CACHE_FILE: &str = ".heatmap/cache.json";

/// Deployment mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => Err(HeatmapError::Config(format!(
                "ENV must be \"development\" or \"production\", got \"{other}\""
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Access token for the map renderer
    pub mapbox_token: String,
    pub debug: bool,
    pub environment: Environment,
    /// Source used when none is given on the command line
    pub data_url: Option<String>,
    pub cache_file: PathBuf,
    pub stale_time: Duration,
}

impl AppConfig {
    /// Loads `.env` (if any), then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|key| var(**key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(HeatmapError::MissingEnvironment(missing));
        }

        let stale_time = match var("HEATMAP_STALE_TIME_SECS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                HeatmapError::Config(format!("HEATMAP_STALE_TIME_SECS must be a whole number of seconds, got \"{raw}\""))
            })?,
            None => DEFAULT_STALE_TIME,
        };

        Ok(Self {
            mapbox_token: var("MAPBOX_TOKEN").unwrap_or_default(),
            debug: var("DEBUG").as_deref() == Some("true"),
            environment: var("ENV").map(|e| e.parse()).transpose()?.unwrap_or_default(),
            data_url: var("HEATMAP_DATA_URL"),
            cache_file: var("HEATMAP_CACHE_FILE").map_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE), PathBuf::from),
            stale_time,
        })
    }
}

/// Setup instructions shown after a missing-variable error.
pub fn setup_hint(environment: &str) -> String {
    let lines: Vec<String> = REQUIRED_VARS
        .iter()
        .map(|v| format!("{v}=your_{}_here", v.to_lowercase()))
        .collect();
    format!(
        "Please make sure you have a .env file with the following variables:\n{}\n\nCurrent environment: {}",
        lines.join("\n"),
        environment
    )
}
