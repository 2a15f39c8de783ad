use anyhow::{Context, Result};
use cadenza_core::ColumnNames;
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for cadenza.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (CADENZA_* prefix)
/// 3. Config file (~/.config/cadenza/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the song dataset (CSV with a header row).
    ///
    /// Can be set via:
    /// - CLI: --dataset /path/to/songs.csv
    /// - ENV: CADENZA_DATASET_PATH
    /// - Config: dataset_path = "/path/to/songs.csv"
    /// - Default: ~/.local/share/cadenza/songs.csv
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Path to the title-to-row index table artifact.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Path to the similarity artifact (dense matrix or TF-IDF features).
    #[serde(default = "default_similarity_path")]
    pub similarity_path: PathBuf,

    /// Dataset header names for title, artist and album.
    #[serde(default)]
    pub columns: ColumnNames,

    /// Dataset columns whose text feeds the TF-IDF vectorizer.
    ///
    /// Empty means "whichever of the title, artist and album columns exist".
    #[serde(default)]
    pub text_columns: Vec<String>,

    #[serde(default)]
    pub recommendations: RecommendationLimits,

    /// Number of result cards per row in the card grid.
    #[serde(default = "default_cards_per_row")]
    pub cards_per_row: usize,

    #[serde(default)]
    pub logging: twyg::Opts,
}

/// Allowed range for the number of recommendations, and the starting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationLimits {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        Self {
            min: 5,
            max: 20,
            default: 10,
        }
    }
}

impl RecommendationLimits {
    pub fn contains(&self, k: usize) -> bool {
        (self.min..=self.max).contains(&k)
    }

    /// Pull `k` into the allowed range.
    pub fn clamp(&self, k: usize) -> usize {
        k.clamp(self.min, self.max)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            index_path: default_index_path(),
            similarity_path: default_similarity_path(),
            columns: ColumnNames::default(),
            text_columns: Vec::new(),
            recommendations: RecommendationLimits::default(),
            cards_per_row: default_cards_per_row(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/cadenza/config.toml
    /// Reads environment variables with CADENZA_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the loaded values are inconsistent.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("cadenza");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Apply path overrides given on the command line.
    #[must_use]
    pub fn with_overrides(
        mut self,
        dataset: Option<PathBuf>,
        index: Option<PathBuf>,
        similarity: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = dataset {
            self.dataset_path = path;
        }
        if let Some(path) = index {
            self.index_path = path;
        }
        if let Some(path) = similarity {
            self.similarity_path = path;
        }
        self
    }

    /// Text columns to vectorize, resolved against the dataset headers.
    pub fn resolve_text_columns(&self, headers: &[String]) -> Vec<String> {
        if !self.text_columns.is_empty() {
            return self.text_columns.clone();
        }
        [&self.columns.title, &self.columns.artist, &self.columns.album]
            .into_iter()
            .filter(|name| headers.contains(*name))
            .cloned()
            .collect()
    }

    /// Check values that the type system cannot.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.recommendations;
        if limits.min == 0 {
            anyhow::bail!("recommendations.min must be at least 1");
        }
        if limits.min > limits.max {
            anyhow::bail!(
                "recommendations.min ({}) is greater than recommendations.max ({})",
                limits.min,
                limits.max
            );
        }
        if !limits.contains(limits.default) {
            anyhow::bail!(
                "recommendations.default ({}) is outside {}..={}",
                limits.default,
                limits.min,
                limits.max
            );
        }
        if self.cards_per_row == 0 {
            anyhow::bail!("cards_per_row must be at least 1");
        }
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
}

fn default_dataset_path() -> PathBuf {
    data_dir().join("songs.csv")
}

fn default_index_path() -> PathBuf {
    data_dir().join("indices.json")
}

fn default_similarity_path() -> PathBuf {
    data_dir().join("similarity.json")
}

const fn default_cards_per_row() -> usize {
    3
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/cadenza/config.toml
/// - macOS: ~/Library/Application Support/cadenza/config.toml
/// - Windows: %APPDATA%\cadenza\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadenza")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Cadenza Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (CADENZA_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Song dataset: a CSV file with a header row
#
# Can also be set via:
# - CLI: cadenza --dataset /custom/songs.csv recommend "Song"
# - Environment: CADENZA_DATASET_PATH=/custom/songs.csv
#
# Default: Platform-specific data directory
#dataset_path = "/path/to/songs.csv"

# Precomputed artifacts written by `cadenza build`
# Paths ending in .gz are gzip-compressed
#index_path = "/path/to/indices.json"
#similarity_path = "/path/to/similarity.json"

# Columns fed to the TF-IDF vectorizer by `cadenza build`
# Empty: whichever of the title, artist and album columns exist
text_columns = []

# Number of result cards per row
cards_per_row = 3

[columns]
title = "Song Title"
artist = "Artist"
album = "Album"

[recommendations]
min = 5
max = 20
default = 10
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}
