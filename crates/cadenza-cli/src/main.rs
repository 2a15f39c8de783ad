use anyhow::{Context, Result};
use cadenza_etl::Config;
use clap::Parser;
use std::path::PathBuf;

mod commands;
mod tui;

#[derive(Debug, Parser)]
#[command(name = "cadenza", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the song dataset (default: ~/.local/share/cadenza/songs.csv)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Path to the index table artifact
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Path to the similarity artifact
    #[arg(long, global = true)]
    similarity: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Recommend songs similar to a given title
    ///
    /// Looks the title up in the index table, ranks every other song in the
    /// dataset by similarity to it, and prints the best matches as a grid of
    /// cards (title, artist, album). The song itself is never included.
    ///
    /// The number of results must lie inside the configured range
    /// (recommendations.min..=recommendations.max, 5..=20 by default).
    ///
    /// If the title is unknown, close matches from the dataset are suggested.
    Recommend {
        /// Exact song title as it appears in the dataset
        title: String,

        /// Number of recommendations (default: recommendations.default)
        #[arg(short = 'k', long = "count")]
        count: Option<usize>,

        /// Print results as JSON instead of cards
        #[arg(long)]
        json: bool,
    },
    /// Browse the catalog interactively and get recommendations
    ///
    /// Opens a terminal UI with a filterable song list, a setting for the
    /// number of recommendations, and a card grid for results.
    Browse,
    /// List song titles in the dataset
    Songs {
        /// Case-insensitive filter on title, artist or album
        filter: Option<String>,
    },
    /// Build the index table and similarity artifacts from the dataset
    ///
    /// Fits a TF-IDF vectorizer over the configured text columns and writes
    /// the title index and the similarity artifact. By default the sparse
    /// TF-IDF features are stored and cosine similarity is computed per
    /// query; --dense stores the full pairwise matrix instead.
    Build {
        /// Write artifacts into this directory instead of the configured paths
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Store the full pairwise similarity matrix
        #[arg(long)]
        dense: bool,

        /// Gzip-compress the artifacts
        #[arg(long)]
        gzip: bool,
    },
    /// Show dataset and artifact status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print one config value, or the whole config file
    Get {
        /// Dotted key, e.g. recommendations.max
        key: Option<String>,
    },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Config { action } => return run_config(action),
        command => command,
    };

    let config = Config::load()?.with_overrides(cli.dataset, cli.index, cli.similarity);

    twyg::setup(config.logging.clone())
        .map_err(|e| anyhow::anyhow!("{e:?}"))
        .context("Failed to set up logging")?;

    match command {
        Commands::Recommend { title, count, json } => {
            commands::run_recommend(&config, &title, count, json)?;
        }
        Commands::Browse => {
            commands::run_browse(&config)?;
        }
        Commands::Songs { filter } => {
            commands::list_songs(&config, filter.as_deref())?;
        }
        Commands::Build {
            out_dir,
            dense,
            gzip,
        } => {
            commands::run_build(&config, out_dir, dense, gzip)?;
        }
        Commands::Status => {
            commands::show_status(&config);
        }
        Commands::Config { action } => {
            run_config(action)?;
        }
    }

    Ok(())
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => commands::config::show_config(),
        ConfigAction::Get { key } => commands::config::get_config(key),
        ConfigAction::Set { key, value } => commands::config::set_config(key, value),
        ConfigAction::Path => commands::config::show_path(),
        ConfigAction::Example => commands::config::show_example(),
        ConfigAction::Init => commands::config::init_config(),
    }
}
