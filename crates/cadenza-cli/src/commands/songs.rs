use anyhow::{Context, Result};
use cadenza_core::Catalog;
use cadenza_etl::Config;

/// Print the titles in the dataset, optionally filtered.
pub fn list_songs(config: &Config, filter: Option<&str>) -> Result<()> {
    let catalog = Catalog::load(&config.dataset_path, &config.columns)
        .with_context(|| format!("Failed to load dataset {}", config.dataset_path.display()))?;

    let mut shown = 0;
    for song in catalog.search(filter.unwrap_or_default()) {
        println!("{:>6}  {}  ({}, {})", song.row, song.title, song.artist, song.album);
        shown += 1;
    }

    println!("\n{} of {} songs", shown, catalog.len());
    Ok(())
}
