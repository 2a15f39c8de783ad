use anyhow::Result;
use cadenza_etl::{load_recommender, Config};

/// Run the interactive browser over the configured dataset.
pub fn run_browse(config: &Config) -> Result<()> {
    let recommender = load_recommender(config)?;

    if recommender.catalog().is_empty() {
        println!("The dataset has no songs.");
        println!("Check 'dataset_path' with 'cadenza config show'.");
        return Ok(());
    }

    crate::tui::run_tui(&recommender, config)
}
