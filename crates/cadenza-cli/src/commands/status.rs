use cadenza_core::Catalog;
use cadenza_etl::{load_recommender, Config};
use cadenza_search::SimilaritySource;
use std::path::Path;

pub fn show_status(config: &Config) {
    println!("\n📊 Cadenza Status\n");
    print_path("Dataset", &config.dataset_path);
    print_path("Index table", &config.index_path);
    print_path("Similarity", &config.similarity_path);

    match load_recommender(config) {
        Ok(recommender) => {
            println!("\n  Songs: {}", recommender.catalog().len());
            println!("  Indexed titles: {}", recommender.index().len());
            println!("  Similarity source: {}", recommender.similarity().kind());
            println!("\n  Ready. Try `cadenza browse`.");
        }
        Err(e) => {
            if let Ok(catalog) = Catalog::load(&config.dataset_path, &config.columns) {
                println!("\n  Songs: {}", catalog.len());
            }
            println!("\n  Not ready: {:#}", e);
            if !config.index_path.exists() || !config.similarity_path.exists() {
                println!("\n  Run `cadenza build` to create the artifacts");
            }
        }
    }
}

fn print_path(label: &str, path: &Path) {
    let state = if path.exists() { "✓" } else { "✗ missing" };
    println!("  {:<12} {} {}", format!("{}:", label), path.display(), state);
}
