//! Assemble a [`Recommender`] from the configured dataset and artifacts.

use anyhow::{Context, Result};
use cadenza_core::{Catalog, IndexTable};
use cadenza_search::{Recommender, SimilarityArtifact, SimilaritySource};

use crate::config::Config;

/// Load the dataset, the index table and the similarity artifact named by
/// `config`, and check that they agree.
///
/// Any missing file is fatal; the error chain names the path and suggests
/// how to produce it.
pub fn load_recommender(config: &Config) -> Result<Recommender> {
    let catalog = Catalog::load(&config.dataset_path, &config.columns)
        .with_context(|| format!("Failed to load dataset {}", config.dataset_path.display()))?;

    let index = IndexTable::load(&config.index_path).with_context(|| {
        format!(
            "Failed to load index table {} (run 'cadenza build' to create it)",
            config.index_path.display()
        )
    })?;

    let similarity = SimilarityArtifact::load(&config.similarity_path)
        .and_then(SimilarityArtifact::into_source)
        .with_context(|| {
            format!(
                "Failed to load similarity artifact {} (run 'cadenza build' to create it)",
                config.similarity_path.display()
            )
        })?;

    log::info!(
        "Loaded {} songs with a {} similarity source",
        catalog.len(),
        similarity.kind()
    );

    Recommender::new(catalog, index, similarity)
        .context("Dataset and artifacts do not match; rebuild them with 'cadenza build'")
}
