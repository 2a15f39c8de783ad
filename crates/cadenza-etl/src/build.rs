//! Build the index table and similarity artifacts from the song dataset.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cadenza_core::artifact::is_gzip;
use cadenza_core::catalog::{read_documents, read_headers};
use cadenza_core::{Catalog, IndexTable};
use cadenza_search::SimilarityArtifact;

use crate::config::Config;
use crate::vectorize::TfidfVectorizer;

/// Options for [`build_artifacts`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Write both artifacts into this directory instead of the configured
    /// paths.
    pub out_dir: Option<PathBuf>,

    /// Store the full pairwise cosine matrix instead of the sparse TF-IDF
    /// features. Faster to query, quadratic in size.
    pub dense: bool,

    /// Gzip-compress the artifacts.
    pub gzip: bool,
}

/// What a build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub songs: usize,
    pub unique_titles: usize,
    pub text_columns: Vec<String>,
    pub vocabulary: usize,
    pub kind: &'static str,
    pub index_path: PathBuf,
    pub similarity_path: PathBuf,
}

/// Read the dataset, vectorize the configured text columns and write the
/// index table and similarity artifact.
pub fn build_artifacts(config: &Config, options: &BuildOptions) -> Result<BuildReport> {
    let dataset = &config.dataset_path;
    log::info!("Building artifacts from {}", dataset.display());

    let catalog = Catalog::load(dataset, &config.columns)
        .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;
    if catalog.is_empty() {
        anyhow::bail!("Dataset {} has no songs", dataset.display());
    }

    let headers = read_headers(dataset)?;
    let text_columns = config.resolve_text_columns(&headers);
    let documents = read_documents(dataset, &text_columns)
        .with_context(|| format!("Failed to read text columns {:?}", text_columns))?;

    let index = IndexTable::from_songs(catalog.songs());
    if index.len() < catalog.len() {
        log::warn!(
            "{} duplicate titles; the first occurrence of each is used",
            catalog.len() - index.len()
        );
    }

    let mut vectorizer = TfidfVectorizer::new()?;
    let features = vectorizer.fit_transform(&documents)?;
    log::debug!(
        "TF-IDF features: {} terms, {} non-zero weights",
        features.cols(),
        features.nnz()
    );

    let artifact = if options.dense {
        SimilarityArtifact::from(features.cosine_matrix())
    } else {
        SimilarityArtifact::from(features)
    };
    let kind = match artifact {
        SimilarityArtifact::Dense { .. } => "dense",
        SimilarityArtifact::Tfidf { .. } => "tfidf",
    };

    let index_path = output_path(&config.index_path, "indices.json", options);
    let similarity_path = output_path(&config.similarity_path, "similarity.json", options);

    index
        .save(&index_path)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;
    artifact
        .save(&similarity_path)
        .with_context(|| format!("Failed to write {}", similarity_path.display()))?;

    log::info!(
        "Wrote {} and {} ({} matrix, {} songs)",
        index_path.display(),
        similarity_path.display(),
        kind,
        catalog.len()
    );

    Ok(BuildReport {
        songs: catalog.len(),
        unique_titles: index.len(),
        text_columns,
        vocabulary: vectorizer.vocabulary().len(),
        kind,
        index_path,
        similarity_path,
    })
}

/// Where to write an artifact: the configured path, or `file_name` inside
/// the output directory, with `.gz` appended when compressing.
fn output_path(configured: &Path, file_name: &str, options: &BuildOptions) -> PathBuf {
    let path = match &options.out_dir {
        Some(dir) => dir.join(file_name),
        None => configured.to_path_buf(),
    };

    if options.gzip && !is_gzip(&path) {
        let mut name = path.clone().into_os_string();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path
    }
}
