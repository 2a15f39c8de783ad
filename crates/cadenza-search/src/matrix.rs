//! In-memory similarity representations.
//!
//! Two shapes are supported: a dense, precomputed `n x n` score matrix and a
//! sparse TF-IDF feature matrix whose rows are compared with cosine
//! similarity on demand.

use std::fmt;
use std::path::Path;

use cadenza_core::{artifact, Error, Result};
use serde::{Deserialize, Serialize};

/// Something that can score one row against every row of the dataset.
pub trait SimilaritySource: fmt::Debug {
    /// Number of rows (songs) covered.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Similarity of `row` against every row, indexed by row position.
    ///
    /// Returns `None` when `row` is out of range.
    fn row_scores(&self, row: usize) -> Option<Vec<f64>>;

    /// Short name used in status output.
    fn kind(&self) -> &'static str;
}

/// A precomputed square similarity matrix, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSimilarity {
    size: usize,
    values: Vec<f64>,
}

impl DenseSimilarity {
    pub fn new(size: usize, values: Vec<f64>) -> Result<Self> {
        if size.checked_mul(size) != Some(values.len()) {
            return Err(Error::invalid(
                "similarity matrix",
                format!("expected {size}x{size} values, found {}", values.len()),
            ));
        }
        Ok(Self { size, values })
    }

    /// Build from nested rows. Every row must be as long as the number of
    /// rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(Error::invalid(
                "similarity matrix",
                format!("row {i} has {} values, expected {size}", row.len()),
            ));
        }
        Self::new(size, rows.into_iter().flatten().collect())
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.size {
            return None;
        }
        let start = row * self.size;
        Some(&self.values[start..start + self.size])
    }
}

impl SimilaritySource for DenseSimilarity {
    fn len(&self) -> usize {
        self.size
    }

    fn row_scores(&self, row: usize) -> Option<Vec<f64>> {
        self.row(row).map(<[f64]>::to_vec)
    }

    fn kind(&self) -> &'static str {
        "dense"
    }
}

/// A sparse TF-IDF feature matrix in compressed sparse row layout.
///
/// Row `r`'s non-zero entries live at `indptr[r]..indptr[r + 1]` in
/// `indices` (column) and `data` (weight).
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
    norms: Vec<f64>,
}

impl TfidfMatrix {
    pub fn new(
        rows: usize,
        cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self> {
        let invalid = |message: String| Error::invalid("TF-IDF matrix", message);

        if rows.checked_add(1) != Some(indptr.len()) {
            return Err(invalid(format!(
                "indptr has {} entries for {rows} rows",
                indptr.len()
            )));
        }
        if indptr.first() != Some(&0) || indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid("indptr must start at 0 and never decrease".to_string()));
        }
        if indices.len() != data.len() {
            return Err(invalid(format!(
                "{} column indices but {} values",
                indices.len(),
                data.len()
            )));
        }
        if indptr.last() != Some(&data.len()) {
            return Err(invalid(format!(
                "indptr ends at {:?} but there are {} values",
                indptr.last(),
                data.len()
            )));
        }
        if let Some(&col) = indices.iter().find(|&&c| c >= cols) {
            return Err(invalid(format!("column {col} out of range for {cols} columns")));
        }

        let norms = (0..rows)
            .map(|r| {
                data[indptr[r]..indptr[r + 1]]
                    .iter()
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
            norms,
        })
    }

    /// Number of feature columns (vocabulary size).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored non-zero weights.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    fn entries(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let span = self.indptr[row]..self.indptr[row + 1];
        self.indices[span.clone()]
            .iter()
            .copied()
            .zip(self.data[span].iter().copied())
    }

    /// Compute the full pairwise cosine matrix.
    pub fn cosine_matrix(&self) -> DenseSimilarity {
        let values = (0..self.rows)
            .flat_map(|r| self.cosine_row(r))
            .collect();
        DenseSimilarity {
            size: self.rows,
            values,
        }
    }

    fn cosine_row(&self, row: usize) -> Vec<f64> {
        let mut query = vec![0.0; self.cols];
        for (col, weight) in self.entries(row) {
            query[col] += weight;
        }
        let query_norm = self.norms[row];

        (0..self.rows)
            .map(|other| {
                let denom = query_norm * self.norms[other];
                if denom == 0.0 {
                    return 0.0;
                }
                let dot: f64 = self.entries(other).map(|(col, w)| query[col] * w).sum();
                dot / denom
            })
            .collect()
    }
}

impl SimilaritySource for TfidfMatrix {
    fn len(&self) -> usize {
        self.rows
    }

    fn row_scores(&self, row: usize) -> Option<Vec<f64>> {
        (row < self.rows).then(|| self.cosine_row(row))
    }

    fn kind(&self) -> &'static str {
        "tfidf"
    }
}

/// On-disk form of a similarity source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimilarityArtifact {
    Dense {
        size: usize,
        values: Vec<f64>,
    },
    Tfidf {
        rows: usize,
        cols: usize,
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    },
}

impl SimilarityArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        artifact::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }

    /// Validate the artifact and turn it into a usable source.
    pub fn into_source(self) -> Result<Box<dyn SimilaritySource>> {
        let source: Box<dyn SimilaritySource> = match self {
            Self::Dense { size, values } => Box::new(DenseSimilarity::new(size, values)?),
            Self::Tfidf {
                rows,
                cols,
                indptr,
                indices,
                data,
            } => Box::new(TfidfMatrix::new(rows, cols, indptr, indices, data)?),
        };
        Ok(source)
    }
}

impl From<DenseSimilarity> for SimilarityArtifact {
    fn from(matrix: DenseSimilarity) -> Self {
        Self::Dense {
            size: matrix.size,
            values: matrix.values,
        }
    }
}

impl From<TfidfMatrix> for SimilarityArtifact {
    fn from(matrix: TfidfMatrix) -> Self {
        Self::Tfidf {
            rows: matrix.rows,
            cols: matrix.cols,
            indptr: matrix.indptr,
            indices: matrix.indices,
            data: matrix.data,
        }
    }
}
