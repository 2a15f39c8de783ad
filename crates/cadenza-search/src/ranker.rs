//! The similarity ranker.

use cadenza_core::{Catalog, Error, IndexTable, Result, Song};
use serde::Serialize;

use crate::matrix::SimilaritySource;

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub score: f64,
    pub song: &'a Song,
}

/// Everything needed to answer recommendation queries.
///
/// Built once at startup from the dataset and the two artifacts, then only
/// read. Front-ends hold one and pass it around explicitly.
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    index: IndexTable,
    similarity: Box<dyn SimilaritySource>,
}

impl Recommender {
    /// Assemble a recommender, checking that the three inputs describe the
    /// same set of rows.
    pub fn new(
        catalog: Catalog,
        index: IndexTable,
        similarity: Box<dyn SimilaritySource>,
    ) -> Result<Self> {
        index.validate(&catalog)?;
        if similarity.len() != catalog.len() {
            return Err(Error::invalid(
                "similarity artifact",
                format!(
                    "{} matrix covers {} rows but the dataset has {}",
                    similarity.kind(),
                    similarity.len(),
                    catalog.len()
                ),
            ));
        }

        Ok(Self {
            catalog,
            index,
            similarity,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    pub fn similarity(&self) -> &dyn SimilaritySource {
        self.similarity.as_ref()
    }

    /// Raw similarity of `title` against every row, indexed by row.
    pub fn scores(&self, title: &str) -> Result<Vec<f64>> {
        let row = self.index.lookup(title)?;
        self.similarity.row_scores(row).ok_or_else(|| {
            Error::invalid(
                "similarity artifact",
                format!("no scores for row {row}"),
            )
        })
    }

    /// Every other song ordered by descending similarity to `title`.
    ///
    /// Equal scores keep row order. The query song and any other row with
    /// the same title are left out.
    pub fn rank(&self, title: &str) -> Result<Vec<Recommendation<'_>>> {
        let query_row = self.index.lookup(title)?;
        let scores = self.scores(title)?;

        let mut scored: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .map(|(row, score)| (row, if score.is_nan() { f64::NEG_INFINITY } else { score }))
            .collect();
        // `sort_by` is stable, so ties stay in row order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let ranked = scored
            .into_iter()
            .filter_map(|(row, score)| self.catalog.get(row).map(|song| (song, score)))
            .filter(|(song, _)| song.row != query_row && song.title != title)
            .enumerate()
            .map(|(i, (song, score))| Recommendation {
                rank: i + 1,
                score,
                song,
            })
            .collect();

        Ok(ranked)
    }

    /// The `k` songs most similar to `title`, best first.
    ///
    /// Returns fewer than `k` when the dataset does not have that many other
    /// songs. Fails with [`Error::UnknownSong`] when the title is not in the
    /// index table.
    pub fn recommend(&self, title: &str, k: usize) -> Result<Vec<Recommendation<'_>>> {
        let mut ranked = self.rank(title)?;
        ranked.truncate(k);
        log::debug!("Recommended {} songs for {:?}", ranked.len(), title);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{DenseSimilarity, TfidfMatrix};

    fn catalog(titles: &[&str]) -> Catalog {
        Catalog::from_songs(
            titles
                .iter()
                .map(|t| Song::new(0, *t, Some("Artist"), None)),
        )
    }

    fn recommender(titles: &[&str], rows: Vec<Vec<f64>>) -> Recommender {
        let catalog = catalog(titles);
        let index = IndexTable::from_songs(catalog.songs());
        let matrix = DenseSimilarity::from_rows(rows).unwrap();
        Recommender::new(catalog, index, Box::new(matrix)).unwrap()
    }

    /// Five songs where A's similarities are 1.0, 0.9, 0.5, 0.2, 0.1.
    fn five_songs() -> Recommender {
        recommender(
            &["A", "B", "C", "D", "E"],
            vec![
                vec![1.0, 0.9, 0.5, 0.2, 0.1],
                vec![0.9, 1.0, 0.4, 0.3, 0.2],
                vec![0.5, 0.4, 1.0, 0.6, 0.7],
                vec![0.2, 0.3, 0.6, 1.0, 0.8],
                vec![0.1, 0.2, 0.7, 0.8, 1.0],
            ],
        )
    }

    fn titles<'a>(recs: &[Recommendation<'a>]) -> Vec<&'a str> {
        recs.iter().map(|r| r.song.title.as_str()).collect()
    }

    #[test]
    fn test_recommend_top_two() {
        let rec = five_songs();
        let recs = rec.recommend("A", 2).unwrap();
        assert_eq!(titles(&recs), vec!["B", "C"]);
        assert_eq!(recs[0].rank, 1);
        assert_eq!(recs[1].rank, 2);
        assert!((recs[0].score - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recommend_length_is_min_of_k_and_others() {
        let rec = five_songs();
        for k in 0..8 {
            let recs = rec.recommend("C", k).unwrap();
            assert_eq!(recs.len(), k.min(4), "k = {k}");
        }
    }

    #[test]
    fn test_recommend_excludes_query() {
        let rec = five_songs();
        for title in ["A", "B", "C", "D", "E"] {
            let recs = rec.recommend(title, 10).unwrap();
            assert!(recs.iter().all(|r| r.song.title != title));
        }
    }

    #[test]
    fn test_recommend_scores_non_increasing() {
        let rec = five_songs();
        let recs = rec.recommend("E", 4).unwrap();
        assert_eq!(titles(&recs), vec!["D", "C", "B", "A"]);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_recommend_unknown_title() {
        let rec = five_songs();
        let err = rec.recommend("Nonexistent Song", 3).unwrap_err();
        assert!(err.is_unknown_song());
    }

    #[test]
    fn test_recommend_is_idempotent() {
        let rec = five_songs();
        let first = rec.recommend("B", 3).unwrap();
        let second = rec.recommend("B", 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_keep_row_order() {
        let rec = recommender(
            &["Q", "X", "Y", "Z"],
            vec![
                vec![1.0, 0.5, 0.5, 0.5],
                vec![0.5, 1.0, 0.0, 0.0],
                vec![0.5, 0.0, 1.0, 0.0],
                vec![0.5, 0.0, 0.0, 1.0],
            ],
        );
        assert_eq!(titles(&rec.recommend("Q", 3).unwrap()), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_query_excluded_even_when_not_ranked_first() {
        // Row 1 ties with the query itself; the query must still be dropped
        // rather than whatever happens to sort first.
        let rec = recommender(
            &["A", "B", "C"],
            vec![
                vec![0.9, 0.9, 0.1],
                vec![0.9, 1.0, 0.2],
                vec![0.1, 0.2, 1.0],
            ],
        );
        assert_eq!(titles(&rec.recommend("A", 1).unwrap()), vec!["B"]);
        assert_eq!(titles(&rec.recommend("A", 5).unwrap()), vec!["B", "C"]);
    }

    #[test]
    fn test_duplicate_titles_are_not_recommended_to_themselves() {
        let rec = recommender(
            &["A", "B", "A"],
            vec![
                vec![1.0, 0.5, 0.99],
                vec![0.5, 1.0, 0.4],
                vec![0.99, 0.4, 1.0],
            ],
        );
        assert_eq!(titles(&rec.recommend("A", 5).unwrap()), vec!["B"]);
    }

    #[test]
    fn test_nan_scores_rank_last() {
        let rec = recommender(
            &["A", "B", "C"],
            vec![
                vec![1.0, f64::NAN, 0.1],
                vec![f64::NAN, 1.0, 0.0],
                vec![0.1, 0.0, 1.0],
            ],
        );
        assert_eq!(titles(&rec.recommend("A", 2).unwrap()), vec!["C", "B"]);
    }

    #[test]
    fn test_tfidf_source() {
        // A and B share term 0; C only has term 2.
        let catalog = catalog(&["A", "B", "C"]);
        let index = IndexTable::from_songs(catalog.songs());
        let matrix = TfidfMatrix::new(
            3,
            3,
            vec![0, 2, 3, 4],
            vec![0, 1, 0, 2],
            vec![0.6, 0.8, 1.0, 1.0],
        )
        .unwrap();
        let rec = Recommender::new(catalog, index, Box::new(matrix)).unwrap();

        let recs = rec.recommend("A", 2).unwrap();
        assert_eq!(titles(&recs), vec!["B", "C"]);
        assert!((recs[0].score - 0.6).abs() < 1e-9);
        assert!(recs[1].score.abs() < 1e-9);
    }

    #[test]
    fn test_new_rejects_size_mismatch() {
        let catalog = catalog(&["A", "B"]);
        let index = IndexTable::from_songs(catalog.songs());
        let matrix = DenseSimilarity::from_rows(vec![vec![1.0]]).unwrap();
        let err = Recommender::new(catalog, index, Box::new(matrix)).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { .. }));
    }

    #[test]
    fn test_new_rejects_swapped_index() {
        let catalog = catalog(&["A", "B", "C", "D"]);
        let index: IndexTable =
            serde_json::from_str(r#"{"A": 1, "B": 0, "C": 2, "D": 3}"#).unwrap();
        let rows = (0..4)
            .map(|i| (0..4).map(|j| if i == j { 1.0 } else { 0.5 }).collect())
            .collect::<Vec<Vec<f64>>>();
        let matrix = DenseSimilarity::from_rows(rows).unwrap();
        let err = Recommender::new(catalog, index, Box::new(matrix)).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { .. }));
    }

    #[test]
    fn test_scores_exposes_raw_row() {
        let rec = five_songs();
        assert_eq!(rec.scores("A").unwrap(), vec![1.0, 0.9, 0.5, 0.2, 0.1]);
    }
}
