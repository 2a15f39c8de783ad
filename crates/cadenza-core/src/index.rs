//! The index table: display title to dataset row.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::artifact;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::model::Song;

/// Maps each display title to its row position in the dataset.
///
/// Stored on disk as a JSON object `{ "<title>": <row>, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexTable {
    rows: BTreeMap<String, usize>,
}

impl IndexTable {
    /// Build the table from songs in row order.
    ///
    /// When a title occurs more than once the first occurrence wins.
    pub fn from_songs<'a>(songs: impl IntoIterator<Item = &'a Song>) -> Self {
        let mut rows = BTreeMap::new();
        for song in songs {
            if let Some(&first) = rows.get(&song.title) {
                log::warn!(
                    "Duplicate title {:?} at row {}; keeping row {}",
                    song.title,
                    song.row,
                    first
                );
                continue;
            }
            rows.insert(song.title.clone(), song.row);
        }
        Self { rows }
    }

    /// Load the table from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let table: Self = artifact::read_json(path)?;
        log::info!("Loaded index table with {} titles from {}", table.len(), path.display());
        Ok(table)
    }

    /// Write the table as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        artifact::write_json(path, self)
    }

    pub fn get(&self, title: &str) -> Option<usize> {
        self.rows.get(title).copied()
    }

    /// Resolve a title to its row, failing with [`Error::UnknownSong`].
    pub fn lookup(&self, title: &str) -> Result<usize> {
        self.get(title).ok_or_else(|| Error::UnknownSong {
            title: title.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check that the table agrees with the dataset: every title points at
    /// the first dataset row carrying that title, and every dataset title has
    /// an entry.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        if let Some((title, row)) = self.rows.iter().find(|&(_, &row)| row >= catalog.len()) {
            return Err(Error::invalid(
                "index table",
                format!(
                    "title {title:?} points at row {row} but the dataset has {} rows",
                    catalog.len()
                ),
            ));
        }

        let mut first_rows: HashMap<&str, usize> = HashMap::new();
        for (row, song) in catalog.songs().iter().enumerate() {
            first_rows.entry(song.title.as_str()).or_insert(row);
        }

        for (title, &row) in &self.rows {
            match first_rows.get(title.as_str()) {
                Some(&first) if first == row => {}
                Some(&first) => {
                    return Err(Error::invalid(
                        "index table",
                        format!(
                            "title {title:?} points at row {row} but the dataset has it at row {first}"
                        ),
                    ));
                }
                None => {
                    return Err(Error::invalid(
                        "index table",
                        format!("title {title:?} is not in the dataset"),
                    ));
                }
            }
        }

        if let Some(song) = catalog.songs().iter().find(|s| !self.rows.contains_key(&s.title)) {
            return Err(Error::invalid(
                "index table",
                format!("no entry for dataset title {:?}", song.title),
            ));
        }

        Ok(())
    }
}
