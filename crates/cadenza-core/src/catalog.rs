//! The song dataset: a CSV file with a header row, loaded once at startup.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Song;

/// Header names of the dataset columns that make up a [`Song`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Required. Holds the unique display title.
    pub title: String,
    /// Optional. Missing cells become "Unknown".
    pub artist: String,
    /// Optional. Missing cells become "Unknown".
    pub album: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            title: "Song Title".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
        }
    }
}

/// All songs of the dataset, in file order.
///
/// A song's position in [`Catalog::songs`] is its row, and every similarity
/// artifact is indexed by that row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    songs: Vec<Song>,
}

impl Catalog {
    /// Load the dataset from a CSV file.
    ///
    /// The title column must exist. The artist and album columns are
    /// optional; when absent every song gets "Unknown".
    pub fn load(path: &Path, columns: &ColumnNames) -> Result<Self> {
        let mut reader = open_reader(path)?;
        let headers = reader.headers()?.clone();

        let title_idx = column_position(&headers, &columns.title).ok_or_else(|| {
            Error::MissingColumn {
                column: columns.title.clone(),
            }
        })?;
        let artist_idx = column_position(&headers, &columns.artist);
        let album_idx = column_position(&headers, &columns.album);

        if artist_idx.is_none() {
            log::debug!("No {:?} column in {}", columns.artist, path.display());
        }
        if album_idx.is_none() {
            log::debug!("No {:?} column in {}", columns.album, path.display());
        }

        let mut songs = Vec::new();
        for record in reader.records() {
            let record = record?;
            let title = record.get(title_idx).unwrap_or_default().trim();
            songs.push(Song::new(
                songs.len(),
                title,
                artist_idx.and_then(|i| record.get(i)),
                album_idx.and_then(|i| record.get(i)),
            ));
        }

        log::info!("Loaded {} songs from {}", songs.len(), path.display());
        Ok(Self { songs })
    }

    /// Build a catalog from songs already in memory, renumbering rows in
    /// iteration order.
    #[must_use]
    pub fn from_songs(songs: impl IntoIterator<Item = Song>) -> Self {
        let songs = songs
            .into_iter()
            .enumerate()
            .map(|(row, song)| Song { row, ..song })
            .collect();
        Self { songs }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn get(&self, row: usize) -> Option<&Song> {
        self.songs.get(row)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Songs whose title, artist or album contains `filter`, ignoring case.
    /// An empty filter matches everything.
    pub fn search<'a>(&'a self, filter: &str) -> impl Iterator<Item = &'a Song> + 'a {
        let needle = filter.trim().to_lowercase();
        self.songs.iter().filter(move |song| {
            needle.is_empty()
                || song.title.to_lowercase().contains(&needle)
                || song.artist.to_lowercase().contains(&needle)
                || song.album.to_lowercase().contains(&needle)
        })
    }
}

/// Header names of the dataset, in file order.
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = open_reader(path)?;
    Ok(reader.headers()?.iter().map(|h| h.trim().to_string()).collect())
}

/// Read one text document per dataset row by joining the given columns with
/// spaces. Blank cells are skipped.
///
/// Every named column must exist in the header.
pub fn read_documents(path: &Path, text_columns: &[String]) -> Result<Vec<String>> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers()?.clone();

    let positions = text_columns
        .iter()
        .map(|column| {
            column_position(&headers, column).ok_or_else(|| Error::MissingColumn {
                column: column.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record?;
        let document = positions
            .iter()
            .filter_map(|&i| record.get(i))
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        documents.push(document);
    }

    Ok(documents)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| Error::MissingArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(file))
}

fn column_position(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}
