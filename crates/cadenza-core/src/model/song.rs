use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when a song has no artist or album.
pub const UNKNOWN: &str = "Unknown";

/// A single song record from the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Row position in the dataset, assigned in file order at load time.
    pub row: usize,

    /// Display title. This is the user-facing key.
    pub title: String,

    pub artist: String,

    pub album: String,
}

impl Song {
    /// Build a song, substituting [`UNKNOWN`] for a missing or blank artist
    /// or album.
    #[must_use]
    pub fn new(row: usize, title: impl Into<String>, artist: Option<&str>, album: Option<&str>) -> Self {
        Self {
            row,
            title: title.into(),
            artist: or_unknown(artist),
            album: or_unknown(album),
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.artist)
    }
}

fn or_unknown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}
