use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required data or model file could not be opened.
    #[error("missing artifact {}: {source}", path.display())]
    MissingArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact was readable but its contents are malformed or do not
    /// agree with the dataset.
    #[error("invalid {artifact}: {message}")]
    InvalidArtifact { artifact: String, message: String },

    /// The requested title is not in the index table.
    #[error("song not found: {title}")]
    UnknownSong { title: String },

    #[error("dataset has no column named {column:?}")]
    MissingColumn { column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidArtifact`].
    pub fn invalid(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when the error is a lookup miss that the caller can
    /// recover from by picking another song.
    pub fn is_unknown_song(&self) -> bool {
        matches!(self, Self::UnknownSong { .. })
    }

    /// Returns `true` when a required file could not be found or opened.
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, Self::MissingArtifact { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_song_is_distinguishable() {
        let err = Error::UnknownSong {
            title: "Nonexistent Song".to_string(),
        };
        assert!(err.is_unknown_song());
        assert!(!err.is_missing_artifact());
        assert_eq!(err.to_string(), "song not found: Nonexistent Song");
    }

    #[test]
    fn test_missing_artifact_message_names_path() {
        let err = Error::MissingArtifact {
            path: PathBuf::from("/data/indices.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.is_missing_artifact());
        assert!(err.to_string().contains("/data/indices.json"));
    }
}
