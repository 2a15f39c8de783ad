//! Reading and writing precomputed artifacts.
//!
//! Artifacts are JSON documents. A path ending in `.gz` is transparently
//! gzip-compressed on write and decompressed on read.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Whether `path` names a gzip-compressed artifact.
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Load a JSON artifact.
///
/// A file that cannot be opened is reported as [`Error::MissingArtifact`];
/// one that opens but does not parse is [`Error::InvalidArtifact`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| Error::MissingArtifact {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    serde_json::from_reader(reader)
        .map_err(|e| Error::invalid(path.display().to_string(), e.to_string()))
}

/// Write a JSON artifact, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(path)?);
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, value)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = writer;
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }

    log::debug!("Wrote artifact {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample() -> BTreeMap<String, usize> {
        BTreeMap::from([("Hey Jude".to_string(), 0), ("Imagine".to_string(), 1)])
    }

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(Path::new("similarity.json.gz")));
        assert!(is_gzip(Path::new("SIMILARITY.JSON.GZ")));
        assert!(!is_gzip(Path::new("similarity.json")));
        assert!(!is_gzip(Path::new("gz")));
    }

    #[test]
    fn test_plain_and_gzip_files_read_back() {
        let dir = TempDir::new().unwrap();
        for name in ["nested/indices.json", "indices.json.gz"] {
            let path = dir.path().join(name);
            write_json(&path, &sample()).unwrap();
            let loaded: BTreeMap<String, usize> = read_json(&path).unwrap();
            assert_eq!(loaded, sample(), "{name}");
        }
    }

    #[test]
    fn test_gzip_file_is_compressed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("indices.json.gz");
        write_json(&path, &sample()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_json::<BTreeMap<String, usize>>(Path::new("/nonexistent/indices.json"))
            .unwrap_err();
        assert!(err.is_missing_artifact());
    }

    #[test]
    fn test_read_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("indices.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_json::<BTreeMap<String, usize>>(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { .. }));
    }
}
