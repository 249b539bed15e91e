use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for catalog and normalization operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Error raised by the image decoder collaborator for a single file.
#[derive(Debug, Error)]
#[error("failed to decode {path:?}: {reason}")]
pub struct DecodeError {
    pub path: PathBuf,
    pub reason: String,
}

/// Error types for catalog construction, filtering, balancing and normalization
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Catalog data contradicts itself or the file tree
    #[error("integrity error: {0}")]
    Integrity(String),
    /// A directory or label has no entry in the translation tables
    #[error("unknown class '{0}'")]
    UnknownClass(String),
    /// A class of the closed class set has no rows left
    #[error("class '{0}' has no samples, cannot balance")]
    EmptyClass(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DatasetError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DatasetError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(error: serde_json::Error) -> Self {
        DatasetError::Config(error.to_string())
    }
}
