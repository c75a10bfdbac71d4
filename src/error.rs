use thiserror::Error;

/// Library error type for photo-grid operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured library root is missing or not a directory.
    #[error("invalid photo library root: {0}")]
    BadLibraryRoot(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
