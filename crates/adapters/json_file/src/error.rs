//! File-specific error type wrapping IO and JSON errors.

use std::path::PathBuf;

use delaylight_domain::error::DelayLightError;

/// Errors originating from the JSON file layer.
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    /// Reading or writing a file failed.
    #[error("unable to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain the expected JSON document.
    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot has no detail for a scene.
    #[error("scene {0} is not in the host snapshot")]
    UnknownScene(String),
}

impl From<FileStoreError> for DelayLightError {
    fn from(err: FileStoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
