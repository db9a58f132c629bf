//! Error types for off-screen rendering and export

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering a figure off-screen
#[derive(Error, Debug)]
pub enum Error {
    /// The handle does not name a live figure root
    #[error("Invalid figure handle: {0}")]
    InvalidHandle(String),

    /// Vector export was requested but the document writers are not available
    #[error("Unsupported build configuration: {0}")]
    UnsupportedBuildConfiguration(String),

    /// The software rendering context could not be created
    #[error("Context creation failed: {0}")]
    ContextCreationFailed(String),

    /// The pixel buffer for the requested dimensions could not be allocated
    #[error("Failed to allocate a {width}x{height} pixel buffer")]
    BufferAllocationFailed { width: u32, height: u32 },

    /// The buffer could not be bound to the context
    #[error("Context bind failed: {0}")]
    ContextBindFailed(String),

    /// The output file could not be opened for writing
    #[error("Couldn't create file {path:?}: {source}")]
    SinkOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the exported document failed
    #[error("Failed to write document: {0}")]
    SinkWriteError(#[from] std::io::Error),

    /// No recognized output format in the format flags
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(String),

    /// A scene description could not be turned into a figure
    #[error("Scene error: {0}")]
    SceneError(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SceneError(err.to_string())
    }
}
