//! Error types for startup and the listener.
//!
//! Request handling never produces these: every outcome of a request is a
//! status code. What ends up here is configuration, socket setup and worker
//! failures.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("root directory {path:?} is not usable: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("root {0:?} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not resolve listen address {0}")]
    Resolve(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to initialise logger: {0}")]
    Logger(String),

    #[error("worker {0} panicked")]
    WorkerPanicked(String),
}
