//! Error types for src2pdf.

use std::path::PathBuf;

/// Errors surfaced by the library.
///
/// Only `FileRead` is recoverable: the document writer logs it, counts the
/// file as skipped and moves on. Everything else ends the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("font unavailable ({origin}): {reason}")]
    FontUnavailable { origin: String, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render document: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
