//! Error types for the proposal exporter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the proposal exporter
#[derive(Error, Debug)]
pub enum Error {
    /// Logo or preview bitmap could not be read or decoded
    #[error("Failed to load asset {}: {reason}", .path.display())]
    AssetLoadFailed { path: PathBuf, reason: String },

    /// Serializing or writing the finished document failed
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Page geometry leaves no room for content
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    /// Source bitmap cannot be paginated
    #[error("Invalid source image: {0}")]
    InvalidImage(String),

    /// Page index outside the document
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    pub(crate) fn asset(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::AssetLoadFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
