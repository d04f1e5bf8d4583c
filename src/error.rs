//! Error types for remodel-geometry.

use crate::model::Version;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the geometry store.
///
/// Not-found ids are never errors. Failures are a version whose geometry was
/// never initialized, and adjacency updates against an empty tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// The working tree for this version is missing.
    #[error("geometry for version '{version}' is not initialized")]
    Uninitialized { version: Version },

    /// An adjacency update was asked of a version with no floors.
    #[error("geometry for version '{version}' has no floors to link")]
    EmptyTree { version: Version },
}

/// Errors that can occur when loading or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Failed to read the document from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the document to disk.
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the model.
    #[error("invalid document: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}
