//! Whole-document save and load.

use crate::error::DocumentError;
use crate::model::Document;
use std::fs;
use std::path::Path;
use tracing::info;

/// Reads a saved document.
///
/// # Example
///
/// ```no_run
/// use remodel_geometry::io::load_document;
///
/// let document = load_document("project.json")?;
/// println!("{}", document.name);
/// # Ok::<(), remodel_geometry::error::DocumentError>(())
/// ```
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document, DocumentError> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref).map_err(|source| DocumentError::FileRead {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let document: Document = serde_json::from_str(&content)?;
    info!(path = %path_ref.display(), name = %document.name, "document loaded");
    Ok(document)
}

/// Writes the whole document as pretty-printed JSON.
pub fn save_document<P: AsRef<Path>>(document: &Document, path: P) -> Result<(), DocumentError> {
    let path_ref = path.as_ref();
    let json = serde_json::to_string_pretty(document)?;

    fs::write(path_ref, json).map_err(|source| DocumentError::FileWrite {
        path: path_ref.to_path_buf(),
        source,
    })?;

    info!(path = %path_ref.display(), "document saved");
    Ok(())
}
