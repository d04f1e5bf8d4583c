use crate::error::ExportError;
use crate::merger::MergedData;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a merge preview, `isCopied` flags included.
pub fn export_merged_json<P: AsRef<Path>>(merged: &MergedData, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let json = serde_json::to_string_pretty(merged)?;

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    Ok(())
}
