pub mod csv;
pub mod json;

pub use crate::error::ExportError;
pub use self::csv::{export_surfaces_csv, write_surfaces};
pub use self::json::export_merged_json;
